//! Transport layer.
//!
//! `window` is the in-process postMessage model shared by both sides of the
//! bridge. `ws` relays the same traffic for out-of-process frames, decoding
//! socket messages once through `codec` before they reach the host.

pub mod codec;
pub mod window;
pub mod ws;

pub use window::{
    MessageEvent, MessagePort, Origin, Port, TargetOrigin, Window, WindowHandle, WindowId,
};

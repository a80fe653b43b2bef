//! Embedded frame seam for the bridge host.

use std::sync::Arc;

use thiserror::Error;

use crate::transport::{MessagePort, WindowHandle, WindowId};

/// Why direct script injection did not happen.
#[derive(Debug, Clone, Error)]
pub enum InjectError {
    /// Reading the frame's document threw (different origin).
    #[error("cross-origin frame ({frame} vs host {host})")]
    CrossOrigin { frame: String, host: String },
    #[error("injection failed: {0}")]
    Failed(String),
}

/// The host page's iframe element, as far as the bridge needs it.
pub trait EmbeddedFrame: Send + Sync {
    /// Port posting into the frame's content window on behalf of the host.
    fn content_window(&self) -> Arc<dyn MessagePort>;

    /// Run `script` directly inside the frame. Only possible same-origin.
    fn inject_same_origin(&self, script: &str) -> Result<(), InjectError>;
}

type Injector = Box<dyn Fn(&str) -> Result<(), InjectError> + Send + Sync>;

/// In-process frame backed by two `Window`s.
pub struct LocalFrame {
    host: WindowHandle,
    content: WindowHandle,
    injector: Option<Injector>,
}

impl LocalFrame {
    pub fn new(host: WindowHandle, content: WindowHandle) -> Self {
        Self {
            host,
            content,
            injector: None,
        }
    }

    /// Hook executed on same-origin injection (the frame's script runner).
    pub fn with_injector<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Result<(), InjectError> + Send + Sync + 'static,
    {
        self.injector = Some(Box::new(f));
        self
    }

    pub fn content_window_id(&self) -> WindowId {
        self.content.id()
    }
}

impl EmbeddedFrame for LocalFrame {
    fn content_window(&self) -> Arc<dyn MessagePort> {
        Arc::new(self.content.port_from(&self.host))
    }

    fn inject_same_origin(&self, script: &str) -> Result<(), InjectError> {
        let (frame, host) = (self.content.origin(), self.host.origin());
        if frame.is_opaque() || frame != host {
            return Err(InjectError::CrossOrigin {
                frame: frame.to_string(),
                host: host.to_string(),
            });
        }
        match &self.injector {
            Some(run) => run(script),
            None => Ok(()),
        }
    }
}

/// Lifecycle of the host with respect to its frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostState {
    /// No frame attached.
    Idle,
    /// Frame attached, handler active, nothing executing.
    Listening,
    /// Frame attached and `in_flight` calls executing concurrently.
    Executing { in_flight: usize },
}

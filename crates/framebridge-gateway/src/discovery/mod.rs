//! Wallet discovery handshake (EIP-6963 style) for the provider stub.
//!
//! Dapps that do not look at the well-known global listen for announcements
//! instead. The stub announces itself on start and again on every
//! `RequestProvider`, always pairing its info with the live provider object.

pub mod announce;

pub use announce::{
    AnnouncementChannel, ProviderDetail, ProviderInfo, ScopeEvent, PROVIDER_INFO_PLACEHOLDER,
};

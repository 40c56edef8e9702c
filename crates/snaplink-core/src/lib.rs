//! Core types and traits for the snaplink short-link engine.
//!
//! This crate provides the link record model, the shortcode type, the
//! clock abstraction and the seams (snapshot store, notification sink)
//! shared by the generator, storage and shortener crates.

pub mod clock;
pub mod error;
pub mod link;
pub mod notification;
pub mod shortcode;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, NotifyError, StorageError};
pub use link::{
    parse_long_url, ClickEvent, LinkRecord, LinkRef, TimeRemaining, ValidityWindow,
    DEFAULT_VALIDITY_MINUTES,
};
pub use notification::{Category, Level, Notification, NotificationSink, Origin};
pub use shortcode::Shortcode;
pub use store::SnapshotStore;

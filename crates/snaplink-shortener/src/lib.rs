//! Short-link lifecycle engine.
//!
//! This crate wires the code generators and snapshot stores into the
//! [`LinkRegistry`], which owns the link records, and the
//! [`SubmissionProcessor`], which turns a batch of form rows into records.
//! Notifications about what happened are handed to a background
//! [`notifier`] task and never block either of them.

pub mod error;
pub mod notifier;
pub mod registry;
pub mod submission;

pub use error::{RegistryError, SubmissionError};
pub use notifier::{NotifierHandle, TracingSink};
pub use registry::{is_expired, time_remaining, LinkRegistry, NewLink};
pub use submission::{BatchPhase, BatchReceipt, SubmissionProcessor, SubmissionRow, SUCCESS_MESSAGE};

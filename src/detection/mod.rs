//! # Detection Dispatcher
//!
//! Samples presented frames at a throttled rate and sends them to an
//! external face detector without blocking the render tick. Results arrive
//! on the async runtime and are swapped into a single-slot mailbox.

mod dispatcher;
mod encode;
mod mailbox;
mod service;
pub mod types;

pub use dispatcher::{DetectionDispatcher, RoundTripCallback};
pub use encode::{encode_jpeg, EncodedFrame};
pub use mailbox::{DetectionMailbox, DetectionSnapshot};
pub use service::{DetectFuture, DetectionService, HttpDetectionService};
pub use types::{DetectionResponse, DetectionResult, DetectionStats, DisplayScale, RawDetection};

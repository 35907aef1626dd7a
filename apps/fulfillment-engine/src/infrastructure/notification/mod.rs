//! Notification Adapters

pub mod tracing_notifier;

pub use tracing_notifier::{RecordingNotifier, TracingNotifier};

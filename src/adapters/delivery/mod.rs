//! Message delivery adapters.

mod recording_message_delivery;

pub use recording_message_delivery::{PostedMessage, RecordingMessageDelivery};

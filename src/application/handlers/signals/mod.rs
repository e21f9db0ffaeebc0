//! Signal command handlers.

mod record_signal;

pub use record_signal::{RecordSignalCommand, RecordSignalError, RecordSignalHandler};

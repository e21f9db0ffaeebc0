//! Generation capability adapters.

mod http;
mod mock;

pub use http::{HttpGenerationClient, HttpGenerationConfig};
pub use mock::{MockImageGenerator, MockTextGenerator};

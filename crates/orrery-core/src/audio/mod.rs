pub mod backend;
pub mod engine;
pub mod recovery;
pub mod transport;

pub use backend::*;
pub use engine::AudioEngine;
pub use recovery::RetryPolicy;
pub use transport::{EventId, Fired, FiredEvents, Transport};

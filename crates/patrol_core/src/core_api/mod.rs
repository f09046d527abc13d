mod engine;
mod error;
mod types;

pub use engine::{Engine, EngineOptions, Session};
pub use error::{CoreError, CoreErrorCode};
pub use types::Snapshot;

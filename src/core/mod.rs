pub mod config;
pub mod error;
pub mod types;

pub use config::{load_config, DwellerConfig};
pub use error::{DwellerError, Result};
pub use types::{AgentBody, AgentHandle, BlockPos, Subject, SubjectId, Tick};

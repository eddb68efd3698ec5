pub mod checks;
pub mod command;
pub mod config;
pub mod executor;
pub mod telemetry;

pub use checks::{CheckCategory, CheckSelection};
pub use command::{compile, CommandVector, CompiledCommand};
pub use config::{AnalyzerOptions, Config, ConfigError};
pub use executor::{Executor, Outcome};

pub type Result<T> = anyhow::Result<T>;

#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CheckArgs, CliConfig, Command, GenerateArgs, LocalArgs, ReleaseArgs, RunArgs};
pub use toml_config::PifConfig;

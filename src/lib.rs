pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{github::GitHubClient, storage::LocalStorage};
pub use app::workflow::{PifWorkflow, WorkflowOutcome};
pub use config::PifConfig;
pub use self::core::{generator::PifGenerator, publisher::ReleasePublisher, release_check::ReleaseChecker};
pub use domain::model::{PifProfile, ReleaseAsset, ReleaseCheckReport, RepoType, SourceRepo};
pub use utils::error::{PifError, Result};

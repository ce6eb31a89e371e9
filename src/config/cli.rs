use crate::config::toml_config::PifConfig;
use crate::domain::model::{ReleaseAsset, RepoType};
use crate::utils::error::{PifError, Result};
use crate::utils::validation::Validate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "pif-gen")]
#[command(about = "Generate Play Integrity Fix profiles from Android build-property releases")]
#[command(version)]
pub struct CliConfig {
    /// Path to an optional TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// GitHub token used for API calls
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Override the GitHub API base URL
    #[arg(long, global = true)]
    pub api_base: Option<String>,

    /// Directory generated profiles and the manifest are written to
    #[arg(long, global = true)]
    pub output_dir: Option<String>,

    /// Directory holding the last processed tag files
    #[arg(long, global = true)]
    pub state_dir: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Check monitored repositories for unprocessed releases
    Check(CheckArgs),
    /// Generate profiles for a list of release assets
    Generate(GenerateArgs),
    /// Create (or reuse) a release and upload the generated profiles
    Release(ReleaseArgs),
    /// Check, generate, optionally publish, then record processed tags
    Run(RunArgs),
    /// Build a profile from a local ZIP or system.prop file
    Local(LocalArgs),
}

#[derive(Debug, Clone, Args)]
pub struct CheckArgs {
    /// GitHub Actions step output file
    #[arg(long, env = "GITHUB_OUTPUT")]
    pub github_output: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct GenerateArgs {
    /// JSON array of {"name", "url"} assets
    #[arg(long, conflicts_with = "assets_file", required_unless_present = "assets_file")]
    pub assets: Option<String>,

    /// File containing the JSON asset array
    #[arg(long)]
    pub assets_file: Option<PathBuf>,

    /// stable or experimental
    #[arg(long)]
    pub repo_type: RepoType,
}

#[derive(Debug, Clone, Args)]
pub struct ReleaseArgs {
    /// Target repository as owner/name
    pub repo: String,
    /// Upstream tag the profiles were generated from
    pub tag: String,
    pub repo_type: RepoType,

    /// Manifest listing the files to upload (defaults to the configured manifest)
    #[arg(long)]
    pub manifest: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Publish generated profiles to this owner/name repository
    #[arg(long)]
    pub publish_to: Option<String>,

    #[arg(long, env = "GITHUB_OUTPUT")]
    pub github_output: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct LocalArgs {
    /// A flashable ZIP or a raw system.prop file
    pub path: PathBuf,

    #[arg(long, default_value = "stable")]
    pub repo_type: RepoType,

    /// Write the profile to the output directory instead of stdout
    #[arg(long)]
    pub write: bool,
}

impl CliConfig {
    /// Merge defaults, the optional TOML file, and command-line overrides.
    pub fn resolve(&self) -> Result<PifConfig> {
        let mut config = match &self.config {
            Some(path) => PifConfig::from_file(path)?,
            None => PifConfig::default(),
        };

        if let Some(token) = self.token.as_ref().filter(|t| !t.trim().is_empty()) {
            config.github.token = Some(token.clone());
        }
        if let Some(api_base) = &self.api_base {
            config.github.api_base = api_base.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output.directory = dir.clone();
        }
        if let Some(dir) = &self.state_dir {
            config.output.state_directory = dir.clone();
        }
        if let Command::Run(RunArgs {
            publish_to: Some(repo),
            ..
        }) = &self.command
        {
            config.publish.repository = Some(repo.clone());
        }

        config.validate()?;
        Ok(config)
    }
}

impl GenerateArgs {
    pub fn load_assets(&self) -> Result<Vec<ReleaseAsset>> {
        let raw = match (&self.assets, &self.assets_file) {
            (Some(json), _) => json.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)?,
            (None, None) => {
                return Err(PifError::MissingConfigError {
                    field: "assets".to_string(),
                })
            }
        };
        Ok(serde_json::from_str(&raw)?)
    }
}

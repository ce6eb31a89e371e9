use crate::adapters::github::DEFAULT_API_BASE;
use crate::adapters::http::DEFAULT_USER_AGENT;
use crate::domain::model::SourceRepo;
use crate::utils::error::{PifError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_repo_slug,
    validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PifConfig {
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default = "SourceRepo::defaults")]
    pub sources: Vec<SourceRepo>,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub publish: PublishConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub api_base: String,
    pub token: Option<String>,
    pub user_agent: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: String,
    pub state_directory: String,
    pub manifest: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    pub repository: Option<String>,
}

impl Default for PifConfig {
    fn default() -> Self {
        Self {
            github: GitHubConfig::default(),
            sources: SourceRepo::defaults(),
            output: OutputConfig::default(),
            download: DownloadConfig::default(),
            publish: PublishConfig::default(),
        }
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            token: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_seconds: 30,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
            state_directory: ".".to_string(),
            manifest: "generated_files.txt".to_string(),
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 120,
        }
    }
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"))
}

impl PifConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        let mut config: PifConfig = toml::from_str(&processed_content)
            .map_err(|e| PifError::config(format!("TOML parsing error: {}", e)))?;

        // unresolved ${VAR} means the token was not provided
        if config
            .github
            .token
            .as_deref()
            .is_some_and(|t| t.trim().is_empty() || env_var_pattern().is_match(t))
        {
            config.github.token = None;
        }

        Ok(config)
    }

    /// Replace `${VAR}` with the environment value; unknown variables are left as is.
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn github_timeout(&self) -> Duration {
        Duration::from_secs(self.github.timeout_seconds)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download.timeout_seconds)
    }
}

impl Validate for PifConfig {
    fn validate(&self) -> Result<()> {
        validate_url("github.api_base", &self.github.api_base)?;
        validate_non_empty_string("github.user_agent", &self.github.user_agent)?;
        validate_positive_number("github.timeout_seconds", self.github.timeout_seconds, 1)?;
        validate_positive_number("download.timeout_seconds", self.download.timeout_seconds, 1)?;

        validate_path("output.directory", &self.output.directory)?;
        validate_path("output.state_directory", &self.output.state_directory)?;
        validate_path("output.manifest", &self.output.manifest)?;

        if self.sources.is_empty() {
            return Err(PifError::MissingConfigError {
                field: "sources".to_string(),
            });
        }
        for source in &self.sources {
            validate_repo_slug("sources", &source.full_name())?;
        }

        if let Some(repository) = &self.publish.repository {
            validate_repo_slug("publish.repository", repository)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::RepoType;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_file_yields_defaults() {
        let config = PifConfig::from_toml_str("").unwrap();

        assert_eq!(config.github.api_base, "https://api.github.com");
        assert_eq!(config.sources, SourceRepo::defaults());
        assert_eq!(config.output.manifest, "generated_files.txt");
        assert_eq!(config.download.timeout_seconds, 120);
        assert!(config.publish.repository.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[github]
api_base = "http://127.0.0.1:9000"
timeout_seconds = 10

[[sources]]
owner = "Pixel-Props"
name = "build.prop"
type = "stable"

[output]
directory = "./out"
state_directory = "./state"

[download]
timeout_seconds = 60

[publish]
repository = "someone/pif-releases"
"#;

        let config = PifConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.sources[0].repo_type, RepoType::Stable);
        assert_eq!(config.output.directory, "./out");
        assert_eq!(config.output.manifest, "generated_files.txt");
        assert_eq!(config.download_timeout(), Duration::from_secs(60));
        assert_eq!(config.publish.repository.as_deref(), Some("someone/pif-releases"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("PIF_GEN_TEST_TOKEN", "ghp_test");

        let config = PifConfig::from_toml_str(
            r#"
[github]
token = "${PIF_GEN_TEST_TOKEN}"
"#,
        )
        .unwrap();
        assert_eq!(config.github.token.as_deref(), Some("ghp_test"));

        std::env::remove_var("PIF_GEN_TEST_TOKEN");
    }

    #[test]
    fn test_unresolved_token_is_dropped() {
        let config = PifConfig::from_toml_str(
            r#"
[github]
token = "${PIF_GEN_SURELY_UNSET_VARIABLE}"
"#,
        )
        .unwrap();
        assert!(config.github.token.is_none());
    }

    #[test]
    fn test_config_validation() {
        let config = PifConfig::from_toml_str(
            r#"
[github]
api_base = "not a url"
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());

        let config = PifConfig::from_toml_str(
            r#"
[publish]
repository = "missing-slash"
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());

        let config = PifConfig::from_toml_str("sources = []").unwrap();
        assert!(matches!(
            config.validate(),
            Err(PifError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[output]\ndirectory = \"./generated\"\n")
            .unwrap();

        let config = PifConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.output.directory, "./generated");
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            PifConfig::from_toml_str("[github"),
            Err(PifError::ConfigError { .. })
        ));
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Release channel of an upstream build-property source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoType {
    Stable,
    Experimental,
}

impl RepoType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepoType::Stable => "stable",
            RepoType::Experimental => "experimental",
        }
    }

    /// File name prefix for generated profiles.
    pub fn file_prefix(&self) -> &'static str {
        match self {
            RepoType::Stable => "Stable_PIF_",
            RepoType::Experimental => "EXPERIMENTAL_",
        }
    }

    /// Name of the file holding the last processed upstream tag.
    pub fn tag_file_name(&self) -> String {
        format!("last_release_{}_tag.txt", self.as_str())
    }
}

impl fmt::Display for RepoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RepoType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stable" => Ok(RepoType::Stable),
            "experimental" => Ok(RepoType::Experimental),
            other => Err(format!(
                "unknown repo type '{}', expected 'stable' or 'experimental'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRepo {
    pub owner: String,
    pub name: String,
    #[serde(rename = "type")]
    pub repo_type: RepoType,
}

impl SourceRepo {
    pub fn new(owner: &str, name: &str, repo_type: RepoType) -> Self {
        Self {
            owner: owner.to_string(),
            name: name.to_string(),
            repo_type,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    pub fn defaults() -> Vec<SourceRepo> {
        vec![
            SourceRepo::new("Pixel-Props", "build.prop", RepoType::Stable),
            SourceRepo::new("Elcapitanoe", "Build-Prop-BETA", RepoType::Experimental),
        ]
    }
}

/// A downloadable release asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseCheckResult {
    pub repo_type: RepoType,
    pub latest_tag: String,
    pub assets: Vec<ReleaseAsset>,
    pub count: usize,
}

impl ReleaseCheckResult {
    pub fn new(repo_type: RepoType, latest_tag: String, assets: Vec<ReleaseAsset>) -> Self {
        let count = assets.len();
        Self {
            repo_type,
            latest_tag,
            assets,
            count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseCheckReport {
    pub new_release: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<ReleaseCheckResult>,
}

impl ReleaseCheckReport {
    pub fn from_results(results: Vec<ReleaseCheckResult>) -> Self {
        Self {
            new_release: !results.is_empty(),
            results,
        }
    }
}

/// Device profile consumed by Play Integrity Fix. Field order is the
/// serialized key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct PifProfile {
    pub manufacturer: String,
    pub model: String,
    pub fingerprint: String,
    pub brand: String,
    pub product: String,
    pub device: String,
    pub security_patch: String,
    pub first_api_level: String,
}

impl PifProfile {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub generated: Vec<String>,
    pub failed: Vec<String>,
    pub total: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PublishSummary {
    pub release_tag: String,
    pub uploaded: usize,
    pub skipped: usize,
    pub missing: usize,
    pub failed: usize,
    pub total: usize,
}

/// Release metadata as returned by the GitHub API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub id: u64,
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub upload_url: String,
    #[serde(default)]
    pub assets: Vec<RemoteAsset>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAsset {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    pub browser_download_url: String,
}

impl From<&RemoteAsset> for ReleaseAsset {
    fn from(asset: &RemoteAsset) -> Self {
        ReleaseAsset {
            name: asset.name.clone(),
            url: asset.browser_download_url.clone(),
        }
    }
}

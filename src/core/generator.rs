use crate::adapters::http::download;
use crate::core::archive::extract_system_prop;
use crate::core::pif::{build_pif, output_filename};
use crate::core::props::parse_system_prop;
use crate::domain::model::{GenerationReport, PifProfile, ReleaseAsset, RepoType};
use crate::domain::ports::Storage;
use crate::utils::error::{PifError, Result};
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_MANIFEST: &str = "generated_files.txt";

/// Turns release ZIPs into PIF JSON files for one repository channel.
pub struct PifGenerator<S: Storage> {
    storage: S,
    client: Client,
    repo_type: RepoType,
    download_timeout: Duration,
    manifest_name: String,
}

impl<S: Storage> PifGenerator<S> {
    pub fn new(storage: S, client: Client, repo_type: RepoType) -> Self {
        Self {
            storage,
            client,
            repo_type,
            download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
            manifest_name: DEFAULT_MANIFEST.to_string(),
        }
    }

    pub fn with_download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }

    pub fn with_manifest_name(mut self, name: impl Into<String>) -> Self {
        self.manifest_name = name.into();
        self
    }

    pub fn repo_type(&self) -> RepoType {
        self.repo_type
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Builds a validated profile from raw ZIP bytes.
    pub fn profile_from_zip(zip_bytes: &[u8]) -> Result<PifProfile> {
        let content = extract_system_prop(zip_bytes)?;
        let props = parse_system_prop(&content);
        tracing::debug!("Parsed {} properties", props.len());
        build_pif(&props)
    }

    /// Writes the profile for `zip_name` and returns the output file name.
    pub async fn generate_from_bytes(&self, zip_name: &str, zip_bytes: &[u8]) -> Result<String> {
        let pif = Self::profile_from_zip(zip_bytes)?;

        let filename = output_filename(self.repo_type, zip_name);
        let json = pif.to_json_pretty()?;
        self.storage.write_file(&filename, json.as_bytes()).await?;

        tracing::info!("Generated {}", filename);
        tracing::debug!("All fields populated for {} ({})", filename, pif.model);
        Ok(filename)
    }

    pub async fn generate(&self, asset: &ReleaseAsset) -> Result<String> {
        let result = async {
            let zip_bytes = download(&self.client, &asset.url, self.download_timeout).await?;
            self.generate_from_bytes(&asset.name, &zip_bytes).await
        }
        .await;

        if let Err(e) = &result {
            tracing::error!("{}: {}", asset.name, e);
        }
        result
    }

    /// Re-reads a generated file and reports whether every value is non-empty.
    async fn verify(&self, filename: &str) -> Result<bool> {
        let data = self.storage.read_file(filename).await?;
        let value: serde_json::Value = serde_json::from_slice(&data)?;
        let all_populated = value
            .as_object()
            .map(|obj| {
                obj.values()
                    .all(|v| v.as_str().map(|s| !s.is_empty()).unwrap_or(true))
            })
            .unwrap_or(false);
        Ok(all_populated)
    }

    /// Processes every asset in order. Failures are recorded and skipped;
    /// an empty result is an error.
    pub async fn generate_all(&self, assets: &[ReleaseAsset]) -> Result<GenerationReport> {
        let total = assets.len();
        tracing::info!("Processing {} assets for {}", total, self.repo_type);

        let mut report = GenerationReport {
            total,
            ..Default::default()
        };

        for (i, asset) in assets.iter().enumerate() {
            tracing::info!("[{}/{}] {}", i + 1, total, asset.name);

            let outcome = match self.generate(asset).await {
                Ok(filename) => {
                    let verified = self.verify(&filename).await;
                    verified.map(|populated| (filename, populated))
                }
                Err(e) => Err(e),
            };

            match outcome {
                Ok((filename, populated)) => {
                    tracing::info!("Verified {} (all fields populated: {})", filename, populated);
                    report.generated.push(filename);
                }
                Err(e) => {
                    tracing::warn!("Failed {}: {}", asset.name, e);
                    report.failed.push(asset.name.clone());
                }
            }
        }

        tracing::info!("Success: {}/{}", report.generated.len(), total);
        tracing::info!("Failed: {}/{}", report.failed.len(), total);
        for name in &report.failed {
            tracing::info!("  - {}", name);
        }

        if report.generated.is_empty() {
            return Err(PifError::NoFilesGenerated {
                failed: report.failed.len(),
                total,
            });
        }

        self.write_manifest(&report.generated).await?;
        Ok(report)
    }

    pub async fn write_manifest(&self, files: &[String]) -> Result<()> {
        self.storage
            .write_file(&self.manifest_name, files.join("\n").as_bytes())
            .await?;
        tracing::info!("Generated files list: {}", self.manifest_name);
        Ok(())
    }
}

/// Reads a newline-separated manifest, ignoring blank lines.
pub fn parse_manifest(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

use crate::domain::model::{
    ReleaseAsset, ReleaseCheckReport, ReleaseCheckResult, RepoType, SourceRepo,
};
use crate::domain::ports::{ReleaseApi, Storage};
use crate::utils::error::Result;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

/// Finds upstream releases that have not been processed yet.
pub struct ReleaseChecker<A: ReleaseApi, S: Storage> {
    api: A,
    state: S,
    sources: Vec<SourceRepo>,
    github_output: Option<PathBuf>,
}

impl<A: ReleaseApi, S: Storage> ReleaseChecker<A, S> {
    pub fn new(api: A, state: S, sources: Vec<SourceRepo>) -> Self {
        Self {
            api,
            state,
            sources,
            github_output: None,
        }
    }

    /// Append step outputs to a GitHub Actions `$GITHUB_OUTPUT` file.
    pub fn with_github_output(mut self, path: Option<PathBuf>) -> Self {
        self.github_output = path;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub async fn last_processed(&self, repo_type: RepoType) -> Option<String> {
        let file = repo_type.tag_file_name();
        if !self.state.exists(&file).await {
            return None;
        }
        let data = self.state.read_file(&file).await.ok()?;
        Some(String::from_utf8_lossy(&data).trim().to_string())
    }

    pub async fn mark_processed(&self, repo_type: RepoType, tag: &str) -> Result<()> {
        self.state
            .write_file(&repo_type.tag_file_name(), tag.as_bytes())
            .await?;
        tracing::info!("Recorded {} as processed for {}", tag, repo_type);
        Ok(())
    }

    async fn check_source(&self, source: &SourceRepo) -> Result<Option<ReleaseCheckResult>> {
        let full_name = source.full_name();

        let Some(latest) = self.api.latest_release(&full_name).await? else {
            tracing::warn!("No releases for {}", full_name);
            return Ok(None);
        };
        let tag = latest.tag_name;

        if self.last_processed(source.repo_type).await.as_deref() == Some(tag.as_str()) {
            tracing::info!("{} @ {} - Already processed", full_name, tag);
            return Ok(None);
        }

        let assets: Vec<ReleaseAsset> = latest
            .assets
            .iter()
            .filter(|asset| asset.name.ends_with(".zip"))
            .map(ReleaseAsset::from)
            .collect();

        if assets.is_empty() {
            tracing::warn!("No ZIP assets in {}", tag);
            return Ok(None);
        }

        tracing::info!("[NEW] {} @ {} - {} assets", full_name, tag, assets.len());
        Ok(Some(ReleaseCheckResult::new(source.repo_type, tag, assets)))
    }

    /// Checks every source; a failing source is logged and skipped.
    pub async fn check(&self) -> Result<ReleaseCheckReport> {
        let mut results = Vec::new();

        for source in &self.sources {
            match self.check_source(source).await {
                Ok(Some(result)) => results.push(result),
                Ok(None) => {}
                Err(e) => tracing::error!("{}: {}", source.full_name(), e),
            }
        }

        let report = ReleaseCheckReport::from_results(results);
        if report.new_release {
            tracing::info!("Found {} new release(s)", report.results.len());
        } else {
            tracing::info!("No new releases");
        }

        self.write_github_output(&report).await?;
        Ok(report)
    }

    async fn write_github_output(&self, report: &ReleaseCheckReport) -> Result<()> {
        let Some(path) = &self.github_output else {
            return Ok(());
        };

        let mut lines = format!("new_release={}\n", report.new_release);
        if report.new_release {
            lines.push_str(&format!(
                "results={}\n",
                serde_json::to_string(&report.results)?
            ));
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        file.write_all(lines.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

use crate::domain::model::{PublishSummary, Release, RepoType};
use crate::domain::ports::{ReleaseApi, Storage};
use crate::utils::error::Result;
use chrono::{NaiveDate, Utc};
use std::collections::HashSet;
use std::path::Path;

pub fn release_tag(repo_type: RepoType, upstream_tag: &str) -> String {
    format!("{}-PIF-{}", repo_type, upstream_tag)
}

pub fn release_name(repo_type: RepoType, upstream_tag: &str) -> String {
    format!("{} PIF - {}", repo_type, upstream_tag)
}

pub fn release_notes(file_count: usize, date: NaiveDate) -> String {
    format!(
        "Auto-generated {} PIF JSON files. Generated: {}",
        file_count,
        date.format("%Y-%m-%d")
    )
}

/// Uploads generated profiles to a release in the target repository.
pub struct ReleasePublisher<A: ReleaseApi, S: Storage> {
    api: A,
    storage: S,
}

impl<A: ReleaseApi, S: Storage> ReleasePublisher<A, S> {
    pub fn new(api: A, storage: S) -> Self {
        Self { api, storage }
    }

    /// Creates the release, or reuses it when the tag already exists (HTTP 422).
    async fn create_or_get_release(
        &self,
        repo: &str,
        tag: &str,
        name: &str,
        notes: &str,
    ) -> Result<Release> {
        match self.api.create_release(repo, tag, name, notes).await {
            Ok(release) => {
                tracing::info!("Created release: {}", tag);
                Ok(release)
            }
            Err(e) if e.status() == Some(422) => {
                let release = self.api.release_by_tag(repo, tag).await?;
                tracing::info!("Release exists: {}", tag);
                Ok(release)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn publish(
        &self,
        repo: &str,
        upstream_tag: &str,
        repo_type: RepoType,
        files: &[String],
    ) -> Result<PublishSummary> {
        let tag = release_tag(repo_type, upstream_tag);
        let notes = release_notes(files.len(), Utc::now().date_naive());
        let release = self
            .create_or_get_release(repo, &tag, &release_name(repo_type, upstream_tag), &notes)
            .await?;

        let existing: HashSet<String> = self
            .api
            .list_assets(repo, &release)
            .await?
            .into_iter()
            .map(|asset| asset.name)
            .collect();

        let mut summary = PublishSummary {
            release_tag: tag,
            total: files.len(),
            ..Default::default()
        };

        for file in files {
            if !self.storage.exists(file).await {
                tracing::warn!("[SKIP] File not found: {}", file);
                summary.missing += 1;
                continue;
            }

            let filename = Path::new(file)
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or(file.as_str());

            if existing.contains(filename) {
                tracing::info!("[SKIP] Already uploaded: {}", filename);
                summary.skipped += 1;
                continue;
            }

            let uploaded = async {
                let data = self.storage.read_file(file).await?;
                self.api.upload_asset(&release, filename, data).await
            }
            .await;

            match uploaded {
                Ok(()) => {
                    tracing::info!("[UPLOAD] {}", filename);
                    summary.uploaded += 1;
                }
                Err(e) => {
                    tracing::error!("Failed to upload {}: {}", filename, e);
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            "Uploaded: {}, Skipped: {}/{}",
            summary.uploaded,
            summary.skipped,
            summary.total
        );
        Ok(summary)
    }
}

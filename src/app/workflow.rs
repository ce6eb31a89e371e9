use crate::adapters::storage::LocalStorage;
use crate::config::PifConfig;
use crate::core::generator::PifGenerator;
use crate::core::publisher::ReleasePublisher;
use crate::core::release_check::ReleaseChecker;
use crate::domain::model::{GenerationReport, PublishSummary, ReleaseCheckResult};
use crate::domain::ports::ReleaseApi;
use crate::utils::error::{PifError, Result};
use reqwest::Client;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct WorkflowOutcome {
    pub release: ReleaseCheckResult,
    pub generation: Option<GenerationReport>,
    pub publish: Option<PublishSummary>,
    pub error: Option<String>,
}

impl WorkflowOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// End-to-end run: check, generate, optionally publish, record the tag.
pub struct PifWorkflow<A: ReleaseApi + Clone> {
    api: A,
    client: Client,
    config: PifConfig,
}

impl<A: ReleaseApi + Clone> PifWorkflow<A> {
    pub fn new(api: A, client: Client, config: PifConfig) -> Self {
        Self {
            api,
            client,
            config,
        }
    }

    fn checker(&self, github_output: Option<PathBuf>) -> ReleaseChecker<A, LocalStorage> {
        ReleaseChecker::new(
            self.api.clone(),
            LocalStorage::new(&self.config.output.state_directory),
            self.config.sources.clone(),
        )
        .with_github_output(github_output)
    }

    async fn process(&self, release: &ReleaseCheckResult) -> Result<(GenerationReport, Option<PublishSummary>)> {
        let output = LocalStorage::new(&self.config.output.directory);

        let generator = PifGenerator::new(output.clone(), self.client.clone(), release.repo_type)
            .with_download_timeout(self.config.download_timeout())
            .with_manifest_name(self.config.output.manifest.clone());
        let generation = generator.generate_all(&release.assets).await?;

        let publish = match &self.config.publish.repository {
            Some(repo) => {
                let publisher = ReleasePublisher::new(self.api.clone(), output);
                let summary = publisher
                    .publish(repo, &release.latest_tag, release.repo_type, &generation.generated)
                    .await?;
                // a failed upload keeps the tag unrecorded so the next run retries it
                if summary.failed > 0 {
                    return Err(PifError::PublishIncomplete {
                        failed: summary.failed,
                        total: summary.total,
                    });
                }
                Some(summary)
            }
            None => None,
        };

        Ok((generation, publish))
    }

    pub async fn run(&self, github_output: Option<PathBuf>) -> Result<Vec<WorkflowOutcome>> {
        let checker = self.checker(github_output);
        let report = checker.check().await?;

        let mut outcomes = Vec::with_capacity(report.results.len());
        for release in report.results {
            tracing::info!(
                "Processing {} release {} ({} assets)",
                release.repo_type,
                release.latest_tag,
                release.count
            );

            let outcome = match self.process(&release).await {
                Ok((generation, publish)) => {
                    checker
                        .mark_processed(release.repo_type, &release.latest_tag)
                        .await?;
                    WorkflowOutcome {
                        release,
                        generation: Some(generation),
                        publish,
                        error: None,
                    }
                }
                Err(e) => {
                    tracing::error!(
                        "{} release {} failed: {}",
                        release.repo_type,
                        release.latest_tag,
                        e
                    );
                    WorkflowOutcome {
                        release,
                        generation: None,
                        publish: None,
                        error: Some(e.to_string()),
                    }
                }
            };
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }
}

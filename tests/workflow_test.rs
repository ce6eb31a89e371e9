use httpmock::prelude::*;
use pif_gen::config::toml_config::PifConfig;
use pif_gen::{GitHubClient, PifWorkflow, RepoType, SourceRepo};
use std::io::{Cursor, Write};
use std::time::Duration;
use tempfile::TempDir;
use zip::write::{SimpleFileOptions, ZipWriter};

const CAIMAN_PROP: &str = "\
# Pixel 9 Pro
ro.product.manufacturer=Google
ro.product.model=Pixel 9 Pro
ro.product.brand=google
ro.product.name=caiman
ro.product.device=caiman
ro.build.product=caiman
ro.build.fingerprint=google/caiman/caiman:15/BP11.241025.006/12620009:user/release-keys
ro.build.version.security_patch=2024-12-05
ro.board.first_api_level=34
";

fn flashable_zip(prop: &str) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file("module.prop", SimpleFileOptions::default())
        .unwrap();
    zip.write_all(b"id=playintegrityfix\n").unwrap();
    zip.start_file("system/system.prop", SimpleFileOptions::default())
        .unwrap();
    zip.write_all(prop.as_bytes()).unwrap();
    zip.finish().unwrap().into_inner()
}

struct Fixture {
    server: MockServer,
    output: TempDir,
    state: TempDir,
}

impl Fixture {
    async fn new() -> Self {
        Self {
            server: MockServer::start_async().await,
            output: TempDir::new().unwrap(),
            state: TempDir::new().unwrap(),
        }
    }

    fn config(&self, publish: Option<&str>) -> PifConfig {
        let mut config = PifConfig::default();
        config.github.api_base = self.server.base_url();
        config.github.token = Some("test-token".to_string());
        config.sources = vec![SourceRepo::new("Elcapitanoe", "Build-Prop-BETA", RepoType::Experimental)];
        config.output.directory = self.output.path().to_string_lossy().into_owned();
        config.output.state_directory = self.state.path().to_string_lossy().into_owned();
        config.download.timeout_seconds = 5;
        config.publish.repository = publish.map(str::to_string);
        config
    }

    fn workflow(&self, publish: Option<&str>) -> PifWorkflow<GitHubClient> {
        let config = self.config(publish);
        let api = GitHubClient::new(
            &config.github.api_base,
            config.github.token.clone(),
            "pif-gen-test",
            Duration::from_secs(5),
        )
        .unwrap();
        PifWorkflow::new(api, reqwest::Client::new(), config)
    }

    async fn mock_latest_release(&self, tag: &str) {
        let download_url = self.server.url("/download/caiman_beta.zip");
        let tag = tag.to_string();
        self.server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/repos/Elcapitanoe/Build-Prop-BETA/releases/latest");
                then.status(200).json_body(serde_json::json!({
                    "id": 100,
                    "tag_name": tag,
                    "upload_url": "",
                    "assets": [
                        {"id": 1, "name": "caiman_beta.zip", "browser_download_url": download_url}
                    ]
                }));
            })
            .await;
    }
}

#[tokio::test]
async fn test_run_generates_publishes_and_records_tag() {
    let fixture = Fixture::new().await;
    fixture.mock_latest_release("beta-12").await;

    let download = fixture
        .server
        .mock_async(|when, then| {
            when.method(GET).path("/download/caiman_beta.zip");
            then.status(200).body(flashable_zip(CAIMAN_PROP));
        })
        .await;
    let create = fixture
        .server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/repos/me/pif/releases")
                .body_contains(r#""tag_name":"experimental-PIF-beta-12""#);
            then.status(201).json_body(serde_json::json!({
                "id": 200,
                "tag_name": "experimental-PIF-beta-12",
                "upload_url": format!(
                    "{}{{?name,label}}",
                    fixture.server.url("/uploads/releases/200/assets")
                ),
                "assets": []
            }));
        })
        .await;
    fixture
        .server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/me/pif/releases/200/assets");
            then.status(200).json_body(serde_json::json!([]));
        })
        .await;
    let upload = fixture
        .server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/uploads/releases/200/assets")
                .query_param("name", "EXPERIMENTAL_caiman_beta.json")
                .body_contains("\"FINGERPRINT\": \"google/caiman/caiman:15/BP11.241025.006/12620009:user/release-keys\"");
            then.status(201).json_body(serde_json::json!({"id": 1}));
        })
        .await;

    let outcomes = fixture.workflow(Some("me/pif")).run(None).await.unwrap();

    download.assert_async().await;
    create.assert_async().await;
    upload.assert_async().await;

    assert_eq!(outcomes.len(), 1);
    let outcome = &outcomes[0];
    assert!(outcome.succeeded());
    assert_eq!(
        outcome.generation.as_ref().unwrap().generated,
        vec!["EXPERIMENTAL_caiman_beta.json".to_string()]
    );
    assert_eq!(outcome.publish.as_ref().unwrap().uploaded, 1);

    let profile: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(fixture.output.path().join("EXPERIMENTAL_caiman_beta.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(profile["MODEL"], "Pixel 9 Pro");
    assert_eq!(profile["PRODUCT"], "caiman");
    assert_eq!(profile["SECURITY_PATCH"], "2024-12-05");
    assert_eq!(profile["FIRST_API_LEVEL"], "34");

    assert_eq!(
        std::fs::read_to_string(fixture.state.path().join("last_release_experimental_tag.txt")).unwrap(),
        "beta-12"
    );
}

#[tokio::test]
async fn test_run_without_publish_then_second_run_is_noop() {
    let fixture = Fixture::new().await;
    fixture.mock_latest_release("beta-13").await;
    let download = fixture
        .server
        .mock_async(|when, then| {
            when.method(GET).path("/download/caiman_beta.zip");
            then.status(200).body(flashable_zip(CAIMAN_PROP));
        })
        .await;

    let workflow = fixture.workflow(None);

    let first = workflow.run(None).await.unwrap();
    assert_eq!(first.len(), 1);
    assert!(first[0].succeeded());
    assert!(first[0].publish.is_none());
    assert!(fixture.output.path().join("generated_files.txt").exists());

    let second = workflow.run(None).await.unwrap();
    assert!(second.is_empty());
    assert_eq!(download.hits_async().await, 1);
}

#[tokio::test]
async fn test_run_leaves_tag_unrecorded_when_generation_fails() {
    let fixture = Fixture::new().await;
    fixture.mock_latest_release("beta-14").await;
    fixture
        .server
        .mock_async(|when, then| {
            when.method(GET).path("/download/caiman_beta.zip");
            then.status(200)
                .body(flashable_zip("ro.product.model=Pixel 9 Pro\n"));
        })
        .await;

    let outcomes = fixture.workflow(None).run(None).await.unwrap();

    assert_eq!(outcomes.len(), 1);
    assert!(!outcomes[0].succeeded());
    assert!(outcomes[0]
        .error
        .as_deref()
        .unwrap()
        .starts_with("No files generated"));
    assert!(!fixture
        .state
        .path()
        .join("last_release_experimental_tag.txt")
        .exists());
}

#[tokio::test]
async fn test_run_leaves_tag_unrecorded_when_uploads_fail() -> anyhow::Result<()> {
    let fixture = Fixture::new().await;
    fixture.mock_latest_release("beta-15").await;
    fixture
        .server
        .mock_async(|when, then| {
            when.method(GET).path("/download/caiman_beta.zip");
            then.status(200).body(flashable_zip(CAIMAN_PROP));
        })
        .await;
    fixture
        .server
        .mock_async(|when, then| {
            when.method(POST).path("/repos/me/pif/releases");
            then.status(201).json_body(serde_json::json!({
                "id": 300,
                "tag_name": "experimental-PIF-beta-15",
                "upload_url": format!(
                    "{}{{?name,label}}",
                    fixture.server.url("/uploads/releases/300/assets")
                ),
                "assets": []
            }));
        })
        .await;
    fixture
        .server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/me/pif/releases/300/assets");
            then.status(200).json_body(serde_json::json!([]));
        })
        .await;
    let upload = fixture
        .server
        .mock_async(|when, then| {
            when.method(POST).path("/uploads/releases/300/assets");
            then.status(500).body("upload exploded");
        })
        .await;

    let outcomes = fixture.workflow(Some("me/pif")).run(None).await?;

    upload.assert_async().await;
    assert_eq!(outcomes.len(), 1);
    assert!(!outcomes[0].succeeded());
    assert_eq!(
        outcomes[0].error.as_deref(),
        Some("Publishing incomplete: 1 of 1 uploads failed")
    );
    assert!(!fixture
        .state
        .path()
        .join("last_release_experimental_tag.txt")
        .exists());
    Ok(())
}

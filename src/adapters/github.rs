use crate::adapters::http::build_client;
use crate::domain::model::{Release, RemoteAsset};
use crate::domain::ports::ReleaseApi;
use crate::utils::error::{PifError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";

const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";
const ASSETS_PER_PAGE: u32 = 100;

#[derive(Serialize)]
struct CreateReleaseRequest<'a> {
    tag_name: &'a str,
    name: &'a str,
    body: &'a str,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// GitHub REST client covering the release endpoints.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    api_base: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(api_base: &str, token: Option<String>, user_agent: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(user_agent, timeout)?,
            api_base: api_base.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request
            .header(reqwest::header::ACCEPT, ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&text)
            .ok()
            .and_then(|body| body.message)
            .unwrap_or(text);

        Err(PifError::GitHubApiError {
            status: status.as_u16(),
            message,
        })
    }

    /// Strips the RFC 6570 `{?name,label}` suffix GitHub appends to upload URLs.
    pub fn upload_endpoint(upload_url: &str) -> &str {
        upload_url
            .split_once('{')
            .map(|(base, _)| base)
            .unwrap_or(upload_url)
    }
}

/// Extracts the `rel="next"` target from a `Link` header.
fn next_page_link(header: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let (target, params) = part.split_once(';')?;
        let is_next = params
            .split(';')
            .any(|param| param.trim() == r#"rel="next""#);
        if !is_next {
            return None;
        }
        let target = target.trim().strip_prefix('<')?.strip_suffix('>')?;
        Some(target.to_string())
    })
}

#[async_trait]
impl ReleaseApi for GitHubClient {
    async fn latest_release(&self, repo: &str) -> Result<Option<Release>> {
        let url = self.endpoint(&format!("repos/{}/releases/latest", repo));
        tracing::debug!("GET {}", url);

        let response = self.authorize(self.client.get(&url)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let release = Self::check(response).await?.json::<Release>().await?;
        Ok(Some(release))
    }

    async fn release_by_tag(&self, repo: &str, tag: &str) -> Result<Release> {
        let url = self.endpoint(&format!("repos/{}/releases/tags/{}", repo, tag));
        tracing::debug!("GET {}", url);

        let response = self.authorize(self.client.get(&url)).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn create_release(
        &self,
        repo: &str,
        tag: &str,
        name: &str,
        body: &str,
    ) -> Result<Release> {
        let url = self.endpoint(&format!("repos/{}/releases", repo));
        tracing::debug!("POST {}", url);

        let payload = CreateReleaseRequest {
            tag_name: tag,
            name,
            body,
        };
        let response = self
            .authorize(self.client.post(&url))
            .json(&payload)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn list_assets(&self, repo: &str, release: &Release) -> Result<Vec<RemoteAsset>> {
        let mut next = Some(self.endpoint(&format!(
            "repos/{}/releases/{}/assets?per_page={}&page=1",
            repo, release.id, ASSETS_PER_PAGE
        )));
        let mut assets = Vec::new();

        while let Some(url) = next.take() {
            tracing::debug!("GET {}", url);
            let response = self.authorize(self.client.get(&url)).send().await?;
            let response = Self::check(response).await?;

            next = response
                .headers()
                .get(reqwest::header::LINK)
                .and_then(|value| value.to_str().ok())
                .and_then(next_page_link);
            let page: Vec<RemoteAsset> = response.json().await?;
            assets.extend(page);
        }

        Ok(assets)
    }

    async fn upload_asset(&self, release: &Release, name: &str, data: Vec<u8>) -> Result<()> {
        if release.upload_url.is_empty() {
            return Err(PifError::config(format!(
                "Release {} has no upload URL",
                release.tag_name
            )));
        }

        let url = Self::upload_endpoint(&release.upload_url);
        tracing::debug!("POST {} ({} bytes)", url, data.len());

        let response = self
            .authorize(self.client.post(url))
            .query(&[("name", name)])
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(data)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

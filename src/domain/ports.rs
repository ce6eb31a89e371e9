use crate::domain::model::{Release, RemoteAsset};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &str) -> impl std::future::Future<Output = bool> + Send;
}

/// Release operations of a hosted git forge.
#[async_trait]
pub trait ReleaseApi: Send + Sync {
    /// Latest published release, or `None` when the repository has none.
    async fn latest_release(&self, repo: &str) -> Result<Option<Release>>;
    async fn release_by_tag(&self, repo: &str, tag: &str) -> Result<Release>;
    async fn create_release(&self, repo: &str, tag: &str, name: &str, body: &str)
        -> Result<Release>;
    async fn list_assets(&self, repo: &str, release: &Release) -> Result<Vec<RemoteAsset>>;
    async fn upload_asset(&self, release: &Release, name: &str, data: Vec<u8>) -> Result<()>;
}

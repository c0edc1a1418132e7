use crate::domain::model::{FailurePolicy, Manifest, RenderedPage};
use crate::utils::error::{Result, ViewerError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn manifest_endpoint(&self) -> &str;
    fn output_path(&self) -> &str;
    fn output_filename(&self) -> &str;
    fn mount_id(&self) -> &str;
    fn page_title(&self) -> &str;
    fn failure_policy(&self) -> FailurePolicy;

    fn request_timeout(&self) -> Option<Duration> {
        None
    }

    fn request_headers(&self) -> HashMap<String, String> {
        HashMap::new()
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn fetch(&self) -> Result<Manifest>;
    fn render(&self, manifest: &Manifest) -> RenderedPage;
    fn render_failure(&self, error: &ViewerError) -> RenderedPage;
    fn render_blank(&self) -> RenderedPage;
    async fn publish(&self, page: &RenderedPage) -> Result<String>;
    fn failure_policy(&self) -> FailurePolicy;
}

use crate::core::fetcher::ManifestFetcher;
use crate::core::renderer::{PageOptions, TileRenderer};
use crate::core::{ConfigProvider, FailurePolicy, Manifest, Pipeline, RenderedPage, Storage};
use crate::utils::error::{Result, ViewerError};

pub struct ViewerPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    fetcher: ManifestFetcher,
    renderer: TileRenderer,
}

impl<S: Storage, C: ConfigProvider> ViewerPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let fetcher = ManifestFetcher::with_options(
            config.manifest_endpoint(),
            config.request_timeout(),
            &config.request_headers(),
        )?;
        let renderer = TileRenderer::new(PageOptions {
            title: config.page_title().to_string(),
            mount_id: config.mount_id().to_string(),
        });

        Ok(Self {
            storage,
            config,
            fetcher,
            renderer,
        })
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ViewerPipeline<S, C> {
    async fn fetch(&self) -> Result<Manifest> {
        self.fetcher.fetch().await
    }

    fn render(&self, manifest: &Manifest) -> RenderedPage {
        self.renderer.render(manifest)
    }

    fn render_failure(&self, error: &ViewerError) -> RenderedPage {
        self.renderer.render_failure(error)
    }

    fn render_blank(&self) -> RenderedPage {
        self.renderer.render_blank()
    }

    async fn publish(&self, page: &RenderedPage) -> Result<String> {
        let filename = self.config.output_filename();
        let output_path = format!("{}/{}", self.config.output_path(), filename);

        tracing::debug!(
            "Writing page ({} bytes, {} tiles) to storage",
            page.html.len(),
            page.tiles.len()
        );
        self.storage.write_file(filename, page.html.as_bytes()).await?;

        Ok(output_path)
    }

    fn failure_policy(&self) -> FailurePolicy {
        self.config.failure_policy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PageState;
    use httpmock::prelude::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        manifest_endpoint: String,
        mount_id: String,
    }

    impl MockConfig {
        fn new(manifest_endpoint: String) -> Self {
            Self {
                manifest_endpoint,
                mount_id: "root".to_string(),
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn manifest_endpoint(&self) -> &str {
            &self.manifest_endpoint
        }

        fn output_path(&self) -> &str {
            "test_output"
        }

        fn output_filename(&self) -> &str {
            "index.html"
        }

        fn mount_id(&self) -> &str {
            &self.mount_id
        }

        fn page_title(&self) -> &str {
            "Test Icons"
        }

        fn failure_policy(&self) -> FailurePolicy {
            FailurePolicy::Surface
        }
    }

    #[tokio::test]
    async fn test_fetch_uses_configured_endpoint() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/icons.json");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([
                    {"image_url": "https://x/a.png", "domains": ["a.com"]}
                ]));
        });

        let pipeline =
            ViewerPipeline::new(MockStorage::new(), MockConfig::new(server.url("/icons.json")))
                .unwrap();
        let manifest = pipeline.fetch().await.unwrap();

        api_mock.assert();
        assert_eq!(manifest.len(), 1);
    }

    #[tokio::test]
    async fn test_render_uses_configured_page_options() {
        let mut config = MockConfig::new("http://test.com".to_string());
        config.mount_id = "grid".to_string();
        let pipeline = ViewerPipeline::new(MockStorage::new(), config).unwrap();

        let page = pipeline.render(&Manifest::default());
        assert_eq!(page.state, PageState::Loaded);
        assert!(page.html.contains(r#"<div id="grid">"#));
        assert!(page.html.contains("<title>Test Icons</title>"));
    }

    #[tokio::test]
    async fn test_publish_writes_page_to_storage() {
        let storage = MockStorage::new();
        let pipeline =
            ViewerPipeline::new(storage.clone(), MockConfig::new("http://test.com".to_string()))
                .unwrap();

        let page = pipeline.render_blank();
        let output_path = pipeline.publish(&page).await.unwrap();

        assert_eq!(output_path, "test_output/index.html");
        let written = storage.get_file("index.html").await.unwrap();
        assert_eq!(String::from_utf8(written).unwrap(), page.html);
    }
}

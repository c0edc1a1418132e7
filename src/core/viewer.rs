use crate::core::{FailurePolicy, Pipeline};
use crate::utils::error::{Result, ViewerError};

/// Runs the single fetch → render → publish pass.
pub struct ViewerEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ViewerEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Fetching icon manifest...");

        let manifest = match self.pipeline.fetch().await {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::error!("❌ Manifest fetch failed: {}", e);
                return self.handle_fetch_failure(e).await;
            }
        };

        tracing::info!("Fetched {} icon records", manifest.len());
        if manifest.is_empty() {
            tracing::warn!("Manifest is empty, rendering an empty grid");
        }

        let page = self.pipeline.render(&manifest);
        tracing::info!("Rendered {} tiles", page.tiles.len());

        let output_path = self.pipeline.publish(&page).await?;
        tracing::info!("📁 Page written to: {}", output_path);

        Ok(output_path)
    }

    async fn handle_fetch_failure(&self, error: ViewerError) -> Result<String> {
        match self.pipeline.failure_policy() {
            FailurePolicy::Surface => Err(error),
            FailurePolicy::FailurePage => {
                let page = self.pipeline.render_failure(&error);
                // 失敗頁寫入失敗時仍回傳原本的抓取錯誤
                match self.pipeline.publish(&page).await {
                    Ok(output_path) => {
                        tracing::warn!("Failure page written to: {}", output_path)
                    }
                    Err(publish_error) => {
                        tracing::error!("❌ Could not write failure page: {}", publish_error)
                    }
                }
                Err(error)
            }
            FailurePolicy::Silent => {
                // 掛載點留空，不顯示錯誤
                let page = self.pipeline.render_blank();
                let output_path = self.pipeline.publish(&page).await?;
                tracing::warn!(
                    "Manifest unavailable ({}), blank page written to: {}",
                    error,
                    output_path
                );
                Ok(output_path)
            }
        }
    }
}

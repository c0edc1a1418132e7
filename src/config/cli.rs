use crate::core::fetcher::DEFAULT_MANIFEST_ENDPOINT;
use crate::core::renderer::{DEFAULT_MOUNT_ID, DEFAULT_PAGE_TITLE};
use crate::core::{ConfigProvider, FailurePolicy};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "icon-grid")]
#[command(about = "Fetch an icon manifest and render it as an HTML tile grid")]
pub struct CliConfig {
    #[arg(long, default_value = DEFAULT_MANIFEST_ENDPOINT)]
    pub manifest_endpoint: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = "index.html")]
    pub output_filename: String,

    #[arg(long, default_value = DEFAULT_MOUNT_ID, help = "Id of the element the grid is mounted into")]
    pub mount_id: String,

    #[arg(long, default_value = DEFAULT_PAGE_TITLE)]
    pub title: String,

    #[arg(
        long,
        default_value_t = FailurePolicy::FailurePage,
        help = "What to publish when the manifest cannot be loaded: surface, failure_page or silent"
    )]
    pub on_failure: FailurePolicy,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl ConfigProvider for CliConfig {
    fn manifest_endpoint(&self) -> &str {
        &self.manifest_endpoint
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_filename(&self) -> &str {
        &self.output_filename
    }

    fn mount_id(&self) -> &str {
        &self.mount_id
    }

    fn page_title(&self) -> &str {
        &self.title
    }

    fn failure_policy(&self) -> FailurePolicy {
        self.on_failure
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("manifest_endpoint", &self.manifest_endpoint)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_file_name("output_filename", &self.output_filename)?;
        validation::validate_element_id("mount_id", &self.mount_id)?;
        Ok(())
    }
}

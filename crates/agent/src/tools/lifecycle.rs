//! Product life-cycle lookups (launch and end-of-support dates)

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

use presage_index::{QaChain, VectorStore};
use presage_provider::Provider;

use crate::tool::{Observation, Tool, ToolError, UNKNOWN_FIELD};

/// Collection the lifecycle data is ingested into
pub const MILESTONES_COLLECTION: &str = "product-milestones";

/// Answers life-cycle questions from the indexed milestones collection.
/// The input is a device model name, e.g. `FortiGate 100E`.
pub struct LifecycleTool {
    store: VectorStore,
    qa: QaChain,
}

impl LifecycleTool {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        index_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store: VectorStore::new(index_dir.into()),
            qa: QaChain::new(provider, model),
        }
    }
}

#[async_trait]
impl Tool for LifecycleTool {
    fn name(&self) -> &str {
        "product_lifecycle"
    }

    fn description(&self) -> &str {
        "Look up product life cycle dates, like the launch date or end-of-support dates. The \
input is the device model name, for example `FortiGate 100E`. If you do not know the model you \
must input 0, never guess."
    }

    async fn execute(&self, input: &str) -> Result<Observation, ToolError> {
        let model = input.trim();
        if model == UNKNOWN_FIELD || model.is_empty() {
            return Ok(Observation::ask_about("the product model"));
        }

        let collection = self.store.open_or_create(MILESTONES_COLLECTION).await?;
        let result = self.qa.answer(&collection, model).await?;
        Ok(Observation::answer(result.answer))
    }
}

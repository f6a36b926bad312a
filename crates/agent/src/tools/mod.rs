//! Retrieval tools

pub mod docs;
pub mod lifecycle;
pub mod library;
pub mod portal;
pub mod tickets;

pub use docs::DocsSearchTool;
pub use lifecycle::{LifecycleTool, MILESTONES_COLLECTION};
pub use library::AnswerLibraryTool;
pub use portal::{PortalClient, PortalSession};
pub use tickets::TicketSearchTool;

use std::sync::Arc;

use presage_config::Config;
use presage_provider::Provider;

use crate::registry::ToolRegistry;

/// Register the standard tool set
pub fn register_default_tools(
    registry: &mut ToolRegistry,
    config: &Config,
    provider: Arc<dyn Provider>,
) {
    let model = config.default_model();

    registry.register(DocsSearchTool::new(
        provider.clone(),
        model.as_str(),
        config.docs.clone(),
        config.assistant.require_version,
        presage_config::index_dir(),
        presage_config::cache_dir(),
    ));
    registry.register(AnswerLibraryTool::new(
        config.portal.clone(),
        presage_config::portal_session_path(),
    ));
    registry.register(TicketSearchTool::new(
        config.portal.clone(),
        presage_config::portal_session_path(),
    ));
    registry.register(LifecycleTool::new(
        provider,
        model.as_str(),
        presage_config::index_dir(),
    ));
}

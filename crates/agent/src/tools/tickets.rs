//! Support-ticket search

use async_trait::async_trait;
use std::path::PathBuf;

use presage_config::PortalConfig;

use super::portal::{format_results, normalize_product_tags, PortalClient, PortalSession};
use crate::tool::{Observation, Tool, ToolError, UNKNOWN_FIELD};

/// Searches archived support tickets over `"<product>,<query>"` input.
/// Matching is restricted to the question fields so results stay close to
/// the reported symptom.
pub struct TicketSearchTool {
    config: PortalConfig,
    session_path: PathBuf,
}

impl TicketSearchTool {
    pub fn new(config: PortalConfig, session_path: impl Into<PathBuf>) -> Self {
        Self {
            config,
            session_path: session_path.into(),
        }
    }
}

#[async_trait]
impl Tool for TicketSearchTool {
    fn name(&self) -> &str {
        "ticket_search"
    }

    fn description(&self) -> &str {
        "Search previous support tickets. Use this over a normal search when the question is \
about product troubleshooting. The input must be the product name (no abbreviation), a comma, \
then the query. For example, `FortiGate,SD-WAN tunnel down` finds tickets about SD-WAN tunnels \
on FortiGate. If you do not know the product name you must input 0, never guess."
    }

    async fn execute(&self, input: &str) -> Result<Observation, ToolError> {
        let parts: Vec<&str> = input.splitn(2, ',').map(str::trim).collect();
        let &[product, query] = parts.as_slice() else {
            return Err(ToolError::Parse(format!(
                "expected `<product>,<query>`, got `{}`",
                input
            )));
        };

        if product == UNKNOWN_FIELD || product.is_empty() {
            return Ok(Observation::ask_about("the product name"));
        }

        let session = PortalSession::load(&self.session_path).await?;
        let client = PortalClient::new(self.config.clone(), session.access_token);

        let tags = normalize_product_tags(&[product.to_string()]);
        let response = client.search(query, &tags, true).await?;
        let formatted = format_results(&response);

        if formatted.is_empty() {
            Ok(Observation::answer(format!(
                "No tickets found for \"{}\" on {}",
                query, product
            )))
        } else {
            Ok(Observation::answer(formatted.join("\n")))
        }
    }
}

//! Knowledge-portal access shared by the library and ticket tools
//!
//! The portal is the company's content library: vetted RFP answers and
//! archived support tickets. Authentication is a bearer token persisted by
//! the CLI `login` command; interactive sign-in happens outside the tools.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use tracing::{debug, info};

use presage_config::PortalConfig;

use crate::tool::ToolError;

/// Persisted portal credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalSession {
    pub access_token: String,
}

impl PortalSession {
    /// Load the saved session, or fail with instructions to sign in
    pub async fn load(path: &Path) -> Result<Self, ToolError> {
        if !path.exists() {
            return Err(ToolError::Auth(
                "no saved portal session, run `presage login` first".to_string(),
            ));
        }
        info!("previous portal session found, loading token");
        let content = tokio::fs::read_to_string(path).await?;
        serde_json::from_str(&content)
            .map_err(|e| ToolError::Auth(format!("corrupt portal session file: {}", e)))
    }

    pub async fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await
    }
}

/// Canonical product tags the portal indexes content under
const PRODUCT_TAGS: &[&str] = &[
    "FortiGate",
    "FortiAP",
    "FortiNac",
    "FortiWeb",
    "FortiManager",
    "FortiMail",
    "FortiSIEM",
    "FortiCNP",
    "FortiAuthenticator",
    "FortiMonitor",
    "FortiSOAR",
    "FortiSASE",
    "FortiAnalyzer",
    "FortiClient",
    "FortiToken",
    "FortiDDos",
    "FortiExtender",
];

/// Map free-form product names onto the portal's canonical tags;
/// unrecognized names are dropped
pub fn normalize_product_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .filter_map(|tag| {
            PRODUCT_TAGS
                .iter()
                .find(|canonical| canonical.to_lowercase() == tag.to_lowercase())
                .map(|canonical| canonical.to_string())
        })
        .collect()
}

/// Remove markup and links from a rich-text portal answer
pub fn strip_html_tags_and_urls(text: &str) -> String {
    let tags = Regex::new(r"<[^>]*>|For more information:").unwrap();
    let links = Regex::new(r"\(?https?://[\w-]+(\.[\w-]+)*(/[^\s/]*)*\)?").unwrap();
    let spaces = Regex::new(r" +").unwrap();

    let text = tags.replace_all(text, " ");
    let text = links.replace_all(&text, " ");
    spaces.replace_all(&text, " ").trim().to_string()
}

/// Content-library search client
pub struct PortalClient {
    client: reqwest::Client,
    config: PortalConfig,
    token: String,
}

impl PortalClient {
    pub fn new(config: PortalConfig, token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            token,
        }
    }

    /// Search the content library. `questions_only` restricts matching to
    /// the question and alternate-question fields (used for ticket search).
    pub async fn search(
        &self,
        query: &str,
        tags: &[String],
        questions_only: bool,
    ) -> Result<serde_json::Value, ToolError> {
        info!("searching portal for \"{}\" with tags {:?}", query, tags);

        let fields = if questions_only {
            json!(["question", "alternate_questions"])
        } else {
            json!(["question", "alternate_questions", "answer"])
        };

        let body = json!({
            "term": query,
            "additionalQueries": { "content_type": ["ANSWER"], "tags": tags },
            "offset": 0,
            "limit": self.config.search_limit,
            "facet": "true",
            "tagSearchOption": "ANY",
            "sortKey": "score desc",
            "fields": fields,
            "source": "CONTENT_LIBRARY",
        });

        let url = format!(
            "{}/rfpserver/content-library/search?companyId={}",
            self.config.base_url, self.config.company_id
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .timeout(std::time::Duration::from_secs(15))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(ToolError::Auth(
                "portal session expired, run `presage login` again".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(ToolError::Other(format!(
                "portal search returned {}",
                status
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ToolError::Other(format!("invalid portal response: {}", e)))?;
        debug!(
            "portal returned {} results",
            json["results"].as_array().map(|r| r.len()).unwrap_or(0)
        );
        Ok(json)
    }
}

/// Flatten portal results into `Question: …` / `Response: …` lines
pub fn format_results(response: &serde_json::Value) -> Vec<String> {
    let mut formatted = Vec::new();
    let Some(results) = response["results"].as_array() else {
        return formatted;
    };

    for result in results {
        let question = strip_html_tags_and_urls(result["question"].as_str().unwrap_or(""));
        let Some(answers) = result["answers"].as_array() else {
            continue;
        };
        for answer in answers {
            let key = answer["key"].as_str().unwrap_or("");
            let key = if key == "Response" || key.is_empty() {
                String::new()
            } else {
                format!("{}.", key)
            };
            let value = answer["value"].as_str().unwrap_or("");
            let value = if answer["type"].as_str() == Some("RICH_TEXT") {
                strip_html_tags_and_urls(value)
            } else {
                value.to_string()
            };
            formatted.push(format!("Question: {}\nResponse: {} {}", question, key, value));
        }
    }

    formatted
}

//! Vendor documentation search
//!
//! Answers from the locally indexed docs collection for the given product
//! and firmware version when one exists, otherwise scrapes the public
//! documentation site: search API, newest matching document, main content
//! extraction.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info};

use presage_config::DocsConfig;
use presage_index::{QaChain, VectorStore};
use presage_provider::Provider;

use crate::tool::{Observation, Tool, ToolError, UNKNOWN_FIELD};

const PRODUCT_LIST_CACHE: &str = "docs_product_list.json";
const HTTP_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Documentation search over `"<product>,<firmware version>,<query>"` input
pub struct DocsSearchTool {
    client: Client,
    site_base: String,
    latest_firmware: HashMap<String, String>,
    require_version: bool,
    cache_path: PathBuf,
    store: VectorStore,
    qa: QaChain,
}

impl DocsSearchTool {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        docs: DocsConfig,
        require_version: bool,
        index_dir: impl Into<PathBuf>,
        cache_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client: Client::new(),
            site_base: docs.site_base,
            latest_firmware: docs.latest_firmware,
            require_version,
            cache_path: cache_dir.into().join(PRODUCT_LIST_CACHE),
            store: VectorStore::new(index_dir.into()),
            qa: QaChain::new(provider, model),
        }
    }

    /// Collection holding the indexed docs for a product/version pair
    fn collection_name(product: &str, version: &str) -> String {
        format!(
            "docs-{}-{}",
            product.to_lowercase(),
            version.replace('.', "_")
        )
    }

    async fn answer_from_index(&self, collection: &str, query: &str) -> Result<Option<String>, ToolError> {
        if !self.store.exists(collection) {
            return Ok(None);
        }

        let coll = self.store.open(collection).await?;
        let result = self.qa.answer(&coll, query).await?;
        if result.is_no_answer() {
            debug!("index had no answer, falling back to live docs");
            return Ok(None);
        }

        let mut output = result.answer;
        if !result.sources.is_empty() {
            output.push_str(&format!("\nSources: {}", result.sources.join(", ")));
        }
        Ok(Some(output))
    }

    /// Product id for the search API, memoized to the cache file
    async fn product_id(&self, product: &str) -> Result<String, ToolError> {
        let listing = if self.cache_path.exists() {
            let content = tokio::fs::read_to_string(&self.cache_path).await?;
            serde_json::from_str(&content)
                .map_err(|e| ToolError::Other(format!("corrupt product list cache: {}", e)))?
        } else {
            let url = format!("{}/api/products", self.site_base);
            debug!("fetching product list from {}", url);
            let response = self
                .client
                .get(&url)
                .timeout(HTTP_TIMEOUT)
                .send()
                .await?;
            if !response.status().is_success() {
                return Err(ToolError::Other(format!(
                    "product list request returned {}",
                    response.status()
                )));
            }
            let listing: serde_json::Value = response.json().await?;

            // First writer wins; a concurrent session that lost the race
            // just reads the existing file next time
            if let Some(parent) = self.cache_path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&self.cache_path)
                .await
            {
                Ok(mut file) => {
                    use tokio::io::AsyncWriteExt;
                    file.write_all(listing.to_string().as_bytes()).await?;
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
                Err(e) => return Err(ToolError::Io(e)),
            }

            listing
        };

        let entries = listing
            .as_object()
            .ok_or_else(|| ToolError::Other("unexpected product list shape".to_string()))?;
        for entry in entries.values() {
            if entry["slug"]
                .as_str()
                .map(|slug| slug.eq_ignore_ascii_case(product))
                .unwrap_or(false)
            {
                // The API serves ids as strings or numbers depending on age
                let id = match &entry["id"] {
                    serde_json::Value::String(id) => id.clone(),
                    serde_json::Value::Number(id) => id.to_string(),
                    _ => continue,
                };
                return Ok(id);
            }
        }

        error!("no product id found for {}", product);
        Ok(String::new())
    }

    async fn search_site(&self, query: &str, product: &str) -> Result<Vec<serde_json::Value>, ToolError> {
        info!("searching \"{}\" for product {} on the docs site", query, product);

        let product_id = self.product_id(product).await?;
        let mut request = self
            .client
            .get(format!("{}/search2", self.site_base))
            .query(&[("q", query)])
            .timeout(HTTP_TIMEOUT);
        if !product_id.is_empty() {
            request = request.query(&[("product", product_id.as_str())]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ToolError::Other(format!(
                "docs search returned {}",
                response.status()
            )));
        }

        let results: serde_json::Value = response.json().await?;
        Ok(results.as_array().cloned().unwrap_or_default())
    }

    async fn scrape(&self, query: &str, product: &str) -> Result<String, ToolError> {
        let results = self.search_site(query, product).await?;
        let Some(first) = results.first() else {
            return Ok(String::new());
        };
        let Some(url) = construct_url(&self.site_base, first) else {
            return Ok(String::new());
        };

        debug!("fetching {}", url);
        let html = self
            .client
            .get(&url)
            .timeout(HTTP_TIMEOUT)
            .send()
            .await?
            .text()
            .await?;

        Ok(extract_content(&html).unwrap_or_default())
    }
}

/// Build the document URL for a search result, picking its most recent
/// version unless the result only carries one
fn construct_url(site_base: &str, result: &serde_json::Value) -> Option<String> {
    let content = &result["content"];
    let versions = content["versions"].as_array()?;

    let mut best = versions.first()?;
    for candidate in versions.iter().skip(1) {
        let best_version = best["version"]["version"].as_str().unwrap_or("");
        let candidate_version = candidate["version"]["version"].as_str().unwrap_or("");
        if version_tuple(candidate_version) > version_tuple(best_version) {
            best = candidate;
        }
    }

    Some(format!(
        "{}/document/{}/{}/{}/{}/{}",
        site_base,
        content["product"]["slug"].as_str()?,
        best["version"]["version"].as_str()?,
        best["document"]["slug"].as_str()?,
        best["page"]["permanent_id"].as_str()?,
        best["page"]["slug"].as_str()?,
    ))
}

fn version_tuple(version: &str) -> Vec<u32> {
    version
        .split('.')
        .map(|part| part.parse().unwrap_or(0))
        .collect()
}

/// Pull the readable text out of a documentation page
fn extract_content(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("div#mc-main-content").unwrap();
    let main_content = document.select(&selector).next()?;

    let text = html2text::from_read(main_content.inner_html().as_bytes(), 100);
    let text = regex::Regex::new(r"\n{3,}")
        .unwrap()
        .replace_all(&text, "\n\n")
        .trim()
        .to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[async_trait]
impl Tool for DocsSearchTool {
    fn name(&self) -> &str {
        "docs_search"
    }

    fn description(&self) -> &str {
        "Search the vendor documentation database. Use this over a normal search for questions \
about a product feature or product configuration. The input must be the product name (no \
abbreviation), a comma, the product firmware version, a comma, then the query, and the query \
must be in English. For example, `FortiGate,7.2.4,SD-WAN overview` searches the SD-WAN \
documentation for FortiGate firmware 7.2.4. If you do not know the product name you must input \
0, and if you do not know the firmware version you must input 0; never guess either."
    }

    async fn execute(&self, input: &str) -> Result<Observation, ToolError> {
        let parts: Vec<&str> = input.splitn(3, ',').map(str::trim).collect();
        let &[product, version, query] = parts.as_slice() else {
            return Err(ToolError::Parse(format!(
                "expected `<product>,<firmware version>,<query>`, got `{}`",
                input
            )));
        };

        if product == UNKNOWN_FIELD || product.is_empty() {
            return Ok(Observation::ask_about("the product name"));
        }

        let version = if version == UNKNOWN_FIELD || version.is_empty() {
            if self.require_version {
                return Ok(Observation::ask_about("the firmware version"));
            }
            match self.latest_firmware.get(&product.to_lowercase()) {
                Some(latest) => latest.clone(),
                // No latest-version default for this product either, so the
                // user has to say which one they run
                None => return Ok(Observation::ask_about("the firmware version")),
            }
        } else {
            version.to_string()
        };

        let collection = Self::collection_name(product, &version);
        if let Some(answer) = self.answer_from_index(&collection, query).await? {
            return Ok(Observation::answer(answer));
        }

        let content = self.scrape(query, product).await?;
        if content.is_empty() {
            Ok(Observation::answer(format!(
                "No documentation found for \"{}\" on {}",
                query, product
            )))
        } else {
            Ok(Observation::answer(content))
        }
    }
}

//! Registry client - HTTP access to the corporations search service

use crate::corp_owners::parse::{merge_detail, parse_detail_page, parse_search_results};
use crate::corp_owners::resolve::normalize_entity_name;
use crate::corp_owners::types::CorpRecord;
use anyhow::Result;
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

const SEARCH_PAGE_SIZE: &str = "10";

/// Client for the WA Secretary of State corporations search
pub struct RegistryClient {
    client: Client,
    base: Url,
}

impl RegistryClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url)?;
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(RegistryClient { client, base })
    }

    /// Search registrations by business name
    pub async fn search(&self, name: &str) -> Result<Vec<CorpRecord>> {
        let mut url = self.base.join("api/BusinessSearch")?;
        url.query_pairs_mut()
            .append_pair("businessName", name)
            .append_pair("pageSize", SEARCH_PAGE_SIZE);

        info!("Searching registry for {:?}", name);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow::anyhow!("Registry search failed: {}", status));
        }

        let body = response.text().await?;
        parse_search_results(&body)
    }

    /// Fetch an entity detail page (HTML) by UBI
    pub async fn fetch_detail(&self, ubi: &str) -> Result<String> {
        let url = self.base.join(&format!("business/{}", ubi))?;

        debug!("Fetching registry detail for UBI {}", ubi);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow::anyhow!("Registry detail fetch failed: {}", status));
        }

        Ok(response.text().await?)
    }

    /// Search for an exact entity and pull its full registration.
    /// Prefers the hit whose name matches exactly after normalization,
    /// otherwise the first hit. Returns None when nothing matches.
    pub async fn lookup(&self, name: &str) -> Result<Option<CorpRecord>> {
        let mut hits = self.search(name).await?;
        if hits.is_empty() {
            return Ok(None);
        }

        let wanted = normalize_entity_name(name);
        let idx = hits
            .iter()
            .position(|h| normalize_entity_name(&h.name) == wanted)
            .unwrap_or(0);
        let record = hits.swap_remove(idx);

        let html = self.fetch_detail(&record.ubi).await?;
        let detail = parse_detail_page(&html)?;

        Ok(Some(merge_detail(record, detail)))
    }
}

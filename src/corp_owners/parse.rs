//! Parse functions - registry search JSON and detail-page HTML

use crate::corp_owners::types::{CorpRecord, CorpStatus};
use anyhow::Result;
use scraper::{Html, Selector};
use serde::Deserialize;
use tracing::info;

/// One hit from the corporations search endpoint
#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "BusinessName")]
    business_name: String,

    #[serde(rename = "UBINumber")]
    ubi_number: String,

    #[serde(rename = "BusinessStatus")]
    business_status: Option<String>,
}

/// Parse the search endpoint's JSON body into bare CorpRecords
/// (no agent or governors yet - those live on the detail page)
pub fn parse_search_results(raw: &str) -> Result<Vec<CorpRecord>> {
    let hits: Vec<SearchHit> = serde_json::from_str(raw)?;

    let records = hits
        .into_iter()
        .map(|hit| CorpRecord {
            ubi: hit.ubi_number.replace(' ', ""),
            name: hit.business_name.trim().to_string(),
            status: hit
                .business_status
                .as_deref()
                .map(CorpStatus::parse)
                .unwrap_or(CorpStatus::Unknown),
            registered_agent: None,
            governors: Vec::new(),
        })
        .collect::<Vec<_>>();

    info!("Parsed {} search hits", records.len());

    Ok(records)
}

/// Agent and governors scraped from an entity detail page
#[derive(Debug, Default, PartialEq)]
pub struct RegistrationDetail {
    pub status: Option<CorpStatus>,
    pub registered_agent: Option<String>,
    pub governors: Vec<String>,
}

/// Scrape a registry detail page.
///
/// Expected markup: `#business-status` for the status line,
/// `#registered-agent .agent-name` for the agent, and one row per governor
/// in `table.governors tbody tr` with the name in the first cell.
pub fn parse_detail_page(html: &str) -> Result<RegistrationDetail> {
    let document = Html::parse_document(html);

    let status_sel = selector("#business-status")?;
    let agent_sel = selector("#registered-agent .agent-name")?;
    let governor_sel = selector("table.governors tbody tr td:first-child")?;

    let status = document
        .select(&status_sel)
        .next()
        .map(|el| CorpStatus::parse(&element_text(&el)));

    let registered_agent = document
        .select(&agent_sel)
        .next()
        .map(|el| element_text(&el))
        .filter(|s| !s.is_empty());

    let governors = document
        .select(&governor_sel)
        .map(|el| element_text(&el))
        .filter(|s| !s.is_empty())
        .collect();

    Ok(RegistrationDetail {
        status,
        registered_agent,
        governors,
    })
}

/// Merge scraped detail into a search record
pub fn merge_detail(mut record: CorpRecord, detail: RegistrationDetail) -> CorpRecord {
    if let Some(status) = detail.status {
        record.status = status;
    }
    record.registered_agent = detail.registered_agent;
    record.governors = detail.governors;
    record
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow::anyhow!("Invalid selector {:?}: {}", css, e))
}

fn element_text(element: &scraper::ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

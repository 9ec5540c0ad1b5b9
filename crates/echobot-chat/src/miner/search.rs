//! Search query construction and transcript link extraction.

use reqwest::Url;
use scraper::{Html, Selector};

use echobot_core::config::MinerConfig;

use crate::error::BotError;
use crate::miner::transcript::TranscriptStyle;

/// Anchor texts that belong to the search engine rather than a result.
const CHROME_ANCHORS: [&str; 2] = ["Cached", "Similar"];

/// A search result on one of the known transcript hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLink {
    pub url: String,
    pub style: TranscriptStyle,
}

/// Search URL for `phrase`, quoted and followed by the configured suffix.
pub fn build_search_url(config: &MinerConfig, phrase: &str) -> Result<String, BotError> {
    let query = format!("\"{}\" {}", phrase, config.query_suffix);
    Url::parse_with_params(&config.search_url, &[("q", query.trim())])
        .map(String::from)
        .map_err(|e| BotError::Parse(format!("invalid search url {}: {}", config.search_url, e)))
}

/// Known transcript hosts with the way each lays out its lines.
pub fn transcript_hosts(config: &MinerConfig) -> Vec<(String, TranscriptStyle)> {
    vec![
        (config.line_break_host.clone(), TranscriptStyle::LineBreaks),
        (config.markup_break_host.clone(), TranscriptStyle::MarkupBreaks),
    ]
}

/// Links on a results page that point at a known transcript host.
///
/// Relative links resolve against `page_url`; `/url?q=` redirects are
/// unwrapped. Results are de-duplicated and capped at `max`.
pub fn extract_transcript_links(
    html: &str,
    page_url: &str,
    hosts: &[(String, TranscriptStyle)],
    max: usize,
) -> Result<Vec<TranscriptLink>, BotError> {
    let base = Url::parse(page_url)
        .map_err(|e| BotError::Parse(format!("invalid page url {}: {}", page_url, e)))?;
    let selector =
        Selector::parse("a[href]").map_err(|e| BotError::Parse(format!("selector: {}", e)))?;
    let document = Html::parse_document(html);

    let mut links: Vec<TranscriptLink> = Vec::new();
    for anchor in document.select(&selector) {
        if links.len() >= max {
            break;
        }
        let text: String = anchor.text().collect();
        if CHROME_ANCHORS.contains(&text.trim()) {
            continue;
        }
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(target) = resolve_target(&base, href) else {
            continue;
        };
        let Some(style) = style_for(&target, hosts) else {
            continue;
        };
        let url = String::from(target);
        if !links.iter().any(|l| l.url == url) {
            links.push(TranscriptLink { url, style });
        }
    }
    Ok(links)
}

fn resolve_target(base: &Url, href: &str) -> Option<Url> {
    let resolved = base.join(href).ok()?;
    if resolved.path() == "/url" {
        let (_, target) = resolved.query_pairs().find(|(k, _)| k == "q")?;
        return Url::parse(&target).ok();
    }
    Some(resolved)
}

fn style_for(url: &Url, hosts: &[(String, TranscriptStyle)]) -> Option<TranscriptStyle> {
    let host = url.host_str()?;
    hosts
        .iter()
        .find(|(known, _)| host == known || host.ends_with(&format!(".{}", known)))
        .map(|(_, style)| *style)
}

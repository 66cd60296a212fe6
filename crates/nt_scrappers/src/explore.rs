use lazy_static::lazy_static;
use nt_core::{domain, Result};
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

use crate::fetch::PageFetcher;

/// Number of links and sections included in an exploration report.
pub const SAMPLE_SIZE: usize = 20;

const MAX_LABEL_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteLink {
    pub url: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchForm {
    pub action: String,
    pub method: String,
    pub inputs: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SiteStructure {
    pub domain: String,
    pub title: String,
    pub links_sample: Vec<SiteLink>,
    pub sections_sample: Vec<String>,
    pub search_form: Option<SearchForm>,
    pub link_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub important_links: Option<Vec<String>>,
}

lazy_static! {
    static ref ANCHORS: Selector = Selector::parse("a[href]").unwrap();
    static ref HEADINGS: Selector = Selector::parse("h1, h2, h3").unwrap();
    static ref FORMS: Selector = Selector::parse("form").unwrap();
    static ref INPUTS: Selector = Selector::parse("input").unwrap();
    static ref TITLE: Selector = Selector::parse("title").unwrap();
}

fn label(element: &ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_short_label(text: &str) -> bool {
    !text.is_empty() && text.chars().count() < MAX_LABEL_CHARS
}

/// Resolves an anchor `href` against the page URL the way a site map
/// crawler would.
pub fn normalize_link(base: &str, href: &str) -> String {
    if let Some(rest) = href.strip_prefix('/') {
        if base.ends_with('/') {
            format!("{}{}", base, rest)
        } else {
            format!("{}{}", base, href)
        }
    } else if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if base.ends_with('/') {
        format!("{}{}", base, href)
    } else {
        format!("{}/{}", base, href)
    }
}

/// Builds the structure report for an already fetched homepage.
pub fn explore_html(url: &str, html: &str) -> SiteStructure {
    let document = Html::parse_document(html);
    let site_domain = domain::extract_domain(url);

    let links: Vec<SiteLink> = document
        .select(&ANCHORS)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?;
            let absolute = normalize_link(url, href);
            if !domain::extract_domain(&absolute).contains(&site_domain) {
                return None;
            }
            let text = label(&anchor);
            is_short_label(&text).then(|| SiteLink { url: absolute, text })
        })
        .collect();

    let sections: Vec<String> = document
        .select(&HEADINGS)
        .map(|heading| label(&heading))
        .filter(|text| is_short_label(text))
        .collect();

    let search_form = document
        .select(&FORMS)
        .find(|form| form.html().to_lowercase().contains("search"))
        .map(|form| {
            let inputs = form
                .select(&INPUTS)
                .filter_map(|input| input.value().attr("name"))
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect();
            let action = form.value().attr("action").unwrap_or_default();
            let action = if action.starts_with('/') {
                normalize_link(url, action)
            } else {
                action.to_string()
            };
            SearchForm {
                action,
                method: form.value().attr("method").unwrap_or("get").to_string(),
                inputs,
            }
        });

    let title = document
        .select(&TITLE)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "Unknown".to_string());

    SiteStructure {
        domain: site_domain,
        title,
        link_count: links.len(),
        links_sample: links.into_iter().take(SAMPLE_SIZE).collect(),
        sections_sample: sections.into_iter().take(SAMPLE_SIZE).collect(),
        search_form,
        important_links: None,
    }
}

/// Fetches the homepage and describes its links, headings and search form.
/// Returns the raw HTML alongside for callers that analyze it further.
pub async fn explore(fetcher: &PageFetcher, url: &str) -> Result<(SiteStructure, String)> {
    let html = fetcher.fetch_homepage(url).await?;
    let structure = explore_html(url, &html);
    tracing::info!(
        "Explored {}: {} links, {} sections, search form: {}",
        structure.domain,
        structure.link_count,
        structure.sections_sample.len(),
        structure.search_form.is_some()
    );
    Ok((structure, html))
}

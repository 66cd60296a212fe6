use nt_core::Result;
use scraper::Html;
use serde::Serialize;

use crate::fetch::PageFetcher;

/// Characters of page text returned by a raw scrape.
pub const PREVIEW_CHARS: usize = 10_000;

const SKIPPED_ELEMENTS: &[&str] = &["script", "style"];

#[derive(Debug, Clone, Serialize)]
pub struct PageText {
    pub text: String,
    pub length: usize,
    pub url: String,
}

/// Visible text of an HTML document: trimmed, non-empty text nodes outside
/// `script` and `style`, one per line.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut lines = Vec::new();

    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map_or(false, |el| SKIPPED_ELEMENTS.contains(&el.name()))
        });
        if hidden {
            continue;
        }
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed.to_string());
        }
    }

    lines.join("\n")
}

pub fn preview(url: &str, html: &str) -> PageText {
    let text = visible_text(html);
    PageText {
        length: text.chars().count(),
        text: text.chars().take(PREVIEW_CHARS).collect(),
        url: url.to_string(),
    }
}

/// Fetch `url` and return a preview of its visible text.
pub async fn scrape_text(fetcher: &PageFetcher, url: &str) -> Result<PageText> {
    let html = fetcher.fetch_html(url).await?;
    Ok(preview(url, &html))
}

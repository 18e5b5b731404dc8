//! HTML → text extraction via `scraper`.

use scraper::{ElementRef, Html, Node, Selector};
use serde::Serialize;

/// Elements whose whole subtree is noise for a job-description payload.
const NOISE_TAGS: &[&str] = &["script", "style", "nav", "footer"];

/// Text and outbound links of a page, without any noise stripping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapedPage {
    pub text: String,
    pub links: Vec<String>,
}

/// Extracts the human-visible text of an HTML document.
///
/// `script`, `style`, `nav` and `footer` subtrees are dropped. Every remaining
/// text node is trimmed, empty nodes are discarded, and the rest are joined with
/// single spaces in document order.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut parts = Vec::new();
    collect_text(&document.root_element(), NOISE_TAGS, &mut parts);
    parts.join(" ")
}

/// Extracts every text node (newline-separated) and every `<a href>` of a document.
pub fn scrape_page(html: &str) -> ScrapedPage {
    let document = Html::parse_document(html);

    let mut parts = Vec::new();
    collect_text(&document.root_element(), &[], &mut parts);

    let links = match Selector::parse("a[href]") {
        Ok(selector) => document
            .select(&selector)
            .filter_map(|a| a.value().attr("href"))
            .map(str::to_string)
            .collect(),
        Err(_) => Vec::new(),
    };

    ScrapedPage {
        text: parts.join("\n"),
        links,
    }
}

fn collect_text<'a>(element: &ElementRef<'a>, skip_tags: &[&str], parts: &mut Vec<&'a str>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    parts.push(trimmed);
                }
            }
            Node::Element(el) => {
                if skip_tags.contains(&el.name()) {
                    continue;
                }
                if let Some(child_ref) = ElementRef::wrap(child) {
                    collect_text(&child_ref, skip_tags, parts);
                }
            }
            _ => {}
        }
    }
}

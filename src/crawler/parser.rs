//! Outbound link extraction for [`super::HttpFetcher`]
//!
//! Only anchors are collected. Special schemes, fragment-only anchors and
//! download links are dropped; everything else is resolved against the page
//! URL and split into internal and external links by host.

use super::Link;
use crate::url::extract_domain;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

const SKIPPED_SCHEMES: [&str; 4] = ["javascript:", "mailto:", "tel:", "data:"];

/// Links found on one page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLinks {
    pub internal: Vec<Link>,
    pub external: Vec<Link>,
}

/// Extracts `<a href>` links from an HTML document
///
/// Links on the same host as `page_url` are internal. Each absolute URL is
/// reported once, with the text of its first anchor.
pub fn extract_links(html: &str, page_url: &Url) -> PageLinks {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return PageLinks::default();
    };

    let page_host = extract_domain(page_url);
    let mut seen = HashSet::new();
    let mut links = PageLinks::default();

    for element in document.select(&selector) {
        if element.value().attr("download").is_some() {
            continue;
        }
        let Some(resolved) = element.value().attr("href").and_then(|href| resolve(href, page_url)) else {
            continue;
        };
        if !seen.insert(resolved.to_string()) {
            continue;
        }

        let text = element.text().collect::<Vec<_>>().join(" ");
        let link = Link {
            href: resolved.to_string(),
            text: text.split_whitespace().collect::<Vec<_>>().join(" "),
        };

        if extract_domain(&resolved) == page_host {
            links.internal.push(link);
        } else {
            links.external.push(link);
        }
    }

    links
}

fn resolve(href: &str, base: &Url) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let lower = href.to_ascii_lowercase();
    if SKIPPED_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
        return None;
    }

    let mut absolute = base.join(href).ok()?;
    if absolute.scheme() != "http" && absolute.scheme() != "https" {
        return None;
    }
    absolute.set_fragment(None);
    Some(absolute)
}

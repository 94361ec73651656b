//! Markup extraction helpers used by the HTML handler
//!
//! Parsing goes through `scraper`; the `<title>` fallback uses a regex so it
//! still works on documents too broken for the DOM parser to recover a title.
//! Relative URLs are resolved against the page URL; only http(s) results are kept.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

static TITLE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("Invalid title regex")
});

const FEED_TYPES: &[&str] = &[
    "application/rss+xml",
    "application/atom+xml",
    "application/feed+json",
    "application/json+feed",
    "application/rdf+xml",
];

/// Everything the HTML handler reads from a page, extracted in a single parse
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageMarkup {
    /// `<meta name=.. content=..>`, names lowercased, first occurrence wins
    pub metatags: HashMap<String, String>,
    /// `og:*` and `article:*` properties
    pub opengraph: HashMap<String, String>,
    /// `<link rel=image_src>`
    pub image_src: Option<String>,
    /// `<img src>` in document order, de-duplicated
    pub images: Vec<String>,
    pub feeds: Vec<String>,
    /// canonical and non-feed alternate links
    pub links: Vec<String>,
    /// `<title>` text found by regex
    pub title: Option<String>,
}

impl PageMarkup {
    pub fn parse(html: &str, base_url: &str) -> Self {
        let base = Url::parse(base_url).ok();
        let document = Html::parse_document(html);

        let mut page = PageMarkup {
            title: extract_title_fallback(html),
            ..PageMarkup::default()
        };

        collect_meta(&document, &mut page.metatags, &mut page.opengraph);

        if let Some(selector) = selector("img[src]") {
            for element in document.select(&selector) {
                if let Some(src) = element.value().attr("src") {
                    if let Some(resolved) = resolve(base.as_ref(), src) {
                        push_unique(&mut page.images, resolved);
                    }
                }
            }
        }

        if let Some(selector) = selector("link[href]") {
            for element in document.select(&selector) {
                classify_link(&element, base.as_ref(), &mut page);
            }
        }

        page
    }
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

fn resolve(base: Option<&Url>, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with("data:") || href.starts_with("javascript:") {
        return None;
    }

    let resolved = match base {
        Some(base) => base.join(href).ok()?,
        None => Url::parse(href).ok()?,
    };

    matches!(resolved.scheme(), "http" | "https").then(|| resolved.to_string())
}

fn rel_tokens(element: &ElementRef<'_>) -> Vec<String> {
    element
        .value()
        .attr("rel")
        .map(|rel| rel.split_whitespace().map(str::to_ascii_lowercase).collect())
        .unwrap_or_default()
}

fn collect_meta(
    document: &Html,
    metatags: &mut HashMap<String, String>,
    opengraph: &mut HashMap<String, String>,
) {
    let Some(selector) = selector("meta[content]") else {
        return;
    };

    for element in document.select(&selector) {
        let attrs = element.value();
        let Some(content) = attrs.attr("content").map(collapse_whitespace) else {
            continue;
        };

        // Some sites put OpenGraph keys in `name` instead of `property`
        let key = attrs
            .attr("property")
            .or_else(|| attrs.attr("name"))
            .map(|k| k.trim().to_ascii_lowercase());
        let Some(key) = key.filter(|k| !k.is_empty()) else {
            continue;
        };

        if key.starts_with("og:") || key.starts_with("article:") {
            opengraph.entry(key.clone()).or_insert_with(|| content.clone());
        }
        if let Some(name) = attrs.attr("name") {
            metatags
                .entry(name.trim().to_ascii_lowercase())
                .or_insert(content);
        }
    }
}

fn classify_link(element: &ElementRef<'_>, base: Option<&Url>, page: &mut PageMarkup) {
    let rels = rel_tokens(element);
    let Some(href) = element
        .value()
        .attr("href")
        .and_then(|href| resolve(base, href))
    else {
        return;
    };

    if rels.iter().any(|rel| rel == "image_src") && page.image_src.is_none() {
        page.image_src = Some(href.clone());
    }

    let is_feed = element
        .value()
        .attr("type")
        .map(|t| t.trim().to_ascii_lowercase())
        .is_some_and(|t| FEED_TYPES.contains(&t.as_str()));

    if rels.iter().any(|rel| rel == "alternate") && is_feed {
        push_unique(&mut page.feeds, href);
    } else if rels.iter().any(|rel| rel == "canonical" || rel == "alternate") {
        push_unique(&mut page.links, href);
    }
}

/// Resolve `href` against `base_url`; `None` unless the result is http(s)
pub fn resolve_url(base_url: &str, href: &str) -> Option<String> {
    resolve(Url::parse(base_url).ok().as_ref(), href)
}

pub fn extract_metatags(html: &str) -> HashMap<String, String> {
    let document = Html::parse_document(html);
    let mut metatags = HashMap::new();
    collect_meta(&document, &mut metatags, &mut HashMap::new());
    metatags
}

pub fn extract_opengraph(html: &str) -> HashMap<String, String> {
    let document = Html::parse_document(html);
    let mut opengraph = HashMap::new();
    collect_meta(&document, &mut HashMap::new(), &mut opengraph);
    opengraph
}

pub fn extract_images(html: &str, base_url: &str) -> Vec<String> {
    PageMarkup::parse(html, base_url).images
}

pub fn extract_rss_feeds(html: &str, base_url: &str) -> Vec<String> {
    PageMarkup::parse(html, base_url).feeds
}

pub fn extract_links(html: &str, base_url: &str) -> Vec<String> {
    PageMarkup::parse(html, base_url).links
}

/// Regex match on the first `<title>` element, whitespace collapsed
pub fn extract_title_fallback(html: &str) -> Option<String> {
    let raw = TITLE_REGEX.captures(html)?.get(1)?.as_str();
    let title = collapse_whitespace(raw);
    (!title.is_empty()).then_some(title)
}

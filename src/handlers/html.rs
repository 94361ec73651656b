use std::collections::HashMap;

use serde_json::Value;

use super::types::{ComputeInput, FieldKind, Meta};
use super::{HandlerError, Result};
use crate::markup::{PageMarkup, resolve_url};

/// HTML pages: metadata, thumbnails and feeds read from the markup
#[derive(Debug, Clone)]
pub struct HtmlHandler {
    fields: HashMap<&'static str, FieldKind>,
    /// Parsed page, built on first use and never persisted
    markup: Option<PageMarkup>,
}

const HTML_PREFIXES: [&[u8]; 4] = [b"<!doctype html", b"<html", b"<head", b"<body"];

/// Content sniffing; the mime type alone is not trusted. `body` arrives
/// already cleaned by the registry.
pub fn applies(_url: &str, mime: &str, body: &[u8]) -> bool {
    let looks_like_html = HTML_PREFIXES.iter().any(|prefix| {
        body.len() >= prefix.len() && body[..prefix.len()].eq_ignore_ascii_case(prefix)
    });
    if looks_like_html {
        return true;
    }

    let mime = mime.trim().to_ascii_lowercase();
    (mime == "text/html" || mime == "application/xhtml+xml") && body.starts_with(b"<")
}

impl HtmlHandler {
    pub fn new() -> Self {
        let fields = [
            FieldKind::Basic,
            FieldKind::Meta,
            FieldKind::Images,
            FieldKind::Feeds,
        ]
        .into_iter()
        .map(|field| (field.name(), field))
        .collect();

        Self {
            fields,
            markup: None,
        }
    }

    pub fn field(&self, name: &str) -> Option<FieldKind> {
        self.fields.get(name).copied()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.keys().copied()
    }

    /// Drop parsed markup so the next compute re-reads the body
    pub fn reset(&mut self) {
        self.markup = None;
    }

    fn markup(&mut self, input: &ComputeInput<'_>) -> &PageMarkup {
        self.markup.get_or_insert_with(|| {
            let html = String::from_utf8_lossy(input.body);
            PageMarkup::parse(&html, input.url)
        })
    }

    pub fn compute(&mut self, field: FieldKind, input: &ComputeInput<'_>) -> Result<Value> {
        match field {
            FieldKind::Meta => Ok(serde_json::to_value(self.meta(input))?),
            FieldKind::Images => Ok(serde_json::to_value(self.images(input))?),
            FieldKind::Feeds => Ok(serde_json::to_value(&self.markup(input).feeds)?),
            FieldKind::Basic => Err(HandlerError::NotComputedByHandler(field.name())),
        }
    }

    /// OpenGraph, then metatags, then `<title>`, then the URL itself
    fn meta(&mut self, input: &ComputeInput<'_>) -> Meta {
        let page = self.markup(input);
        let title = pick(&[(&page.opengraph, "og:title"), (&page.metatags, "title")])
            .or_else(|| page.title.clone())
            .unwrap_or_else(|| input.url.to_string());

        let description = pick(&[
            (&page.opengraph, "og:description"),
            (&page.metatags, "description"),
        ])
        .unwrap_or_default();

        let author = pick(&[
            (&page.metatags, "author"),
            (&page.opengraph, "article:author"),
        ])
        .unwrap_or_default();

        Meta {
            title,
            description,
            author,
            links: page.links.clone(),
        }
    }

    /// og:image, image_src, every `<img>`, then the fallback thumbnail
    fn images(&mut self, input: &ComputeInput<'_>) -> Vec<String> {
        let page = self.markup(input);
        let mut images: Vec<String> = Vec::new();

        let og_image = page
            .opengraph
            .get("og:image")
            .and_then(|href| resolve_url(input.url, href));

        let found = og_image
            .into_iter()
            .chain(page.image_src.clone())
            .chain(page.images.iter().cloned());
        for image in found {
            if !images.contains(&image) {
                images.push(image);
            }
        }

        images.push(input.fallback_thumbnail.to_string());
        images
    }
}

/// First non-empty value among `(map, key)` candidates
fn pick(candidates: &[(&HashMap<String, String>, &str)]) -> Option<String> {
    candidates
        .iter()
        .filter_map(|(map, key)| map.get(*key))
        .find(|value| !value.is_empty())
        .cloned()
}

impl Default for HtmlHandler {
    fn default() -> Self {
        Self::new()
    }
}

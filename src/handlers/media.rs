use std::collections::HashMap;

use serde_json::Value;
use url::Url;

use super::types::{ComputeInput, FieldKind, Meta, ResourceKind};
use super::{HandlerError, Result};

fn mime_has_prefix(mime: &str, prefix: &str) -> bool {
    mime.trim().to_ascii_lowercase().starts_with(prefix)
}

pub fn applies_image(_url: &str, mime: &str, _body: &[u8]) -> bool {
    mime_has_prefix(mime, "image/")
}

pub fn applies_audio(_url: &str, mime: &str, _body: &[u8]) -> bool {
    mime_has_prefix(mime, "audio/")
}

pub fn applies_video(_url: &str, mime: &str, _body: &[u8]) -> bool {
    mime_has_prefix(mime, "video/")
}

/// Image, audio, video and generic resources
///
/// Nothing is read from the body: metadata is synthesized from the URL.
#[derive(Debug, Clone)]
pub struct MediaHandler {
    kind: ResourceKind,
    fields: HashMap<&'static str, FieldKind>,
}

impl MediaHandler {
    pub fn new(kind: ResourceKind) -> Self {
        let fields = [FieldKind::Basic, FieldKind::Meta, FieldKind::Images]
            .into_iter()
            .map(|field| (field.name(), field))
            .collect();

        Self { kind, fields }
    }

    pub fn field(&self, name: &str) -> Option<FieldKind> {
        self.fields.get(name).copied()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.keys().copied()
    }

    pub fn compute(&self, field: FieldKind, input: &ComputeInput<'_>) -> Result<Value> {
        match field {
            FieldKind::Meta => Ok(serde_json::to_value(self.meta(input))?),
            FieldKind::Images => Ok(serde_json::to_value(self.images(input))?),
            FieldKind::Basic | FieldKind::Feeds => {
                Err(HandlerError::NotComputedByHandler(field.name()))
            }
        }
    }

    fn label(&self) -> &'static str {
        match self.kind {
            ResourceKind::Image => "Image",
            ResourceKind::Audio => "Audio",
            ResourceKind::Video => "Video",
            ResourceKind::Html | ResourceKind::Generic => "File",
        }
    }

    fn meta(&self, input: &ComputeInput<'_>) -> Meta {
        let parsed = Url::parse(input.url).ok();

        let title = parsed
            .as_ref()
            .and_then(|url| url.path_segments()?.next_back().map(str::to_string))
            .filter(|segment| !segment.is_empty())
            .unwrap_or_else(|| input.url.to_string());

        let description = match parsed.as_ref().and_then(Url::host_str) {
            Some(host) => format!("{} from {}", self.label(), host),
            None => self.label().to_string(),
        };

        Meta {
            title,
            description,
            author: String::new(),
            links: Vec::new(),
        }
    }

    /// Images are their own thumbnail; everything else only gets the fallback
    fn images(&self, input: &ComputeInput<'_>) -> Vec<String> {
        let mut images = Vec::with_capacity(2);
        if self.kind == ResourceKind::Image {
            images.push(input.url.to_string());
        }
        images.push(input.fallback_thumbnail.to_string());
        images
    }
}

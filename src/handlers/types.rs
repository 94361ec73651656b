use serde::{Deserialize, Serialize};
use std::fmt;

/// Content category a resource is classified into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Html,
    Image,
    Audio,
    Video,
    Generic,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Html,
        ResourceKind::Image,
        ResourceKind::Audio,
        ResourceKind::Video,
        ResourceKind::Generic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Html => "html",
            ResourceKind::Image => "image",
            ResourceKind::Audio => "audio",
            ResourceKind::Video => "video",
            ResourceKind::Generic => "generic",
        }
    }

    /// Classification priority; higher wins when several kinds match
    pub fn priority(&self) -> i32 {
        match self {
            ResourceKind::Html => 1,
            ResourceKind::Image | ResourceKind::Audio | ResourceKind::Video => 0,
            ResourceKind::Generic => i32::MIN,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed field a handler knows how to compute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Classification record with the encoded body
    Basic,
    Meta,
    Images,
    Feeds,
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Basic => "basic",
            FieldKind::Meta => "meta",
            FieldKind::Images => "images",
            FieldKind::Feeds => "feeds",
        }
    }
}

/// Value of the `meta` field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub title: String,
    pub description: String,
    pub author: String,
    pub links: Vec<String>,
}

/// Inputs available to a handler when it computes a derived field
#[derive(Debug, Clone, Copy)]
pub struct ComputeInput<'a> {
    pub url: &'a str,
    pub mime_type: &'a str,
    /// Raw body; empty for handlers that never read it
    pub body: &'a [u8],
    pub fallback_thumbnail: &'a str,
}

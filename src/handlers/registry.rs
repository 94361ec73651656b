use tracing::debug;

use super::types::ResourceKind;
use super::{html, media};

/// Classification predicate
///
/// [`ResourceTypeRegistry::classify`] runs [`clean_body`] once and hands the
/// cleaned body to every predicate; predicates do not clean it again.
pub type Predicate = fn(url: &str, mime: &str, body: &[u8]) -> bool;

#[derive(Clone, Copy)]
struct Registration {
    kind: ResourceKind,
    priority: i32,
    applies: Predicate,
}

/// Ordered set of handler matchers
///
/// `classify` picks the matching registration with the highest priority.
/// Equal priorities resolve to the earliest registration. Nothing matching
/// resolves to [`ResourceKind::Generic`], which is always available.
#[derive(Clone)]
pub struct ResourceTypeRegistry {
    registrations: Vec<Registration>,
}

impl ResourceTypeRegistry {
    pub fn new() -> Self {
        Self {
            registrations: Vec::new(),
        }
    }

    pub fn register(&mut self, kind: ResourceKind, priority: i32, applies: Predicate) {
        self.registrations.push(Registration {
            kind,
            priority,
            applies,
        });
    }

    /// Registry with the built-in matchers: Html, Image, Audio, Video
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(ResourceKind::Html, ResourceKind::Html.priority(), html::applies);
        registry.register(
            ResourceKind::Image,
            ResourceKind::Image.priority(),
            media::applies_image,
        );
        registry.register(
            ResourceKind::Audio,
            ResourceKind::Audio.priority(),
            media::applies_audio,
        );
        registry.register(
            ResourceKind::Video,
            ResourceKind::Video.priority(),
            media::applies_video,
        );

        registry
    }

    pub fn contains(&self, kind: ResourceKind) -> bool {
        kind == ResourceKind::Generic || self.registrations.iter().any(|r| r.kind == kind)
    }

    pub fn classify(&self, url: &str, mime: &str, body: &[u8]) -> ResourceKind {
        let cleaned = clean_body(body);
        let mut best: Option<Registration> = None;

        for registration in &self.registrations {
            if !(registration.applies)(url, mime, cleaned) {
                continue;
            }
            // strict comparison keeps the earliest registration on ties
            if best.is_none_or(|b| registration.priority > b.priority) {
                best = Some(*registration);
            }
        }

        let kind = best.map_or(ResourceKind::Generic, |b| b.kind);
        debug!(url, mime, %kind, "Classified resource");
        kind
    }
}

impl Default for ResourceTypeRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

const BOMS: [&[u8]; 3] = [&[0xEF, 0xBB, 0xBF], &[0xFE, 0xFF], &[0xFF, 0xFE]];

/// Strip byte-order marks, leading whitespace/control bytes and leading HTML
/// comments so decoys in front of the real markup do not defeat sniffing
pub fn clean_body(body: &[u8]) -> &[u8] {
    let mut rest = body;

    loop {
        let before = rest.len();

        for bom in BOMS {
            if let Some(stripped) = rest.strip_prefix(bom) {
                rest = stripped;
            }
        }

        while let [first, tail @ ..] = rest {
            if first.is_ascii_whitespace() || first.is_ascii_control() {
                rest = tail;
            } else {
                break;
            }
        }

        if rest.starts_with(b"<!--") {
            rest = match find(&rest[4..], b"-->") {
                Some(end) => &rest[4 + end + 3..],
                // unterminated comment swallows the rest of the document
                None => &[],
            };
        }

        if rest.len() == before {
            return rest;
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

//! Pure helpers for request processing

const DEFAULT_FIELDS: &[&str] = &["meta", "images"];

const MOBILE_MARKERS: &[&str] = &["mobi", "android", "iphone", "ipad", "ipod", "opera mini"];

/// Split a comma-separated `fields` parameter, dropping blanks and repeats.
/// No parameter (or only blanks) selects the default fields.
pub fn parse_fields(raw: Option<&str>) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    for field in raw.unwrap_or_default().split(',').map(str::trim) {
        if !field.is_empty() && !fields.iter().any(|f| f == field) {
            fields.push(field.to_string());
        }
    }

    if fields.is_empty() {
        DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect()
    } else {
        fields
    }
}

pub fn is_mobile_user_agent(user_agent: &str) -> bool {
    let user_agent = user_agent.to_ascii_lowercase();
    MOBILE_MARKERS.iter().any(|marker| user_agent.contains(marker))
}

use indexmap::IndexMap;

use crate::ir::MediaKind;
use crate::parse::operation::MediaType;

/// Classify a media type string, ignoring parameters such as `charset`.
pub fn classify(media_type: &str) -> Option<MediaKind> {
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if essence == "application/json" || essence.ends_with("+json") {
        return Some(MediaKind::Json);
    }
    match essence.as_str() {
        "multipart/form-data" => Some(MediaKind::FormData),
        "application/x-www-form-urlencoded" => Some(MediaKind::UrlSearchParams),
        "application/octet-stream" => Some(MediaKind::OctetStream),
        _ if essence.starts_with("text/") => Some(MediaKind::Text),
        _ => None,
    }
}

/// A media type picked from a `content` map.
#[derive(Debug, Clone, Copy)]
pub struct SelectedContent<'a> {
    pub media_type: &'a str,
    pub kind: Option<MediaKind>,
    pub content: &'a MediaType,
}

/// Pick the first JSON media type, otherwise the first one declared.
pub fn select_content(content: &IndexMap<String, MediaType>) -> Option<SelectedContent<'_>> {
    let classified = || {
        content
            .iter()
            .map(|(media_type, mt)| SelectedContent {
                media_type: media_type.as_str(),
                kind: classify(media_type),
                content: mt,
            })
    };
    classified()
        .find(|c| c.kind == Some(MediaKind::Json))
        .or_else(|| classified().next())
}

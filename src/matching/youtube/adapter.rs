//! Adapter layer: Convert YouTube DTOs to domain models
//!
//! This is the ONLY place where DTO types are converted to domain types.

use super::dto;
use crate::matching::domain::SearchResult;

/// Convert a search response into domain results, dropping non-video hits.
pub fn to_search_results(response: dto::SearchListResponse) -> Vec<SearchResult> {
    response
        .items
        .into_iter()
        .filter_map(convert_item)
        .collect()
}

fn convert_item(item: dto::SearchItem) -> Option<SearchResult> {
    let video_id = item.id.video_id.filter(|id| !id.is_empty())?;
    let snippet = item.snippet?;

    let thumbnails = snippet.thumbnails;
    let thumbnail_url = thumbnails
        .high
        .or(thumbnails.medium)
        .or(thumbnails.default)
        .map(|t| t.url);

    Some(SearchResult {
        video_id,
        title: decode_entities(&snippet.title),
        channel_title: decode_entities(&snippet.channel_title),
        thumbnail_url,
    })
}

/// Undo the HTML escaping the API applies to snippet text.
fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(video_id: Option<&str>, title: &str) -> dto::SearchItem {
        dto::SearchItem {
            id: dto::ResourceId {
                kind: "youtube#video".to_string(),
                video_id: video_id.map(String::from),
            },
            snippet: Some(dto::Snippet {
                title: title.to_string(),
                channel_id: None,
                channel_title: "Simon &amp; Garfunkel".to_string(),
                thumbnails: dto::Thumbnails {
                    default: Some(dto::Thumbnail {
                        url: "https://img/default.jpg".to_string(),
                        width: None,
                        height: None,
                    }),
                    medium: Some(dto::Thumbnail {
                        url: "https://img/medium.jpg".to_string(),
                        width: None,
                        height: None,
                    }),
                    high: None,
                },
            }),
        }
    }

    #[test]
    fn test_converts_and_decodes() {
        let response = dto::SearchListResponse {
            items: vec![item(Some("abc"), "Don&#39;t Stop &quot;Live&quot;")],
            next_page_token: None,
        };
        let results = to_search_results(response);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].video_id, "abc");
        assert_eq!(results[0].title, "Don't Stop \"Live\"");
        assert_eq!(results[0].channel_title, "Simon & Garfunkel");
        assert_eq!(results[0].thumbnail_url.as_deref(), Some("https://img/medium.jpg"));
    }

    #[test]
    fn test_skips_items_without_video_id() {
        let response = dto::SearchListResponse {
            items: vec![item(None, "A playlist"), item(Some(""), "Blank"), item(Some("v1"), "Video")],
            next_page_token: None,
        };
        let results = to_search_results(response);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].video_id, "v1");
    }

    #[test]
    fn test_decode_leaves_plain_text() {
        assert_eq!(decode_entities("Plain title"), "Plain title");
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
    }
}

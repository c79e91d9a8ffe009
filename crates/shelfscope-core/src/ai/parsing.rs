//! JSON parsing helpers for text backend responses
//!
//! Models often wrap JSON in prose or code fences; these helpers pull the
//! payload out before deserializing.

use crate::error::{Error, Result};

use super::types::{RecommendationList, StrategicRecommendation};

const RAW_PREVIEW_LEN: usize = 200;

fn preview(raw: &str) -> String {
    if raw.len() > RAW_PREVIEW_LEN {
        let mut end = RAW_PREVIEW_LEN;
        while !raw.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &raw[..end])
    } else {
        raw.to_string()
    }
}

/// Slice out the outermost `open`..`close` span, if any
fn extract_span(response: &str, open: char, close: char) -> Option<&str> {
    let start = response.find(open)?;
    let end = response.rfind(close)?;
    (start < end).then(|| &response[start..=end])
}

/// Parse strategic recommendations from a model reply
///
/// Accepts either a bare JSON array or an object with a `recommendations`
/// array. At most three recommendations are kept.
pub fn parse_recommendations(response: &str) -> Result<Vec<StrategicRecommendation>> {
    let response = response.trim();

    let array_start = response.find('[');
    let object_start = response.find('{');
    let prefer_array = match (array_start, object_start) {
        (Some(a), Some(o)) => a < o,
        (Some(_), None) => true,
        _ => false,
    };

    let mut recommendations = if prefer_array {
        let json_str = extract_span(response, '[', ']').ok_or_else(|| {
            Error::InvalidData(format!("No JSON found in response | Raw: {}", preview(response)))
        })?;
        serde_json::from_str::<Vec<StrategicRecommendation>>(json_str).map_err(|e| {
            Error::InvalidData(format!(
                "Invalid recommendations JSON: {} | Raw: {}",
                e,
                preview(json_str)
            ))
        })?
    } else {
        let json_str = extract_span(response, '{', '}').ok_or_else(|| {
            Error::InvalidData(format!("No JSON found in response | Raw: {}", preview(response)))
        })?;
        serde_json::from_str::<RecommendationList>(json_str)
            .map_err(|e| {
                Error::InvalidData(format!(
                    "Invalid recommendations JSON: {} | Raw: {}",
                    e,
                    preview(json_str)
                ))
            })?
            .recommendations
    };

    recommendations.truncate(3);
    Ok(recommendations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_array_with_prose() {
        let raw = r#"Here you go:
```json
[{"title": "A", "description": "d", "impact": "i"}]
```"#;
        let recs = parse_recommendations(raw).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].title, "A");
    }

    #[test]
    fn test_parse_wrapped_object_truncates_to_three() {
        let item = r#"{"title": "T", "description": "d", "impact": "i"}"#;
        let raw = format!(
            r#"{{"recommendations": [{0}, {0}, {0}, {0}]}}"#,
            item
        );
        assert_eq!(parse_recommendations(&raw).unwrap().len(), 3);
    }

    #[test]
    fn test_parse_rejects_prose_only() {
        let err = parse_recommendations("I cannot help with that.").unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn test_parse_rejects_missing_fields() {
        let err = parse_recommendations(r#"[{"title": "only"}]"#).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }
}

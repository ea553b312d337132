use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::complaints::models::ComplaintPriority;
use crate::features::triage::classifier::TriageCategory;
use crate::features::triage::error::TriageError;

/// Invocation payload. Fields are optional so that missing ones produce the
/// function's own error body rather than a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CategorizeRequestDto {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Validated invocation input
#[derive(Debug, Clone)]
pub struct CategorizeRequest {
    pub id: Uuid,
    pub title: String,
    pub description: String,
}

impl CategorizeRequestDto {
    pub fn new(id: Uuid, title: &str, description: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            title: Some(title.to_string()),
            description: Some(description.to_string()),
        }
    }

    /// Read an invocation body whatever its content type.
    ///
    /// Scalars are taken as their text (`42` becomes `"42"`); `null`, `false`,
    /// `0` and `""` count as absent. A body that is not JSON is an
    /// [`TriageError::InvalidBody`].
    pub fn from_body(body: &[u8]) -> Result<Self, TriageError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| TriageError::InvalidBody(format!("Invalid JSON body: {}", e)))?;

        match value {
            Value::Null => Err(TriageError::InvalidBody(
                "Request body must be a JSON object".to_string(),
            )),
            Value::Object(fields) => Ok(Self {
                id: fields.get("id").and_then(field_text),
                title: fields.get("title").and_then(field_text),
                description: fields.get("description").and_then(field_text),
            }),
            _ => Ok(Self::default()),
        }
    }

    /// Empty strings count as missing
    pub fn into_request(self) -> Result<CategorizeRequest, TriageError> {
        let present = |v: Option<String>| v.filter(|s| !s.is_empty());

        let (Some(id), Some(title), Some(description)) = (
            present(self.id),
            present(self.title),
            present(self.description),
        ) else {
            return Err(TriageError::MissingFields);
        };

        // The id is only ever used to address the stored complaint
        let id = Uuid::parse_str(id.trim()).map_err(|_| {
            TriageError::Persistence(format!("invalid input syntax for type uuid: \"{}\"", id))
        })?;

        Ok(CategorizeRequest {
            id,
            title,
            description,
        })
    }
}

fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Bool(true) => Some("true".to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| field_text(item).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Some("[object Object]".to_string()),
    }
}

/// Successful invocation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategorizeResponseDto {
    pub id: Uuid,
    pub predicted_category: TriageCategory,
    pub confidence_score: f64,
    pub predicted_priority: ComplaintPriority,
}

/// Error body of the invocation endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TriageErrorDto {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_or_empty_fields_are_rejected() {
        let missing = CategorizeRequestDto {
            id: Some(Uuid::now_v7().to_string()),
            title: Some("Leak".to_string()),
            description: None,
        };
        assert!(matches!(
            missing.into_request(),
            Err(TriageError::MissingFields)
        ));

        let empty = CategorizeRequestDto {
            id: Some(Uuid::now_v7().to_string()),
            title: Some(String::new()),
            description: Some("Pipe burst".to_string()),
        };
        assert!(matches!(empty.into_request(), Err(TriageError::MissingFields)));
    }

    #[test]
    fn test_non_uuid_id_fails_like_the_store() {
        let dto = CategorizeRequestDto {
            id: Some("42".to_string()),
            title: Some("Leak".to_string()),
            description: Some("Pipe burst".to_string()),
        };
        assert!(matches!(
            dto.into_request(),
            Err(TriageError::Persistence(_))
        ));
    }

    #[test]
    fn test_from_body_takes_scalars_as_text() {
        let dto = CategorizeRequestDto::from_body(
            br#"{"id": "abc", "title": 42, "description": true}"#,
        )
        .unwrap();
        assert_eq!(dto.title.as_deref(), Some("42"));
        assert_eq!(dto.description.as_deref(), Some("true"));

        let falsy =
            CategorizeRequestDto::from_body(br#"{"id": 0, "title": false, "description": null}"#)
                .unwrap();
        assert!(falsy.id.is_none());
        assert!(falsy.title.is_none());
        assert!(falsy.description.is_none());
    }

    #[test]
    fn test_from_body_rejects_non_json_and_null() {
        assert!(matches!(
            CategorizeRequestDto::from_body(b"{not json"),
            Err(TriageError::InvalidBody(_))
        ));
        assert!(matches!(
            CategorizeRequestDto::from_body(b"null"),
            Err(TriageError::InvalidBody(_))
        ));

        let array = CategorizeRequestDto::from_body(b"[1, 2]").unwrap();
        assert!(matches!(
            array.into_request(),
            Err(TriageError::MissingFields)
        ));
    }

    #[test]
    fn test_complete_request_is_accepted() {
        let id = Uuid::now_v7();
        let request = CategorizeRequestDto::new(id, "Leak", "Pipe burst")
            .into_request()
            .unwrap();
        assert_eq!(request.id, id);
        assert_eq!(request.title, "Leak");
    }

    #[test]
    fn test_response_wire_format() {
        let id = Uuid::nil();
        let body = serde_json::to_value(CategorizeResponseDto {
            id,
            predicted_category: TriageCategory::Roads,
            confidence_score: 1.0,
            predicted_priority: ComplaintPriority::Low,
        })
        .unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "id": "00000000-0000-0000-0000-000000000000",
                "predicted_category": "roads",
                "confidence_score": 1.0,
                "predicted_priority": "low"
            })
        );
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// A note owned by exactly one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: Option<String>,
    /// Identity of the owner as issued by the identity provider
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Text fed to the embedding model: title, blank line, content.
    pub fn embedding_text(&self) -> String {
        let content = self.content.as_deref().unwrap_or_default();
        format!("{}\n\n{}", self.title, content)
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

/// Body of `POST /api/notes`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateNote {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
}

/// Body of `PUT /api/notes`
///
/// An absent `content` keeps the stored content.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateNote {
    pub id: Uuid,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
}

/// Body of `DELETE /api/notes`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct DeleteNote {
    pub id: Uuid,
}

/// Query of `GET /api/notes/search`
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchNotes {
    /// Free text to match semantically
    #[validate(length(min = 1, message = "Query is required"))]
    pub query: String,
    /// Maximum number of hits (1-50)
    #[serde(default = "default_search_limit")]
    #[validate(range(min = 1, max = 50))]
    #[param(minimum = 1, maximum = 50, default = 5)]
    pub limit: u64,
}

fn default_search_limit() -> u64 {
    5
}

/// Row to insert; the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNote {
    pub title: String,
    pub content: Option<String>,
    pub user_id: String,
}

/// Full replacement of the editable fields
#[derive(Debug, Clone, PartialEq)]
pub struct NoteChanges {
    pub title: String,
    pub content: Option<String>,
}

impl From<&Note> for NoteChanges {
    fn from(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            content: note.content.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NoteEnvelope {
    pub note: Note,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdatedNoteEnvelope {
    #[serde(rename = "updatedNote")]
    pub updated_note: Note,
}

/// Search hit hydrated from the relational store
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScoredNote {
    pub note: Note,
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn note(content: Option<&str>) -> Note {
        let now = Utc::now();
        Note {
            id: Uuid::now_v7(),
            title: "Groceries".to_string(),
            content: content.map(str::to_string),
            user_id: "user_1".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_note_serializes_camel_case() {
        let value = serde_json::to_value(note(Some("milk, eggs"))).unwrap();
        assert_eq!(value["userId"], "user_1");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("user_id").is_none());
    }

    #[test]
    fn test_embedding_text_treats_missing_content_as_empty() {
        assert_eq!(
            note(Some("milk, eggs")).embedding_text(),
            "Groceries\n\nmilk, eggs"
        );
        assert_eq!(note(None).embedding_text(), "Groceries\n\n");
    }

    #[test]
    fn test_create_note_requires_non_empty_title() {
        let input: CreateNote = serde_json::from_value(json!({ "title": "" })).unwrap();
        assert!(input.validate().is_err());

        let input: CreateNote = serde_json::from_value(json!({ "title": "Groceries" })).unwrap();
        assert!(input.validate().is_ok());
        assert!(input.content.is_none());
    }

    #[test]
    fn test_create_note_rejects_non_string_title() {
        let numeric = serde_json::from_value::<CreateNote>(json!({ "title": 42 }));
        assert!(numeric.is_err());

        let missing = serde_json::from_value::<CreateNote>(json!({ "content": "x" }));
        assert!(missing.is_err());
    }

    #[test]
    fn test_search_limit_defaults_and_bounds() {
        let params: SearchNotes = serde_json::from_value(json!({ "query": "milk" })).unwrap();
        assert_eq!(params.limit, 5);

        let params: SearchNotes =
            serde_json::from_value(json!({ "query": "milk", "limit": 51 })).unwrap();
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_updated_note_envelope_key() {
        let value = serde_json::to_value(UpdatedNoteEnvelope {
            updated_note: note(None),
        })
        .unwrap();
        assert!(value.get("updatedNote").is_some());
    }
}

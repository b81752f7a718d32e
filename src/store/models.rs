//! Typed views over schema-less documents.
//!
//! Conversion happens once, at the gateway boundary; absent or null fields fall
//! back to their defaults and only a missing/invalid `_id` is an error.

use serde_json::Value;
use tracing::warn;

use super::{Document, DocumentId, StoreError, ID_FIELD};

#[derive(Debug, Clone, PartialEq)]
pub struct AlertDocument {
    pub id: DocumentId,
    pub alert_message: String,
    pub timestamp: Value,
    pub sid: String,
    pub code: String,
    /// References in stored order; unparseable entries are dropped as dangling.
    pub transaction_ids: Vec<DocumentId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDocument {
    pub id: DocumentId,
    pub system_name: String,
    /// Raw growth value; see [`crate::growth::parse_growth`].
    pub growth: Value,
    pub file_path: String,
    pub timestamp: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserDocument {
    pub id: DocumentId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    pub date_joined: Value,
}

impl TryFrom<Document> for AlertDocument {
    type Error = StoreError;

    fn try_from(doc: Document) -> Result<Self, Self::Error> {
        let id = document_id(&doc)?;
        Ok(Self {
            id,
            alert_message: text(&doc, "alert_message"),
            timestamp: raw(&doc, "timestamp"),
            sid: text(&doc, "sid"),
            code: text(&doc, "code"),
            transaction_ids: references(&doc, "transaction_ids", id),
        })
    }
}

impl TryFrom<Document> for TransactionDocument {
    type Error = StoreError;

    fn try_from(doc: Document) -> Result<Self, Self::Error> {
        Ok(Self {
            id: document_id(&doc)?,
            system_name: text(&doc, "system_name"),
            growth: raw(&doc, "growth"),
            file_path: text(&doc, "file_path"),
            timestamp: raw(&doc, "timestamp"),
        })
    }
}

impl TryFrom<Document> for UserDocument {
    type Error = StoreError;

    fn try_from(doc: Document) -> Result<Self, Self::Error> {
        Ok(Self {
            id: document_id(&doc)?,
            username: text(&doc, "username"),
            email: text(&doc, "email"),
            password_hash: text(&doc, "password_hash"),
            is_active: doc.get("is_active").and_then(Value::as_bool).unwrap_or(true),
            date_joined: raw(&doc, "date_joined"),
        })
    }
}

fn document_id(doc: &Document) -> Result<DocumentId, StoreError> {
    doc.get(ID_FIELD)
        .and_then(Value::as_str)
        .ok_or_else(|| StoreError::InvalidDocument(format!("missing {}", ID_FIELD)))
        .and_then(|raw| {
            DocumentId::parse(raw).map_err(|e| StoreError::InvalidDocument(e.to_string()))
        })
}

/// String field with `""` default; other scalars are rendered as text.
fn text(doc: &Document, key: &str) -> String {
    match doc.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn raw(doc: &Document, key: &str) -> Value {
    doc.get(key).cloned().unwrap_or(Value::Null)
}

fn references(doc: &Document, key: &str, owner: DocumentId) -> Vec<DocumentId> {
    let Some(Value::Array(items)) = doc.get(key) else {
        return vec![];
    };
    items
        .iter()
        .filter_map(|item| match item.as_str().map(DocumentId::parse) {
            Some(Ok(id)) => Some(id),
            _ => {
                warn!("alert {} has malformed transaction reference {}", owner, item);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn alert_defaults_missing_fields() {
        let id = DocumentId::new();
        let alert = AlertDocument::try_from(doc(json!({ "_id": id.to_string() }))).unwrap();
        assert_eq!(alert.id, id);
        assert_eq!(alert.alert_message, "");
        assert_eq!(alert.sid, "");
        assert_eq!(alert.code, "");
        assert_eq!(alert.timestamp, Value::Null);
        assert!(alert.transaction_ids.is_empty());
    }

    #[test]
    fn alert_keeps_reference_order_and_drops_malformed() {
        let (a, b) = (DocumentId::new(), DocumentId::new());
        let alert = AlertDocument::try_from(doc(json!({
            "_id": DocumentId::new().to_string(),
            "alert_message": "Spike",
            "sid": null,
            "transaction_ids": [b.to_string(), "garbage", 42, a.to_string()]
        })))
        .unwrap();
        assert_eq!(alert.transaction_ids, vec![b, a]);
        assert_eq!(alert.sid, "");
    }

    #[test]
    fn transaction_keeps_raw_growth_and_timestamp() {
        let tx = TransactionDocument::try_from(doc(json!({
            "_id": DocumentId::new().to_string(),
            "growth": "12.5%",
            "timestamp": "2024-03-01T10:00:00Z"
        })))
        .unwrap();
        assert_eq!(tx.growth, json!("12.5%"));
        assert_eq!(tx.timestamp, json!("2024-03-01T10:00:00Z"));
        assert_eq!(tx.system_name, "");
        assert_eq!(tx.file_path, "");
    }

    #[test]
    fn user_is_active_by_default() {
        let user = UserDocument::try_from(doc(json!({
            "_id": DocumentId::new().to_string(),
            "email": "a@b.io"
        })))
        .unwrap();
        assert!(user.is_active);
    }

    #[test]
    fn missing_id_is_invalid() {
        let err = TransactionDocument::try_from(doc(json!({ "growth": 1 }))).unwrap_err();
        assert!(matches!(err, StoreError::InvalidDocument(_)));
    }
}

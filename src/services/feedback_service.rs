use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

use super::QueryError;
use crate::store::{Document, DocumentId, StoreGateway};

/// Feedback payload as submitted by clients. Only `alert_id` is required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedbackInput {
    #[serde(default)]
    pub alert_id: Option<String>,
    #[serde(default)]
    pub alert_message: Option<String>,
    #[serde(default)]
    pub rating: Option<i64>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub is_correct: Option<bool>,
}

/// Writes immutable feedback records into `user_feedback`
#[derive(Clone)]
pub struct FeedbackService {
    store: StoreGateway,
}

impl FeedbackService {
    pub fn new(store: StoreGateway) -> Self {
        Self { store }
    }

    /// Insert one feedback record stamped with the current UTC time.
    pub async fn submit_feedback(&self, input: FeedbackInput) -> Result<DocumentId, QueryError> {
        let alert_id = DocumentId::parse(input.alert_id.as_deref().unwrap_or_default())?;
        let doc = feedback_document(alert_id, input);

        match self.store.feedback().insert_one(doc).await {
            Ok(id) => {
                info!("Recorded feedback {} for alert {}", id, alert_id);
                Ok(id)
            }
            Err(e) => {
                error!("Error submitting feedback for alert {}: {}", alert_id, e);
                Err(QueryError::WriteFailed(e.to_string()))
            }
        }
    }
}

fn feedback_document(alert_id: DocumentId, input: FeedbackInput) -> Document {
    let mut doc = Document::new();
    doc.insert("alertId".to_string(), json!(alert_id.to_string()));
    doc.insert("alertMessage".to_string(), json!(input.alert_message.unwrap_or_default()));
    doc.insert("rating".to_string(), json!(input.rating.unwrap_or(0)));
    doc.insert("comment".to_string(), json!(input.comment.unwrap_or_default()));
    if let Some(is_correct) = input.is_correct {
        doc.insert("isCorrect".to_string(), Value::Bool(is_correct));
    }
    doc.insert(
        "timestamp".to_string(),
        json!(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    doc
}

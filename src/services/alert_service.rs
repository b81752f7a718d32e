use std::collections::{HashMap, HashSet};

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::QueryError;
use crate::growth::parse_growth;
use crate::store::{
    AlertDocument, DocumentId, Filter, FindOptions, Projection, StoreGateway, TransactionDocument,
};

/// Alert as returned to clients, with its transactions resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssembledAlert {
    #[serde(rename = "_id")]
    pub id: String,
    pub alert_message: String,
    pub timestamp: Value,
    pub sid: String,
    pub code: String,
    pub transactions: Vec<AssembledTransaction>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssembledTransaction {
    pub id: String,
    pub system_name: String,
    pub growth: f64,
    pub file_path: String,
    pub timestamp: Value,
}

/// Read-only aggregation of alerts and the transactions they reference
#[derive(Clone)]
pub struct AlertService {
    store: StoreGateway,
}

impl AlertService {
    pub fn new(store: StoreGateway) -> Self {
        Self { store }
    }

    /// One page of alerts in natural order, each with its transactions.
    pub async fn list_alerts(&self, limit: u64, skip: u64) -> Result<Vec<AssembledAlert>, QueryError> {
        let docs = self
            .store
            .alerts()
            .find(&Filter::All, &Projection::without_embedding(), FindOptions::page(limit, skip))
            .await?;
        if docs.is_empty() {
            return Ok(vec![]);
        }

        let alerts = docs
            .into_iter()
            .map(AlertDocument::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let lookup = self.fetch_transactions(&alerts).await?;

        Ok(alerts.iter().map(|alert| assemble(alert, &lookup)).collect())
    }

    /// A single alert; malformed ids fail with `InvalidIdentifier`, unknown ids with `NotFound`.
    pub async fn get_alert(&self, alert_id: &str) -> Result<AssembledAlert, QueryError> {
        let id = DocumentId::parse(alert_id)?;
        let doc = self
            .store
            .alerts()
            .find_one(&Filter::ById(id), &Projection::without_embedding())
            .await?
            .ok_or_else(|| QueryError::NotFound(format!("Alert {}", id)))?;

        let alert = AlertDocument::try_from(doc)?;
        let lookup = self.fetch_transactions(std::slice::from_ref(&alert)).await?;
        Ok(assemble(&alert, &lookup))
    }

    /// One batched fetch for every transaction referenced by `alerts`.
    async fn fetch_transactions(
        &self,
        alerts: &[AlertDocument],
    ) -> Result<HashMap<DocumentId, TransactionDocument>, QueryError> {
        let ids: HashSet<DocumentId> = alerts
            .iter()
            .flat_map(|alert| alert.transaction_ids.iter().copied())
            .collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        debug!("fetching {} transactions for {} alerts", ids.len(), alerts.len());
        let docs = self
            .store
            .transactions()
            .find(&Filter::IdIn(ids), &Projection::without_embedding(), FindOptions::default())
            .await?;

        let mut lookup = HashMap::with_capacity(docs.len());
        for doc in docs {
            let tx = TransactionDocument::try_from(doc)?;
            lookup.insert(tx.id, tx);
        }
        Ok(lookup)
    }
}

/// Resolve references in stored order; dangling ones are skipped.
fn assemble(alert: &AlertDocument, lookup: &HashMap<DocumentId, TransactionDocument>) -> AssembledAlert {
    let transactions = alert
        .transaction_ids
        .iter()
        .filter_map(|id| lookup.get(id))
        .map(|tx| AssembledTransaction {
            id: tx.id.to_string(),
            system_name: tx.system_name.clone(),
            growth: parse_growth(&tx.growth),
            file_path: tx.file_path.clone(),
            timestamp: tx.timestamp.clone(),
        })
        .collect();

    AssembledAlert {
        id: alert.id.to_string(),
        alert_message: alert.alert_message.clone(),
        timestamp: alert.timestamp.clone(),
        sid: alert.sid.clone(),
        code: alert.code.clone(),
        transactions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::RecordingStore;
    use crate::store::{Collection, Document, StoreGateway};
    use serde_json::json;
    use std::sync::atomic::Ordering;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    async fn insert(gateway: &StoreGateway, collection: Collection, value: Value) -> DocumentId {
        gateway.collection(collection).insert_one(doc(value)).await.unwrap()
    }

    async fn transaction(gateway: &StoreGateway, system: &str, growth: Value) -> DocumentId {
        insert(
            gateway,
            Collection::Transactions,
            json!({
                "system_name": system,
                "growth": growth,
                "file_path": format!("/data/{}.csv", system),
                "timestamp": "2024-03-01T10:00:00Z",
                "embedding": [0.5, 0.25]
            }),
        )
        .await
    }

    async fn alert(gateway: &StoreGateway, code: &str, refs: &[DocumentId]) -> DocumentId {
        let refs: Vec<String> = refs.iter().map(ToString::to_string).collect();
        insert(
            gateway,
            Collection::Alerts,
            json!({
                "alert_message": format!("Alert {}", code),
                "timestamp": "2024-03-02T08:30:00Z",
                "sid": "S-1",
                "code": code,
                "transaction_ids": refs,
                "embedding": [1.0, 2.0, 3.0]
            }),
        )
        .await
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let (recorder, gateway) = RecordingStore::gateway();
        let service = AlertService::new(gateway);

        let alerts = service.list_alerts(3, 0).await.unwrap();
        assert!(alerts.is_empty());
        assert_eq!(recorder.find_count(Collection::Transactions), 0);
    }

    #[tokio::test]
    async fn transactions_follow_reference_order_without_dangling() {
        let (_, gateway) = RecordingStore::gateway();
        let t1 = transaction(&gateway, "ledger", json!("12.5%")).await;
        let t2 = transaction(&gateway, "billing", json!(7)).await;
        let t9 = DocumentId::new();
        alert(&gateway, "A1", &[t2, t9, t1]).await;

        let service = AlertService::new(gateway);
        let alerts = service.list_alerts(3, 0).await.unwrap();
        assert_eq!(alerts.len(), 1);

        let txs = &alerts[0].transactions;
        let ids: Vec<&str> = txs.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec![t2.to_string(), t1.to_string()]);
        assert_eq!(txs[0].growth, 7.0);
        assert_eq!(txs[1].growth, 12.5);
        assert_eq!(txs[1].file_path, "/data/ledger.csv");
        assert_eq!(txs[1].timestamp, json!("2024-03-01T10:00:00Z"));
    }

    #[tokio::test]
    async fn one_batched_fetch_per_page_with_unique_ids() {
        let (recorder, gateway) = RecordingStore::gateway();
        let t1 = transaction(&gateway, "ledger", json!(1)).await;
        let t2 = transaction(&gateway, "billing", json!(2)).await;
        alert(&gateway, "A1", &[t1, t2]).await;
        alert(&gateway, "A2", &[t2, t1, t2]).await;
        alert(&gateway, "A3", &[]).await;

        let service = AlertService::new(gateway);
        let alerts = service.list_alerts(3, 0).await.unwrap();

        assert_eq!(recorder.find_count(Collection::Transactions), 1);
        match &recorder.filters(Collection::Transactions)[0] {
            Filter::IdIn(ids) => assert_eq!(ids.len(), 2),
            other => panic!("unexpected filter {:?}", other),
        }
        // Repeated references are emitted once per reference.
        assert_eq!(alerts[1].transactions.len(), 3);
        assert!(alerts[2].transactions.is_empty());
    }

    #[tokio::test]
    async fn pages_are_bounded_and_disjoint() {
        let (_, gateway) = RecordingStore::gateway();
        for code in ["A1", "A2", "A3", "A4", "A5"] {
            alert(&gateway, code, &[]).await;
        }
        let service = AlertService::new(gateway);

        let first = service.list_alerts(2, 0).await.unwrap();
        let second = service.list_alerts(2, 2).await.unwrap();
        let last = service.list_alerts(2, 4).await.unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 2);
        assert_eq!(last.len(), 1);
        let codes: Vec<&str> = first.iter().chain(&second).chain(&last).map(|a| a.code.as_str()).collect();
        assert_eq!(codes, vec!["A1", "A2", "A3", "A4", "A5"]);
        assert!(first.iter().all(|a| second.iter().all(|b| a.id != b.id)));
    }

    #[tokio::test]
    async fn single_alert_matches_list_element() {
        let (_, gateway) = RecordingStore::gateway();
        let t1 = transaction(&gateway, "ledger", json!("3%")).await;
        let t2 = transaction(&gateway, "billing", json!("bad")).await;
        alert(&gateway, "A1", &[]).await;
        let id = alert(&gateway, "A2", &[t2, DocumentId::new(), t1]).await;

        let service = AlertService::new(gateway);
        let listed = service.list_alerts(10, 0).await.unwrap();
        let single = service.get_alert(&id.to_string()).await.unwrap();

        assert_eq!(listed[1], single);
        assert_eq!(single.transactions[0].growth, 0.0);
    }

    #[tokio::test]
    async fn embedding_is_never_serialized() {
        let (_, gateway) = RecordingStore::gateway();
        let t1 = transaction(&gateway, "ledger", json!(1)).await;
        let id = alert(&gateway, "A1", &[t1]).await;

        let service = AlertService::new(gateway);
        let value = serde_json::to_value(service.get_alert(&id.to_string()).await.unwrap()).unwrap();

        assert_eq!(value["_id"], id.to_string());
        assert!(value.get("embedding").is_none());
        assert!(value["transactions"][0].get("embedding").is_none());
        let keys: Vec<&str> = value["transactions"][0]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys.len(), 5);
    }

    #[tokio::test]
    async fn malformed_id_is_invalid_identifier() {
        let (recorder, gateway) = RecordingStore::gateway();
        let service = AlertService::new(gateway);

        let err = service.get_alert("not-a-valid-objectid").await.unwrap_err();
        assert!(matches!(err, QueryError::InvalidIdentifier(_)));
        assert_eq!(recorder.find_count(Collection::Alerts), 0);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let (_, gateway) = RecordingStore::gateway();
        let service = AlertService::new(gateway);

        let err = service.get_alert(&DocumentId::new().to_string()).await.unwrap_err();
        assert!(matches!(err, QueryError::NotFound(_)));
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        let (recorder, gateway) = RecordingStore::gateway();
        recorder.fail_reads.store(true, Ordering::SeqCst);
        let service = AlertService::new(gateway);

        let err = service.list_alerts(3, 0).await.unwrap_err();
        assert!(matches!(err, QueryError::StoreUnavailable(_)));
    }
}

use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::{AppConfig, StoreBackend};
use crate::store::{Document, StoreGateway};

/// Fixture file layout; either list may be omitted
#[derive(Debug, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub transactions: Vec<Document>,
    #[serde(default)]
    pub alerts: Vec<Document>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub transactions: usize,
    pub alerts: usize,
}

pub async fn handle(file: PathBuf, output_format: OutputFormat) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&file)
        .with_context(|| format!("cannot read fixture file {}", file.display()))?;
    let seed: SeedFile = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a valid fixture file", file.display()))?;

    let config = AppConfig::from_env();
    if config.store.backend == StoreBackend::Memory {
        warn!("STORE_BACKEND=memory: seeded documents disappear when alertctl exits");
    }
    let store = StoreGateway::connect(&config.store).await?;

    let summary = load(&store, seed).await?;
    output_success(
        output_format,
        &format!(
            "Seeded {} transactions and {} alerts from {}",
            summary.transactions,
            summary.alerts,
            file.display()
        ),
        Some(json!({
            "transactions": summary.transactions,
            "alerts": summary.alerts,
        })),
    )
}

/// Insert transactions first so alert references resolve as soon as alerts land.
pub async fn load(store: &StoreGateway, seed: SeedFile) -> anyhow::Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    for (index, doc) in seed.transactions.into_iter().enumerate() {
        store
            .transactions()
            .insert_one(doc)
            .await
            .with_context(|| format!("transaction #{} rejected", index))?;
        summary.transactions += 1;
    }

    for (index, doc) in seed.alerts.into_iter().enumerate() {
        if !doc.get("transaction_ids").map_or(true, Value::is_array) {
            warn!("alert #{} has a non-list transaction_ids; it will resolve no transactions", index);
        }
        store
            .alerts()
            .insert_one(doc)
            .await
            .with_context(|| format!("alert #{} rejected", index))?;
        summary.alerts += 1;
    }

    info!(
        "Seeded {} transactions and {} alerts",
        summary.transactions, summary.alerts
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Filter, Projection};

    const TX_ID: &str = "0b6f1c2e-4a43-4a4e-9e0f-3c1d2b5a6e7f";
    const ALERT_ID: &str = "6f9619ff-8b86-4011-b42d-00cf4fc964ff";

    fn fixture() -> SeedFile {
        serde_json::from_value(json!({
            "transactions": [
                {"_id": TX_ID, "system_name": "ledger", "growth": "12.5%", "file_path": "/data/l.csv", "timestamp": "t1"},
                {"system_name": "billing", "growth": 3, "file_path": "/data/b.csv", "timestamp": "t2"}
            ],
            "alerts": [
                {"_id": ALERT_ID, "alert_message": "Spike", "timestamp": "t3", "sid": "S1", "code": "C1", "transaction_ids": [TX_ID]}
            ]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn loads_both_collections_keeping_ids() {
        let store = StoreGateway::memory();
        let summary = load(&store, fixture()).await.unwrap();
        assert_eq!(summary, SeedSummary { transactions: 2, alerts: 1 });

        let alert = store
            .alerts()
            .find_one(&Filter::ById(ALERT_ID.parse().unwrap()), &Projection::none())
            .await
            .unwrap();
        assert!(alert.is_some());

        let tx = store
            .transactions()
            .find_one(&Filter::ById(TX_ID.parse().unwrap()), &Projection::none())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tx["system_name"], "ledger");
    }

    #[tokio::test]
    async fn rejects_duplicate_ids() {
        let store = StoreGateway::memory();
        load(&store, fixture()).await.unwrap();

        let err = load(&store, fixture()).await.unwrap_err();
        assert!(err.to_string().contains("transaction #0 rejected"));
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let seed: SeedFile = serde_json::from_str("{}").unwrap();
        assert!(seed.transactions.is_empty() && seed.alerts.is_empty());
    }
}

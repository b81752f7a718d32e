// handlers/alerts/mod.rs - Alert retrieval handlers
//
// Both endpoints return alerts in the same assembled shape: the alert fields
// plus its resolved transactions, embeddings stripped.

pub mod list; // GET /api/alerts/?limit&skip
pub mod show; // GET /api/alerts/:alert_id/

pub use list::alerts_list;
pub use show::alerts_show;

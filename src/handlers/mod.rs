// handlers/mod.rs - HTTP handlers grouped by resource
//
// All routes are public: alerts and feedback carry no ownership checks, and the
// auth handlers are the token acquisition endpoints.

pub mod alerts;   // GET /api/alerts/, GET /api/alerts/:alert_id/
pub mod auth;     // POST /api/register/, /api/token/, /api/token/refresh/
pub mod feedback; // POST /api/feedback/
pub mod system;   // GET /, GET /health

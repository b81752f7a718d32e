pub mod alerts;
pub mod auth;
pub mod feedback;
pub mod seed;

// API module - HTTP endpoints and the HTML view

pub mod rest;
pub mod view;

use serde::Serialize;

use crate::snapshot::RouterSnapshot;

/// A snapshot as served to clients, stamped with when it was collected
#[derive(Debug, Serialize)]
pub struct RouterView {
    #[serde(flatten)]
    pub snapshot: RouterSnapshot,
    pub collected_at: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

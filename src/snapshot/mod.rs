// Snapshot module - router identity and BGP state collected per request

pub mod builder;
pub mod commands;
pub mod fields;
pub mod filter;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeerInfo {
    pub name: String,
    /// Kept exactly as the router reports it
    pub remote_as: String,
    pub remote_address: String,
    pub address_families: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BgpState {
    pub local_as: u32,
    /// Response order, duplicates kept
    pub prefixes: Vec<String>,
    pub peers: Vec<PeerInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouterSnapshot {
    pub name: String,
    pub bgp: BgpState,
}

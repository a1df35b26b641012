// Peer filtering - which discovered peers make it into the snapshot

use serde::{Deserialize, Serialize};

use super::PeerInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PeerFilter {
    /// Drop peers whose remote AS equals the local AS (iBGP / self sessions)
    #[default]
    ExcludeLocalAs,
    /// Keep every peer the router reports
    IncludeAll,
}

impl PeerFilter {
    pub fn accepts(&self, peer: &PeerInfo, local_asn: u32) -> bool {
        match self {
            PeerFilter::ExcludeLocalAs => peer.remote_as != local_asn.to_string(),
            PeerFilter::IncludeAll => true,
        }
    }
}

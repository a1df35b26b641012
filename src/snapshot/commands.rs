// Command namespaces for the four snapshot queries.
// RouterOS 6 and 7 put BGP under different menus with different field names.

use serde::{Deserialize, Serialize};

use super::fields::string_field;
use super::PeerInfo;
use crate::routeros::Record;

const IDENTITY_PRINT: &str = "/system/identity/print";

/// The queries a snapshot needs, and how to read their replies
pub trait QueryNamespace: Send + Sync {
    fn identity_command(&self) -> &str {
        IDENTITY_PRINT
    }

    fn local_as_command(&self) -> &str;

    fn prefix_command(&self) -> &str;

    fn peer_command(&self) -> &str;

    /// The prefix a record contributes, or `None` if it does not belong in the snapshot
    fn prefix(&self, record: &Record) -> Option<String>;

    fn peer(&self, record: &Record) -> PeerInfo;
}

/// RouterOS 6: `/routing/bgp/instance`, `/routing/bgp/network`, `/routing/bgp/peer`
#[derive(Debug, Clone, Default)]
pub struct LegacyNamespace;

impl QueryNamespace for LegacyNamespace {
    fn local_as_command(&self) -> &str {
        "/routing/bgp/instance/print"
    }

    fn prefix_command(&self) -> &str {
        "/routing/bgp/network/print"
    }

    fn peer_command(&self) -> &str {
        "/routing/bgp/peer/print"
    }

    fn prefix(&self, record: &Record) -> Option<String> {
        Some(string_field(record, "network"))
    }

    fn peer(&self, record: &Record) -> PeerInfo {
        PeerInfo {
            name: string_field(record, "name"),
            remote_as: string_field(record, "remote-as"),
            remote_address: string_field(record, "remote-address"),
            address_families: string_field(record, "address-families"),
        }
    }
}

/// RouterOS 7: `/routing/bgp/template`, `/ipv6/firewall/address-list`, `/routing/bgp/connection`
#[derive(Debug, Clone, Default)]
pub struct V7Namespace {
    /// Only keep address-list entries from this list
    pub address_list: Option<String>,
}

impl QueryNamespace for V7Namespace {
    fn local_as_command(&self) -> &str {
        "/routing/bgp/template/print"
    }

    fn prefix_command(&self) -> &str {
        "/ipv6/firewall/address-list/print"
    }

    fn peer_command(&self) -> &str {
        "/routing/bgp/connection/print"
    }

    fn prefix(&self, record: &Record) -> Option<String> {
        match &self.address_list {
            Some(list) if record.get("list") != Some(list) => None,
            _ => Some(string_field(record, "address")),
        }
    }

    fn peer(&self, record: &Record) -> PeerInfo {
        PeerInfo {
            name: string_field(record, "name"),
            remote_as: string_field(record, "remote.as"),
            remote_address: string_field(record, "remote.address"),
            address_families: string_field(record, "address-families"),
        }
    }
}

/// Configured command set selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CommandSet {
    Legacy,
    #[default]
    V7,
}

impl CommandSet {
    pub fn namespace(self, address_list: Option<String>) -> Box<dyn QueryNamespace> {
        match self {
            CommandSet::Legacy => {
                if address_list.is_some() {
                    tracing::warn!("address_list is ignored by the legacy command set");
                }
                Box::new(LegacyNamespace)
            }
            CommandSet::V7 => Box::new(V7Namespace { address_list }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_legacy_commands() {
        let ns = LegacyNamespace;
        assert_eq!(ns.identity_command(), "/system/identity/print");
        assert_eq!(ns.local_as_command(), "/routing/bgp/instance/print");
        assert_eq!(ns.prefix_command(), "/routing/bgp/network/print");
        assert_eq!(ns.peer_command(), "/routing/bgp/peer/print");
    }

    #[test]
    fn test_v7_commands_do_not_mix_with_legacy() {
        let ns = V7Namespace::default();
        assert_eq!(ns.identity_command(), "/system/identity/print");
        assert_eq!(ns.local_as_command(), "/routing/bgp/template/print");
        assert_eq!(ns.prefix_command(), "/ipv6/firewall/address-list/print");
        assert_eq!(ns.peer_command(), "/routing/bgp/connection/print");
    }

    #[test]
    fn test_legacy_peer_fields() {
        let peer = LegacyNamespace.peer(&record(&[
            ("name", "p1"),
            ("remote-as", "65002"),
            ("remote-address", "198.51.100.1"),
            ("address-families", "ip,ipv6"),
        ]));
        assert_eq!(peer.remote_as, "65002");
        assert_eq!(peer.remote_address, "198.51.100.1");
        assert_eq!(peer.address_families, "ip,ipv6");
    }

    #[test]
    fn test_v7_peer_fields() {
        let peer = V7Namespace::default().peer(&record(&[
            ("name", "p1-1"),
            ("remote.as", "65002"),
            ("remote.address", "2001:db8::2"),
            ("address-families", "ipv6"),
        ]));
        assert_eq!(peer.name, "p1-1");
        assert_eq!(peer.remote_as, "65002");
        assert_eq!(peer.remote_address, "2001:db8::2");
    }

    #[test]
    fn test_v7_address_list_filter() {
        let ns = V7Namespace {
            address_list: Some("bgp-networks".to_string()),
        };
        let announced = record(&[("list", "bgp-networks"), ("address", "2001:db8::/32")]);
        let other = record(&[("list", "blocklist"), ("address", "2001:db8:bad::/48")]);

        assert_eq!(ns.prefix(&announced), Some("2001:db8::/32".to_string()));
        assert_eq!(ns.prefix(&other), None);
        assert_eq!(V7Namespace::default().prefix(&other), Some("2001:db8:bad::/48".to_string()));
    }
}

// Snapshot builder - the four ordered queries that make up one RouterSnapshot

use super::commands::QueryNamespace;
use super::fields::{int_field, string_field};
use super::filter::PeerFilter;
use super::{BgpState, PeerInfo, RouterSnapshot};
use crate::error::{CollectError, CollectResult};
use crate::routeros::{Record, RouterClient, RouterTarget, Session};

pub struct SnapshotBuilder {
    namespace: Box<dyn QueryNamespace>,
    peer_filter: PeerFilter,
}

impl SnapshotBuilder {
    pub fn new(namespace: Box<dyn QueryNamespace>, peer_filter: PeerFilter) -> Self {
        SnapshotBuilder {
            namespace,
            peer_filter,
        }
    }

    /// Open a session to `target`, build a snapshot, and close the session on every path.
    pub async fn fetch(
        &self,
        client: &dyn RouterClient,
        target: &RouterTarget,
        local_asn: Option<u32>,
    ) -> CollectResult<RouterSnapshot> {
        let mut session = client.open(target).await?;

        let result = self.build(session.as_mut(), local_asn).await;

        if let Err(e) = session.close().await {
            tracing::warn!("Failed to close session to {}: {}", target.address, e);
        }

        result
    }

    /// Run identity, AS, prefix and peer queries in that order.
    ///
    /// `local_asn` is the AS used by the peer filter; when `None` the AS read
    /// from the router in the second step is used. The first failing step
    /// ends the build and nothing collected so far is returned.
    pub async fn build(
        &self,
        session: &mut dyn Session,
        local_asn: Option<u32>,
    ) -> CollectResult<RouterSnapshot> {
        let name = self.identity(session).await?;
        let local_as = self.local_as(session).await?;
        let prefixes = self.prefixes(session).await?;
        let peers = self.peers(session, local_asn.unwrap_or(local_as)).await?;

        Ok(RouterSnapshot {
            name,
            bgp: BgpState {
                local_as,
                prefixes,
                peers,
            },
        })
    }

    async fn run(&self, session: &mut dyn Session, command: &str) -> CollectResult<Vec<Record>> {
        tracing::debug!("Running {}", command);
        let records = session.run(command).await?;
        tracing::debug!("{} returned {} record(s)", command, records.len());
        Ok(records)
    }

    async fn first_record(&self, session: &mut dyn Session, command: &str) -> CollectResult<Record> {
        self.run(session, command)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| CollectError::EmptyResponse {
                command: command.to_string(),
            })
    }

    async fn identity(&self, session: &mut dyn Session) -> CollectResult<String> {
        let record = self.first_record(session, self.namespace.identity_command()).await?;
        Ok(string_field(&record, "name"))
    }

    async fn local_as(&self, session: &mut dyn Session) -> CollectResult<u32> {
        let record = self.first_record(session, self.namespace.local_as_command()).await?;
        int_field(&record, "as")
    }

    async fn prefixes(&self, session: &mut dyn Session) -> CollectResult<Vec<String>> {
        let records = self.run(session, self.namespace.prefix_command()).await?;
        Ok(records.iter().filter_map(|r| self.namespace.prefix(r)).collect())
    }

    async fn peers(&self, session: &mut dyn Session, local_asn: u32) -> CollectResult<Vec<PeerInfo>> {
        let records = self.run(session, self.namespace.peer_command()).await?;

        let peers = records
            .iter()
            .map(|r| self.namespace.peer(r))
            .filter(|peer| {
                let keep = self.peer_filter.accepts(peer, local_asn);
                if !keep {
                    tracing::trace!("Skipping peer {} (remote AS {} is local)", peer.name, peer.remote_as);
                }
                keep
            })
            .collect();

        Ok(peers)
    }
}

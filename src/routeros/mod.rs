// RouterOS API boundary - sessions that run commands and return records

pub mod client;
pub mod protocol;

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::ClientError;

/// One reply row: attribute name to raw string value
pub type Record = HashMap<String, String>;

/// Where and how to reach the router API
#[derive(Debug, Clone)]
pub struct RouterTarget {
    pub address: String,
    pub username: String,
    pub password: String,
}

/// An authenticated session. Not safe for concurrent use; callers hold it mutably.
#[async_trait]
pub trait Session: Send {
    /// Run a single command and collect every reply record in order
    async fn run(&mut self, command: &str) -> Result<Vec<Record>, ClientError>;

    async fn close(&mut self) -> Result<(), ClientError>;
}

/// Opens sessions against a router target
#[async_trait]
pub trait RouterClient: Send + Sync {
    async fn open(&self, target: &RouterTarget) -> Result<Box<dyn Session>, ClientError>;
}

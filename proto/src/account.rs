use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SyncStatus {
    #[default]
    Unknown,
    Offline,
    Syncing,
    Synced,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ThreadSummary {
    pub status: SyncStatus,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ThreadCafe {
    pub status: SyncStatus,
    pub last_pulled: u64,
    pub last_pushed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadAccount {
    pub id: String,
    pub devices: Vec<ThreadDevice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadDevice {
    pub name: String,
    pub online: bool,
    pub last_pulled: u64,
    pub last_edited: u64,
}

/// Per-context thread sync status, as delivered by threadStatus.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ThreadInfo {
    pub summary: ThreadSummary,
    pub cafe: ThreadCafe,
    pub accounts: Vec<ThreadAccount>,
}

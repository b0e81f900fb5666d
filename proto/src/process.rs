use serde::{Deserialize, Serialize};

/// A long-running authority-side job reported through processNew/Update/Done.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Process {
    pub id: String,
    pub kind: ProcessKind,
    pub state: ProcessState,
    pub progress: ProcessProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessKind {
    DropFiles,
    Import,
    Export,
    SaveFile,
    RecoverAccount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessState {
    None,
    Running,
    Done,
    Canceled,
    Error,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessProgress {
    pub done: u64,
    pub total: u64,
}

/// What the progress collaborator receives while a process is alive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub id: String,
    pub status: String,
    pub current: u64,
    pub total: u64,
    pub is_unlocked: bool,
    pub can_cancel: bool,
}

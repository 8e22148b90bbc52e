//! Inter-process communication between pacer and pacerctl
//!
//! We use Unix domain sockets for local IPC - they're fast, secure,
//! and perfect for this use case.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Commands that pacerctl can send to a running pacer instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Command {
    Start,
    Pause,
    Reset,
    AddTen,
    /// Stop the countdown and advance to the next phase
    SkipToNext,
    /// Advance to the next phase without touching the running flag
    SwitchPhase,
    Status,
    SetLang { lang: String },
    Export { path: String },
    Import { path: String },
    Share,
}

/// Responses from pacer back to pacerctl
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Response {
    Ok,
    Status(TimerStatus),
    Error(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerStatus {
    pub running: bool,
    pub phase_index: usize,
    pub phase_title: String,
    pub remaining: u64, // seconds
    pub total: u64,     // seconds
    pub lang: String,
}

#[derive(Error, Debug)]
pub enum IpcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Connection refused - is pacer running?")]
    ConnectionRefused,
}

pub const SOCKET_PATH: &str = "/tmp/pacer.sock";

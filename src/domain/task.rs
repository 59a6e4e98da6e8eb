//! Verification work queued at link-creation time.

use std::fmt;

/// Kind of background verification. Each kind has its own queue and worker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Reachability,
    Qr,
}

impl TaskKind {
    pub const ALL: [TaskKind; 2] = [TaskKind::Reachability, TaskKind::Qr];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reachability => "reachability",
            Self::Qr => "qr",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of verification work for one link.
///
/// The payload is the URL the worker operates on: the link target for a
/// reachability check, the public short URL for QR rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationTask {
    pub hash: String,
    pub kind: TaskKind,
    pub payload: String,
}

impl VerificationTask {
    pub fn reachability(hash: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            kind: TaskKind::Reachability,
            payload: target.into(),
        }
    }

    pub fn qr(hash: impl Into<String>, public_url: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            kind: TaskKind::Qr,
            payload: public_url.into(),
        }
    }
}

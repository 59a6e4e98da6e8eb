//! Short link entity and its verification state machine.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Whether a link's target answered the liveness probe.
///
/// `Pending` is the only non-terminal state. Once a verdict is recorded it
/// never changes for the same link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reachability {
    Pending,
    Reachable,
    Unreachable,
}

impl Reachability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reachable => "reachable",
            Self::Unreachable => "unreachable",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Returns true if a write of `next` over `self` advances the state machine.
    pub fn can_advance_to(&self, next: Reachability) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Reachable) | (Self::Pending, Self::Unreachable)
        )
    }

    /// States from which `next` may be written.
    pub fn predecessors(next: Reachability) -> &'static [Reachability] {
        match next {
            Self::Pending => &[],
            Self::Reachable | Self::Unreachable => &[Self::Pending],
        }
    }
}

/// Progress of the optional QR code for a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QrStatus {
    NotRequested,
    Pending,
    Ready,
}

impl QrStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotRequested => "not_requested",
            Self::Pending => "pending",
            Self::Ready => "ready",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::NotRequested => 0,
            Self::Pending => 1,
            Self::Ready => 2,
        }
    }

    /// Returns true if a write of `next` over `self` advances the state machine.
    pub fn can_advance_to(&self, next: QrStatus) -> bool {
        next.rank() > self.rank()
    }

    /// States from which `next` may be written.
    pub fn predecessors(next: QrStatus) -> &'static [QrStatus] {
        match next {
            Self::NotRequested => &[],
            Self::Pending => &[Self::NotRequested],
            Self::Ready => &[Self::NotRequested, Self::Pending],
        }
    }
}

/// Error returned when a stored status string is not a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status value: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for Reachability {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "reachable" => Ok(Self::Reachable),
            "unreachable" => Ok(Self::Unreachable),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl FromStr for QrStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_requested" => Ok(Self::NotRequested),
            "pending" => Ok(Self::Pending),
            "ready" => Ok(Self::Ready),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl fmt::Display for Reachability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for QrStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A shortened link together with its verification state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortLink {
    pub hash: String,
    pub target: String,
    pub created_at: DateTime<Utc>,
    /// Redirects allowed per refill window; `0` means unlimited.
    pub redirect_limit: u32,
    pub reachability: Reachability,
    pub qr: QrStatus,
}

impl ShortLink {
    /// Builds the initial record for a freshly minted hash.
    pub fn from_new(new_link: NewShortLink, created_at: DateTime<Utc>) -> Self {
        Self {
            hash: new_link.hash,
            target: new_link.target,
            created_at,
            redirect_limit: new_link.redirect_limit,
            reachability: Reachability::Pending,
            qr: if new_link.want_qr {
                QrStatus::Pending
            } else {
                QrStatus::NotRequested
            },
        }
    }

    pub fn is_unlimited(&self) -> bool {
        self.redirect_limit == 0
    }
}

/// Input data for creating a new short link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShortLink {
    pub hash: String,
    pub target: String,
    pub redirect_limit: u32,
    pub want_qr: bool,
}

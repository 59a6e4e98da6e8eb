//! DTOs for link creation and status endpoints.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::Validate;

use crate::application::services::{CreatedLink, LinkStatusView};
use crate::domain::entities::{QrStatus, Reachability};

static CUSTOM_HASH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

/// Request to register a short link.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    /// Absolute http(s) URL to redirect to.
    #[validate(url(message = "Invalid URL format"))]
    pub url: String,

    /// Redirects allowed per refill window; `0` or absent means unlimited.
    #[validate(range(min = 0, message = "Limit must not be negative"))]
    pub limit: Option<i64>,

    /// Render a QR code for the short URL.
    pub qr: Option<bool>,

    #[validate(length(min = 4, max = 32))]
    #[validate(regex(path = "*CUSTOM_HASH_REGEX"))]
    pub custom_hash: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LinkProperties {
    pub redirect_limit: u32,
    pub reachability: Reachability,
}

/// Body of `201 Created`.
#[derive(Debug, Serialize)]
pub struct CreateLinkResponse {
    pub hash: String,
    /// Public short URL.
    pub url: String,
    /// QR image URL, `null` when not requested.
    pub qr: Option<String>,
    pub properties: LinkProperties,
}

impl From<CreatedLink> for CreateLinkResponse {
    fn from(created: CreatedLink) -> Self {
        Self {
            properties: LinkProperties {
                redirect_limit: created.link.redirect_limit,
                reachability: created.link.reachability,
            },
            hash: created.link.hash,
            url: created.short_url,
            qr: created.qr_url,
        }
    }
}

/// Current verification state and quota usage of a link.
#[derive(Debug, Serialize)]
pub struct LinkStatusResponse {
    pub hash: String,
    pub target: String,
    pub reachability: Reachability,
    pub qr: QrStatus,
    pub redirects_used: u32,
    /// `0` means unlimited.
    pub redirect_limit: u32,
    pub created_at: DateTime<Utc>,
}

impl From<LinkStatusView> for LinkStatusResponse {
    fn from(view: LinkStatusView) -> Self {
        Self {
            hash: view.hash,
            target: view.target,
            reachability: view.reachability,
            qr: view.qr,
            redirects_used: view.redirects_used,
            redirect_limit: view.redirect_limit,
            created_at: view.created_at,
        }
    }
}

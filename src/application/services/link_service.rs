//! Link creation, status and QR lookup service.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use crate::application::dispatcher::VerificationDispatcher;
use crate::application::redirect_budget::RedirectBudget;
use crate::domain::VerificationTask;
use crate::domain::entities::{NewShortLink, QrStatus, Reachability, ShortLink};
use crate::domain::repositories::{LinkRegistry, QrStore};
use crate::error::AppError;
use crate::utils::code_generator::{generate_hash, validate_custom_hash};
use crate::utils::url_normalizer::normalize_url;

/// Public short URL for `hash` under `base_url`.
pub fn public_url(base_url: &str, hash: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), hash)
}

/// Result of [`LinkService::create_link`].
#[derive(Debug, Clone)]
pub struct CreatedLink {
    pub link: ShortLink,
    pub short_url: String,
    /// Set when a QR code was requested.
    pub qr_url: Option<String>,
}

/// Snapshot of a link's verification state and quota usage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkStatusView {
    pub hash: String,
    pub target: String,
    pub reachability: Reachability,
    pub qr: QrStatus,
    pub redirects_used: u32,
    pub redirect_limit: u32,
    pub created_at: DateTime<Utc>,
}

/// What `GET /{hash}/qr` can see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QrLookup {
    NotFound,
    NotRequested,
    InProgress,
    /// The target failed verification.
    Blocked,
    Ready(Vec<u8>),
}

/// Service for creating links and reading their state.
///
/// Creation never waits on verification: the link is stored `Pending`,
/// its quota bucket installed and verification tasks queued.
pub struct LinkService<R = dyn LinkRegistry, Q = dyn QrStore>
where
    R: LinkRegistry + ?Sized,
    Q: QrStore + ?Sized,
{
    registry: Arc<R>,
    qr_store: Arc<Q>,
    budget: Arc<RedirectBudget>,
    dispatcher: Arc<VerificationDispatcher>,
    base_url: String,
}

impl<R, Q> LinkService<R, Q>
where
    R: LinkRegistry + ?Sized,
    Q: QrStore + ?Sized,
{
    pub fn new(
        registry: Arc<R>,
        qr_store: Arc<Q>,
        budget: Arc<RedirectBudget>,
        dispatcher: Arc<VerificationDispatcher>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            qr_store,
            budget,
            dispatcher,
            base_url: base_url.into(),
        }
    }

    pub fn public_url(&self, hash: &str) -> String {
        public_url(&self.base_url, hash)
    }

    pub fn qr_url(&self, hash: &str) -> String {
        format!("{}/qr", self.public_url(hash))
    }

    /// Registers a new short link and queues its verification.
    ///
    /// `limit` is the number of redirects per refill window; `0` means
    /// unlimited.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if:
    /// - `limit` is negative or too large
    /// - the target is not an absolute http(s) URL
    /// - the custom hash is invalid
    ///
    /// Returns [`AppError::Conflict`] if the custom hash is taken.
    pub async fn create_link(
        &self,
        target: &str,
        limit: i64,
        want_qr: bool,
        custom_hash: Option<String>,
    ) -> Result<CreatedLink, AppError> {
        let redirect_limit = u32::try_from(limit).map_err(|_| {
            AppError::bad_request(
                "Limit must be between 0 and 4294967295",
                json!({ "limit": limit }),
            )
        })?;

        let target = normalize_url(target).map_err(|e| {
            AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
        })?;

        let link = match custom_hash {
            Some(hash) => {
                validate_custom_hash(&hash)?;
                self.registry
                    .create(NewShortLink {
                        hash,
                        target,
                        redirect_limit,
                        want_qr,
                    })
                    .await?
            }
            None => self.create_with_generated_hash(target, redirect_limit, want_qr).await?,
        };

        self.budget.register(&link.hash, link.redirect_limit);

        let short_url = self.public_url(&link.hash);
        // A dispatch failure leaves the link Pending; the sweep picks it up.
        if let Err(e) = self
            .dispatcher
            .publish(VerificationTask::reachability(&link.hash, &link.target))
        {
            tracing::warn!(hash = %link.hash, error = %e, "Reachability check not queued");
        }
        let qr_url = if want_qr {
            if let Err(e) = self
                .dispatcher
                .publish(VerificationTask::qr(&link.hash, &short_url))
            {
                tracing::warn!(hash = %link.hash, error = %e, "QR rendering not queued");
            }
            Some(self.qr_url(&link.hash))
        } else {
            None
        };

        tracing::info!(
            hash = %link.hash,
            limit = link.redirect_limit,
            want_qr,
            "Short link created"
        );

        Ok(CreatedLink {
            link,
            short_url,
            qr_url,
        })
    }

    /// Inserts under a random hash, retrying on collision.
    ///
    /// Attempts up to 10 times before failing.
    async fn create_with_generated_hash(
        &self,
        target: String,
        redirect_limit: u32,
        want_qr: bool,
    ) -> Result<ShortLink, AppError> {
        const MAX_ATTEMPTS: usize = 10;

        for _ in 0..MAX_ATTEMPTS {
            let new_link = NewShortLink {
                hash: generate_hash()?,
                target: target.clone(),
                redirect_limit,
                want_qr,
            };

            match self.registry.create(new_link).await {
                Err(AppError::Conflict { .. }) => continue,
                other => return other,
            }
        }

        Err(AppError::internal(
            "Failed to generate unique hash",
            json!({ "reason": "Too many collisions" }),
        ))
    }

    /// Returns a link's state and how much of its current quota is used.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link matches the hash.
    pub async fn query_status(&self, hash: &str) -> Result<LinkStatusView, AppError> {
        let link = self
            .registry
            .get(hash)
            .await?
            .ok_or_else(|| AppError::link_not_found(hash))?;

        Ok(LinkStatusView {
            redirects_used: self.budget.consumed(&link.hash),
            hash: link.hash,
            target: link.target,
            reachability: link.reachability,
            qr: link.qr,
            redirect_limit: link.redirect_limit,
            created_at: link.created_at,
        })
    }

    /// Looks up the QR image for a link.
    ///
    /// A `Ready` status without stored bytes (e.g. an in-memory store after
    /// a restart) re-queues rendering and reports `InProgress`. At most one
    /// re-render per hash is outstanding at a time.
    pub async fn qr_image(&self, hash: &str) -> Result<QrLookup, AppError> {
        let Some(link) = self.registry.get(hash).await? else {
            return Ok(QrLookup::NotFound);
        };

        if link.reachability == Reachability::Unreachable {
            return Ok(QrLookup::Blocked);
        }

        match link.qr {
            QrStatus::NotRequested => Ok(QrLookup::NotRequested),
            QrStatus::Pending => Ok(QrLookup::InProgress),
            QrStatus::Ready => match self.qr_store.get(hash).await? {
                Some(bytes) => Ok(QrLookup::Ready(bytes)),
                None => {
                    match self
                        .dispatcher
                        .publish_once(VerificationTask::qr(hash, self.public_url(hash)))
                    {
                        Ok(true) => {
                            tracing::warn!(hash, "QR marked ready but image missing, re-rendering");
                        }
                        Ok(false) => {}
                        Err(e) => {
                            tracing::warn!(hash, error = %e, "QR re-render not queued");
                        }
                    }
                    Ok(QrLookup::InProgress)
                }
            },
        }
    }
}

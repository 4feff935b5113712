//! Link creation and resolution service.

use axum::http::HeaderValue;
use metrics::counter;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::clock::Clock;
use crate::domain::entities::{NewLink, UrlRecord};
use crate::domain::policy::{Decision, evaluate};
use crate::domain::repositories::{RecordStore, StoreError};
use crate::domain::writeback::{WritebackQueue, WritebackTicket};
use crate::error::AppError;
use crate::utils::token_generator::{TOKEN_LENGTH, generate_token, is_token_shaped};

/// An allowed redirect.
#[derive(Debug)]
pub struct Resolution {
    pub long_url: String,
    /// Completion of the background write of the updated counters.
    pub writeback: WritebackTicket,
}

/// Service for creating short links and resolving tokens to redirect targets.
///
/// Resolution is a read-evaluate-write cycle that is not atomic: concurrent
/// redirects for the same token may read the same counters and one increment
/// can be lost. The write itself is queued on a [`WritebackQueue`], so the
/// caller can respond before it completes.
pub struct LinkService {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    writeback: WritebackQueue,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>, writeback: WritebackQueue) -> Self {
        Self {
            store,
            clock,
            writeback,
        }
    }

    /// Stores a new record under a freshly generated unique token.
    ///
    /// The record's TTL is its `max_age`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if the store cannot be read or written.
    pub async fn create_link(&self, new_link: NewLink) -> Result<UrlRecord, AppError> {
        let token = self.generate_unique_token(TOKEN_LENGTH).await?;
        let record = UrlRecord::new(token, new_link, self.clock.now());

        self.store
            .set(&record.token, &record, record.age_duration)
            .await?;

        info!(
            token = %record.token,
            max_access = %record.max_access,
            max_per_hour = %record.max_per_hour,
            max_age_secs = record.age_duration.as_secs(),
            "Short link created"
        );
        counter!("linkgate_links_created_total").increment(1);

        Ok(record)
    }

    /// Resolves a token to its long URL, enforcing the record's access limits.
    ///
    /// On success the updated record is queued for persistence with its
    /// original TTL, which refreshes the key's deadline.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if the token is unknown or expired
    /// - [`AppError::LimitExceeded`] if a cap was hit; a total-cap rejection
    ///   also deletes the record
    /// - [`AppError::UnusableTarget`] if the long URL cannot be sent as a `Location` header
    /// - [`AppError::Store`] if the store cannot be read
    pub async fn resolve(&self, token: &str) -> Result<Resolution, AppError> {
        if !is_token_shaped(token, TOKEN_LENGTH) {
            debug!(token = %token, "Malformed token");
            return Err(AppError::not_found());
        }

        let record = self
            .store
            .get(token)
            .await?
            .ok_or_else(AppError::not_found)?;

        // Checked before evaluation so an unusable target never consumes an access.
        if HeaderValue::from_str(&record.long_url).is_err() {
            warn!(token = %token, "Stored URL is not a valid Location header value");
            return Err(AppError::UnusableTarget);
        }

        match evaluate(record, self.clock.now()) {
            Decision::Allowed(updated) => {
                let long_url = updated.long_url.clone();
                let ttl = updated.age_duration;
                debug!(
                    token = %token,
                    access_count = updated.current_access_count,
                    hourly_count = updated.hourly_access_count,
                    "Access allowed"
                );

                let writeback = self.writeback.submit(token.to_string(), updated, ttl);

                Ok(Resolution {
                    long_url,
                    writeback,
                })
            }
            Decision::Rejected(rejection) => {
                info!(token = %token, reason = rejection.as_label(), "Access rejected");

                if rejection.evicts_record()
                    && let Err(e) = self.store.delete(token).await
                {
                    warn!(token = %token, error = %e, "Failed to delete exhausted record");
                }

                Err(AppError::LimitExceeded(rejection))
            }
        }
    }

    /// Generates a token with no live record in the store.
    ///
    /// Retries until a free token is found. Store errors end the search.
    async fn generate_unique_token(&self, length: usize) -> Result<String, StoreError> {
        loop {
            let token = generate_token(length);

            if self.store.get(&token).await?.is_none() {
                return Ok(token);
            }

            debug!(token = %token, "Token collision, regenerating");
        }
    }
}

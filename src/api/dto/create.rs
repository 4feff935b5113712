//! DTOs for the link creation endpoint.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

use crate::domain::entities::{Limit, NewLink};
use crate::error::AppError;

/// Default record lifetime in seconds.
pub const DEFAULT_MAX_AGE_SECS: i64 = 3600;

/// Raw form fields as submitted.
///
/// Numeric fields are kept as strings so that malformed values produce a
/// field-specific message instead of a generic extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct CreateForm {
    pub long_url: Option<String>,
    pub max_access: Option<String>,
    pub max_per_hour: Option<String>,
    pub max_age: Option<String>,
}

/// Parsed creation request.
#[derive(Debug, Validate)]
pub struct CreateRequest {
    pub long_url: String,
    pub max_access: Limit,
    pub max_per_hour: Limit,
    /// Lifetime in seconds, at most one year.
    #[validate(range(min = 1, max = 31_536_000, message = "Invalid max_age parameter"))]
    pub max_age: i64,
}

/// Response carrying the generated token.
#[derive(Debug, Serialize)]
pub struct CreateResponse {
    pub token: String,
}

fn parse_int(raw: Option<&str>, default: i64, field: &str) -> Result<i64, AppError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .parse::<i64>()
            .map_err(|_| AppError::bad_request(format!("Invalid {field} parameter"))),
    }
}

fn parse_limit(raw: Option<&str>, field: &str) -> Result<Limit, AppError> {
    let value = parse_int(raw, Limit::Unlimited.as_raw(), field)?;
    Limit::from_raw(value).ok_or_else(|| AppError::bad_request(format!("Invalid {field} parameter")))
}

impl TryFrom<CreateForm> for CreateRequest {
    type Error = AppError;

    /// Checks presence of `long_url` first, then parses the numeric fields in
    /// form order. Range checks are left to [`Validate`].
    fn try_from(form: CreateForm) -> Result<Self, Self::Error> {
        let long_url = form
            .long_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| AppError::bad_request("Missing long_url parameter"))?;

        let max_access = parse_limit(form.max_access.as_deref(), "max_access")?;
        let max_per_hour = parse_limit(form.max_per_hour.as_deref(), "max_per_hour")?;
        let max_age = parse_int(form.max_age.as_deref(), DEFAULT_MAX_AGE_SECS, "max_age")?;

        Ok(Self {
            long_url,
            max_access,
            max_per_hour,
            max_age,
        })
    }
}

impl CreateRequest {
    /// Validates the request and converts it into domain input.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `max_age` is out of range.
    pub fn into_new_link(self) -> Result<NewLink, AppError> {
        self.validate()?;

        Ok(NewLink {
            long_url: self.long_url,
            max_access: self.max_access,
            max_per_hour: self.max_per_hour,
            max_age: Duration::from_secs(self.max_age.unsigned_abs()),
        })
    }
}

//! Handler for link creation endpoint.

use axum::{
    Form, Json,
    extract::{State, rejection::FormRejection},
};

use crate::api::dto::create::{CreateForm, CreateRequest, CreateResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link with optional usage limits.
///
/// # Endpoint
///
/// `POST /create`
///
/// # Request Body
///
/// `application/x-www-form-urlencoded`:
///
/// | Field | Required | Default | Meaning |
/// |-------|----------|---------|---------|
/// | `long_url` | yes | - | Redirect target |
/// | `max_access` | no | `-1` | Total access cap (`-1` = unlimited) |
/// | `max_per_hour` | no | `-1` | Hourly access cap (`-1` = unlimited) |
/// | `max_age` | no | `3600` | Lifetime in seconds, `1..=31536000` |
///
/// # Response
///
/// ```json
/// { "token": "aB3dE6gH" }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request with `{"message": ...}` if a field is missing or
/// invalid, or if the body is not a form.
pub async fn create_handler(
    State(state): State<AppState>,
    form: Result<Form<CreateForm>, FormRejection>,
) -> Result<Json<CreateResponse>, AppError> {
    let Form(form) =
        form.map_err(|e| AppError::bad_request(format!("Invalid form body: {}", e.body_text())))?;

    let new_link = CreateRequest::try_from(form)?.into_new_link()?;

    let record = state.link_service.create_link(new_link).await?;

    Ok(Json(CreateResponse {
        token: record.token,
    }))
}

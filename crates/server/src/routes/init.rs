use axum::extract::State;
use tracing::warn;

use crate::{errors::ApiError, state::ServerState};

/// Wipe every banner and insert the sample set. Development only.
#[utoipa::path(
    get, path = "/api/init", tag = "init",
    responses(
        (status = 200, description = "Collection reseeded", body = String),
        (status = 500, description = "Internal error", body = crate::openapi::InternalErrorDoc)
    )
)]
pub async fn init(State(state): State<ServerState>) -> Result<&'static str, ApiError> {
    warn!(event = "banners_reset", "removing all banners and inserting samples");
    state.banners.reset_with_samples().await?;
    Ok("Banners removed and created.")
}

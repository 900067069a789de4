use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::Html,
    Json,
};
use axum_extra::extract::Query;
use models::banner::BannerDto;
use serde::Deserialize;
use service::banner::domain::BannerInput;
use tracing::error;
use uuid::Uuid;

use crate::{errors::ApiError, state::ServerState};

/// `?fields=html&fields=id`
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FieldsQuery {
    /// Field names to include, one per value; unknown names are ignored.
    #[serde(default)]
    pub fields: Vec<String>,
}

fn location(state: &ServerState, id: Uuid) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let url = state.location(id);
    match HeaderValue::from_str(&url) {
        Ok(value) => {
            headers.insert(header::LOCATION, value);
        }
        // config validation rejects such base URLs; only reachable with a hand-built state
        Err(e) => error!(location = %url, error = %e, "location is not a valid header value"),
    }
    headers
}

#[utoipa::path(
    get, path = "/api/v1/banners", tag = "banners",
    responses(
        (status = 200, description = "All banners", body = [crate::openapi::BannerDoc]),
        (status = 500, description = "Internal error", body = crate::openapi::InternalErrorDoc)
    )
)]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<BannerDto>>, ApiError> {
    Ok(Json(state.banners.list().await?))
}

#[utoipa::path(
    get, path = "/api/v1/banners/{id}", tag = "banners",
    params(("id" = Uuid, Path, description = "Banner ID"), FieldsQuery),
    responses(
        (status = 200, description = "Banner, optionally restricted to the selected fields", body = crate::openapi::BannerDoc),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Query(q): Query<FieldsQuery>,
) -> Result<Json<BannerDto>, ApiError> {
    Ok(Json(state.banners.get(id, &q.fields).await?))
}

#[utoipa::path(
    post, path = "/api/v1/banners", tag = "banners",
    request_body = crate::openapi::BannerInputDoc,
    responses(
        (status = 200, description = "Created; Location header points at the new banner", body = crate::openapi::BannerDoc),
        (status = 400, description = "Missing html or markup parse errors", body = [crate::openapi::HtmlParseErrorDoc])
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    Json(input): Json<BannerInput>,
) -> Result<(HeaderMap, Json<BannerDto>), ApiError> {
    let dto = state.banners.create(input).await?;
    let headers = dto.id.map(|id| location(&state, id)).unwrap_or_default();
    Ok((headers, Json(dto)))
}

#[utoipa::path(
    put, path = "/api/v1/banners/{id}", tag = "banners",
    params(("id" = Uuid, Path, description = "Banner ID")),
    request_body = crate::openapi::BannerInputDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::BannerDoc),
        (status = 400, description = "Missing html or markup parse errors", body = [crate::openapi::HtmlParseErrorDoc]),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(input): Json<BannerInput>,
) -> Result<(HeaderMap, Json<BannerDto>), ApiError> {
    let dto = state.banners.update(id, input).await?;
    Ok((location(&state, id), Json(dto)))
}

#[utoipa::path(
    delete, path = "/api/v1/banners/{id}", tag = "banners",
    params(("id" = Uuid, Path, description = "Banner ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    state.banners.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get, path = "/api/v1/banners/{id}/html", tag = "banners",
    params(("id" = Uuid, Path, description = "Banner ID")),
    responses(
        (status = 200, description = "Stored markup", content_type = "text/html", body = String),
        (status = 404, description = "Not Found")
    )
)]
pub async fn html(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Result<Html<String>, ApiError> {
    Ok(Html(state.banners.html(id).await?))
}

use crate::error::{AppError, Result};
use crate::model::{
    ExpandResponse, ListResponse, RedirectQuery, RedirectTarget, ShortenRequest, ShortenResponse,
    UrlItem,
};
use crate::state::AppState;
use ::url::Url;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use snip_core::Shortener;

/// First path segments that never resolve as root-level short codes.
const RESERVED_SEGMENTS: [&str; 4] = ["health", "shorten", "expand", "urls"];

pub async fn shorten_handler<S: Shortener>(
    State(state): State<AppState<S>>,
    payload: std::result::Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<Json<ShortenResponse>> {
    let Json(request) = payload?;
    let url = request
        .url
        .filter(|url| !url.is_empty())
        .ok_or_else(|| AppError::BadRequest("URL is required".to_string()))?;

    let shortened = state.shortener().shorten(&url).await?;
    Ok(Json(shortened.into()))
}

pub async fn expand_handler<S: Shortener>(
    State(state): State<AppState<S>>,
    Path(short_code): Path<String>,
) -> Result<Json<ExpandResponse>> {
    let expanded = state.shortener().expand(&short_code).await?;
    Ok(Json(expanded.into()))
}

pub async fn list_handler<S: Shortener>(
    State(state): State<AppState<S>>,
) -> Result<Json<ListResponse>> {
    let urls = state.shortener().list().await?;
    Ok(Json(ListResponse {
        success: true,
        urls: urls.into_iter().map(UrlItem::from).collect(),
    }))
}

pub async fn redirect_handler<S: Shortener>(
    State(state): State<AppState<S>>,
    Path(short_code): Path<String>,
    Query(query): Query<RedirectQuery>,
) -> Result<Response> {
    redirect(&state, &short_code, &query).await
}

/// Root-level short links. Segments that belong to the API are refused so a
/// code can never shadow them.
pub async fn root_redirect_handler<S: Shortener>(
    State(state): State<AppState<S>>,
    Path(segment): Path<String>,
    Query(query): Query<RedirectQuery>,
) -> Result<Response> {
    if is_reserved(&segment) {
        return Err(AppError::NotFound("Not found"));
    }
    redirect(&state, &segment, &query).await
}

pub async fn not_found_handler() -> AppError {
    AppError::NotFound("Not found")
}

async fn redirect<S: Shortener>(
    state: &AppState<S>,
    short_code: &str,
    query: &RedirectQuery,
) -> Result<Response> {
    let expanded = state.shortener().expand(short_code).await?;

    if query.wants_json() {
        return Ok(Json(RedirectTarget {
            original_url: expanded.original_url,
        })
        .into_response());
    }

    let location = location_header(&expanded.original_url)?;
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

/// Stored URLs are kept as submitted; the header carries their normalized,
/// ASCII-only serialization.
fn location_header(original_url: &str) -> Result<HeaderValue> {
    let normalized = Url::parse(original_url)
        .map_err(|e| AppError::Internal(format!("stored url '{original_url}' is invalid: {e}")))?;
    HeaderValue::from_str(normalized.as_str())
        .map_err(|e| AppError::Internal(format!("stored url '{original_url}' is not a valid header: {e}")))
}

fn is_reserved(segment: &str) -> bool {
    RESERVED_SEGMENTS.contains(&segment) || segment.starts_with("api")
}

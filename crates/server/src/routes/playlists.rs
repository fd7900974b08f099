use axum::{
    async_trait,
    extract::{FromRequestParts, Path, Query, State},
    http::{request::Parts, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use service::playlist::{
    domain::{
        CreatePlaylistCommand, DeletePlaylistCommand, GetPlaylistsQuery, Playlist, PlaylistDto, PlaylistItemDto,
        PlaylistItemInput, Playlists, ReadPlaylistByUidQuery, UpdatePlaylistCommand,
    },
    RequestContext,
};

use crate::{errors::JsonApiError, state::AppState};

pub const ORG_HEADER: &str = "x-org-id";
pub const DEFAULT_ORG_ID: i64 = 1;

/// Organization of the caller, from the `X-Org-Id` header (default 1).
#[derive(Debug, Clone, Copy)]
pub struct OrgId(pub i64);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for OrgId {
    type Rejection = JsonApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(raw) = parts.headers.get(ORG_HEADER) else {
            return Ok(OrgId(DEFAULT_ORG_ID));
        };
        raw.to_str()
            .ok()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|id| *id > 0)
            .map(OrgId)
            .ok_or_else(|| JsonApiError::bad_request("X-Org-Id must be a positive integer"))
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Case-insensitive substring of the playlist name.
    pub query: Option<String>,
    /// Maximum number of results; 0 or absent means 1000.
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CreatePlaylistInput {
    #[serde(default)]
    pub uid: Option<String>,
    pub name: String,
    pub interval: String,
    #[serde(default)]
    pub items: Vec<PlaylistItemInput>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdatePlaylistInput {
    pub name: String,
    pub interval: String,
    #[serde(default)]
    pub items: Vec<PlaylistItemInput>,
}

fn request_ctx(state: &AppState) -> RequestContext {
    RequestContext::background().with_timeout(state.request_timeout)
}

#[utoipa::path(
    get, path = "/api/playlists", tag = "playlists",
    params(SearchParams, ("X-Org-Id" = Option<i64>, Header, description = "Organization id, default 1")),
    responses(
        (status = 200, description = "Matching playlists, possibly empty", body = [crate::openapi::PlaylistDoc]),
        (status = 400, description = "Validation Error")
    )
)]
pub async fn search(State(state): State<AppState>, OrgId(org_id): OrgId, Query(q): Query<SearchParams>) -> Result<Json<Playlists>, JsonApiError> {
    let query = GetPlaylistsQuery { org_id, name: q.query, limit: q.limit.unwrap_or(0) };
    let found = state.playlists.search(&request_ctx(&state), &query).await?;
    Ok(Json(found))
}

#[utoipa::path(
    post, path = "/api/playlists", tag = "playlists",
    request_body = crate::openapi::CreatePlaylistInputDoc,
    responses(
        (status = 200, description = "Created", body = crate::openapi::PlaylistDoc),
        (status = 400, description = "Validation Error"),
        (status = 409, description = "Uid already taken")
    )
)]
pub async fn create(State(state): State<AppState>, OrgId(org_id): OrgId, Json(input): Json<CreatePlaylistInput>) -> Result<Json<Playlist>, JsonApiError> {
    let cmd = CreatePlaylistCommand { org_id, uid: input.uid, name: input.name, interval: input.interval, items: input.items };
    let created = state.playlists.create(&request_ctx(&state), &cmd).await?;
    Ok(Json(created))
}

#[utoipa::path(
    get, path = "/api/playlists/{uid}", tag = "playlists",
    params(("uid" = String, Path, description = "Playlist uid")),
    responses(
        (status = 200, description = "Playlist with items", body = crate::openapi::PlaylistDtoDoc),
        (status = 404, description = "Not Found")
    )
)]
pub async fn read(State(state): State<AppState>, OrgId(org_id): OrgId, Path(uid): Path<String>) -> Result<Json<PlaylistDto>, JsonApiError> {
    let dto = state.playlists.read(&request_ctx(&state), &ReadPlaylistByUidQuery { org_id, uid }).await?;
    Ok(Json(dto))
}

#[utoipa::path(
    get, path = "/api/playlists/{uid}/items", tag = "playlists",
    params(("uid" = String, Path, description = "Playlist uid")),
    responses(
        (status = 200, description = "Items in rotation order", body = [crate::openapi::PlaylistItemDoc]),
        (status = 404, description = "Not Found")
    )
)]
pub async fn items(State(state): State<AppState>, OrgId(org_id): OrgId, Path(uid): Path<String>) -> Result<Json<Vec<PlaylistItemDto>>, JsonApiError> {
    let dto = state.playlists.read(&request_ctx(&state), &ReadPlaylistByUidQuery { org_id, uid }).await?;
    Ok(Json(dto.items))
}

#[utoipa::path(
    get, path = "/api/playlists/{uid}/summary", tag = "playlists",
    params(("uid" = String, Path, description = "Playlist uid")),
    responses(
        (status = 200, description = "Playlist without items", body = crate::openapi::PlaylistDoc),
        (status = 404, description = "Not Found")
    )
)]
pub async fn summary(State(state): State<AppState>, OrgId(org_id): OrgId, Path(uid): Path<String>) -> Result<Json<Playlist>, JsonApiError> {
    let playlist = state.playlists.get_without_items(&request_ctx(&state), &ReadPlaylistByUidQuery { org_id, uid }).await?;
    Ok(Json(playlist))
}

#[utoipa::path(
    put, path = "/api/playlists/{uid}", tag = "playlists",
    params(("uid" = String, Path, description = "Playlist uid")),
    request_body = crate::openapi::UpdatePlaylistInputDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::PlaylistDtoDoc),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update(
    State(state): State<AppState>,
    OrgId(org_id): OrgId,
    Path(uid): Path<String>,
    Json(input): Json<UpdatePlaylistInput>,
) -> Result<Json<PlaylistDto>, JsonApiError> {
    let cmd = UpdatePlaylistCommand { org_id, uid, name: input.name, interval: input.interval, items: input.items };
    let dto = state.playlists.update(&request_ctx(&state), &cmd).await?;
    Ok(Json(dto))
}

#[utoipa::path(
    delete, path = "/api/playlists/{uid}", tag = "playlists",
    params(("uid" = String, Path, description = "Playlist uid")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete(State(state): State<AppState>, OrgId(org_id): OrgId, Path(uid): Path<String>) -> Result<StatusCode, JsonApiError> {
    state.playlists.delete(&request_ctx(&state), &DeletePlaylistCommand { org_id, uid }).await?;
    Ok(StatusCode::NO_CONTENT)
}

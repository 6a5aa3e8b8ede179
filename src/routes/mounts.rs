// Mountpoint handlers: status, directory create/remove, mount/umount

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use std::path::Path as FsPath;

use super::{ApiError, AppState, blocking};
use crate::models::{CreateParams, MountRequest, MountStatus, UmountParams, UnlinkParams};
use crate::mount_point::{DEFAULT_DIR_MODE, MountPoint, is_device_file};

/// Plain ids must be a single path component; device files are flattened by
/// `build_path`. Either way the result has to sit directly under `base_dir`.
fn mount_point(state: &AppState, id: &str) -> Result<MountPoint, ApiError> {
    let invalid = || ApiError::BadRequest(format!("invalid mount id {:?}", id));
    if !is_device_file(id)
        && (id.is_empty() || id == "." || id == ".." || id.contains(['/', '\0']))
    {
        return Err(invalid());
    }

    let base = FsPath::new(&state.config.mount.base_dir);
    let mp = MountPoint::for_id(base, id, state.executor.clone());
    let path = mp.path();
    let nul = path.to_string_lossy().contains('\0');
    if path.parent() != Some(base) || path.file_name().is_none() || nul {
        return Err(invalid());
    }
    Ok(mp)
}

fn status_of(id: String, mp: &MountPoint) -> crate::Result<MountStatus> {
    let exists = mp.exists()?;
    let mounted = exists && mp.is_mounted()?;
    Ok(MountStatus {
        id,
        path: mp.path().to_string_lossy().into_owned(),
        exists,
        mounted,
    })
}

fn valid_mode(mode: &str) -> bool {
    (3..=4).contains(&mode.len()) && mode.bytes().all(|b| (b'0'..=b'7').contains(&b))
}

/// GET /api/mounts/{id}
pub(super) async fn status_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MountStatus>, ApiError> {
    let mp = mount_point(&state, &id)?;
    Ok(Json(blocking(move || status_of(id, &mp)).await?))
}

/// POST /api/mounts/{id}/dir?mode=0750
pub(super) async fn create_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<CreateParams>,
) -> Result<Json<MountStatus>, ApiError> {
    let mode = params.mode.unwrap_or_else(|| DEFAULT_DIR_MODE.to_string());
    if !valid_mode(&mode) {
        return Err(ApiError::BadRequest(format!("invalid mode {:?}", mode)));
    }
    let mp = mount_point(&state, &id)?;
    let status = blocking(move || {
        mp.create(&mode)?;
        status_of(id, &mp)
    })
    .await?;
    Ok(Json(status))
}

/// DELETE /api/mounts/{id}/dir?force=false
pub(super) async fn unlink_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<UnlinkParams>,
) -> Result<StatusCode, ApiError> {
    let mp = mount_point(&state, &id)?;
    let force = params.force.unwrap_or(true);
    blocking(move || mp.unlink(force)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/mounts/{id}/mount with `{"options": "defaults,nofail"}` or a list.
pub(super) async fn mount_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<MountRequest>,
) -> Result<Json<MountStatus>, ApiError> {
    let mp = mount_point(&state, &id)?;
    let status = blocking(move || {
        mp.mount(req.options)?;
        status_of(id, &mp)
    })
    .await?;
    Ok(Json(status))
}

/// POST /api/mounts/{id}/umount?force=true&lazy=true
pub(super) async fn umount_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<UmountParams>,
) -> Result<Json<MountStatus>, ApiError> {
    let mp = mount_point(&state, &id)?;
    let status = blocking(move || {
        mp.umount(params.force, params.lazy)?;
        status_of(id, &mp)
    })
    .await?;
    Ok(Json(status))
}

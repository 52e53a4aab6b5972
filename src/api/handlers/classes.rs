//! Class and section lookup handlers.

use crate::api::doc::CLASS_TAG;
use crate::api::dto::{ClassesResponse, ErrorResponse, SectionsResponse};
use crate::error::AppResult;
use crate::state::AppState;
use axum::{Json, extract::State};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub fn class_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_classes))
        .routes(routes!(list_sections))
}

/// GET /api/v1/classes - All classes ordered by name
#[utoipa::path(
    get,
    path = "/classes",
    tag = CLASS_TAG,
    responses(
        (status = 200, description = "Classes", body = ClassesResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
async fn list_classes(State(state): State<AppState>) -> AppResult<Json<ClassesResponse>> {
    let classes = state.services.classes.list_classes().await?;
    Ok(Json(ClassesResponse { classes }))
}

/// GET /api/v1/sections - All sections ordered by name
#[utoipa::path(
    get,
    path = "/sections",
    tag = CLASS_TAG,
    responses(
        (status = 200, description = "Sections", body = SectionsResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
async fn list_sections(State(state): State<AppState>) -> AppResult<Json<SectionsResponse>> {
    let sections = state.services.classes.list_sections().await?;
    Ok(Json(SectionsResponse { sections }))
}

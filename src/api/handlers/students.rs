//! Student request handlers.
//!
//! Thin adapters: extract and validate, call the student service, serialize.

use crate::api::doc::STUDENT_TAG;
use crate::api::dto::{
    CreateStudentRequest, ErrorResponse, MessageResponse, StatusRequest, StudentIdParams,
    StudentListQuery, UpdateStudentRequest,
};
use crate::api::middleware::AuthUser;
use crate::error::AppResult;
use crate::models::{Paginated, Student};
use crate::repositories::StatusChange;
use crate::state::AppState;
use crate::utils::{ValidatedJson, ValidatedPath, ValidatedQuery};
use axum::{Extension, Json, extract::State};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Creates student routes.
///
/// - GET    /students             - List students
/// - POST   /students             - Create a student
/// - GET    /students/{id}        - Student detail
/// - PUT    /students/{id}        - Partial update
/// - DELETE /students/{id}        - Soft delete
/// - POST   /students/{id}/status - Enable or disable login access
pub fn student_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_students, add_student))
        .routes(routes!(get_student, update_student, delete_student))
        .routes(routes!(set_student_status))
}

#[utoipa::path(
    get,
    path = "/students",
    tag = STUDENT_TAG,
    params(StudentListQuery),
    responses(
        (status = 200, description = "A page of students", body = Paginated<Student>),
        (status = 400, description = "Invalid query", body = ErrorResponse)
    )
)]
async fn list_students(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<StudentListQuery>,
) -> AppResult<Json<Paginated<Student>>> {
    let page = state
        .services
        .students
        .get_all_students(query.into_params())
        .await?;
    Ok(Json(page))
}

#[utoipa::path(
    post,
    path = "/students",
    tag = STUDENT_TAG,
    request_body = CreateStudentRequest,
    responses(
        (status = 200, description = "Student added", body = MessageResponse),
        (status = 400, description = "Invalid body", body = ErrorResponse),
        (status = 500, description = "Unable to add student", body = ErrorResponse)
    )
)]
async fn add_student(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateStudentRequest>,
) -> AppResult<Json<MessageResponse>> {
    let new_student = req.into_new_student()?;
    let message = state.services.students.add_new_student(new_student).await?;
    Ok(Json(MessageResponse::new(message)))
}

#[utoipa::path(
    get,
    path = "/students/{id}",
    tag = STUDENT_TAG,
    params(StudentIdParams),
    responses(
        (status = 200, description = "Student found", body = Student),
        (status = 400, description = "Invalid ID", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    )
)]
async fn get_student(
    State(state): State<AppState>,
    ValidatedPath(params): ValidatedPath<StudentIdParams>,
) -> AppResult<Json<Student>> {
    let student = state.services.students.get_student_detail(params.id()).await?;
    Ok(Json(student))
}

#[utoipa::path(
    put,
    path = "/students/{id}",
    tag = STUDENT_TAG,
    params(StudentIdParams),
    request_body = UpdateStudentRequest,
    responses(
        (status = 200, description = "Student updated", body = MessageResponse),
        (status = 400, description = "Invalid body or ID", body = ErrorResponse),
        (status = 500, description = "Update failed", body = ErrorResponse)
    )
)]
async fn update_student(
    State(state): State<AppState>,
    ValidatedPath(params): ValidatedPath<StudentIdParams>,
    ValidatedJson(req): ValidatedJson<UpdateStudentRequest>,
) -> AppResult<Json<MessageResponse>> {
    let changes = req.into_changes()?;
    let message = state
        .services
        .students
        .update_student(params.id(), changes)
        .await?;
    Ok(Json(MessageResponse::new(message)))
}

#[utoipa::path(
    post,
    path = "/students/{id}/status",
    tag = STUDENT_TAG,
    params(StudentIdParams),
    request_body = StatusRequest,
    responses(
        (status = 200, description = "Status changed", body = MessageResponse),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Unable to change status", body = ErrorResponse)
    ),
    security((), ("bearerAuth" = []))
)]
async fn set_student_status(
    State(state): State<AppState>,
    reviewer: Option<Extension<AuthUser>>,
    ValidatedPath(params): ValidatedPath<StudentIdParams>,
    ValidatedJson(req): ValidatedJson<StatusRequest>,
) -> AppResult<Json<MessageResponse>> {
    let change = StatusChange {
        user_id: params.id(),
        reviewer_id: reviewer.map(|Extension(user)| user.user_id),
        status: req.status,
    };
    let message = state.services.students.set_student_status(change).await?;
    Ok(Json(MessageResponse::new(message)))
}

#[utoipa::path(
    delete,
    path = "/students/{id}",
    tag = STUDENT_TAG,
    params(StudentIdParams),
    responses(
        (status = 200, description = "Student deleted", body = MessageResponse),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Unable to delete student", body = ErrorResponse)
    )
)]
async fn delete_student(
    State(state): State<AppState>,
    ValidatedPath(params): ValidatedPath<StudentIdParams>,
) -> AppResult<Json<MessageResponse>> {
    let message = state.services.students.delete_student(params.id()).await?;
    Ok(Json(MessageResponse::new(message)))
}

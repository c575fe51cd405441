//! Student endpoints

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    routing::get,
    Json, Router,
};

use crate::http::error::ApiError;
use crate::http::extractors::{JsonBody, QueryParams, ValidId};
use crate::models::{NewStudent, Page, PageParams, Student, StudentPatch};
use crate::state::AppState;

/// GET /students - one page of students
async fn list_students(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<PageParams>,
) -> Result<Json<Page<Student>>, ApiError> {
    let page = params.into_request(state.max_page_size)?;
    Ok(Json(state.students.find_all(page).await?))
}

/// GET /students/{id}
async fn get_student(
    State(state): State<AppState>,
    ValidId(id): ValidId,
) -> Result<Json<Student>, ApiError> {
    Ok(Json(state.students.find_student_by_id(id).await?))
}

/// GET /students/search/{fragment}
async fn search_students(
    State(state): State<AppState>,
    Path(fragment): Path<String>,
) -> Result<Json<Vec<Student>>, ApiError> {
    Ok(Json(state.students.find_student_by_name_like(&fragment).await?))
}

/// POST /students - 201 with Location of the new record
async fn create_student(
    State(state): State<AppState>,
    JsonBody(new_student): JsonBody<NewStudent>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<Student>), ApiError> {
    let student = state.students.save(new_student).await?;
    let location = format!("/students/{}", student.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(student),
    ))
}

/// PUT /students/{id} - partial update
async fn update_student(
    State(state): State<AppState>,
    ValidId(id): ValidId,
    JsonBody(patch): JsonBody<StudentPatch>,
) -> Result<Json<Student>, ApiError> {
    Ok(Json(state.students.update(patch, id).await?))
}

/// DELETE /students/{id}
async fn delete_student(
    State(state): State<AppState>,
    ValidId(id): ValidId,
) -> Result<StatusCode, ApiError> {
    state.students.delete(id).await?;
    Ok(StatusCode::OK)
}

/// Student routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/students", get(list_students).post(create_student))
        .route(
            "/students/{id}",
            get(get_student).put(update_student).delete(delete_student),
        )
        .route("/students/search/{fragment}", get(search_students))
}

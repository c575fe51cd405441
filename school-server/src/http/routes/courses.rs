//! Course endpoints

use axum::{extract::State, http::StatusCode, routing::{delete, get}, Json, Router};

use crate::http::error::ApiError;
use crate::http::extractors::ValidId;
use crate::models::{Course, CourseStudentCount};
use crate::state::AppState;

/// GET /courses - every course, unpaged (paging parameters are ignored)
async fn list_courses(State(state): State<AppState>) -> Result<Json<Vec<Course>>, ApiError> {
    Ok(Json(state.courses.find_all().await?))
}

/// GET /courses/studcount
async fn count_students(
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseStudentCount>>, ApiError> {
    Ok(Json(state.courses.get_count_students_in_course().await?))
}

/// DELETE /courses/{id}
async fn delete_course(
    State(state): State<AppState>,
    ValidId(id): ValidId,
) -> Result<StatusCode, ApiError> {
    state.courses.delete(id).await?;
    Ok(StatusCode::OK)
}

/// Course routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/courses", get(list_courses))
        .route("/courses/studcount", get(count_students))
        .route("/courses/{id}", delete(delete_course))
}

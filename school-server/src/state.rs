//! Application state shared across handlers
//!
//! This is the composition root: repositories are built here and handed to
//! the services, which the router then receives as state.

use std::sync::Arc;

use sqlx::PgPool;

use crate::db::{MemoryStore, PgCourseRepo, PgStudentRepo};
use crate::models::MAX_PAGE_SIZE;
use crate::service::{CourseService, StudentService};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub students: StudentService,
    pub courses: CourseService,
    /// Upper bound applied to the `size` query parameter
    pub max_page_size: u32,
}

impl AppState {
    pub fn new(students: StudentService, courses: CourseService) -> Self {
        Self {
            students,
            courses,
            max_page_size: MAX_PAGE_SIZE,
        }
    }

    /// Services backed by PostgreSQL.
    pub fn postgres(pool: PgPool) -> Self {
        Self::new(
            StudentService::new(Arc::new(PgStudentRepo::new(pool.clone()))),
            CourseService::new(Arc::new(PgCourseRepo::new(pool))),
        )
    }

    /// Services backed by a fresh in-memory store.
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(
            StudentService::new(store.clone()),
            CourseService::new(store),
        )
    }

    pub fn with_max_page_size(mut self, max_page_size: u32) -> Self {
        self.max_page_size = max_page_size.max(1);
        self
    }
}

//! Repository contracts and their PostgreSQL implementations
//!
//! The traits are the seam between the services and a datastore. Each
//! backend follows these patterns:
//! - Lookups by id return `DbError::NotFound` for absent rows
//! - Deletes remove enrollment rows and the parent row atomically
//! - Name search is a case-sensitive substring match in id order

use async_trait::async_trait;

use crate::models::{
    Course, CourseId, CourseName, CourseStudentCount, Page, PageRequest, Student, StudentDraft,
    StudentId,
};

pub mod students;
pub mod courses;

pub use students::PgStudentRepo;
pub use courses::PgCourseRepo;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: i64 },
}

impl DbError {
    pub(crate) fn student(id: StudentId) -> Self {
        Self::NotFound {
            resource: "student",
            id,
        }
    }

    pub(crate) fn course(id: CourseId) -> Self {
        Self::NotFound {
            resource: "course",
            id,
        }
    }
}

/// Student persistence
#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// One page of students in the requested order.
    async fn find_all(&self, page: PageRequest) -> Result<Page<Student>, DbError>;

    async fn find_by_id(&self, id: StudentId) -> Result<Student, DbError>;

    /// Students whose name contains `fragment`; empty fragment matches all.
    async fn find_by_name_containing(&self, fragment: &str) -> Result<Vec<Student>, DbError>;

    /// Insert when `id` is `None`, otherwise overwrite name and email of an
    /// existing row. Enrollments are never touched.
    async fn save(&self, id: Option<StudentId>, draft: &StudentDraft) -> Result<Student, DbError>;

    /// Remove the student and its enrollment rows.
    async fn delete_by_id(&self, id: StudentId) -> Result<(), DbError>;

    /// Link a student to a course; an existing link is left as is.
    async fn enroll(&self, student_id: StudentId, course_id: CourseId) -> Result<(), DbError>;
}

/// Course persistence
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// All courses in id order, unpaged.
    async fn find_all(&self) -> Result<Vec<Course>, DbError>;

    async fn find_by_id(&self, id: CourseId) -> Result<Course, DbError>;

    async fn save(&self, name: &CourseName) -> Result<Course, DbError>;

    /// Remove the course and its enrollment rows.
    async fn delete_by_id(&self, id: CourseId) -> Result<(), DbError>;

    /// Distinct enrolled students per course, every course included.
    async fn count_students_per_course(&self) -> Result<Vec<CourseStudentCount>, DbError>;
}

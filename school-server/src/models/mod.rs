//! Entity model with validation at construction
//!
//! Request input is validated when building the draft types written to the
//! datastore. Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod student;
pub mod course;
pub mod patch;
pub mod pagination;

pub use validation::ValidationError;
pub use student::{NewStudent, Student, StudentDraft, StudentId, StudentName, StudentPatch, StudentSummary};
pub use course::{Course, CourseId, CourseName, CourseStudentCount, CourseSummary};
pub use patch::Patch;
pub use pagination::{
    Direction, Page, PageParams, PageRequest, Sort, StudentSortField, DEFAULT_PAGE_SIZE,
    MAX_PAGE_SIZE,
};

//! Resource services
//!
//! The only layer with decision logic: existence checks, partial-update
//! merging, and translating datastore outcomes into [`crate::Error`].
//! Services own an `Arc<dyn Repository>` handed to them by the
//! composition root.

pub mod students;
pub mod courses;

pub use students::StudentService;
pub use courses::CourseService;

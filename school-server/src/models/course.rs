//! Course entity and its derived student-count projection

use serde::{Deserialize, Serialize};

use super::{StudentSummary, ValidationError};

/// Datastore-assigned course identifier
pub type CourseId = i64;

/// Validated course name: non-empty after trimming
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CourseName(String);

impl CourseName {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty {
                field: "course name",
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A course with its enrolled students
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub students: Vec<StudentSummary>,
}

/// Course as nested inside a student
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSummary {
    pub id: CourseId,
    pub name: String,
}

/// Number of students enrolled in a course, computed at read time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseStudentCount {
    pub course_id: CourseId,
    pub course_name: String,
    pub student_count: i64,
}

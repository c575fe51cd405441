//! Student entity and request shapes

use serde::{Deserialize, Serialize};

use super::{CourseSummary, Patch, ValidationError};

/// Datastore-assigned student identifier
pub type StudentId = i64;

/// Validated student name: non-empty after trimming
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StudentName(String);

impl StudentName {
    /// Create a student name, trimming surrounding whitespace.
    ///
    /// # Example
    /// ```
    /// use school_server::models::StudentName;
    ///
    /// assert_eq!(StudentName::new("  Ada ").unwrap().as_str(), "Ada");
    /// assert!(StudentName::new("   ").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "name" });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A student with the courses they are enrolled in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub email: Option<String>,
    pub courses: Vec<CourseSummary>,
}

/// Student as nested inside a course
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentSummary {
    pub id: StudentId,
    pub name: String,
    pub email: Option<String>,
}

/// Validated field values written to the datastore
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentDraft {
    pub name: StudentName,
    pub email: Option<String>,
}

/// Body of a create request
///
/// `name` stays optional here so a missing name is reported as a validation
/// failure instead of a deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewStudent {
    #[serde(default)]
    pub id: Option<StudentId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl NewStudent {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_owned()),
            ..Self::default()
        }
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = Some(email.to_owned());
        self
    }

    /// Validate into a draft.
    pub fn into_draft(self) -> Result<StudentDraft, ValidationError> {
        let name = self
            .name
            .as_deref()
            .ok_or(ValidationError::Empty { field: "name" })
            .and_then(StudentName::new)?;

        Ok(StudentDraft {
            name,
            email: self.email,
        })
    }
}

/// Body of a partial update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentPatch {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub email: Patch<String>,
}

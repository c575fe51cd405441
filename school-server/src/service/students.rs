//! Student service

use std::sync::Arc;

use tracing::{debug, info};

use crate::db::StudentRepository;
use crate::error::Result;
use crate::models::{
    CourseId, NewStudent, Page, PageRequest, Patch, Student, StudentDraft, StudentId,
    StudentName, StudentPatch, ValidationError,
};

/// Student operations over any [`StudentRepository`]
#[derive(Clone)]
pub struct StudentService {
    repo: Arc<dyn StudentRepository>,
}

impl StudentService {
    pub fn new(repo: Arc<dyn StudentRepository>) -> Self {
        Self { repo }
    }

    pub async fn find_all(&self, page: PageRequest) -> Result<Page<Student>> {
        debug!(page = page.page, size = page.size, "listing students");
        Ok(self.repo.find_all(page).await?)
    }

    pub async fn find_student_by_id(&self, id: StudentId) -> Result<Student> {
        Ok(self.repo.find_by_id(id).await?)
    }

    /// Substring search; no matches is an empty list, not an error.
    pub async fn find_student_by_name_like(&self, fragment: &str) -> Result<Vec<Student>> {
        debug!(fragment, "searching students by name");
        Ok(self.repo.find_by_name_containing(fragment).await?)
    }

    /// Create a student, or replace name and email of an existing one.
    ///
    /// Without an `id` a fresh identifier is assigned. An explicit `id` must
    /// reference an existing student; an unknown one fails with NotFound
    /// rather than creating a record under a caller-chosen identifier.
    pub async fn save(&self, new_student: NewStudent) -> Result<Student> {
        let id = new_student.id;
        let draft = new_student.into_draft()?;
        let student = self.repo.save(id, &draft).await?;

        match id {
            None => info!(id = student.id, "student created"),
            Some(_) => info!(id = student.id, "student replaced"),
        }
        Ok(student)
    }

    /// Merge the fields present in `patch` onto the stored student.
    pub async fn update(&self, patch: StudentPatch, id: StudentId) -> Result<Student> {
        let existing = self.repo.find_by_id(id).await?;
        let draft = merge(&existing, patch)?;
        let student = self.repo.save(Some(id), &draft).await?;

        info!(id, "student updated");
        Ok(student)
    }

    /// Remove the student together with its enrollments.
    pub async fn delete(&self, id: StudentId) -> Result<()> {
        self.repo.delete_by_id(id).await?;
        info!(id, "student deleted");
        Ok(())
    }

    pub async fn enroll(&self, student_id: StudentId, course_id: CourseId) -> Result<()> {
        self.repo.enroll(student_id, course_id).await?;
        info!(student_id, course_id, "student enrolled");
        Ok(())
    }
}

/// Apply a partial update to a stored student.
///
/// Name is required: clearing it or setting it blank is rejected.
fn merge(existing: &Student, patch: StudentPatch) -> std::result::Result<StudentDraft, ValidationError> {
    let name = match patch.name {
        Patch::Keep => StudentName::new(&existing.name)?,
        Patch::Clear => return Err(ValidationError::Empty { field: "name" }),
        Patch::Set(name) => StudentName::new(&name)?,
    };

    Ok(StudentDraft {
        name,
        email: patch.email.apply(existing.email.clone()),
    })
}

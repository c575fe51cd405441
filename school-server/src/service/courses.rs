//! Course service

use std::sync::Arc;

use tracing::{debug, info};

use crate::db::CourseRepository;
use crate::error::Result;
use crate::models::{Course, CourseId, CourseName, CourseStudentCount};

/// Course operations over any [`CourseRepository`]
#[derive(Clone)]
pub struct CourseService {
    repo: Arc<dyn CourseRepository>,
}

impl CourseService {
    pub fn new(repo: Arc<dyn CourseRepository>) -> Self {
        Self { repo }
    }

    /// Every course, unpaged.
    pub async fn find_all(&self) -> Result<Vec<Course>> {
        Ok(self.repo.find_all().await?)
    }

    pub async fn find_course_by_id(&self, id: CourseId) -> Result<Course> {
        Ok(self.repo.find_by_id(id).await?)
    }

    /// Enrolled-student counts, recomputed on every call.
    pub async fn get_count_students_in_course(&self) -> Result<Vec<CourseStudentCount>> {
        let counts = self.repo.count_students_per_course().await?;
        debug!(courses = counts.len(), "computed course student counts");
        Ok(counts)
    }

    pub async fn create(&self, name: &str) -> Result<Course> {
        let name = CourseName::new(name)?;
        let course = self.repo.save(&name).await?;
        info!(id = course.id, name = %course.name, "course created");
        Ok(course)
    }

    /// Remove the course together with its enrollments.
    pub async fn delete(&self, id: CourseId) -> Result<()> {
        self.repo.delete_by_id(id).await?;
        info!(id, "course deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::error::Error;
    use crate::models::NewStudent;
    use crate::service::StudentService;

    fn services() -> (CourseService, StudentService) {
        let store = Arc::new(MemoryStore::new());
        (
            CourseService::new(store.clone()),
            StudentService::new(store),
        )
    }

    #[tokio::test]
    async fn create_validates_name() {
        let (courses, _) = services();
        assert!(matches!(
            courses.create("  ").await.unwrap_err(),
            Error::Validation(_)
        ));
        let course = courses.create("Data Science").await.unwrap();
        assert_eq!(course.name, "Data Science");
    }

    #[tokio::test]
    async fn find_all_lists_every_course_with_students() {
        let (courses, students) = services();
        for name in ["Java", "SQL", "Rust", "Go"] {
            courses.create(name).await.unwrap();
        }
        let ada = students.save(NewStudent::named("Ada")).await.unwrap();
        students.enroll(ada.id, 2).await.unwrap();

        let all = courses.find_all().await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[1].students.len(), 1);
        assert_eq!(all[1].students[0].name, "Ada");
    }

    #[tokio::test]
    async fn counts_track_enrollments() {
        let (courses, students) = services();
        let java = courses.create("Java").await.unwrap();
        let sql = courses.create("SQL").await.unwrap();
        let ada = students.save(NewStudent::named("Ada")).await.unwrap();
        let bob = students.save(NewStudent::named("Bob")).await.unwrap();

        students.enroll(ada.id, java.id).await.unwrap();
        let before = courses.get_count_students_in_course().await.unwrap();
        assert_eq!(before[0].student_count, 1);
        assert_eq!(before[1].student_count, 0);

        students.enroll(bob.id, java.id).await.unwrap();
        let after = courses.get_count_students_in_course().await.unwrap();
        assert_eq!(after[0].student_count, before[0].student_count + 1);
        assert_eq!(after[1].course_id, sql.id);
        assert_eq!(after[1].student_count, 0);
    }

    #[tokio::test]
    async fn delete_cascades_and_then_fails() {
        let (courses, students) = services();
        let java = courses.create("Java").await.unwrap();
        let ada = students.save(NewStudent::named("Ada")).await.unwrap();
        students.enroll(ada.id, java.id).await.unwrap();

        courses.delete(java.id).await.unwrap();
        let ada = students.find_student_by_id(ada.id).await.unwrap();
        assert!(ada.courses.is_empty());

        assert!(courses.delete(java.id).await.unwrap_err().is_not_found());
        assert!(courses.find_course_by_id(java.id).await.unwrap_err().is_not_found());
    }
}

//! In-memory datastore
//!
//! Implements both repository traits over plain maps guarded by a single
//! lock, mirroring the PostgreSQL backend's ordering and NULL placement.
//! Used for `serve --in-memory` and for tests that need no database.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::repos::{CourseRepository, DbError, StudentRepository};
use crate::models::{
    Course, CourseId, CourseName, CourseStudentCount, CourseSummary, Page, PageRequest, Sort,
    Student, StudentDraft, StudentId, StudentSortField, StudentSummary,
};

#[derive(Debug, Clone)]
struct StudentRow {
    name: String,
    email: Option<String>,
}

#[derive(Debug, Default)]
struct Tables {
    students: BTreeMap<StudentId, StudentRow>,
    courses: BTreeMap<CourseId, String>,
    enrollments: BTreeSet<(StudentId, CourseId)>,
    // Identifiers are never reused, like a sequence
    last_student_id: StudentId,
    last_course_id: CourseId,
}

impl Tables {
    fn student(&self, id: StudentId) -> Option<Student> {
        let row = self.students.get(&id)?;
        let courses = self
            .enrollments
            .iter()
            .filter(|(s, _)| *s == id)
            .filter_map(|(_, c)| {
                self.courses.get(c).map(|name| CourseSummary {
                    id: *c,
                    name: name.clone(),
                })
            })
            .collect();

        Some(Student {
            id,
            name: row.name.clone(),
            email: row.email.clone(),
            courses,
        })
    }

    fn course(&self, id: CourseId) -> Option<Course> {
        let name = self.courses.get(&id)?;
        let mut students: Vec<StudentSummary> = self
            .enrollments
            .iter()
            .filter(|(_, c)| *c == id)
            .filter_map(|(s, _)| {
                self.students.get(s).map(|row| StudentSummary {
                    id: *s,
                    name: row.name.clone(),
                    email: row.email.clone(),
                })
            })
            .collect();
        students.sort_by_key(|s| s.id);

        Some(Course {
            id,
            name: name.clone(),
            students,
        })
    }
}

/// NULL sorts after every value, as in PostgreSQL.
fn nulls_last(a: &Option<String>, b: &Option<String>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
    }
}

fn compare(sort: Sort, a: (&StudentId, &StudentRow), b: (&StudentId, &StudentRow)) -> Ordering {
    let primary = match sort.field {
        StudentSortField::Id => a.0.cmp(b.0),
        StudentSortField::Name => a.1.name.cmp(&b.1.name),
        StudentSortField::Email => nulls_last(&a.1.email, &b.1.email),
    };
    sort.direction.apply(primary).then_with(|| a.0.cmp(b.0))
}

/// Shared in-memory store; clones share the same tables
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StudentRepository for MemoryStore {
    async fn find_all(&self, page: PageRequest) -> Result<Page<Student>, DbError> {
        let tables = self.tables.read().await;

        let mut rows: Vec<_> = tables.students.iter().collect();
        rows.sort_by(|a, b| compare(page.sort, *a, *b));

        let items = rows
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .filter_map(|(id, _)| tables.student(*id))
            .collect();

        Ok(Page {
            items,
            total: tables.students.len() as i64,
            page: page.page,
            size: page.size,
        })
    }

    async fn find_by_id(&self, id: StudentId) -> Result<Student, DbError> {
        self.tables
            .read()
            .await
            .student(id)
            .ok_or_else(|| DbError::student(id))
    }

    async fn find_by_name_containing(&self, fragment: &str) -> Result<Vec<Student>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables
            .students
            .iter()
            .filter(|(_, row)| row.name.contains(fragment))
            .filter_map(|(id, _)| tables.student(*id))
            .collect())
    }

    async fn save(&self, id: Option<StudentId>, draft: &StudentDraft) -> Result<Student, DbError> {
        let mut tables = self.tables.write().await;
        let row = StudentRow {
            name: draft.name.as_str().to_owned(),
            email: draft.email.clone(),
        };

        let id = match id {
            None => {
                tables.last_student_id += 1;
                let id = tables.last_student_id;
                tables.students.insert(id, row);
                id
            }
            Some(id) => {
                let existing = tables
                    .students
                    .get_mut(&id)
                    .ok_or_else(|| DbError::student(id))?;
                *existing = row;
                id
            }
        };

        tables.student(id).ok_or_else(|| DbError::student(id))
    }

    async fn delete_by_id(&self, id: StudentId) -> Result<(), DbError> {
        let mut tables = self.tables.write().await;
        if tables.students.remove(&id).is_none() {
            return Err(DbError::student(id));
        }
        tables.enrollments.retain(|(s, _)| *s != id);
        Ok(())
    }

    async fn enroll(&self, student_id: StudentId, course_id: CourseId) -> Result<(), DbError> {
        let mut tables = self.tables.write().await;
        if !tables.students.contains_key(&student_id) {
            return Err(DbError::student(student_id));
        }
        if !tables.courses.contains_key(&course_id) {
            return Err(DbError::course(course_id));
        }
        tables.enrollments.insert((student_id, course_id));
        Ok(())
    }
}

#[async_trait]
impl CourseRepository for MemoryStore {
    async fn find_all(&self) -> Result<Vec<Course>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables
            .courses
            .keys()
            .filter_map(|id| tables.course(*id))
            .collect())
    }

    async fn find_by_id(&self, id: CourseId) -> Result<Course, DbError> {
        self.tables
            .read()
            .await
            .course(id)
            .ok_or_else(|| DbError::course(id))
    }

    async fn save(&self, name: &CourseName) -> Result<Course, DbError> {
        let mut tables = self.tables.write().await;
        tables.last_course_id += 1;
        let id = tables.last_course_id;
        tables.courses.insert(id, name.as_str().to_owned());

        Ok(Course {
            id,
            name: name.as_str().to_owned(),
            students: Vec::new(),
        })
    }

    async fn delete_by_id(&self, id: CourseId) -> Result<(), DbError> {
        let mut tables = self.tables.write().await;
        if tables.courses.remove(&id).is_none() {
            return Err(DbError::course(id));
        }
        tables.enrollments.retain(|(_, c)| *c != id);
        Ok(())
    }

    async fn count_students_per_course(&self) -> Result<Vec<CourseStudentCount>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables
            .courses
            .iter()
            .map(|(id, name)| CourseStudentCount {
                course_id: *id,
                course_name: name.clone(),
                student_count: tables.enrollments.iter().filter(|(_, c)| c == id).count() as i64,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Direction, StudentName};

    fn draft(name: &str, email: Option<&str>) -> StudentDraft {
        StudentDraft {
            name: StudentName::new(name).unwrap(),
            email: email.map(str::to_owned),
        }
    }

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        StudentRepository::save(&store, None, &draft("Carol", Some("c@x.com")))
            .await
            .unwrap();
        StudentRepository::save(&store, None, &draft("Alice", None))
            .await
            .unwrap();
        StudentRepository::save(&store, None, &draft("Bob", Some("b@x.com")))
            .await
            .unwrap();
        store
    }

    fn names(page: &Page<Student>) -> Vec<&str> {
        page.items.iter().map(|s| s.name.as_str()).collect()
    }

    #[tokio::test]
    async fn ids_are_sequential_and_not_reused() {
        let store = seeded().await;
        StudentRepository::delete_by_id(&store, 3).await.unwrap();
        let next = StudentRepository::save(&store, None, &draft("Dan", None))
            .await
            .unwrap();
        assert_eq!(next.id, 4);
    }

    #[tokio::test]
    async fn default_order_is_by_id() {
        let store = seeded().await;
        let page = StudentRepository::find_all(&store, PageRequest::new(0, 10))
            .await
            .unwrap();
        assert_eq!(names(&page), vec!["Carol", "Alice", "Bob"]);
        assert_eq!(page.total, 3);
    }

    #[tokio::test]
    async fn sorts_by_name_and_email() {
        let store = seeded().await;

        let by_name = PageRequest::new(0, 10).sorted(Sort {
            field: StudentSortField::Name,
            direction: Direction::Desc,
        });
        let page = StudentRepository::find_all(&store, by_name).await.unwrap();
        assert_eq!(names(&page), vec!["Carol", "Bob", "Alice"]);

        let by_email = PageRequest::new(0, 10).sorted(Sort {
            field: StudentSortField::Email,
            direction: Direction::Asc,
        });
        let page = StudentRepository::find_all(&store, by_email).await.unwrap();
        assert_eq!(names(&page), vec!["Bob", "Carol", "Alice"]);
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty() {
        let store = seeded().await;
        let page = StudentRepository::find_all(&store, PageRequest::new(5, 3))
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 3);
    }

    #[tokio::test]
    async fn name_search_is_case_sensitive() {
        let store = seeded().await;
        let hits = store.find_by_name_containing("o").await.unwrap();
        let names: Vec<_> = hits.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Carol", "Bob"]);

        assert!(store.find_by_name_containing("ALICE").await.unwrap().is_empty());
        assert_eq!(store.find_by_name_containing("").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn enroll_is_idempotent_and_checks_both_sides() {
        let store = seeded().await;
        let course = CourseRepository::save(&store, &CourseName::new("Java").unwrap())
            .await
            .unwrap();

        store.enroll(1, course.id).await.unwrap();
        store.enroll(1, course.id).await.unwrap();
        let counts = store.count_students_per_course().await.unwrap();
        assert_eq!(counts[0].student_count, 1);

        assert!(matches!(
            store.enroll(99, course.id).await,
            Err(DbError::NotFound { resource: "student", .. })
        ));
        assert!(matches!(
            store.enroll(1, 99).await,
            Err(DbError::NotFound { resource: "course", .. })
        ));
    }

    #[tokio::test]
    async fn deletes_cascade_to_enrollments() {
        let store = seeded().await;
        let java = CourseRepository::save(&store, &CourseName::new("Java").unwrap())
            .await
            .unwrap();
        let sql = CourseRepository::save(&store, &CourseName::new("SQL").unwrap())
            .await
            .unwrap();
        store.enroll(1, java.id).await.unwrap();
        store.enroll(2, java.id).await.unwrap();
        store.enroll(1, sql.id).await.unwrap();

        StudentRepository::delete_by_id(&store, 1).await.unwrap();
        let java = CourseRepository::find_by_id(&store, java.id).await.unwrap();
        assert_eq!(java.students.len(), 1);

        CourseRepository::delete_by_id(&store, java.id).await.unwrap();
        let alice = StudentRepository::find_by_id(&store, 2).await.unwrap();
        assert!(alice.courses.is_empty());
    }
}

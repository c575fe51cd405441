//! Student repository backed by PostgreSQL
//!
//! - find_all: one page query + one JOIN for the page's enrollments
//! - delete: enrollments then student, in one transaction

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::{DbError, StudentRepository};
use crate::models::{
    CourseId, CourseSummary, Page, PageRequest, Student, StudentDraft, StudentId, StudentSummary,
};

/// Student repository
#[derive(Clone)]
pub struct PgStudentRepo {
    pool: PgPool,
}

impl PgStudentRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn count(&self) -> Result<i64, DbError> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM students")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    /// Load enrollments for a batch of students with a single JOIN.
    async fn attach_courses(&self, rows: Vec<StudentSummary>) -> Result<Vec<Student>, DbError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<StudentId> = rows.iter().map(|s| s.id).collect();
        let links = sqlx::query(
            r#"
            SELECT e.student_id, c.id, c.name
            FROM enrollments e
            JOIN courses c ON c.id = e.course_id
            WHERE e.student_id = ANY($1)
            ORDER BY c.id
            "#,
        )
        .bind(&ids[..])
        .fetch_all(&self.pool)
        .await?;

        let mut by_student: HashMap<StudentId, Vec<CourseSummary>> = HashMap::new();
        for link in links {
            by_student
                .entry(link.get("student_id"))
                .or_default()
                .push(CourseSummary {
                    id: link.get("id"),
                    name: link.get("name"),
                });
        }

        Ok(rows
            .into_iter()
            .map(|s| Student {
                courses: by_student.remove(&s.id).unwrap_or_default(),
                id: s.id,
                name: s.name,
                email: s.email,
            })
            .collect())
    }

    async fn attach_one(&self, row: StudentSummary) -> Result<Student, DbError> {
        let id = row.id;
        self.attach_courses(vec![row])
            .await?
            .pop()
            .ok_or_else(|| DbError::student(id))
    }
}

fn summary(row: &PgRow) -> StudentSummary {
    StudentSummary {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
    }
}

#[async_trait]
impl StudentRepository for PgStudentRepo {
    async fn find_all(&self, page: PageRequest) -> Result<Page<Student>, DbError> {
        // Columns come from a closed enum, never from request text
        let sql = format!(
            r#"
            SELECT id, name, email, COUNT(*) OVER() AS total
            FROM students
            ORDER BY {} {}, id ASC
            LIMIT $1 OFFSET $2
            "#,
            page.sort.field.column(),
            page.sort.direction.as_sql(),
        );

        let rows = sqlx::query(&sql)
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        // COUNT(*) OVER() yields nothing past the last page
        let Some(first) = rows.first() else {
            let mut empty = Page::empty(page);
            empty.total = self.count().await?;
            return Ok(empty);
        };
        let total: i64 = first.get("total");
        let items = self
            .attach_courses(rows.iter().map(summary).collect())
            .await?;

        Ok(Page {
            items,
            total,
            page: page.page,
            size: page.size,
        })
    }

    async fn find_by_id(&self, id: StudentId) -> Result<Student, DbError> {
        let row = sqlx::query("SELECT id, name, email FROM students WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::student(id))?;

        self.attach_one(summary(&row)).await
    }

    async fn find_by_name_containing(&self, fragment: &str) -> Result<Vec<Student>, DbError> {
        // strpos keeps the match literal and case-sensitive (no LIKE wildcards)
        let rows = sqlx::query(
            r#"
            SELECT id, name, email
            FROM students
            WHERE strpos(name, $1) > 0
            ORDER BY id
            "#,
        )
        .bind(fragment)
        .fetch_all(&self.pool)
        .await?;

        self.attach_courses(rows.iter().map(summary).collect())
            .await
    }

    async fn save(&self, id: Option<StudentId>, draft: &StudentDraft) -> Result<Student, DbError> {
        match id {
            None => {
                let row = sqlx::query(
                    r#"
                    INSERT INTO students (name, email)
                    VALUES ($1, $2)
                    RETURNING id, name, email
                    "#,
                )
                .bind(draft.name.as_str())
                .bind(draft.email.as_deref())
                .fetch_one(&self.pool)
                .await?;

                let s = summary(&row);
                Ok(Student {
                    id: s.id,
                    name: s.name,
                    email: s.email,
                    courses: Vec::new(),
                })
            }
            Some(id) => {
                let row = sqlx::query(
                    r#"
                    UPDATE students
                    SET name = $1, email = $2
                    WHERE id = $3
                    RETURNING id, name, email
                    "#,
                )
                .bind(draft.name.as_str())
                .bind(draft.email.as_deref())
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| DbError::student(id))?;

                self.attach_one(summary(&row)).await
            }
        }
    }

    async fn delete_by_id(&self, id: StudentId) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM enrollments WHERE student_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            // Dropping tx rolls back
            return Err(DbError::student(id));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn enroll(&self, student_id: StudentId, course_id: CourseId) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        let (student_exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM students WHERE id = $1)")
                .bind(student_id)
                .fetch_one(&mut *tx)
                .await?;
        if !student_exists {
            return Err(DbError::student(student_id));
        }

        let (course_exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM courses WHERE id = $1)")
                .bind(course_id)
                .fetch_one(&mut *tx)
                .await?;
        if !course_exists {
            return Err(DbError::course(course_id));
        }

        sqlx::query(
            r#"
            INSERT INTO enrollments (student_id, course_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(student_id)
        .bind(course_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, schema};
    use crate::models::StudentName;

    // Run with: DATABASE_URL=postgres://... cargo test -p school-server -- --ignored

    async fn repo() -> PgStudentRepo {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url).await.expect("pool creation failed");
        schema::bootstrap(&pool).await.expect("schema bootstrap failed");
        PgStudentRepo::new(pool)
    }

    fn draft(name: &str) -> StudentDraft {
        StudentDraft {
            name: StudentName::new(name).unwrap(),
            email: None,
        }
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn save_then_delete() {
        let repo = repo().await;

        let created = repo.save(None, &draft("Pg Student")).await.unwrap();
        let found = repo.find_by_id(created.id).await.unwrap();
        assert_eq!(found.name, "Pg Student");

        repo.delete_by_id(created.id).await.unwrap();
        assert!(matches!(
            repo.find_by_id(created.id).await,
            Err(DbError::NotFound { .. })
        ));
        assert!(matches!(
            repo.delete_by_id(created.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn update_of_missing_row_is_not_found() {
        let repo = repo().await;
        let err = repo.save(Some(i64::MAX), &draft("Ghost")).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "student", .. }));
    }
}

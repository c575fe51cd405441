//! Course repository backed by PostgreSQL
//!
//! - find_all: unpaged, one JOIN for all enrollments
//! - count_students_per_course: LEFT JOIN so empty courses report 0

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use super::{CourseRepository, DbError};
use crate::models::{Course, CourseId, CourseName, CourseStudentCount, StudentSummary};

/// Course repository
#[derive(Clone)]
pub struct PgCourseRepo {
    pool: PgPool,
}

impl PgCourseRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn attach_students(
        &self,
        courses: Vec<(CourseId, String)>,
    ) -> Result<Vec<Course>, DbError> {
        if courses.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<CourseId> = courses.iter().map(|(id, _)| *id).collect();
        let links = sqlx::query(
            r#"
            SELECT e.course_id, s.id, s.name, s.email
            FROM enrollments e
            JOIN students s ON s.id = e.student_id
            WHERE e.course_id = ANY($1)
            ORDER BY s.id
            "#,
        )
        .bind(&ids[..])
        .fetch_all(&self.pool)
        .await?;

        let mut by_course: HashMap<CourseId, Vec<StudentSummary>> = HashMap::new();
        for link in links {
            by_course
                .entry(link.get("course_id"))
                .or_default()
                .push(StudentSummary {
                    id: link.get("id"),
                    name: link.get("name"),
                    email: link.get("email"),
                });
        }

        Ok(courses
            .into_iter()
            .map(|(id, name)| Course {
                students: by_course.remove(&id).unwrap_or_default(),
                id,
                name,
            })
            .collect())
    }
}

#[async_trait]
impl CourseRepository for PgCourseRepo {
    async fn find_all(&self) -> Result<Vec<Course>, DbError> {
        let rows: Vec<(CourseId, String)> =
            sqlx::query_as("SELECT id, name FROM courses ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        self.attach_students(rows).await
    }

    async fn find_by_id(&self, id: CourseId) -> Result<Course, DbError> {
        let row: (CourseId, String) = sqlx::query_as("SELECT id, name FROM courses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::course(id))?;

        self.attach_students(vec![row])
            .await?
            .pop()
            .ok_or_else(|| DbError::course(id))
    }

    async fn save(&self, name: &CourseName) -> Result<Course, DbError> {
        let (id, name): (CourseId, String) =
            sqlx::query_as("INSERT INTO courses (name) VALUES ($1) RETURNING id, name")
                .bind(name.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(Course {
            id,
            name,
            students: Vec::new(),
        })
    }

    async fn delete_by_id(&self, id: CourseId) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        // Enrollments first, then the course
        sqlx::query("DELETE FROM enrollments WHERE course_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(DbError::course(id));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn count_students_per_course(&self) -> Result<Vec<CourseStudentCount>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT
                c.id,
                c.name,
                COUNT(DISTINCT e.student_id) AS student_count
            FROM courses c
            LEFT JOIN enrollments e ON e.course_id = c.id
            GROUP BY c.id, c.name
            ORDER BY c.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| CourseStudentCount {
                course_id: r.get("id"),
                course_name: r.get("name"),
                student_count: r.get("student_count"),
            })
            .collect())
    }
}

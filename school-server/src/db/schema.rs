//! Table bootstrap for the school schema
//!
//! Creates tables that don't exist yet; never alters existing ones.

use sqlx::PgPool;

/// Create the students, courses, and enrollments tables if missing.
pub async fn bootstrap(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Bootstrapping school schema...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS students (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL CHECK (length(btrim(name)) > 0),
            email TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS courses (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL CHECK (length(btrim(name)) > 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // One row per (student, course) pair; either side going away takes the row with it
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS enrollments (
            student_id BIGINT NOT NULL REFERENCES students(id) ON DELETE CASCADE,
            course_id BIGINT NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
            PRIMARY KEY (student_id, course_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_enrollments_course ON enrollments(course_id)")
        .execute(pool)
        .await?;

    tracing::info!("School schema ready");
    Ok(())
}

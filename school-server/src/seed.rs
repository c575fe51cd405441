//! Fixture roster for demos and local development

use tracing::{info, warn};

use crate::error::Result;
use crate::models::{NewStudent, PageRequest};
use crate::state::AppState;

const COURSES: &[&str] = &[
    "Data Science",
    "JavaScript",
    "Node.js",
    "Java Back End",
    "Mobile IOS",
    "Mobile Android",
];

/// (name, email, indexes into COURSES)
const STUDENTS: &[(&str, &str, &[usize])] = &[
    ("John", "john@school.local", &[0, 3]),
    ("Julian", "julian@school.local", &[1]),
    ("Mary", "mary@school.local", &[0, 2, 5]),
];

/// What a seed run inserted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub courses: usize,
    pub students: usize,
    pub enrollments: usize,
}

/// Load the fixture roster into an empty datastore.
///
/// Returns `None` without writing anything if any student or course exists.
pub async fn load_fixtures(state: &AppState) -> Result<Option<SeedReport>> {
    let existing_students = state.students.find_all(PageRequest::new(0, 1)).await?.total;
    let existing_courses = state.courses.find_all().await?.len();
    if existing_students > 0 || existing_courses > 0 {
        warn!(
            students = existing_students,
            courses = existing_courses,
            "datastore not empty, skipping seed"
        );
        return Ok(None);
    }

    let mut course_ids = Vec::with_capacity(COURSES.len());
    for name in COURSES {
        course_ids.push(state.courses.create(name).await?.id);
    }

    let mut enrollments = 0;
    for (name, email, picks) in STUDENTS {
        let student = state
            .students
            .save(NewStudent::named(name).with_email(email))
            .await?;
        for &pick in picks.iter() {
            state.students.enroll(student.id, course_ids[pick]).await?;
            enrollments += 1;
        }
    }

    let report = SeedReport {
        courses: COURSES.len(),
        students: STUDENTS.len(),
        enrollments,
    };
    info!(?report, "seed complete");
    Ok(Some(report))
}

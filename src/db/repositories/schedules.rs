use anyhow::{Context, Result};
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    helpers::{parse_datetime, to_i64, to_u64},
    models::StudentSchedule,
};
use crate::schedule::{Day, WeeklyPayload};

const SCHEDULE_COLUMNS: &str =
    "course, student_email, student_name, sun, mon, tue, wed, thu, fri, sat, updated_at";

fn row_to_schedule(row: &Row) -> Result<StudentSchedule> {
    let mut days = [0u64; 7];
    for day in Day::ALL {
        let column = day.as_str().to_ascii_lowercase();
        let value: i64 = row.get(column.as_str())?;
        days[day.index()] = to_u64(value, &column)?;
    }
    let updated_at: String = row.get("updated_at")?;

    Ok(StudentSchedule {
        course: row.get("course")?,
        email: row.get("student_email")?,
        name: row.get("student_name")?,
        availability: WeeklyPayload::from_days(days),
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

impl Database {
    /// Insert or replace a student's week for a course.
    pub async fn upsert_schedule(&self, schedule: &StudentSchedule) -> Result<()> {
        let record = schedule.clone();
        self.execute(move |conn| {
            let days = record.availability.to_days();
            conn.execute(
                "INSERT INTO schedules (course, student_email, student_name, sun, mon, tue, wed, thu, fri, sat, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                 ON CONFLICT(course, student_email) DO UPDATE SET
                     student_name = excluded.student_name,
                     sun = excluded.sun,
                     mon = excluded.mon,
                     tue = excluded.tue,
                     wed = excluded.wed,
                     thu = excluded.thu,
                     fri = excluded.fri,
                     sat = excluded.sat,
                     updated_at = excluded.updated_at",
                params![
                    record.course,
                    record.email,
                    record.name,
                    to_i64(days[0])?,
                    to_i64(days[1])?,
                    to_i64(days[2])?,
                    to_i64(days[3])?,
                    to_i64(days[4])?,
                    to_i64(days[5])?,
                    to_i64(days[6])?,
                    record.updated_at.to_rfc3339(),
                ],
            )
            .with_context(|| "failed to upsert schedule")?;
            Ok(())
        })
        .await
    }

    pub async fn get_schedule(&self, course: &str, email: &str) -> Result<Option<StudentSchedule>> {
        let course = course.to_string();
        let email = email.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SCHEDULE_COLUMNS} FROM schedules
                 WHERE course = ?1 AND student_email = ?2"
            ))?;
            let mut rows = stmt.query(params![course, email])?;
            let schedule = match rows.next()? {
                Some(row) => Some(row_to_schedule(row)?),
                None => None,
            };
            Ok(schedule)
        })
        .await
    }

    /// Courses with at least one saved schedule.
    pub async fn list_courses(&self) -> Result<Vec<String>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT course FROM schedules
                 GROUP BY course
                 HAVING COUNT(*) > 0
                 ORDER BY course ASC",
            )?;
            let courses = stmt
                .query_map([], |row| row.get(0))?
                .collect::<Result<Vec<String>, _>>()?;
            Ok(courses)
        })
        .await
    }

    /// Everyone in a course, ordered by name.
    pub async fn list_students(&self, course: &str) -> Result<Vec<StudentSchedule>> {
        let course = course.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SCHEDULE_COLUMNS} FROM schedules
                 WHERE course = ?1
                 ORDER BY student_name ASC, student_email ASC"
            ))?;
            let mut rows = stmt.query(params![course])?;
            let mut schedules = Vec::new();
            while let Some(row) = rows.next()? {
                schedules.push(row_to_schedule(row)?);
            }
            Ok(schedules)
        })
        .await
    }

    /// Returns whether a row was removed.
    pub async fn delete_schedule(&self, course: &str, email: &str) -> Result<bool> {
        let course = course.to_string();
        let email = email.to_string();
        self.execute(move |conn| {
            let removed = conn
                .execute(
                    "DELETE FROM schedules WHERE course = ?1 AND student_email = ?2",
                    params![course, email],
                )
                .with_context(|| "failed to delete schedule")?;
            Ok(removed > 0)
        })
        .await
    }

    pub async fn count_students(&self, course: &str) -> Result<usize> {
        let course = course.to_string();
        self.execute(move |conn| {
            let count = conn
                .query_row(
                    "SELECT COUNT(*) FROM schedules WHERE course = ?1",
                    params![course],
                    |row| row.get::<_, usize>(0),
                )
                .with_context(|| "failed to count students")?;
            Ok(count)
        })
        .await
    }
}

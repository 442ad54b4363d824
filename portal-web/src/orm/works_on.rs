//! Hours bookkeeping for the `works_on` table.
//!
//! Hours for an (employee, project) pair only ever accumulate. The ceiling
//! (999.9) is a CHECK constraint on the column; this module does not
//! re-check it, it only translates the database's refusal.

use diesel::prelude::*;
use diesel::sql_types::{Double, Integer, Text};
use diesel::sqlite::SqliteConnection;

use crate::error::{PortalError, PortalResult};
use crate::models::WorksOn;
use crate::schema::works_on;

/// Largest value the hours column accepts. Used for user-facing messages only.
pub const MAX_HOURS: f64 = 999.9;

/// Adds `hours` to the (employee, project) pair, creating the row if needed.
///
/// A single upsert statement runs inside a transaction. Values are rounded
/// to one decimal place, matching a NUMERIC(4,1) column. If the new total
/// would break the ceiling the statement fails with
/// [`PortalError::CheckViolation`] and the existing row is left unchanged.
pub fn add_hours(
    conn: &mut SqliteConnection,
    employee_ssn: &str,
    project_number: i32,
    hours: f64,
) -> PortalResult<()> {
    conn.transaction::<_, diesel::result::Error, _>(|c| {
        diesel::sql_query(
            r#"
            INSERT INTO works_on (essn, pno, hours)
            VALUES (?, ?, ROUND(?, 1))
            ON CONFLICT (essn, pno)
            DO UPDATE SET hours = ROUND(works_on.hours + excluded.hours, 1)
            "#,
        )
        .bind::<Text, _>(employee_ssn)
        .bind::<Integer, _>(project_number)
        .bind::<Double, _>(hours)
        .execute(c)?;
        Ok(())
    })
    .map_err(PortalError::from)
}

pub fn get_works_on(
    conn: &mut SqliteConnection,
    employee_ssn: &str,
    project_number: i32,
) -> Result<Option<WorksOn>, diesel::result::Error> {
    works_on::table
        .find((employee_ssn, project_number))
        .select(WorksOn::as_select())
        .first(conn)
        .optional()
}

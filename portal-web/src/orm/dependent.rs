use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::error::{PortalError, PortalResult};
use crate::models::NewDependent;
use crate::schema::dependent;

/// Dependents are not managed through the portal; rows arrive from data loads.
pub fn insert_dependent(conn: &mut SqliteConnection, new_dependent: &NewDependent) -> PortalResult<()> {
    diesel::insert_into(dependent::table)
        .values(new_dependent)
        .execute(conn)
        .map(|_| ())
        .map_err(PortalError::from)
}

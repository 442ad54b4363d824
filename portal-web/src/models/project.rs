use diesel::prelude::*;
use serde::Serialize;

use crate::schema::project;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize)]
#[diesel(table_name = project)]
#[diesel(primary_key(pnumber))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Project {
    pub pnumber: i32,
    pub pname: String,
    pub dnum: i32,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = project)]
pub struct NewProject {
    pub pnumber: i32,
    pub pname: String,
    pub dnum: i32,
}

use diesel::prelude::*;
use serde::Serialize;

use crate::schema::department;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize)]
#[diesel(table_name = department)]
#[diesel(primary_key(dnumber))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Department {
    pub dnumber: i32,
    pub dname: String,
    pub mgr_ssn: Option<String>,
}

#[derive(Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = department)]
pub struct NewDepartment {
    pub dnumber: i32,
    pub dname: String,
    pub mgr_ssn: Option<String>,
}

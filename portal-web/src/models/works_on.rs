use diesel::prelude::*;
use serde::Serialize;

use crate::schema::works_on;

#[derive(Queryable, Selectable, Debug, Clone, PartialEq, Serialize)]
#[diesel(table_name = works_on)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WorksOn {
    pub essn: String,
    pub pno: i32,
    pub hours: f64,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = works_on)]
pub struct NewWorksOn {
    pub essn: String,
    pub pno: i32,
    pub hours: f64,
}

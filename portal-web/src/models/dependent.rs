use chrono::NaiveDate;
use diesel::prelude::*;

use crate::schema::dependent;

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = dependent)]
pub struct NewDependent {
    pub essn: String,
    pub dependent_name: String,
    pub sex: Option<String>,
    pub bdate: Option<NaiveDate>,
    pub relationship: Option<String>,
}

use chrono::NaiveDate;
use diesel::prelude::*;
use serde::Serialize;

use crate::schema::employee;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize)]
#[diesel(table_name = employee)]
#[diesel(primary_key(ssn))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Employee {
    pub ssn: String,
    pub fname: String,
    pub minit: Option<String>,
    pub lname: String,
    pub address: String,
    pub salary: f64,
    pub sex: Option<String>,
    pub dno: i32,
    pub super_ssn: Option<String>,
    pub bdate: Option<NaiveDate>,
    pub empdate: Option<NaiveDate>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        full_name(&self.fname, self.minit.as_deref(), &self.lname)
    }
}

/// Formats "First M. Last", dropping the initial when it is missing.
pub fn full_name(fname: &str, minit: Option<&str>, lname: &str) -> String {
    match minit.map(str::trim).filter(|m| !m.is_empty()) {
        Some(m) => format!("{} {}. {}", fname, m, lname),
        None => format!("{} {}", fname, lname),
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = employee)]
pub struct NewEmployee {
    pub ssn: String,
    pub fname: String,
    pub minit: Option<String>,
    pub lname: String,
    pub address: String,
    pub salary: f64,
    pub sex: Option<String>,
    pub dno: i32,
    pub super_ssn: Option<String>,
    pub bdate: Option<NaiveDate>,
    pub empdate: Option<NaiveDate>,
}

/// The mutable part of an employee record. The SSN never changes.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = employee)]
pub struct EmployeeUpdate {
    pub address: String,
    pub salary: f64,
    pub dno: i32,
}

/// One entry of the name-sorted employee dropdown.
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeChoice {
    pub ssn: String,
    pub full_name: String,
}

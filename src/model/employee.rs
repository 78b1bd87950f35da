use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::any::AnyRow;
use sqlx::{FromRow, Row};
use utoipa::ToSchema;

use super::{get_enum, get_opt, get_opt_date, get_timestamp};
use crate::model::employment_record::{EmploymentRecord, active_record_of};
use crate::model::role::Role;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[schema(
    example = json!({
        "id": "0c6f3a52-7b0e-4bb8-8f0e-1f1e3f0a9b42",
        "user_id": "9a1e5d0b-3c44-4f1b-a6a2-6de0b7f1c8d3",
        "first_name": "Jane",
        "last_name": "Doe",
        "ni_number": "QQ123456C",
        "date_of_birth": "1990-04-12",
        "address_line1": "1 High Street",
        "address_line2": null,
        "city": "Leeds",
        "postcode": "LS1 1AA",
        "emergency_contact_name": "John Doe",
        "emergency_contact_phone": "+447700900123",
        "created_at": "2026-01-05T09:00:00Z",
        "updated_at": "2026-01-05T09:00:00Z"
    })
)]
pub struct Employee {
    pub id: String,
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub ni_number: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub date_of_birth: Option<NaiveDate>,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub postcode: String,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTime<Utc>,
}

impl FromRow<'_, AnyRow> for Employee {
    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            ni_number: get_opt(row, "ni_number")?,
            date_of_birth: get_opt_date(row, "date_of_birth")?,
            address_line1: row.try_get("address_line1")?,
            address_line2: get_opt(row, "address_line2")?,
            city: row.try_get("city")?,
            postcode: row.try_get("postcode")?,
            emergency_contact_name: get_opt(row, "emergency_contact_name")?,
            emergency_contact_phone: get_opt(row, "emergency_contact_phone")?,
            created_at: get_timestamp(row, "created_at")?,
            updated_at: get_timestamp(row, "updated_at")?,
        })
    }
}

/// An employee together with the owning login and the full assignment history,
/// most recent first.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EmployeeProfile {
    #[serde(flatten)]
    pub employee: Employee,
    pub email: String,
    pub role: Role,
    pub records: Vec<EmploymentRecord>,
}

impl EmployeeProfile {
    pub fn active_record(&self) -> Option<&EmploymentRecord> {
        active_record_of(&self.records)
    }
}

/// Row shape of the employees ⋈ users join; history is attached afterwards.
pub(crate) struct ProfileRow {
    pub employee: Employee,
    pub email: String,
    pub role: Role,
}

impl FromRow<'_, AnyRow> for ProfileRow {
    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            employee: Employee::from_row(row)?,
            email: row.try_get("email")?,
            role: get_enum(row, "role")?,
        })
    }
}

impl ProfileRow {
    pub fn with_records(self, records: Vec<EmploymentRecord>) -> EmployeeProfile {
        EmployeeProfile {
            employee: self.employee,
            email: self.email,
            role: self.role,
            records,
        }
    }
}

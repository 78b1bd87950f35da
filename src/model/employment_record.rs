use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::any::AnyRow;
use sqlx::{FromRow, Row};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use super::{get_enum, get_opt_timestamp, get_timestamp};
use crate::model::department::Department;

#[derive(
    Debug, Copy, Clone, Default, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PayBasis {
    #[default]
    AnnualSalary,
    Hourly,
}

/// One time-bounded job assignment. Rows are append-only; the only mutation
/// ever applied is setting `end_date` when a newer assignment replaces it.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[schema(
    example = json!({
        "id": "5b0d3c7e-1f5a-4a4e-9a51-3f7c0f2d6a11",
        "employee_id": "0c6f3a52-7b0e-4bb8-8f0e-1f1e3f0a9b42",
        "revision": 2,
        "job_title": "Senior Analyst",
        "department": "FINANCE",
        "pay_amount": 36000.0,
        "pay_basis": "ANNUAL_SALARY",
        "hours_per_week": 37.5,
        "start_date": "2026-03-01T09:00:00Z",
        "end_date": null,
        "change_reason": "Promotion"
    })
)]
pub struct EmploymentRecord {
    pub id: String,
    pub employee_id: String,
    /// Per-employee sequence number, unique with `employee_id`.
    pub revision: i64,
    pub job_title: String,
    pub department: Department,
    pub pay_amount: f64,
    pub pay_basis: PayBasis,
    pub hours_per_week: f64,
    #[schema(value_type = String, format = DateTime)]
    pub start_date: DateTime<Utc>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub end_date: Option<DateTime<Utc>>,
    pub change_reason: String,
}

impl EmploymentRecord {
    pub fn is_active(&self) -> bool {
        self.end_date.is_none()
    }
}

impl FromRow<'_, AnyRow> for EmploymentRecord {
    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            employee_id: row.try_get("employee_id")?,
            revision: row.try_get("revision")?,
            job_title: row.try_get("job_title")?,
            department: get_enum(row, "department")?,
            pay_amount: row.try_get("pay_amount")?,
            pay_basis: get_enum(row, "pay_basis")?,
            hours_per_week: row.try_get("hours_per_week")?,
            start_date: get_timestamp(row, "start_date")?,
            end_date: get_opt_timestamp(row, "end_date")?,
            change_reason: row.try_get("change_reason")?,
        })
    }
}

/// The assignment currently in effect: the record with no end date.
///
/// History is ordered most recent first, but position is never trusted;
/// legacy rows can put a closed record at the front.
pub fn active_record_of(records: &[EmploymentRecord]) -> Option<&EmploymentRecord> {
    records.iter().find(|r| r.is_active())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(revision: i64, end_date: Option<DateTime<Utc>>) -> EmploymentRecord {
        EmploymentRecord {
            id: format!("rec-{revision}"),
            employee_id: "emp".into(),
            revision,
            job_title: "Analyst".into(),
            department: Department::Finance,
            pay_amount: 30000.0,
            pay_basis: PayBasis::AnnualSalary,
            hours_per_week: 37.5,
            start_date: Utc::now(),
            end_date,
            change_reason: "Initial Hire".into(),
        }
    }

    #[test]
    fn active_record_is_found_by_end_date_not_position() {
        let closed = record(3, Some(Utc::now() + Duration::days(1)));
        let open = record(2, None);
        let records = vec![closed, open.clone()];

        assert_eq!(active_record_of(&records), Some(&open));
    }

    #[test]
    fn no_active_record_in_empty_or_closed_history() {
        assert!(active_record_of(&[]).is_none());
        assert!(active_record_of(&[record(1, Some(Utc::now()))]).is_none());
    }
}

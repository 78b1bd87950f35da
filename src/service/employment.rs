//! Personal-data edits and versioned employment changes.
//!
//! A change to job title, department or pay never edits a record in place:
//! the active record is closed and a new one opened at the same instant,
//! inside the transaction that also applies the personal edit.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use sqlx::{AnyConnection, AnyPool};
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::error::{DbResultExt, ServiceError};
use crate::model::department::Department;
use crate::model::employee::EmployeeProfile;
use crate::model::employment_record::{EmploymentRecord, PayBasis};
use crate::service::directory::{RECORD_COLUMNS, fetch_profile};
use crate::service::validation;
use crate::utils::db_utils::{new_id, non_blank, now, to_millis};

pub const DEFAULT_JOB_TITLE: &str = "Unassigned";
pub const DEFAULT_HOURS_PER_WEEK: f64 = 37.5;
pub const DEFAULT_CHANGE_REASON: &str = "Employment Update";

const UPDATE_FAILED: &str = "Failed to update employee";

/// Body of `PUT /employees/{id}`. Every field is optional.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct UpdateEmployeeRequest {
    #[schema(example = "Jane")]
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub ni_number: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub date_of_birth: Option<NaiveDate>,
    #[schema(example = "2 Park Row")]
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub postcode: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,

    #[schema(example = "Senior Analyst")]
    pub job_title: Option<String>,
    pub department: Option<Department>,
    #[schema(example = 36000.0)]
    pub pay_amount: Option<f64>,
    pub pay_basis: Option<PayBasis>,
    pub hours_per_week: Option<f64>,
    #[schema(example = "Promotion")]
    pub change_reason: Option<String>,
}

/// Field-level overwrite of an employee's own details. Never versioned.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PersonalUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub ni_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub postcode: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
}

impl PersonalUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A new job assignment. Fields left `None` carry over from the record being
/// replaced, or fall back to hire defaults when there is none.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EmploymentChange {
    pub job_title: Option<String>,
    pub department: Option<Department>,
    pub pay_amount: Option<f64>,
    pub pay_basis: Option<PayBasis>,
    pub hours_per_week: Option<f64>,
    pub change_reason: Option<String>,
}

impl EmploymentChange {
    pub(crate) fn validate(&self) -> Result<(), ServiceError> {
        if let Some(amount) = self.pay_amount {
            validation::pay_amount(amount)?;
        }
        if let Some(hours) = self.hours_per_week {
            validation::hours_per_week(hours)?;
        }
        Ok(())
    }

    pub(crate) fn into_record(
        self,
        employee_id: &str,
        revision: i64,
        previous: Option<&EmploymentRecord>,
        start_date: DateTime<Utc>,
        default_reason: &str,
    ) -> EmploymentRecord {
        EmploymentRecord {
            id: new_id(),
            employee_id: employee_id.to_string(),
            revision,
            job_title: self
                .job_title
                .or_else(|| previous.map(|r| r.job_title.clone()))
                .unwrap_or_else(|| DEFAULT_JOB_TITLE.to_string()),
            department: self
                .department
                .or(previous.map(|r| r.department))
                .unwrap_or_default(),
            pay_amount: self
                .pay_amount
                .or(previous.map(|r| r.pay_amount))
                .unwrap_or(0.0),
            pay_basis: self
                .pay_basis
                .or(previous.map(|r| r.pay_basis))
                .unwrap_or_default(),
            hours_per_week: self
                .hours_per_week
                .or(previous.map(|r| r.hours_per_week))
                .unwrap_or(DEFAULT_HOURS_PER_WEEK),
            start_date,
            end_date: None,
            change_reason: self
                .change_reason
                .unwrap_or_else(|| default_reason.to_string()),
        }
    }
}

/// What one update does: always the personal part, and a new assignment only
/// when `employment` is present.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EmployeeUpdate {
    pub personal: PersonalUpdate,
    pub employment: Option<EmploymentChange>,
}

impl TryFrom<UpdateEmployeeRequest> for EmployeeUpdate {
    type Error = ServiceError;

    /// The only place that decides whether a request versions history:
    /// it does when job title, department or pay amount is supplied.
    fn try_from(req: UpdateEmployeeRequest) -> Result<Self, Self::Error> {
        let personal = PersonalUpdate {
            first_name: validation::required_text("first_name", req.first_name)?,
            last_name: validation::required_text("last_name", req.last_name)?,
            ni_number: non_blank(req.ni_number)
                .map(|ni| validation::ni_number(&ni))
                .transpose()?,
            date_of_birth: req.date_of_birth,
            address_line1: validation::required_text("address_line1", req.address_line1)?,
            address_line2: non_blank(req.address_line2),
            city: validation::required_text("city", req.city)?,
            postcode: validation::required_text("postcode", req.postcode)?,
            emergency_contact_name: non_blank(req.emergency_contact_name),
            emergency_contact_phone: non_blank(req.emergency_contact_phone),
        };

        let job_title = validation::required_text("job_title", req.job_title)?;
        let versioned = job_title.is_some() || req.department.is_some() || req.pay_amount.is_some();

        let employment = if versioned {
            let change = EmploymentChange {
                job_title,
                department: req.department,
                pay_amount: req.pay_amount,
                pay_basis: req.pay_basis,
                hours_per_week: req.hours_per_week,
                change_reason: non_blank(req.change_reason),
            };
            change.validate()?;
            Some(change)
        } else if req.pay_basis.is_some()
            || req.hours_per_week.is_some()
            || non_blank(req.change_reason).is_some()
        {
            return Err(ServiceError::validation(
                "pay_basis, hours_per_week and change_reason need job_title, department or pay_amount",
            ));
        } else {
            None
        };

        if personal.is_empty() && employment.is_none() {
            return Err(ServiceError::validation("No fields provided for update"));
        }

        Ok(Self {
            personal,
            employment,
        })
    }
}

pub(crate) async fn insert_record(
    conn: &mut AnyConnection,
    record: &EmploymentRecord,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO employment_records
        (id, employee_id, revision, job_title, department, pay_amount,
         pay_basis, hours_per_week, start_date, end_date, change_reason)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(record.id.as_str())
    .bind(record.employee_id.as_str())
    .bind(record.revision)
    .bind(record.job_title.as_str())
    .bind(record.department.to_string())
    .bind(record.pay_amount)
    .bind(record.pay_basis.to_string())
    .bind(record.hours_per_week)
    .bind(to_millis(record.start_date))
    .bind(record.end_date.map(to_millis))
    .bind(record.change_reason.as_str())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn active_record_in(
    conn: &mut AnyConnection,
    employee_id: &str,
) -> Result<Option<EmploymentRecord>, sqlx::Error> {
    let sql = format!(
        "SELECT {RECORD_COLUMNS} FROM employment_records \
         WHERE employee_id = ? AND end_date IS NULL \
         ORDER BY start_date DESC, revision DESC LIMIT 1"
    );
    sqlx::query_as::<_, EmploymentRecord>(&sql)
        .bind(employee_id)
        .fetch_optional(&mut *conn)
        .await
}

async fn apply_personal(
    conn: &mut AnyConnection,
    employee_id: &str,
    personal: &PersonalUpdate,
    now: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE employees SET
            first_name = COALESCE(?, first_name),
            last_name = COALESCE(?, last_name),
            ni_number = COALESCE(?, ni_number),
            date_of_birth = COALESCE(?, date_of_birth),
            address_line1 = COALESCE(?, address_line1),
            address_line2 = COALESCE(?, address_line2),
            city = COALESCE(?, city),
            postcode = COALESCE(?, postcode),
            emergency_contact_name = COALESCE(?, emergency_contact_name),
            emergency_contact_phone = COALESCE(?, emergency_contact_phone),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(personal.first_name.clone())
    .bind(personal.last_name.clone())
    .bind(personal.ni_number.clone())
    .bind(personal.date_of_birth.map(|d| d.format("%Y-%m-%d").to_string()))
    .bind(personal.address_line1.clone())
    .bind(personal.address_line2.clone())
    .bind(personal.city.clone())
    .bind(personal.postcode.clone())
    .bind(personal.emergency_contact_name.clone())
    .bind(personal.emergency_contact_phone.clone())
    .bind(to_millis(now))
    .bind(employee_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Closes whatever is open for the employee and appends the replacement.
///
/// Closing every open row, not just the newest, heals histories that
/// already hold more than one.
async fn version(
    conn: &mut AnyConnection,
    employee_id: &str,
    change: EmploymentChange,
    now: DateTime<Utc>,
) -> Result<EmploymentRecord, sqlx::Error> {
    let previous = active_record_in(conn, employee_id).await?;

    let revision = sqlx::query_scalar::<_, i64>(
        "SELECT COALESCE(MAX(revision), 0) + 1 FROM employment_records WHERE employee_id = ?",
    )
    .bind(employee_id)
    .fetch_one(&mut *conn)
    .await?;

    let closed = sqlx::query(
        "UPDATE employment_records SET end_date = ? WHERE employee_id = ? AND end_date IS NULL",
    )
    .bind(to_millis(now))
    .bind(employee_id)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    let record = change.into_record(
        employee_id,
        revision,
        previous.as_ref(),
        now,
        DEFAULT_CHANGE_REASON,
    );
    insert_record(conn, &record).await?;

    debug!(employee_id, closed, revision, "Employment record versioned");
    Ok(record)
}

/// Applies `update` to the employee in a single transaction and returns the
/// resulting profile as seen by that transaction.
pub async fn update_employee(
    pool: &AnyPool,
    employee_id: &str,
    update: EmployeeUpdate,
) -> Result<EmployeeProfile, ServiceError> {
    let now = now();
    let mut tx = pool.begin().await.or_tx_failure(UPDATE_FAILED)?;

    let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees WHERE id = ?")
        .bind(employee_id)
        .fetch_one(&mut *tx)
        .await
        .or_tx_failure(UPDATE_FAILED)?;
    if exists == 0 {
        return Err(ServiceError::not_found("Employee not found"));
    }

    apply_personal(&mut tx, employee_id, &update.personal, now)
        .await
        .or_tx_failure(UPDATE_FAILED)?;

    if let Some(change) = update.employment {
        let record = version(&mut tx, employee_id, change, now)
            .await
            .or_tx_failure(UPDATE_FAILED)?;
        info!(
            employee_id,
            revision = record.revision,
            job_title = %record.job_title,
            department = %record.department,
            "Employment changed"
        );
    }

    let profile = fetch_profile(&mut tx, employee_id)
        .await
        .or_tx_failure(UPDATE_FAILED)?
        .ok_or_else(|| ServiceError::not_found("Employee not found"))?;

    tx.commit().await.or_tx_failure(UPDATE_FAILED)?;
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn personal_only_request_does_not_version() {
        let update = EmployeeUpdate::try_from(UpdateEmployeeRequest {
            address_line1: Some("2 Park Row".into()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(update.personal.address_line1.as_deref(), Some("2 Park Row"));
        assert!(update.employment.is_none());
    }

    #[test]
    fn any_job_field_versions() {
        for req in [
            UpdateEmployeeRequest {
                job_title: Some("Senior Analyst".into()),
                ..Default::default()
            },
            UpdateEmployeeRequest {
                department: Some(Department::Sales),
                ..Default::default()
            },
            UpdateEmployeeRequest {
                pay_amount: Some(31000.0),
                ..Default::default()
            },
        ] {
            let update = EmployeeUpdate::try_from(req).unwrap();
            assert!(update.personal.is_empty());
            assert!(update.employment.is_some());
        }
    }

    #[test]
    fn hours_alone_is_rejected_rather_than_ignored() {
        let err = EmployeeUpdate::try_from(UpdateEmployeeRequest {
            hours_per_week: Some(30.0),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err.code(), "VALIDATION");
    }

    #[test]
    fn empty_request_is_rejected() {
        let err = EmployeeUpdate::try_from(UpdateEmployeeRequest::default()).unwrap_err();
        assert_eq!(err, ServiceError::validation("No fields provided for update"));
    }

    #[test]
    fn negative_pay_is_rejected() {
        let err = EmployeeUpdate::try_from(UpdateEmployeeRequest {
            pay_amount: Some(-5.0),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err.code(), "VALIDATION");
    }

    #[test]
    fn unspecified_fields_carry_forward() {
        let previous = EmploymentChange {
            job_title: Some("Analyst".into()),
            department: Some(Department::Finance),
            pay_amount: Some(30000.0),
            pay_basis: Some(PayBasis::AnnualSalary),
            hours_per_week: Some(30.0),
            change_reason: None,
        }
        .into_record("emp", 1, None, Utc::now(), "Initial Hire");

        let next = EmploymentChange {
            job_title: Some("Senior Analyst".into()),
            ..Default::default()
        }
        .into_record("emp", 2, Some(&previous), Utc::now(), DEFAULT_CHANGE_REASON);

        assert_eq!(next.job_title, "Senior Analyst");
        assert_eq!(next.department, Department::Finance);
        assert_eq!(next.pay_amount, 30000.0);
        assert_eq!(next.hours_per_week, 30.0);
        assert_eq!(next.change_reason, DEFAULT_CHANGE_REASON);
        assert!(next.is_active());
    }

    #[test]
    fn defaults_apply_without_a_previous_record() {
        let record = EmploymentChange::default().into_record("emp", 1, None, Utc::now(), "Initial Hire");

        assert_eq!(record.job_title, DEFAULT_JOB_TITLE);
        assert_eq!(record.department, Department::Unassigned);
        assert_eq!(record.pay_amount, 0.0);
        assert_eq!(record.pay_basis, PayBasis::AnnualSalary);
        assert_eq!(record.hours_per_week, DEFAULT_HOURS_PER_WEEK);
        assert_eq!(record.change_reason, "Initial Hire");
    }
}

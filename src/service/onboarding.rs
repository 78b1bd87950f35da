//! Creating a login, its employee profile and the first assignment as one unit.

use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::{AnyConnection, AnyPool};
use tracing::{error, info, instrument};
use utoipa::ToSchema;

use crate::auth::password::hash_password;
use crate::error::{DbResultExt, ServiceError};
use crate::model::department::Department;
use crate::model::employee::{Employee, EmployeeProfile};
use crate::model::employment_record::PayBasis;
use crate::model::role::Role;
use crate::model::user::User;
use crate::service::accounts::{email_in_use, insert_user};
use crate::service::employment::{EmploymentChange, insert_record};
use crate::service::validation;
use crate::utils::db_utils::{new_id, non_blank, normalize_email, now, to_millis};

pub const INITIAL_HIRE: &str = "Initial Hire";
pub const PENDING_ADDRESS: &str = "Pending Address";
pub const PENDING_CITY: &str = "Pending City";
pub const PENDING_POSTCODE: &str = "Pending";

const ONBOARD_FAILED: &str = "System error during registration";

/// Everything needed to bring a new starter onto the system.
#[derive(Clone, Default, Deserialize, ToSchema)]
pub struct OnboardEmployee {
    #[schema(example = "jane.doe@company.co.uk")]
    pub email: String,
    #[schema(example = "correct-horse-battery")]
    pub password: String,
    /// Defaults to EMPLOYEE
    pub role: Option<Role>,

    #[schema(example = "Jane")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
    #[schema(example = "QQ123456C")]
    pub ni_number: Option<String>,
    #[schema(value_type = Option<String>, format = Date, example = "1990-04-12")]
    pub date_of_birth: Option<NaiveDate>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub postcode: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,

    #[schema(example = "Analyst")]
    pub job_title: Option<String>,
    pub department: Option<Department>,
    #[schema(example = 30000.0)]
    pub pay_amount: Option<f64>,
    pub pay_basis: Option<PayBasis>,
    #[schema(example = 37.5)]
    pub hours_per_week: Option<f64>,
}

async fn insert_employee(conn: &mut AnyConnection, employee: &Employee) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO employees
        (id, user_id, first_name, last_name, ni_number, date_of_birth,
         address_line1, address_line2, city, postcode,
         emergency_contact_name, emergency_contact_phone, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(employee.id.as_str())
    .bind(employee.user_id.as_str())
    .bind(employee.first_name.as_str())
    .bind(employee.last_name.as_str())
    .bind(employee.ni_number.clone())
    .bind(employee.date_of_birth.map(|d| d.format("%Y-%m-%d").to_string()))
    .bind(employee.address_line1.as_str())
    .bind(employee.address_line2.clone())
    .bind(employee.city.as_str())
    .bind(employee.postcode.as_str())
    .bind(employee.emergency_contact_name.clone())
    .bind(employee.emergency_contact_phone.clone())
    .bind(to_millis(employee.created_at))
    .bind(to_millis(employee.updated_at))
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Creates the user, the employee and an open "Initial Hire" record, or
/// nothing at all.
#[instrument(name = "onboard", skip(pool, input), fields(email = %normalize_email(&input.email)))]
pub async fn onboard(pool: &AnyPool, input: OnboardEmployee) -> Result<EmployeeProfile, ServiceError> {
    let email = normalize_email(&input.email);
    validation::email(&email)?;
    validation::password(&input.password)?;
    let first_name = validation::non_empty("first_name", input.first_name)?;
    let last_name = validation::non_empty("last_name", input.last_name)?;
    let ni_number = non_blank(input.ni_number)
        .map(|ni| validation::ni_number(&ni))
        .transpose()?;

    let assignment = EmploymentChange {
        job_title: non_blank(input.job_title),
        department: input.department,
        pay_amount: input.pay_amount,
        pay_basis: input.pay_basis,
        hours_per_week: input.hours_per_week,
        change_reason: None,
    };
    assignment.validate()?;

    if email_in_use(pool, &email).await.or_tx_failure(ONBOARD_FAILED)? {
        return Err(ServiceError::Conflict("This email is already in use.".into()));
    }

    let password_hash = hash_password(&input.password).map_err(|e| {
        error!(error = %e, "Password hashing failed");
        ServiceError::internal(ONBOARD_FAILED)
    })?;

    let now = now();
    let user = User {
        id: new_id(),
        email,
        password_hash,
        role: input.role.unwrap_or_default(),
        created_at: now,
    };
    let employee = Employee {
        id: new_id(),
        user_id: user.id.clone(),
        first_name,
        last_name,
        ni_number,
        date_of_birth: input.date_of_birth,
        address_line1: non_blank(input.address_line1).unwrap_or_else(|| PENDING_ADDRESS.into()),
        address_line2: non_blank(input.address_line2),
        city: non_blank(input.city).unwrap_or_else(|| PENDING_CITY.into()),
        postcode: non_blank(input.postcode).unwrap_or_else(|| PENDING_POSTCODE.into()),
        emergency_contact_name: non_blank(input.emergency_contact_name),
        emergency_contact_phone: non_blank(input.emergency_contact_phone),
        created_at: now,
        updated_at: now,
    };
    let record = assignment.into_record(&employee.id, 1, None, now, INITIAL_HIRE);

    let mut tx = pool.begin().await.or_tx_failure(ONBOARD_FAILED)?;
    insert_user(&mut tx, &user).await.or_tx_failure(ONBOARD_FAILED)?;
    insert_employee(&mut tx, &employee)
        .await
        .or_tx_failure(ONBOARD_FAILED)?;
    insert_record(&mut tx, &record)
        .await
        .or_tx_failure(ONBOARD_FAILED)?;
    tx.commit().await.or_tx_failure(ONBOARD_FAILED)?;

    info!(
        user_id = %user.id,
        employee_id = %employee.id,
        role = %user.role,
        "Employee onboarded"
    );

    Ok(EmployeeProfile {
        employee,
        email: user.email,
        role: user.role,
        records: vec![record],
    })
}

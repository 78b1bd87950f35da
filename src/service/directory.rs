//! Employee and history reads.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::{AnyConnection, AnyPool};
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use crate::error::{DbResultExt, ServiceError};
use crate::model::employee::{EmployeeProfile, ProfileRow};
use crate::model::employment_record::EmploymentRecord;
use crate::utils::db_utils::{non_blank, placeholders};

const READ_FAILED: &str = "Failed to fetch employees";

pub(crate) const PROFILE_COLUMNS: &str = r#"
    e.id, e.user_id, e.first_name, e.last_name, e.ni_number, e.date_of_birth,
    e.address_line1, e.address_line2, e.city, e.postcode,
    e.emergency_contact_name, e.emergency_contact_phone,
    e.created_at, e.updated_at, u.email, u.role
"#;

pub(crate) const RECORD_COLUMNS: &str = r#"
    id, employee_id, revision, job_title, department, pay_amount,
    pay_basis, hours_per_week, start_date, end_date, change_reason
"#;

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct EmployeeQuery {
    /// Page number, starting at 1
    #[schema(example = 1)]
    pub page: Option<u32>,
    /// Items per page (1..=100)
    #[schema(example = 20)]
    pub per_page: Option<u32>,
    /// Case-insensitive match on first name, last name or email
    #[schema(example = "doe")]
    pub search: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EmployeePage {
    pub data: Vec<EmployeeProfile>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total: i64,
}

/// History of one employee, most recent assignment first.
pub(crate) async fn records_of(
    conn: &mut AnyConnection,
    employee_id: &str,
) -> Result<Vec<EmploymentRecord>, sqlx::Error> {
    let sql = format!(
        "SELECT {RECORD_COLUMNS} FROM employment_records \
         WHERE employee_id = ? ORDER BY start_date DESC, revision DESC"
    );
    sqlx::query_as::<_, EmploymentRecord>(&sql)
        .bind(employee_id)
        .fetch_all(&mut *conn)
        .await
}

/// Histories for many employees in one round-trip, keyed by employee id.
async fn records_for(
    conn: &mut AnyConnection,
    employee_ids: &[String],
) -> Result<HashMap<String, Vec<EmploymentRecord>>, sqlx::Error> {
    let mut grouped: HashMap<String, Vec<EmploymentRecord>> = HashMap::new();
    if employee_ids.is_empty() {
        return Ok(grouped);
    }

    let sql = format!(
        "SELECT {RECORD_COLUMNS} FROM employment_records \
         WHERE employee_id IN ({}) ORDER BY start_date DESC, revision DESC",
        placeholders(employee_ids.len())
    );
    let mut query = sqlx::query_as::<_, EmploymentRecord>(&sql);
    for id in employee_ids {
        query = query.bind(id.as_str());
    }

    for record in query.fetch_all(&mut *conn).await? {
        grouped
            .entry(record.employee_id.clone())
            .or_default()
            .push(record);
    }
    Ok(grouped)
}

pub(crate) async fn fetch_profile(
    conn: &mut AnyConnection,
    employee_id: &str,
) -> Result<Option<EmployeeProfile>, sqlx::Error> {
    let sql = format!(
        "SELECT {PROFILE_COLUMNS} FROM employees e JOIN users u ON u.id = e.user_id WHERE e.id = ?"
    );
    let row = sqlx::query_as::<_, ProfileRow>(&sql)
        .bind(employee_id)
        .fetch_optional(&mut *conn)
        .await?;

    match row {
        Some(row) => {
            let records = records_of(conn, employee_id).await?;
            Ok(Some(row.with_records(records)))
        }
        None => Ok(None),
    }
}

pub async fn get_employee(pool: &AnyPool, employee_id: &str) -> Result<EmployeeProfile, ServiceError> {
    let mut conn = pool.acquire().await.or_tx_failure(READ_FAILED)?;
    fetch_profile(&mut conn, employee_id)
        .await
        .or_tx_failure(READ_FAILED)?
        .ok_or_else(|| ServiceError::not_found("Employee not found"))
}

/// Profile owned by a login, if that login has one.
pub async fn find_by_user(pool: &AnyPool, user_id: &str) -> Result<Option<EmployeeProfile>, ServiceError> {
    let mut conn = pool.acquire().await.or_tx_failure(READ_FAILED)?;

    let employee_id = sqlx::query_scalar::<_, String>("SELECT id FROM employees WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await
        .or_tx_failure(READ_FAILED)?;

    match employee_id {
        Some(id) => fetch_profile(&mut conn, &id).await.or_tx_failure(READ_FAILED),
        None => Ok(None),
    }
}

/// Newest employees first, each with full history attached.
pub async fn list_employees(pool: &AnyPool, query: &EmployeeQuery) -> Result<EmployeePage, ServiceError> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (i64::from(page) - 1) * i64::from(per_page);

    let like = non_blank(query.search.clone()).map(|s| format!("%{}%", s.to_lowercase()));
    let where_clause = if like.is_some() {
        "WHERE (LOWER(e.first_name) LIKE ? OR LOWER(e.last_name) LIKE ? OR u.email LIKE ?)"
    } else {
        ""
    };

    let mut conn = pool.acquire().await.or_tx_failure(READ_FAILED)?;

    // ---------- total count ----------
    let count_sql = format!(
        "SELECT COUNT(*) FROM employees e JOIN users u ON u.id = e.user_id {where_clause}"
    );
    debug!(sql = %count_sql, "Counting employees");

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(like) = &like {
        for _ in 0..3 {
            count_query = count_query.bind(like.clone());
        }
    }
    let total = count_query
        .fetch_one(&mut *conn)
        .await
        .or_tx_failure(READ_FAILED)?;

    // ---------- data query ----------
    let data_sql = format!(
        "SELECT {PROFILE_COLUMNS} FROM employees e JOIN users u ON u.id = e.user_id {where_clause} \
         ORDER BY e.created_at DESC, e.id DESC LIMIT ? OFFSET ?"
    );
    debug!(page, per_page, offset, "Fetching employees");

    let mut data_query = sqlx::query_as::<_, ProfileRow>(&data_sql);
    if let Some(like) = &like {
        for _ in 0..3 {
            data_query = data_query.bind(like.clone());
        }
    }
    let rows = data_query
        .bind(i64::from(per_page))
        .bind(offset)
        .fetch_all(&mut *conn)
        .await
        .or_tx_failure(READ_FAILED)?;

    let ids: Vec<String> = rows.iter().map(|r| r.employee.id.clone()).collect();
    let mut histories = records_for(&mut conn, &ids)
        .await
        .or_tx_failure(READ_FAILED)?;

    let data = rows
        .into_iter()
        .map(|row| {
            let records = histories.remove(&row.employee.id).unwrap_or_default();
            row.with_records(records)
        })
        .collect();

    Ok(EmployeePage {
        data,
        page,
        per_page,
        total,
    })
}

//! Permanent removal of an employee and every row that references it.

use serde::Serialize;
use sqlx::AnyPool;
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::error::{DbResultExt, ServiceError};

const DELETE_FAILED: &str = "Failed to delete employee";

/// Which identifier a cascade step filters on.
#[derive(Debug, Clone, Copy)]
enum Key {
    Employee,
    User,
}

struct CascadeStep {
    table: &'static str,
    sql: &'static str,
    key: Key,
}

/// Children before parents, so every foreign key still holds after each
/// statement. The whole list runs in one transaction.
const CASCADE: [CascadeStep; 4] = [
    CascadeStep {
        table: "case_involved_parties",
        sql: "DELETE FROM case_involved_parties WHERE employee_id = ?",
        key: Key::Employee,
    },
    CascadeStep {
        table: "employment_records",
        sql: "DELETE FROM employment_records WHERE employee_id = ?",
        key: Key::Employee,
    },
    CascadeStep {
        table: "employees",
        sql: "DELETE FROM employees WHERE id = ?",
        key: Key::Employee,
    },
    CascadeStep {
        table: "users",
        sql: "DELETE FROM users WHERE id = ?",
        key: Key::User,
    },
];

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeletedEmployee {
    pub employee_id: String,
    pub user_id: String,
    pub email: String,
    pub case_links_removed: u64,
    pub records_removed: u64,
}

#[instrument(name = "delete_employee", skip(pool))]
pub async fn delete_employee(pool: &AnyPool, employee_id: &str) -> Result<DeletedEmployee, ServiceError> {
    let mut tx = pool.begin().await.or_tx_failure(DELETE_FAILED)?;

    let owner = sqlx::query_as::<_, (String, String)>(
        "SELECT u.id, u.email FROM employees e JOIN users u ON u.id = e.user_id WHERE e.id = ?",
    )
    .bind(employee_id)
    .fetch_optional(&mut *tx)
    .await
    .or_tx_failure(DELETE_FAILED)?;

    // Dropping `tx` rolls back; nothing has been written yet anyway.
    let Some((user_id, email)) = owner else {
        return Err(ServiceError::not_found("Employee not found"));
    };

    let mut removed = [0u64; 4];
    for (step, count) in CASCADE.iter().zip(removed.iter_mut()) {
        let key = match step.key {
            Key::Employee => employee_id,
            Key::User => user_id.as_str(),
        };
        *count = sqlx::query(step.sql)
            .bind(key)
            .execute(&mut *tx)
            .await
            .or_tx_failure(DELETE_FAILED)?
            .rows_affected();
        tracing::debug!(table = step.table, rows = *count, "Cascade step done");
    }

    tx.commit().await.or_tx_failure(DELETE_FAILED)?;

    info!(employee_id, user_id = %user_id, "Employee deleted");

    Ok(DeletedEmployee {
        employee_id: employee_id.to_string(),
        user_id,
        email,
        case_links_removed: removed[0],
        records_removed: removed[1],
    })
}

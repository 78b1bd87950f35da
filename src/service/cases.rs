//! Disciplinary and grievance cases, limited to the parties they involve.

use serde::Deserialize;
use sqlx::AnyPool;
use tracing::info;
use utoipa::ToSchema;

use crate::error::{DbResultExt, ServiceError};
use crate::model::case::{Case, CaseDetail, CaseInvolvedParty, CaseStatus, CaseType, PartyRole};
use crate::service::validation;
use crate::utils::db_utils::{new_id, non_blank, now, to_millis};

const CASE_FAILED: &str = "Failed to save case";
const CASE_READ_FAILED: &str = "Failed to fetch case";

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct OpenCase {
    pub case_type: CaseType,
    #[schema(example = "Repeated lateness")]
    pub summary: String,
    /// Generated when omitted
    #[schema(example = "CASE-2026-001")]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AddInvolvedParty {
    pub employee_id: String,
    pub party_role: PartyRole,
}

fn generated_reference(id: &str) -> String {
    let short: String = id.chars().filter(|c| *c != '-').take(8).collect();
    format!("CASE-{}", short.to_uppercase())
}

pub async fn open_case(pool: &AnyPool, input: OpenCase) -> Result<Case, ServiceError> {
    let summary = validation::non_empty("summary", input.summary)?;
    let id = new_id();
    let case = Case {
        reference: non_blank(input.reference).unwrap_or_else(|| generated_reference(&id)),
        id,
        case_type: input.case_type,
        status: CaseStatus::Open,
        summary,
        opened_at: now(),
    };

    sqlx::query(
        r#"
        INSERT INTO cases (id, reference, case_type, status, summary, opened_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(case.id.as_str())
    .bind(case.reference.as_str())
    .bind(case.case_type.to_string())
    .bind(case.status.to_string())
    .bind(case.summary.as_str())
    .bind(to_millis(case.opened_at))
    .execute(pool)
    .await
    .or_tx_failure(CASE_FAILED)?;

    info!(case_id = %case.id, reference = %case.reference, "Case opened");
    Ok(case)
}

pub async fn add_involved_party(
    pool: &AnyPool,
    case_id: &str,
    input: AddInvolvedParty,
) -> Result<CaseInvolvedParty, ServiceError> {
    let mut tx = pool.begin().await.or_tx_failure(CASE_FAILED)?;

    let cases = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM cases WHERE id = ?")
        .bind(case_id)
        .fetch_one(&mut *tx)
        .await
        .or_tx_failure(CASE_FAILED)?;
    if cases == 0 {
        return Err(ServiceError::not_found("Case not found"));
    }

    let employees = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees WHERE id = ?")
        .bind(input.employee_id.as_str())
        .fetch_one(&mut *tx)
        .await
        .or_tx_failure(CASE_FAILED)?;
    if employees == 0 {
        return Err(ServiceError::not_found("Employee not found"));
    }

    let party = CaseInvolvedParty {
        id: new_id(),
        case_id: case_id.to_string(),
        employee_id: input.employee_id,
        party_role: input.party_role,
        added_at: now(),
    };

    sqlx::query(
        r#"
        INSERT INTO case_involved_parties (id, case_id, employee_id, party_role, added_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(party.id.as_str())
    .bind(party.case_id.as_str())
    .bind(party.employee_id.as_str())
    .bind(party.party_role.to_string())
    .bind(to_millis(party.added_at))
    .execute(&mut *tx)
    .await
    .or_tx_failure(CASE_FAILED)?;

    tx.commit().await.or_tx_failure(CASE_FAILED)?;
    Ok(party)
}

pub async fn get_case(pool: &AnyPool, case_id: &str) -> Result<CaseDetail, ServiceError> {
    let case = sqlx::query_as::<_, Case>(
        "SELECT id, reference, case_type, status, summary, opened_at FROM cases WHERE id = ?",
    )
    .bind(case_id)
    .fetch_optional(pool)
    .await
    .or_tx_failure(CASE_READ_FAILED)?
    .ok_or_else(|| ServiceError::not_found("Case not found"))?;

    let parties = sqlx::query_as::<_, CaseInvolvedParty>(
        r#"
        SELECT id, case_id, employee_id, party_role, added_at
        FROM case_involved_parties
        WHERE case_id = ?
        ORDER BY added_at, id
        "#,
    )
    .bind(case_id)
    .fetch_all(pool)
    .await
    .or_tx_failure(CASE_READ_FAILED)?;

    Ok(CaseDetail { case, parties })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_reference_uses_id_prefix() {
        assert_eq!(
            generated_reference("5b0d3c7e-1f5a-4a4e-9a51-3f7c0f2d6a11"),
            "CASE-5B0D3C7E"
        );
    }
}

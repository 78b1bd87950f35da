use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::any::AnyRow;
use sqlx::{FromRow, Row};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use super::{get_enum, get_timestamp};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseType {
    Disciplinary,
    Grievance,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseStatus {
    Open,
    Closed,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PartyRole {
    Subject,
    Complainant,
    Witness,
    Investigator,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Case {
    pub id: String,
    pub reference: String,
    pub case_type: CaseType,
    pub status: CaseStatus,
    pub summary: String,
    #[schema(value_type = String, format = DateTime)]
    pub opened_at: DateTime<Utc>,
}

impl FromRow<'_, AnyRow> for Case {
    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            reference: row.try_get("reference")?,
            case_type: get_enum(row, "case_type")?,
            status: get_enum(row, "status")?,
            summary: row.try_get("summary")?,
            opened_at: get_timestamp(row, "opened_at")?,
        })
    }
}

/// Links an employee into a case. These rows block employee deletion until removed.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CaseInvolvedParty {
    pub id: String,
    pub case_id: String,
    pub employee_id: String,
    pub party_role: PartyRole,
    #[schema(value_type = String, format = DateTime)]
    pub added_at: DateTime<Utc>,
}

impl FromRow<'_, AnyRow> for CaseInvolvedParty {
    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            case_id: row.try_get("case_id")?,
            employee_id: row.try_get("employee_id")?,
            party_role: get_enum(row, "party_role")?,
            added_at: get_timestamp(row, "added_at")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CaseDetail {
    #[serde(flatten)]
    pub case: Case,
    pub parties: Vec<CaseInvolvedParty>,
}

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Default, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[default]
    Employee,
    LineManager,
    HrAdvisor,
    SuperAdmin,
}

impl Role {
    /// Roles allowed to onboard, edit and read other people's HR records.
    pub fn manages_people(self) -> bool {
        matches!(self, Role::HrAdvisor | Role::SuperAdmin)
    }
}

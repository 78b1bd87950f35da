use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Default, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Department {
    Finance,
    HumanResources,
    Operations,
    Sales,
    Marketing,
    Technology,
    Legal,
    CustomerService,
    /// Placeholder for hires whose department is not known yet.
    #[default]
    Unassigned,
}

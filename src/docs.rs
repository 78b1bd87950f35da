use crate::error::{ErrorBody, ErrorEnvelope};
use crate::model::{
    case::{Case, CaseDetail, CaseInvolvedParty, CaseStatus, CaseType, PartyRole},
    department::Department,
    employee::{Employee, EmployeeProfile},
    employment_record::{EmploymentRecord, PayBasis},
    role::Role,
};
use crate::models::{LoginReqDto, LoginResponse};
use crate::service::{
    cases::{AddInvolvedParty, OpenCase},
    deletion::DeletedEmployee,
    directory::EmployeePage,
    employment::UpdateEmployeeRequest,
    onboarding::OnboardEmployee,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "StaffPilot API",
        version = "1.0.0",
        description = r#"
## StaffPilot HR backend

Employee records for UK employers.

### Key Features
- **Onboarding**: login, employee profile and first employment record are created together or not at all
- **Employment history**: changing job title, department or pay closes the active record and opens a new one
- **Offboarding**: deleting an employee removes case links, history and the login in one transaction
- **Cases**: disciplinary and grievance cases with involved employees

### Security
Everything under `/api` needs `Authorization: Bearer <token>` from `POST /auth/login`.

### Response Format
`{"success": true, "data": ...}` on success, `{"success": false, "error": {"code", "message"}}` otherwise.
"#,
    ),
    paths(
        crate::auth::handlers::login,

        crate::api::employee::me,
        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::case::open_case,
        crate::api::case::get_case,
        crate::api::case::add_party
    ),
    components(
        schemas(
            LoginReqDto,
            LoginResponse,
            Role,
            Department,
            PayBasis,
            Employee,
            EmploymentRecord,
            EmployeeProfile,
            EmployeePage,
            OnboardEmployee,
            UpdateEmployeeRequest,
            DeletedEmployee,
            CaseType,
            CaseStatus,
            PartyRole,
            Case,
            CaseInvolvedParty,
            CaseDetail,
            OpenCase,
            AddInvolvedParty,
            ErrorBody,
            ErrorEnvelope
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login"),
        (name = "Employee", description = "Onboarding, history and offboarding"),
        (name = "Case", description = "Disciplinary and grievance cases"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

use crate::{
    api::Envelope,
    auth::auth::AuthUser,
    error::{DbResultExt, ErrorEnvelope, ServiceError},
    model::employee::EmployeeProfile,
    service::{
        self, accounts,
        deletion::DeletedEmployee,
        directory::{self, EmployeePage, EmployeeQuery},
        employment::{EmployeeUpdate, UpdateEmployeeRequest},
        onboarding::OnboardEmployee,
    },
    utils::email_registry::EmailRegistry,
};
use actix_web::{HttpResponse, web};
use sqlx::AnyPool;
use tracing::{debug, info};

/// Onboard Employee
///
/// Creates the login, the employee profile and the initial employment record together.
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = OnboardEmployee,
    responses(
        (status = 201, description = "Employee onboarded; data is the new profile", body = EmployeeProfile),
        (status = 400, description = "Missing or invalid field", body = ErrorEnvelope),
        (status = 403, description = "HR/Admin only; SUPER_ADMIN role needs a super admin caller", body = ErrorEnvelope),
        (status = 409, description = "Email already in use", body = ErrorEnvelope),
        (status = 500, description = "Registration rolled back", body = ErrorEnvelope)
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_employee(
    auth: AuthUser,
    pool: web::Data<AnyPool>,
    registry: web::Data<EmailRegistry>,
    payload: web::Json<OnboardEmployee>,
) -> Result<HttpResponse, ServiceError> {
    auth.require_hr_or_admin()?;

    let input = payload.into_inner();
    auth.require_can_grant(input.role.unwrap_or_default())?;

    // A cache hit is only a hint; the users table decides.
    if registry.is_taken(&input.email).await {
        let in_use = accounts::email_in_use(pool.get_ref(), &input.email)
            .await
            .or_tx_failure("System error during registration")?;
        if in_use {
            debug!("Email rejected by registry cache");
            return Err(ServiceError::Conflict("This email is already in use.".into()));
        }
        debug!("Stale registry entry dropped");
        registry.forget(&input.email).await;
    }

    let profile = service::onboard(pool.get_ref(), input).await?;
    registry.mark_taken(&profile.email).await;

    Ok(HttpResponse::Created().json(Envelope::ok(profile)))
}

#[utoipa::path(
    get,
    path = "/api/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated employees with history, newest first", body = EmployeePage),
        (status = 403, description = "HR/Admin only", body = ErrorEnvelope)
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_employees(
    auth: AuthUser,
    pool: web::Data<AnyPool>,
    query: web::Query<EmployeeQuery>,
) -> Result<HttpResponse, ServiceError> {
    auth.require_hr_or_admin()?;

    let page = service::list_employees(pool.get_ref(), &query).await?;
    Ok(HttpResponse::Ok().json(Envelope::ok(page)))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee with history, most recent assignment first", body = EmployeeProfile),
        (status = 403, description = "Not HR/Admin and not the employee", body = ErrorEnvelope),
        (status = 404, description = "Employee not found", body = ErrorEnvelope)
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_employee(
    auth: AuthUser,
    pool: web::Data<AnyPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let employee_id = path.into_inner();
    auth.require_can_view(&employee_id)?;

    let profile = service::get_employee(pool.get_ref(), &employee_id).await?;
    Ok(HttpResponse::Ok().json(Envelope::ok(profile)))
}

/// Update Employee
///
/// Personal fields are overwritten in place. Supplying job_title, department or
/// pay_amount closes the active employment record and opens a new one.
#[utoipa::path(
    put,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    request_body = UpdateEmployeeRequest,
    responses(
        (status = 200, description = "Employee updated", body = EmployeeProfile),
        (status = 400, description = "No fields or invalid field", body = ErrorEnvelope),
        (status = 404, description = "Employee not found", body = ErrorEnvelope),
        (status = 500, description = "Update rolled back", body = ErrorEnvelope)
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_employee(
    auth: AuthUser,
    pool: web::Data<AnyPool>,
    path: web::Path<String>,
    body: web::Json<UpdateEmployeeRequest>,
) -> Result<HttpResponse, ServiceError> {
    auth.require_hr_or_admin()?;

    let employee_id = path.into_inner();
    let update = EmployeeUpdate::try_from(body.into_inner())?;

    let profile = service::update_employee(pool.get_ref(), &employee_id, update).await?;
    Ok(HttpResponse::Ok().json(Envelope::ok(profile)))
}

/// Delete Employee
///
/// Removes case links, employment history, the employee and the owning login.
#[utoipa::path(
    delete,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = DeletedEmployee),
        (status = 403, description = "Super admin only", body = ErrorEnvelope),
        (status = 404, description = "Employee not found", body = ErrorEnvelope),
        (status = 500, description = "Deletion rolled back", body = ErrorEnvelope)
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_employee(
    auth: AuthUser,
    pool: web::Data<AnyPool>,
    registry: web::Data<EmailRegistry>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    auth.require_super_admin()?;

    let employee_id = path.into_inner();
    let deleted = service::delete_employee(pool.get_ref(), &employee_id).await?;
    registry.forget(&deleted.email).await;

    info!(employee_id = %deleted.employee_id, by = %auth.user_id, "Employee deleted via API");
    Ok(HttpResponse::Ok().json(Envelope::ok(deleted)))
}

/// Own profile
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "The caller's employee profile", body = EmployeeProfile),
        (status = 404, description = "Login has no employee profile", body = ErrorEnvelope)
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn me(auth: AuthUser, pool: web::Data<AnyPool>) -> Result<HttpResponse, ServiceError> {
    let profile = directory::find_by_user(pool.get_ref(), &auth.user_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("No employee profile for this login"))?;
    Ok(HttpResponse::Ok().json(Envelope::ok(profile)))
}

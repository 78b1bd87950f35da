use crate::{
    api::Envelope,
    auth::auth::AuthUser,
    error::{ErrorEnvelope, ServiceError},
    model::case::{Case, CaseDetail, CaseInvolvedParty},
    service::cases::{self, AddInvolvedParty, OpenCase},
};
use actix_web::{HttpResponse, web};
use sqlx::AnyPool;

#[utoipa::path(
    post,
    path = "/api/cases",
    request_body = OpenCase,
    responses(
        (status = 201, description = "Case opened", body = Case),
        (status = 400, description = "Missing summary", body = ErrorEnvelope),
        (status = 409, description = "Reference already used", body = ErrorEnvelope)
    ),
    tag = "Case",
    security(("bearer_auth" = []))
)]
pub async fn open_case(
    auth: AuthUser,
    pool: web::Data<AnyPool>,
    payload: web::Json<OpenCase>,
) -> Result<HttpResponse, ServiceError> {
    auth.require_hr_or_admin()?;

    let case = cases::open_case(pool.get_ref(), payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(Envelope::ok(case)))
}

#[utoipa::path(
    get,
    path = "/api/cases/{case_id}",
    params(("case_id", Path, description = "Case ID")),
    responses(
        (status = 200, body = CaseDetail),
        (status = 404, description = "Case not found", body = ErrorEnvelope)
    ),
    tag = "Case",
    security(("bearer_auth" = []))
)]
pub async fn get_case(
    auth: AuthUser,
    pool: web::Data<AnyPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    auth.require_hr_or_admin()?;

    let detail = cases::get_case(pool.get_ref(), &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(Envelope::ok(detail)))
}

#[utoipa::path(
    post,
    path = "/api/cases/{case_id}/parties",
    params(("case_id", Path, description = "Case ID")),
    request_body = AddInvolvedParty,
    responses(
        (status = 201, body = CaseInvolvedParty),
        (status = 404, description = "Case or employee not found", body = ErrorEnvelope),
        (status = 409, description = "Employee already has this role in the case", body = ErrorEnvelope)
    ),
    tag = "Case",
    security(("bearer_auth" = []))
)]
pub async fn add_party(
    auth: AuthUser,
    pool: web::Data<AnyPool>,
    path: web::Path<String>,
    payload: web::Json<AddInvolvedParty>,
) -> Result<HttpResponse, ServiceError> {
    auth.require_hr_or_admin()?;

    let party = cases::add_involved_party(pool.get_ref(), &path.into_inner(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(Envelope::ok(party)))
}

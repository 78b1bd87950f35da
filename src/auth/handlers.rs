use crate::{
    api::Envelope,
    auth::jwt::generate_access_token,
    config::Config,
    error::{ErrorEnvelope, ServiceError},
    models::{LoginReqDto, LoginResponse},
    service::accounts,
};
use actix_web::{HttpResponse, web};
use sqlx::AnyPool;
use tracing::{debug, error, info, instrument};

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Access token issued", body = LoginResponse),
        (status = 400, description = "Email or password missing", body = ErrorEnvelope),
        (status = 401, description = "Invalid credentials", body = ErrorEnvelope)
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_login", skip(pool, config, user), fields(email = %user.email))]
pub async fn login(
    user: web::Json<LoginReqDto>,
    pool: web::Data<AnyPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ServiceError> {
    info!("Login request received");

    if user.email.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty email or password");
        return Err(ServiceError::validation("Email and password are required"));
    }

    let account = accounts::authenticate(pool.get_ref(), &user.email, &user.password).await?;
    debug!(user_id = %account.user.id, "Password verified");

    let access_token = generate_access_token(
        &account.user.id,
        &account.user.email,
        account.user.role,
        account.employee_id.clone(),
        &config.jwt_secret,
        config.access_token_ttl,
    )
    .map_err(|e| {
        error!(error = %e, "Failed to sign access token");
        ServiceError::internal("Login failed")
    })?;

    info!("Login successful");

    Ok(HttpResponse::Ok().json(Envelope::ok(LoginResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: config.access_token_ttl,
        role: account.user.role,
        employee_id: account.employee_id,
    })))
}

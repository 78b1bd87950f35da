//! Login identities: lookup, credential checks and the bootstrap administrator.

use sqlx::{AnyConnection, AnyPool};
use tracing::{error, info, warn};

use crate::auth::password::{hash_password, verify_password};
use crate::error::{DbResultExt, ServiceError};
use crate::model::role::Role;
use crate::model::user::User;
use crate::service::validation;
use crate::utils::db_utils::{new_id, normalize_email, now, to_millis};

const LOGIN_FAILED: &str = "Login failed";

/// A verified login, with the employee profile it owns if any.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub user: User,
    pub employee_id: Option<String>,
}

pub(crate) async fn insert_user(conn: &mut AnyConnection, user: &User) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO users (id, email, password_hash, role, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(user.id.as_str())
    .bind(user.email.as_str())
    .bind(user.password_hash.as_str())
    .bind(user.role.to_string())
    .bind(to_millis(user.created_at))
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn email_in_use(pool: &AnyPool, email: &str) -> Result<bool, sqlx::Error> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = ?")
        .bind(normalize_email(email))
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

async fn find_by_email(pool: &AnyPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, email, password_hash, role, created_at FROM users WHERE email = ?",
    )
    .bind(normalize_email(email))
    .fetch_optional(pool)
    .await
}

/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn authenticate(
    pool: &AnyPool,
    email: &str,
    password: &str,
) -> Result<Authenticated, ServiceError> {
    let invalid = || ServiceError::Unauthorized("Invalid credentials".into());

    let Some(user) = find_by_email(pool, email).await.or_tx_failure(LOGIN_FAILED)? else {
        info!("Invalid credentials: user not found");
        return Err(invalid());
    };

    if let Err(e) = verify_password(password, &user.password_hash) {
        info!(error = %e, user_id = %user.id, "Invalid credentials: password mismatch");
        return Err(invalid());
    }

    let employee_id = sqlx::query_scalar::<_, String>("SELECT id FROM employees WHERE user_id = ?")
        .bind(user.id.as_str())
        .fetch_optional(pool)
        .await
        .or_tx_failure(LOGIN_FAILED)?;

    Ok(Authenticated { user, employee_id })
}

/// Creates a SUPER_ADMIN login with no employee profile unless the email is
/// already registered. Returns whether a user was created.
pub async fn ensure_bootstrap_admin(
    pool: &AnyPool,
    email: &str,
    password: &str,
) -> Result<bool, ServiceError> {
    const BOOTSTRAP_FAILED: &str = "Failed to create bootstrap admin";

    let email = normalize_email(email);
    validation::email(&email)?;
    validation::password(password)?;

    if email_in_use(pool, &email).await.or_tx_failure(BOOTSTRAP_FAILED)? {
        return Ok(false);
    }

    let password_hash = hash_password(password).map_err(|e| {
        error!(error = %e, "Password hashing failed");
        ServiceError::internal(BOOTSTRAP_FAILED)
    })?;

    let user = User {
        id: new_id(),
        email,
        password_hash,
        role: Role::SuperAdmin,
        created_at: now(),
    };

    let mut conn = pool.acquire().await.or_tx_failure(BOOTSTRAP_FAILED)?;
    match insert_user(&mut conn, &user).await.or_tx_failure(BOOTSTRAP_FAILED) {
        Ok(()) => {
            info!(user_id = %user.id, "Bootstrap admin created");
            Ok(true)
        }
        // Another instance got there first.
        Err(ServiceError::Conflict(_)) => {
            warn!("Bootstrap admin already exists");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

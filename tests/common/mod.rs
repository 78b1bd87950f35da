#![allow(dead_code)]

use sqlx::AnyPool;
use sqlx::any::{AnyPoolOptions, install_default_drivers};

use staffpilot::config::Config;
use staffpilot::db::apply_schema;
use staffpilot::model::department::Department;
use staffpilot::service::onboarding::OnboardEmployee;

pub const TEST_SECRET: &str = "test-secret-with-enough-entropy";

/// Private in-memory SQLite database with the application schema.
///
/// One connection that never expires: every connection to `sqlite::memory:`
/// opens a fresh, empty database.
pub async fn create_test_db() -> AnyPool {
    install_default_drivers();

    let pool = AnyPoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("open in-memory database");

    apply_schema(&pool).await.expect("apply schema");
    pool
}

pub fn jane() -> OnboardEmployee {
    OnboardEmployee {
        email: "jane.doe@company.co.uk".into(),
        password: "correct-horse-battery".into(),
        first_name: "Jane".into(),
        last_name: "Doe".into(),
        ni_number: Some("QQ123456C".into()),
        address_line1: Some("1 High Street".into()),
        city: Some("Leeds".into()),
        postcode: Some("LS1 1AA".into()),
        job_title: Some("Analyst".into()),
        department: Some(Department::Finance),
        pay_amount: Some(30000.0),
        ..Default::default()
    }
}

pub fn starter(email: &str, first_name: &str, last_name: &str) -> OnboardEmployee {
    OnboardEmployee {
        email: email.into(),
        password: "correct-horse-battery".into(),
        first_name: first_name.into(),
        last_name: last_name.into(),
        ..Default::default()
    }
}

pub async fn count(pool: &AnyPool, sql: &str, id: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(sql)
        .bind(id)
        .fetch_one(pool)
        .await
        .expect("count query")
}

/// Makes every INSERT or DELETE on `table` abort, standing in for a failure
/// half-way through a transaction.
pub async fn fail_on(pool: &AnyPool, event: &str, table: &str) {
    let sql = format!(
        "CREATE TRIGGER fail_{event}_{table} BEFORE {event} ON {table} \
         BEGIN SELECT RAISE(ABORT, 'simulated failure'); END"
    );
    sqlx::query(&sql).execute(pool).await.expect("create trigger");
}

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".into(),
        db_max_connections: 1,
        jwt_secret: TEST_SECRET.into(),
        server_addr: "127.0.0.1:0".into(),
        access_token_ttl: 3600,
        rate_login_per_min: 1000,
        rate_protected_per_min: 1000,
        api_prefix: "/api".into(),
        log_dir: "logs".into(),
        bootstrap_admin: None,
    }
}

pub async fn rows(pool: &AnyPool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .expect("row count")
}

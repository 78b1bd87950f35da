use sqlx::AnyPool;
use sqlx::any::{AnyPoolOptions, install_default_drivers};
use tracing::info;

// Portable between MySQL and SQLite. Foreign keys carry no ON DELETE action:
// employee deletion removes dependants itself, in order.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id VARCHAR(36) NOT NULL PRIMARY KEY,
        email VARCHAR(255) NOT NULL UNIQUE,
        password_hash VARCHAR(255) NOT NULL,
        role VARCHAR(32) NOT NULL,
        created_at BIGINT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS employees (
        id VARCHAR(36) NOT NULL PRIMARY KEY,
        user_id VARCHAR(36) NOT NULL UNIQUE,
        first_name VARCHAR(100) NOT NULL,
        last_name VARCHAR(100) NOT NULL,
        ni_number VARCHAR(16),
        date_of_birth VARCHAR(10),
        address_line1 VARCHAR(255) NOT NULL,
        address_line2 VARCHAR(255),
        city VARCHAR(100) NOT NULL,
        postcode VARCHAR(16) NOT NULL,
        emergency_contact_name VARCHAR(200),
        emergency_contact_phone VARCHAR(32),
        created_at BIGINT NOT NULL,
        updated_at BIGINT NOT NULL,
        FOREIGN KEY (user_id) REFERENCES users (id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS employment_records (
        id VARCHAR(36) NOT NULL PRIMARY KEY,
        employee_id VARCHAR(36) NOT NULL,
        revision BIGINT NOT NULL,
        job_title VARCHAR(200) NOT NULL,
        department VARCHAR(32) NOT NULL,
        pay_amount DOUBLE NOT NULL,
        pay_basis VARCHAR(32) NOT NULL,
        hours_per_week DOUBLE NOT NULL,
        start_date BIGINT NOT NULL,
        end_date BIGINT,
        change_reason VARCHAR(255) NOT NULL,
        UNIQUE (employee_id, revision),
        FOREIGN KEY (employee_id) REFERENCES employees (id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS cases (
        id VARCHAR(36) NOT NULL PRIMARY KEY,
        reference VARCHAR(32) NOT NULL UNIQUE,
        case_type VARCHAR(32) NOT NULL,
        status VARCHAR(16) NOT NULL,
        summary VARCHAR(1000) NOT NULL,
        opened_at BIGINT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS case_involved_parties (
        id VARCHAR(36) NOT NULL PRIMARY KEY,
        case_id VARCHAR(36) NOT NULL,
        employee_id VARCHAR(36) NOT NULL,
        party_role VARCHAR(32) NOT NULL,
        added_at BIGINT NOT NULL,
        UNIQUE (case_id, employee_id, party_role),
        FOREIGN KEY (case_id) REFERENCES cases (id),
        FOREIGN KEY (employee_id) REFERENCES employees (id)
    )
    "#,
];

pub async fn init_db(database_url: &str, max_connections: u32) -> Result<AnyPool, sqlx::Error> {
    install_default_drivers();

    let pool = AnyPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    apply_schema(&pool).await?;
    Ok(pool)
}

pub async fn apply_schema(pool: &AnyPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    info!(tables = SCHEMA.len(), "Database schema ready");
    Ok(())
}

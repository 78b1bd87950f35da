use actix_web::middleware::{Logger, NormalizePath};
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::Context;
use tracing::{error, info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use staffpilot::config::Config;
use staffpilot::db::init_db;
use staffpilot::docs::ApiDoc;
use staffpilot::routes;
use staffpilot::service::accounts;
use staffpilot::utils::email_registry::EmailRegistry;

#[get("/")]
async fn index() -> impl Responder {
    "StaffPilot is running"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .init();

    info!(addr = %config.server_addr, "Server starting...");

    let pool = init_db(&config.database_url, config.db_max_connections)
        .await
        .context("failed to connect to the database")?;

    let registry = EmailRegistry::default();

    if let Some(admin) = &config.bootstrap_admin {
        match accounts::ensure_bootstrap_admin(&pool, &admin.email, &admin.password).await {
            Ok(created) => {
                info!(created, "Bootstrap admin checked");
                registry.mark_taken(&admin.email).await;
            }
            Err(e) => warn!(error = %e, "Bootstrap admin not created"),
        }
    }

    let warmup_pool = pool.clone();
    let warmup_registry = registry.clone();
    actix_web::rt::spawn(async move {
        if let Err(e) = warmup_registry.warmup(&warmup_pool, 500).await {
            error!(error = %e, "Failed to warm up email registry");
        }
    });

    let server_addr = config.server_addr.clone();
    let pool = Data::new(pool);
    let registry = Data::new(registry);
    let config = Data::new(config);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                // wildcard so the UI's JS/CSS assets resolve
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(pool.clone())
            .app_data(registry.clone())
            .app_data(config.clone())
            .service(index)
            .configure(|cfg| routes::configure(cfg, &config))
    })
    .bind(&server_addr)
    .with_context(|| format!("failed to bind {server_addr}"))?
    .run()
    .await?;

    Ok(())
}

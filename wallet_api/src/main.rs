mod config;
mod handlers;
mod scheduler;
mod state;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware::Logger, web};
use dotenv::dotenv;
use pretty_env_logger::env_logger::{Builder, Env};

use crate::config::AppConfig;
use crate::scheduler::AccrualScheduler;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    if cli::run_cli().await {
        return Ok(());
    }

    let logger_env = Env::default().default_filter_or("info");
    let mut logger_builder = Builder::from_env(logger_env);
    logger_builder.init();

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("Application initialization failed: {:#}", e);
        std::io::Error::other(e.to_string())
    })?;

    let state = config.create_app_state().await.map_err(|e| {
        log::error!("Application initialization failed: {:#}", e);
        std::io::Error::other(e.to_string())
    })?;

    log::info!("App state initialized successfully");

    if config.accrual_enabled {
        AccrualScheduler::new(state.db.clone(), config.accrual_timezone).spawn();
        log::info!(
            "Balance accrual scheduled daily at midnight {}",
            config.accrual_timezone
        );
    } else {
        log::warn!("Balance accrual disabled by ACCRUAL_ENABLED");
    }

    let data = web::Data::new(state);

    log::info!(
        "Server running at http://{}:{}",
        config.bind_address,
        config.port
    );

    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(Cors::permissive())
            .wrap(Logger::new("%a %t %r %s  %{Referer}i %Dms"))
            .configure(handlers::configure)
    })
    .bind((config.bind_address.as_str(), config.port))?
    .run()
    .await
}

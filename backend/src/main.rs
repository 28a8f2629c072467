mod config;
mod gemini;
mod routes;

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use config::AppConfig;
use gemini::GeminiClient;
use routes::{PromptLimit, configure_routes};
use std::env;
use std::path::Path;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    } else {
        log::error!("Failed to get the current working directory.");
    }

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    let client = GeminiClient::new(
        config.gemini_api_key.clone(),
        &config.gemini_model,
        &config.gemini_api_base,
    )
    .map_err(|e| {
        log::error!("Failed to create Gemini client: {}", e);
        std::io::Error::other(e.to_string())
    })?;
    log::info!("Using model endpoint {}", client.endpoint());

    let constraint = config.upload_constraint();
    log::info!(
        "Accepting up to {} per upload: {}",
        shared::format_bytes(constraint.max_size),
        constraint.accept_attr()
    );

    let frontend_dir = if Path::new(&config.frontend_dir).is_dir() {
        Some(config.frontend_dir.clone())
    } else {
        log::warn!(
            "Frontend directory {} not found, serving the API only",
            config.frontend_dir
        );
        None
    };

    let prompt_limit = config.max_prompt_bytes;

    let bind_address = config.bind_address();
    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(web::Data::new(client.clone()))
            .app_data(web::Data::new(constraint.clone()))
            .configure(|cfg| {
                configure_routes::<GeminiClient>(cfg, frontend_dir.clone(), PromptLimit(prompt_limit))
            })
    })
    .bind(&bind_address)?
    .run()
    .await
}

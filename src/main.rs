use std::sync::Arc;

use actix_web::{App, HttpServer, middleware, web};

use sagra::config::AppConfig;
use sagra::google::{drive::GoogleDrive, oauth::TokenSource, sheets::GoogleSheets};
use sagra::handlers;
use sagra::intake::RegistrationService;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // .env may set RUST_LOG, so load it before the logger
    let dotenv = dotenvy::dotenv();
    env_logger::init();
    if let Err(e) = dotenv {
        log::info!("No .env file loaded ({e}); using process environment");
    }

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("Invalid configuration: {e}");
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    let http = reqwest::Client::new();
    let tokens = Arc::new(TokenSource::new(http.clone(), config.google.clone()));
    let service = web::Data::new(RegistrationService::new(
        config.destinations.clone(),
        Arc::new(GoogleDrive::new(http.clone(), Arc::clone(&tokens))),
        Arc::new(GoogleSheets::new(http, tokens)),
    ));

    let static_dir = config.static_dir.clone();
    let serve_static = static_dir.is_dir();
    if !serve_static {
        log::warn!("Static directory {} not found; serving the API only", static_dir.display());
    }

    log::info!("Starting server at http://{}", config.bind_addr);

    HttpServer::new(move || {
        let mut app = App::new()
            .wrap(middleware::Logger::default())
            .app_data(service.clone())
            .configure(handlers::configure);
        // Static site last so it never shadows the API routes
        if serve_static {
            app = app.service(actix_files::Files::new("/", &static_dir).index_file("index.html"));
        }
        app
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use quiz_identity_server::{
    app_state::AppState,
    auth::AuthMiddleware,
    config::Config,
    handlers::{health, login, me, refresh, register, register_admin},
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;

    let host = config.web_server_host.clone();
    let port = config.web_server_port;

    let state = Arc::new(
        AppState::new(config)
            .await
            .map_err(|e| std::io::Error::other(e.to_string()))?,
    );

    log::info!("Starting identity server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::from(state.token_issuer.clone()))
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .service(
                web::scope("/api/identity/account")
                    .service(register)
                    .service(register_admin)
                    .service(login)
                    .service(refresh)
                    .service(
                        web::resource("/me")
                            .wrap(AuthMiddleware)
                            .route(web::get().to(me)),
                    ),
            )
            .service(health)
    })
    .bind((host, port))?
    .run()
    .await
}

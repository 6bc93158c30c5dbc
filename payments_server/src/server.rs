use std::time::Duration;

use actix_web::{
    dev::Server,
    http::KeepAlive,
    middleware::{Condition, Logger},
    web,
    web::ServiceConfig,
    App,
    HttpServer,
};
use log::*;
use payments_engine::{AccountApi, PaymentApi, SqliteDatabase};

use crate::{
    auth::TokenIssuer,
    config::{AuthConfig, ServerConfig},
    errors::ServerError,
    middleware::JwtAuthMiddlewareFactory,
    routes::{
        health,
        not_found,
        CreatePaymentRoute,
        DeletePaymentRoute,
        LoginRoute,
        PaymentByIdRoute,
        PaymentsRoute,
        RegisterRoute,
        UpdatePaymentRoute,
        PAYMENTS_PATH,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, config.max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db.clone())?;
    let result = srv.await.map_err(ServerError::from);
    db.close().await;
    info!("🚀️ Database connections closed");
    result
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("payments::access_log"))
            .configure(|cfg| configure_service(cfg, db.clone(), &config.auth, !config.disable_auth))
            .default_service(web::to(not_found))
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Registers the API objects and every route on `cfg`. When `enforce_auth` is false, the payment routes accept
/// requests without a bearer token.
pub fn configure_service(cfg: &mut ServiceConfig, db: SqliteDatabase, auth: &AuthConfig, enforce_auth: bool) {
    let accounts_api = AccountApi::new(db.clone());
    let payments_api = PaymentApi::new(db);
    let jwt_signer = TokenIssuer::new(auth);
    // Routes that require authentication
    let payments_scope = web::scope(PAYMENTS_PATH)
        .wrap(Condition::new(enforce_auth, JwtAuthMiddlewareFactory::new(jwt_signer.clone())))
        .service(CreatePaymentRoute::<SqliteDatabase>::new())
        .service(PaymentsRoute::<SqliteDatabase>::new())
        .service(PaymentByIdRoute::<SqliteDatabase>::new())
        .service(UpdatePaymentRoute::<SqliteDatabase>::new())
        .service(DeletePaymentRoute::<SqliteDatabase>::new());
    cfg.app_data(web::Data::new(accounts_api))
        .app_data(web::Data::new(payments_api))
        .app_data(web::Data::new(jwt_signer))
        .service(health)
        .service(RegisterRoute::<SqliteDatabase>::new())
        .service(LoginRoute::<SqliteDatabase>::new())
        .service(payments_scope);
}

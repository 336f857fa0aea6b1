use actix_cors::Cors;
use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{middleware::Logger, web, App, HttpServer};

use notekeep::{
    config::{AppConfig, StorageKind},
    handlers,
    store::{MemoryNoteStore, NoteStore, PgNoteStore},
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env().unwrap_or_else(|e| {
        log::error!("{e}");
        std::process::exit(1);
    });

    let store = match (config.storage, &config.database_url) {
        (StorageKind::Postgres, Some(database_url)) => {
            let pg = PgNoteStore::new(database_url, config.pool_size)
                .and_then(|pg| pg.run_migrations().map(|_| pg))
                .unwrap_or_else(|e| {
                    log::error!("{e}");
                    std::process::exit(1);
                });
            NoteStore::new(pg)
        }
        _ => {
            log::warn!("notes are kept in memory and are lost on shutdown");
            NoteStore::new(MemoryNoteStore::new())
        }
    };

    let governor_conf = GovernorConfigBuilder::default()
        .per_millisecond(config.rate_limit_replenish_ms)
        .burst_size(config.rate_limit_burst)
        .finish()
        .expect("rate limit values are validated as non-zero");

    let data = web::Data::new(store);
    log::info!("listening on {}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Governor::new(&governor_conf))
            .wrap(Logger::default())
            .configure(handlers::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

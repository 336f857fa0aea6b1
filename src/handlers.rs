use actix_web::{web, HttpResponse};

use crate::errors::ServerError;

/// Builds the full app over a fresh in-memory store: `(service, store)`.
#[cfg(test)]
macro_rules! test_app {
    () => {{
        let store = crate::store::NoteStore::new(crate::store::MemoryNoteStore::new());
        let app = actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new(store.clone()))
                .configure(crate::handlers::configure),
        )
        .await;
        (app, store)
    }};
}

pub mod note;
pub mod trash;

pub async fn index() -> impl actix_web::Responder {
    HttpResponse::Ok().finish()
}

/// Registers every route; shared by the server binary and the tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        ServerError::UserError(format!("Invalid Request: {err}")).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        ServerError::UserError(format!("Invalid Request: {err}")).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|_err, req| {
        let id = req.match_info().get("id").unwrap_or_default();
        ServerError::NotFound(id.to_owned()).into()
    }))
    .route("/", web::get().to(index))
    .service(
        web::scope("/api")
            .service(
                web::scope("/notes")
                    .route("", web::get().to(note::query::list))
                    .route("", web::post().to(note::mutate::create))
                    .route("", web::delete().to(note::mutate::clear_all))
                    .route("/clear-all", web::delete().to(note::mutate::clear_all))
                    .route("/trash/empty", web::delete().to(trash::empty))
                    .route("/{id}", web::get().to(note::query::get))
                    .route("/{id}", web::put().to(note::mutate::update))
                    .route("/{id}", web::delete().to(note::mutate::soft_delete))
                    .route("/{id}/important", web::patch().to(note::mutate::set_important))
                    .route("/{id}/restore", web::patch().to(note::mutate::restore))
                    .route("/{id}/permanent", web::delete().to(note::mutate::permanently_delete)),
            )
            .service(
                web::scope("/trash")
                    .route("", web::get().to(trash::list))
                    .route("/clear", web::delete().to(trash::empty)),
            ),
    );
}

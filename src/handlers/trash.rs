use actix_web::{web, HttpResponse};
use serde_json::json;

use super::note::blocking;
use crate::{
    errors::ServerError,
    models::note::{NoteFilter, NoteQuery, NoteSort},
    store::NoteStore,
};

pub async fn list(store: web::Data<NoteStore>) -> Result<HttpResponse, ServerError> {
    let query = NoteQuery::new(NoteFilter::Deleted, None, NoteSort::Newest);
    let notes = blocking(&store, move |s| s.list(&query)).await?;
    Ok(HttpResponse::Ok().json(json!(notes)))
}

pub async fn empty(store: web::Data<NoteStore>) -> Result<HttpResponse, ServerError> {
    let count = blocking(&store, |s| s.empty_trash()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Trash emptied successfully",
        "deletedCount": count,
    })))
}

use actix_web::{web, HttpResponse};
use serde_derive::Deserialize;
use serde_json::json;

use super::blocking;
use crate::{
    errors::ServerError,
    models::note::{NoteFilter, NoteQuery, NoteSort},
    store::NoteStore,
};

#[derive(Debug, Default, Deserialize)]
pub struct ListParameters {
    pub filter: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
}

impl ListParameters {
    pub fn into_query(self) -> NoteQuery {
        NoteQuery::new(
            self.filter.as_deref().map(NoteFilter::parse).unwrap_or_default(),
            self.search.as_deref(),
            self.sort.as_deref().map(NoteSort::parse).unwrap_or_default(),
        )
    }
}

pub async fn list(
    params: web::Query<ListParameters>,
    store: web::Data<NoteStore>,
) -> Result<HttpResponse, ServerError> {
    let query = params.into_inner().into_query();
    let notes = blocking(&store, move |s| s.list(&query)).await?;
    Ok(HttpResponse::Ok().json(json!(notes)))
}

pub async fn get(
    note_id: web::Path<i64>,
    store: web::Data<NoteStore>,
) -> Result<HttpResponse, ServerError> {
    let note_id = note_id.into_inner();
    let note = blocking(&store, move |s| s.get(note_id)).await?;
    Ok(HttpResponse::Ok().json(json!(note)))
}

use actix_web::{web, HttpResponse};
use serde_derive::Deserialize;
use serde_json::json;

use super::blocking;
use crate::{errors::ServerError, models::note::NoteDraft, store::NoteStore};

pub async fn create(
    input: web::Json<NoteDraft>,
    store: web::Data<NoteStore>,
) -> Result<HttpResponse, ServerError> {
    let draft = input.into_inner();
    let note = blocking(&store, move |s| s.create(draft)).await?;
    log::debug!("created note {}", note.id);
    Ok(HttpResponse::Created().json(json!(note)))
}

pub async fn update(
    note_id: web::Path<i64>,
    input: web::Json<NoteDraft>,
    store: web::Data<NoteStore>,
) -> Result<HttpResponse, ServerError> {
    let note_id = note_id.into_inner();
    let draft = input.into_inner();
    let note = blocking(&store, move |s| s.update(note_id, draft)).await?;
    Ok(HttpResponse::Ok().json(json!(note)))
}

#[derive(Deserialize)]
pub struct ImportantField {
    pub important: bool,
}

pub async fn set_important(
    note_id: web::Path<i64>,
    input: web::Json<ImportantField>,
    store: web::Data<NoteStore>,
) -> Result<HttpResponse, ServerError> {
    let note_id = note_id.into_inner();
    let important = input.important;
    let note = blocking(&store, move |s| s.set_important(note_id, important)).await?;
    Ok(HttpResponse::Ok().json(json!(note)))
}

pub async fn soft_delete(
    note_id: web::Path<i64>,
    store: web::Data<NoteStore>,
) -> Result<HttpResponse, ServerError> {
    let note_id = note_id.into_inner();
    let note = blocking(&store, move |s| s.soft_delete(note_id)).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Note moved to trash",
        "note": note,
    })))
}

pub async fn restore(
    note_id: web::Path<i64>,
    store: web::Data<NoteStore>,
) -> Result<HttpResponse, ServerError> {
    let note_id = note_id.into_inner();
    let note = blocking(&store, move |s| s.restore(note_id)).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Note restored from trash",
        "note": note,
    })))
}

pub async fn permanently_delete(
    note_id: web::Path<i64>,
    store: web::Data<NoteStore>,
) -> Result<HttpResponse, ServerError> {
    let note_id = note_id.into_inner();
    let note = blocking(&store, move |s| s.permanently_delete(note_id)).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Note permanently deleted",
        "note": note,
    })))
}

#[derive(Deserialize)]
pub struct ConfirmQuery {
    pub confirm: Option<String>,
}

pub async fn clear_all(
    query: web::Query<ConfirmQuery>,
    store: web::Data<NoteStore>,
) -> Result<HttpResponse, ServerError> {
    let confirmed = query.confirm.as_deref() == Some("true");
    let count = blocking(&store, move |s| s.clear_all(confirmed)).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "All notes deleted permanently",
        "deletedCount": count,
    })))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use serde_json::{json, Value};

    use crate::models::note::{Note, NoteDraft, NoteFilter, NoteQuery, NoteSort};

    #[actix_web::test]
    async fn create_returns_created_note() {
        let (app, store) = test_app!();
        let req = test::TestRequest::post()
            .uri("/api/notes")
            .set_json(json!({ "title": "A", "content": "x", "tags": ["t"] }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let note: Note = test::read_body_json(res).await;
        assert_eq!(note.id, 1);
        assert_eq!(note.tags, vec!["t".to_owned()]);
        assert_eq!(store.get(1).unwrap(), note);
    }

    #[actix_web::test]
    async fn create_rejects_empty_title_and_persists_nothing() {
        let (app, store) = test_app!();
        let req = test::TestRequest::post()
            .uri("/api/notes")
            .set_json(json!({ "title": "", "content": "y" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert!(body["error"].is_string());
        assert!(store
            .list(&NoteQuery::new(NoteFilter::All, None, NoteSort::Newest))
            .unwrap()
            .is_empty());
    }

    #[actix_web::test]
    async fn malformed_body_is_bad_request() {
        let (app, _store) = test_app!();
        let req = test::TestRequest::post()
            .uri("/api/notes")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn update_of_missing_note_is_not_found_and_changes_nothing() {
        let (app, store) = test_app!();
        let note = store.create(NoteDraft::new("A", "x")).unwrap();
        let req = test::TestRequest::put()
            .uri("/api/notes/999")
            .set_json(json!({ "title": "B", "content": "y" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(store.get(note.id).unwrap(), note);
    }

    #[actix_web::test]
    async fn update_validates_and_edits() {
        let (app, store) = test_app!();
        let note = store.create(NoteDraft::new("A", "x")).unwrap();
        let uri = format!("/api/notes/{}", note.id);

        let req = test::TestRequest::put()
            .uri(&uri)
            .set_json(json!({ "title": "B", "content": "" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::put()
            .uri(&uri)
            .set_json(json!({ "title": "B", "content": "y", "important": true }))
            .to_request();
        let updated: Note = test::call_and_read_body_json(&app, req).await;
        assert_eq!(updated.title, "B");
        assert!(updated.important);
        assert!(updated.updated_at > updated.created_at);
    }

    #[actix_web::test]
    async fn important_toggle_returns_note() {
        let (app, store) = test_app!();
        let note = store.create(NoteDraft::new("A", "x")).unwrap();
        let req = test::TestRequest::patch()
            .uri(&format!("/api/notes/{}/important", note.id))
            .set_json(json!({ "important": true }))
            .to_request();
        let updated: Note = test::call_and_read_body_json(&app, req).await;
        assert!(updated.important);

        let req = test::TestRequest::patch()
            .uri("/api/notes/77/important")
            .set_json(json!({ "important": true }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn trash_round_trip() {
        let (app, store) = test_app!();
        let note = store.create(NoteDraft::new("A", "x")).unwrap();

        let req = test::TestRequest::delete()
            .uri(&format!("/api/notes/{}", note.id))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["message"], "Note moved to trash");
        assert_eq!(body["note"]["deleted"], true);

        let req = test::TestRequest::patch()
            .uri(&format!("/api/notes/{}/restore", note.id))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["note"]["deleted"], false);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/notes/{}/permanent", note.id))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["note"]["id"], note.id);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/notes/{}/permanent", note.id))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn clear_all_needs_confirmation() {
        let (app, store) = test_app!();
        store.create(NoteDraft::new("A", "x")).unwrap();
        let trashed = store.create(NoteDraft::new("B", "y")).unwrap();
        store.soft_delete(trashed.id).unwrap();

        for uri in ["/api/notes", "/api/notes?confirm=false", "/api/notes/clear-all"] {
            let req = test::TestRequest::delete().uri(uri).to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
        }

        let req = test::TestRequest::delete()
            .uri("/api/notes?confirm=true")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["deletedCount"], 2);

        store.create(NoteDraft::new("C", "z")).unwrap();
        let req = test::TestRequest::delete()
            .uri("/api/notes/clear-all?confirm=true")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["deletedCount"], 1);
    }
}

use derive_more::Display;
use serde::de::DeserializeOwned;
use serde_derive::Deserialize;
use serde_json::json;

use crate::models::note::{Note, NoteDraft, NoteFilter, NoteSort};

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[display(fmt = "{}", _0)]
    Validation(String),
    #[display(fmt = "{}", _0)]
    NotFound(String),
    #[display(fmt = "server error: {}", _0)]
    Server(String),
    #[display(fmt = "server unreachable: {}", _0)]
    Transport(String),
}

impl ClientError {
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            400 => ClientError::Validation(message),
            404 => ClientError::NotFound(message),
            _ => ClientError::Server(message),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Transport(e.to_string())
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
struct NoteEnvelope {
    note: Note,
}

#[derive(Deserialize)]
struct DeletedCount {
    #[serde(rename = "deletedCount")]
    deleted_count: usize,
}

/// Query string for `GET /notes`. The active filter is the server default
/// and is left out.
pub fn list_parameters(
    filter: NoteFilter,
    search: &str,
    sort: NoteSort,
) -> Vec<(&'static str, String)> {
    let mut params = Vec::with_capacity(3);
    if filter != NoteFilter::Active {
        params.push(("filter", filter.as_str().to_owned()));
    }
    let search = search.trim();
    if !search.is_empty() {
        params.push(("search", search.to_owned()));
    }
    params.push(("sort", sort.as_str().to_owned()));
    params
}

/// Typed client for the notes HTTP API.
#[derive(Clone, Debug)]
pub struct NotesApi {
    http: reqwest::Client,
    base_url: String,
}

impl NotesApi {
    /// `base_url` includes the API prefix, e.g. `http://localhost:3000/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        NotesApi {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read<T: DeserializeOwned>(res: reqwest::Response) -> Result<T, ClientError> {
        let status = res.status();
        if status.is_success() {
            return Ok(res.json::<T>().await?);
        }
        let message = match res.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status.to_string(),
        };
        Err(ClientError::from_status(status.as_u16(), message))
    }

    pub async fn list(
        &self,
        filter: NoteFilter,
        search: &str,
        sort: NoteSort,
    ) -> Result<Vec<Note>, ClientError> {
        let res = self
            .http
            .get(self.url("/notes"))
            .query(&list_parameters(filter, search, sort))
            .send()
            .await?;
        Self::read(res).await
    }

    pub async fn trash(&self) -> Result<Vec<Note>, ClientError> {
        let res = self.http.get(self.url("/trash")).send().await?;
        Self::read(res).await
    }

    pub async fn get(&self, id: i64) -> Result<Note, ClientError> {
        let res = self.http.get(self.url(&format!("/notes/{id}"))).send().await?;
        Self::read(res).await
    }

    pub async fn create(&self, draft: &NoteDraft) -> Result<Note, ClientError> {
        let res = self.http.post(self.url("/notes")).json(draft).send().await?;
        Self::read(res).await
    }

    pub async fn update(&self, id: i64, draft: &NoteDraft) -> Result<Note, ClientError> {
        let res = self
            .http
            .put(self.url(&format!("/notes/{id}")))
            .json(draft)
            .send()
            .await?;
        Self::read(res).await
    }

    pub async fn set_important(&self, id: i64, important: bool) -> Result<Note, ClientError> {
        let res = self
            .http
            .patch(self.url(&format!("/notes/{id}/important")))
            .json(&json!({ "important": important }))
            .send()
            .await?;
        Self::read(res).await
    }

    pub async fn soft_delete(&self, id: i64) -> Result<Note, ClientError> {
        let res = self
            .http
            .delete(self.url(&format!("/notes/{id}")))
            .send()
            .await?;
        Ok(Self::read::<NoteEnvelope>(res).await?.note)
    }

    pub async fn restore(&self, id: i64) -> Result<Note, ClientError> {
        let res = self
            .http
            .patch(self.url(&format!("/notes/{id}/restore")))
            .send()
            .await?;
        Ok(Self::read::<NoteEnvelope>(res).await?.note)
    }

    pub async fn permanently_delete(&self, id: i64) -> Result<Note, ClientError> {
        let res = self
            .http
            .delete(self.url(&format!("/notes/{id}/permanent")))
            .send()
            .await?;
        Ok(Self::read::<NoteEnvelope>(res).await?.note)
    }

    pub async fn clear_all(&self) -> Result<usize, ClientError> {
        let res = self
            .http
            .delete(self.url("/notes"))
            .query(&[("confirm", "true")])
            .send()
            .await?;
        Ok(Self::read::<DeletedCount>(res).await?.deleted_count)
    }

    pub async fn empty_trash(&self) -> Result<usize, ClientError> {
        let res = self.http.delete(self.url("/notes/trash/empty")).send().await?;
        Ok(Self::read::<DeletedCount>(res).await?.deleted_count)
    }
}

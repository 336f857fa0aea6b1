use std::sync::Arc;

use crate::{
    errors::ServerError,
    models::note::{InsertNote, Note, NoteChangeset, NoteDraft, NoteQuery},
};

pub mod memory;
pub mod pg;

pub use memory::MemoryNoteStore;
pub use pg::PgNoteStore;

/// Storage backend for notes. Every method is one atomic operation against
/// the backend; missing ids are reported as `ServerError::NotFound`.
pub trait NoteRepository: Send + Sync {
    fn list(&self, query: &NoteQuery) -> Result<Vec<Note>, ServerError>;
    fn find(&self, id: i64) -> Result<Note, ServerError>;
    fn insert(&self, note: InsertNote) -> Result<Note, ServerError>;
    fn update(&self, id: i64, changes: NoteChangeset) -> Result<Note, ServerError>;
    fn set_important(&self, id: i64, important: bool) -> Result<Note, ServerError>;
    fn set_deleted(&self, id: i64, deleted: bool) -> Result<Note, ServerError>;
    fn remove(&self, id: i64) -> Result<Note, ServerError>;
    fn remove_all(&self) -> Result<usize, ServerError>;
    fn remove_deleted(&self) -> Result<usize, ServerError>;
}

/// Validating front of a [`NoteRepository`], shared by all handlers.
#[derive(Clone)]
pub struct NoteStore {
    repo: Arc<dyn NoteRepository>,
}

impl NoteStore {
    pub fn new<R: NoteRepository + 'static>(repo: R) -> Self {
        NoteStore {
            repo: Arc::new(repo),
        }
    }

    pub fn list(&self, query: &NoteQuery) -> Result<Vec<Note>, ServerError> {
        self.repo.list(query)
    }

    pub fn get(&self, id: i64) -> Result<Note, ServerError> {
        self.repo.find(id)
    }

    pub fn create(&self, draft: NoteDraft) -> Result<Note, ServerError> {
        let note = draft.into_insertable(crate::models::note::now())?;
        self.repo.insert(note)
    }

    pub fn update(&self, id: i64, draft: NoteDraft) -> Result<Note, ServerError> {
        let changes = draft.into_changeset()?;
        self.repo.update(id, changes)
    }

    pub fn set_important(&self, id: i64, important: bool) -> Result<Note, ServerError> {
        self.repo.set_important(id, important)
    }

    pub fn soft_delete(&self, id: i64) -> Result<Note, ServerError> {
        self.repo.set_deleted(id, true)
    }

    pub fn restore(&self, id: i64) -> Result<Note, ServerError> {
        self.repo.set_deleted(id, false)
    }

    pub fn permanently_delete(&self, id: i64) -> Result<Note, ServerError> {
        self.repo.remove(id)
    }

    pub fn clear_all(&self, confirmed: bool) -> Result<usize, ServerError> {
        if !confirmed {
            return Err(ServerError::UserError(
                "Confirmation required. Add ?confirm=true to delete all notes".to_owned(),
            ));
        }
        self.repo.remove_all()
    }

    pub fn empty_trash(&self) -> Result<usize, ServerError> {
        self.repo.remove_deleted()
    }
}

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::NoteRepository;
use crate::{
    errors::ServerError,
    models::note::{next_stamp, InsertNote, Note, NoteChangeset, NoteQuery},
};

#[derive(Default)]
struct Inner {
    last_id: i64,
    notes: BTreeMap<i64, Note>,
}

/// Process-local note storage. Ids come from a counter and are never reused.
#[derive(Default)]
pub struct MemoryNoteStore {
    inner: Mutex<Inner>,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, ServerError> {
        self.inner.lock().map_err(|_| {
            log::error!("in-memory note store lock is poisoned");
            ServerError::Unavailable
        })
    }

    fn modify<F>(&self, id: i64, f: F) -> Result<Note, ServerError>
    where
        F: FnOnce(&mut Note),
    {
        let mut inner = self.lock()?;
        let note = inner
            .notes
            .get_mut(&id)
            .ok_or_else(|| ServerError::not_found(id))?;
        f(note);
        note.updated_at = next_stamp(note.updated_at);
        Ok(note.clone())
    }
}

impl NoteRepository for MemoryNoteStore {
    fn list(&self, query: &NoteQuery) -> Result<Vec<Note>, ServerError> {
        let inner = self.lock()?;
        let mut result: Vec<Note> = inner
            .notes
            .values()
            .filter(|n| query.admits(n))
            .cloned()
            .collect();
        result.sort_by(|a, b| query.sort.compare(a, b));
        Ok(result)
    }

    fn find(&self, id: i64) -> Result<Note, ServerError> {
        self.lock()?
            .notes
            .get(&id)
            .cloned()
            .ok_or_else(|| ServerError::not_found(id))
    }

    fn insert(&self, note: InsertNote) -> Result<Note, ServerError> {
        let mut inner = self.lock()?;
        inner.last_id += 1;
        let note = note.with_id(inner.last_id);
        inner.notes.insert(note.id, note.clone());
        Ok(note)
    }

    fn update(&self, id: i64, changes: NoteChangeset) -> Result<Note, ServerError> {
        self.modify(id, |note| changes.apply(note))
    }

    fn set_important(&self, id: i64, important: bool) -> Result<Note, ServerError> {
        self.modify(id, |note| note.important = important)
    }

    fn set_deleted(&self, id: i64, deleted: bool) -> Result<Note, ServerError> {
        self.modify(id, |note| note.deleted = deleted)
    }

    fn remove(&self, id: i64) -> Result<Note, ServerError> {
        self.lock()?
            .notes
            .remove(&id)
            .ok_or_else(|| ServerError::not_found(id))
    }

    fn remove_all(&self) -> Result<usize, ServerError> {
        let mut inner = self.lock()?;
        let count = inner.notes.len();
        inner.notes.clear();
        log::info!("removed all {count} notes");
        Ok(count)
    }

    fn remove_deleted(&self) -> Result<usize, ServerError> {
        let mut inner = self.lock()?;
        let before = inner.notes.len();
        inner.notes.retain(|_, n| !n.deleted);
        let count = before - inner.notes.len();
        log::info!("emptied trash, {count} notes removed");
        Ok(count)
    }
}

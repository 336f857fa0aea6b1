use std::{fs, io, path::PathBuf};

use serde_derive::{Deserialize, Serialize};

use crate::models::note::{Note, NoteFilter, NoteQuery};

#[derive(Serialize, Deserialize)]
struct CachedList {
    filter: String,
    search: Option<String>,
    notes: Vec<Note>,
}

/// Last list of notes fetched successfully, kept as JSON on disk together
/// with the filter and search it was fetched for.
#[derive(Clone, Debug)]
pub struct NotesCache {
    path: PathBuf,
}

impl NotesCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        NotesCache { path: path.into() }
    }

    pub fn store(&self, query: &NoteQuery, notes: &[Note]) -> io::Result<()> {
        let cached = CachedList {
            filter: query.filter.as_str().to_owned(),
            search: query.search.clone(),
            notes: notes.to_vec(),
        };
        let bytes = serde_json::to_vec(&cached)?;
        fs::write(&self.path, bytes)
    }

    /// The cached list re-sorted for `query`, or `None` when nothing usable
    /// is cached or the copy was fetched for another filter or search.
    pub fn load(&self, query: &NoteQuery) -> Option<Vec<Note>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                log::warn!("cannot read note cache {}: {e}", self.path.display());
                return None;
            }
        };
        let cached: CachedList = match serde_json::from_slice(&bytes) {
            Ok(cached) => cached,
            Err(e) => {
                log::warn!("discarding corrupt note cache {}: {e}", self.path.display());
                return None;
            }
        };
        if NoteFilter::parse(&cached.filter) != query.filter || cached.search != query.search {
            log::debug!("note cache holds a {} listing, not usable", cached.filter);
            return None;
        }
        let mut notes = cached.notes;
        notes.sort_by(|a, b| query.sort.compare(a, b));
        Some(notes)
    }
}

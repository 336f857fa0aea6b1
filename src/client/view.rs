use chrono::{DateTime, Utc};

use super::state::ClientState;
use crate::models::note::{Note, NoteFilter};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardAction {
    Edit,
    ToggleImportant,
    Delete,
    Restore,
    DeletePermanently,
}

/// What one note card shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardView {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub timestamp: String,
    pub important: bool,
    pub deleted: bool,
    pub selected: bool,
    pub actions: Vec<CardAction>,
}

pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%d.%m.%Y %H:%M").to_string()
}

impl CardView {
    pub fn new(note: &Note, selected: bool) -> Self {
        let actions = if note.deleted {
            vec![CardAction::Restore, CardAction::DeletePermanently]
        } else {
            vec![
                CardAction::Edit,
                CardAction::ToggleImportant,
                CardAction::Delete,
            ]
        };
        CardView {
            id: note.id,
            title: note.title.clone(),
            content: note.content.clone(),
            tags: note.tags.clone(),
            timestamp: format_timestamp(&note.updated_at),
            important: note.important,
            deleted: note.deleted,
            selected,
            actions,
        }
    }
}

pub fn cards(state: &ClientState) -> Vec<CardView> {
    state
        .notes
        .iter()
        .map(|note| CardView::new(note, state.selected == Some(note.id)))
        .collect()
}

/// Placeholder text when there is nothing to show.
pub fn empty_message(state: &ClientState) -> Option<&'static str> {
    if !state.notes.is_empty() {
        return None;
    }
    Some(match (state.filter, state.search.trim().is_empty()) {
        (_, false) => "No notes match your search",
        (NoteFilter::Deleted, true) => "Trash is empty",
        (NoteFilter::Important, true) => "No important notes",
        _ => "No notes yet",
    })
}

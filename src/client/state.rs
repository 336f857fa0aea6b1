use std::collections::VecDeque;

use crate::models::note::{Note, NoteDraft, NoteFilter, NoteSort};

const MAX_NOTIFICATIONS: usize = 5;

/// The note form: empty for a new note, or bound to the note being edited.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Editor {
    #[default]
    Idle,
    Editing { id: i64, draft: NoteDraft },
}

impl Editor {
    pub fn submit_label(&self) -> &'static str {
        match self {
            Editor::Idle => "Create",
            Editor::Editing { .. } => "Update",
        }
    }

    pub fn editing_id(&self) -> Option<i64> {
        match self {
            Editor::Idle => None,
            Editor::Editing { id, .. } => Some(*id),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    NotesLoaded(Vec<Note>),
    SetFilter(NoteFilter),
    SetSearch(String),
    SetSort(NoteSort),
    Select(Option<i64>),
    BeginEdit(Note),
    CancelEdit,
    Saved(Note),
    Notify(NotificationKind, String),
    DismissNotification,
}

/// Everything the notes page shows. Changed only through [`ClientState::apply`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClientState {
    pub notes: Vec<Note>,
    pub filter: NoteFilter,
    pub search: String,
    pub sort: NoteSort,
    pub selected: Option<i64>,
    pub editor: Editor,
    pub notifications: VecDeque<Notification>,
}

impl ClientState {
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::NotesLoaded(notes) => {
                if let Some(id) = self.selected {
                    if !notes.iter().any(|n| n.id == id) {
                        self.selected = None;
                    }
                }
                self.notes = notes;
            }
            Action::SetFilter(filter) => self.filter = filter,
            Action::SetSearch(search) => self.search = search,
            Action::SetSort(sort) => self.sort = sort,
            Action::Select(id) => {
                self.selected = id.filter(|id| self.notes.iter().any(|n| n.id == *id));
            }
            Action::BeginEdit(note) => {
                let draft = NoteDraft::new(note.title, note.content)
                    .with_tags(note.tags)
                    .with_important(note.important);
                self.editor = Editor::Editing { id: note.id, draft };
            }
            Action::CancelEdit => self.editor = Editor::Idle,
            Action::Saved(note) => {
                self.editor = Editor::Idle;
                self.selected = Some(note.id);
            }
            Action::Notify(kind, message) => {
                if self.notifications.len() == MAX_NOTIFICATIONS {
                    self.notifications.pop_front();
                }
                self.notifications.push_back(Notification { kind, message });
            }
            Action::DismissNotification => {
                self.notifications.pop_front();
            }
        }
    }

    pub fn note(&self, id: i64) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn selected_note(&self) -> Option<&Note> {
        self.selected.and_then(|id| self.note(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::note::now;

    fn note(id: i64, title: &str) -> Note {
        let stamp = now();
        Note {
            id,
            title: title.to_owned(),
            content: "body".to_owned(),
            tags: vec!["a".to_owned()],
            important: true,
            deleted: false,
            created_at: stamp,
            updated_at: stamp,
        }
    }

    #[test]
    fn editor_moves_between_idle_and_editing() {
        let mut state = ClientState::default();
        assert_eq!(state.editor.submit_label(), "Create");

        state.apply(Action::BeginEdit(note(3, "Plan")));
        assert_eq!(state.editor.submit_label(), "Update");
        match &state.editor {
            Editor::Editing { id, draft } => {
                assert_eq!(*id, 3);
                assert_eq!(draft.title, "Plan");
                assert_eq!(draft.tags, Some(vec!["a".to_owned()]));
                assert_eq!(draft.important, Some(true));
            }
            Editor::Idle => panic!("expected editing"),
        }

        state.apply(Action::CancelEdit);
        assert_eq!(state.editor, Editor::Idle);

        state.apply(Action::BeginEdit(note(3, "Plan")));
        state.apply(Action::Saved(note(3, "Plan v2")));
        assert_eq!(state.editor.editing_id(), None);
    }

    #[test]
    fn selection_follows_loaded_notes() {
        let mut state = ClientState::default();
        state.apply(Action::Select(Some(1)));
        assert_eq!(state.selected, None);

        state.apply(Action::NotesLoaded(vec![note(1, "a"), note(2, "b")]));
        state.apply(Action::Select(Some(2)));
        assert_eq!(state.selected_note().map(|n| n.id), Some(2));

        state.apply(Action::NotesLoaded(vec![note(1, "a")]));
        assert_eq!(state.selected, None);
    }

    #[test]
    fn notifications_are_bounded() {
        let mut state = ClientState::default();
        for i in 0..7 {
            state.apply(Action::Notify(NotificationKind::Info, format!("n{i}")));
        }
        assert_eq!(state.notifications.len(), MAX_NOTIFICATIONS);
        assert_eq!(state.notifications[0].message, "n2");

        state.apply(Action::DismissNotification);
        assert_eq!(state.notifications[0].message, "n3");
    }
}

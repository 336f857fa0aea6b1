use std::time::Instant;

use super::{
    api::{ClientError, NotesApi},
    cache::NotesCache,
    debounce::Debouncer,
    state::{Action, ClientState, Editor, NotificationKind},
    transfer::{self, ImportPlan},
    view::{self, CardView},
};
use crate::models::note::{NoteDraft, NoteFilter, NoteQuery, NoteSort};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
}

/// A notes page: local state kept in step with the server. Every successful
/// mutation re-fetches the list; failures become notifications.
pub struct NotesSession {
    api: NotesApi,
    cache: Option<NotesCache>,
    state: ClientState,
    search: Debouncer<String>,
}

impl NotesSession {
    pub fn new(api: NotesApi) -> Self {
        NotesSession {
            api,
            cache: None,
            state: ClientState::default(),
            search: Debouncer::default(),
        }
    }

    pub fn with_cache(mut self, cache: NotesCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    pub fn cards(&self) -> Vec<CardView> {
        view::cards(&self.state)
    }

    pub fn dismiss_notification(&mut self) {
        self.state.apply(Action::DismissNotification);
    }

    fn notify(&mut self, kind: NotificationKind, message: impl Into<String>) {
        self.state.apply(Action::Notify(kind, message.into()));
    }

    fn query(&self) -> NoteQuery {
        NoteQuery::new(
            self.state.filter,
            Some(self.state.search.as_str()),
            self.state.sort,
        )
    }

    /// Fetches the list for the current filter, search and sort. On failure
    /// a cached copy of the same listing is shown if there is one, else the
    /// prior list stays.
    pub async fn reload(&mut self) -> bool {
        let result = self
            .api
            .list(self.state.filter, &self.state.search, self.state.sort)
            .await;
        match result {
            Ok(notes) => {
                if let Some(cache) = &self.cache {
                    if let Err(e) = cache.store(&self.query(), &notes) {
                        log::warn!("cannot update note cache: {e}");
                    }
                }
                self.state.apply(Action::NotesLoaded(notes));
                true
            }
            Err(e) => {
                log::warn!("failed to load notes: {e}");
                let query = self.query();
                match self.cache.as_ref().and_then(|cache| cache.load(&query)) {
                    Some(cached) => {
                        self.state.apply(Action::NotesLoaded(cached));
                        self.notify(
                            NotificationKind::Error,
                            format!("Could not load notes ({e}), showing saved copy"),
                        );
                    }
                    None => {
                        self.notify(NotificationKind::Error, format!("Could not load notes: {e}"))
                    }
                }
                false
            }
        }
    }

    pub async fn set_filter(&mut self, filter: NoteFilter) -> bool {
        self.state.apply(Action::SetFilter(filter));
        self.reload().await
    }

    pub async fn set_sort(&mut self, sort: NoteSort) -> bool {
        self.state.apply(Action::SetSort(sort));
        self.reload().await
    }

    /// Records a keystroke in the search box; see [`NotesSession::tick`].
    pub fn search_input(&mut self, text: impl Into<String>, now: Instant) {
        self.search.push(text.into(), now);
    }

    pub fn search_deadline(&self) -> Option<Instant> {
        self.search.deadline()
    }

    /// Applies the pending search once it has settled. Returns whether a
    /// reload was attempted.
    pub async fn tick(&mut self, now: Instant) -> bool {
        match self.search.take_ready(now) {
            Some(search) => {
                self.state.apply(Action::SetSearch(search));
                self.reload().await;
                true
            }
            None => false,
        }
    }

    /// Searches for the pending input right away, e.g. on Enter. Returns
    /// whether a reload was attempted.
    pub async fn submit_search(&mut self) -> bool {
        match self.search.flush() {
            Some(search) => {
                self.state.apply(Action::SetSearch(search));
                self.reload().await;
                true
            }
            None => false,
        }
    }

    pub fn select(&mut self, id: Option<i64>) {
        self.state.apply(Action::Select(id));
    }

    pub async fn begin_edit(&mut self, id: i64) -> bool {
        match self.api.get(id).await {
            Ok(note) => {
                self.state.apply(Action::BeginEdit(note));
                true
            }
            Err(e) => {
                self.notify(NotificationKind::Error, format!("Could not open note: {e}"));
                false
            }
        }
    }

    pub fn cancel_edit(&mut self) {
        self.state.apply(Action::CancelEdit);
    }

    /// Creates or updates depending on the editor. A rejected draft leaves
    /// the editor as it was.
    pub async fn save(&mut self, draft: NoteDraft) -> bool {
        let result = match &self.state.editor {
            Editor::Idle => self.api.create(&draft).await,
            Editor::Editing { id, .. } => self.api.update(*id, &draft).await,
        };
        match result {
            Ok(note) => {
                let message = match self.state.editor {
                    Editor::Idle => "Note created",
                    Editor::Editing { .. } => "Note updated",
                };
                self.state.apply(Action::Saved(note));
                self.notify(NotificationKind::Success, message);
                self.reload().await;
                true
            }
            Err(e) => {
                self.notify(NotificationKind::Error, format!("Could not save note: {e}"));
                false
            }
        }
    }

    async fn after_mutation(&mut self, result: Result<(), ClientError>, done: &str) -> bool {
        match result {
            Ok(()) => {
                self.notify(NotificationKind::Success, done);
                self.reload().await;
                true
            }
            Err(e) => {
                self.notify(NotificationKind::Error, e.to_string());
                false
            }
        }
    }

    pub async fn toggle_important(&mut self, id: i64) -> bool {
        let Some(current) = self.state.note(id).map(|n| n.important) else {
            self.notify(NotificationKind::Error, format!("note id: {id} is not loaded"));
            return false;
        };
        let result = self.api.set_important(id, !current).await.map(|_| ());
        let done = if current {
            "Note unmarked as important"
        } else {
            "Note marked as important"
        };
        self.after_mutation(result, done).await
    }

    pub async fn delete(&mut self, id: i64) -> bool {
        let result = self.api.soft_delete(id).await.map(|_| ());
        self.after_mutation(result, "Note moved to trash").await
    }

    pub async fn restore(&mut self, id: i64) -> bool {
        let result = self.api.restore(id).await.map(|_| ());
        self.after_mutation(result, "Note restored from trash").await
    }

    pub async fn delete_permanently(&mut self, id: i64) -> bool {
        let result = self.api.permanently_delete(id).await.map(|_| ());
        self.after_mutation(result, "Note permanently deleted").await
    }

    /// Call only after the user confirmed.
    pub async fn clear_all(&mut self) -> bool {
        let result = self.api.clear_all().await;
        let done = match &result {
            Ok(count) => format!("Deleted {count} notes"),
            Err(_) => String::new(),
        };
        self.after_mutation(result.map(|_| ()), &done).await
    }

    pub async fn empty_trash(&mut self) -> bool {
        let result = self.api.empty_trash().await;
        let done = match &result {
            Ok(count) => format!("Removed {count} notes from trash"),
            Err(_) => String::new(),
        };
        self.after_mutation(result.map(|_| ()), &done).await
    }

    pub fn export(&self) -> Result<String, serde_json::Error> {
        transfer::export_notes(&self.state.notes)
    }

    pub async fn import(&mut self, text: &str) -> ImportReport {
        let ImportPlan { drafts, skipped } = match transfer::parse_import(text) {
            Ok(plan) => plan,
            Err(e) => {
                self.notify(NotificationKind::Error, format!("Invalid import file: {e}"));
                return ImportReport::default();
            }
        };

        let mut report = ImportReport {
            imported: 0,
            skipped,
        };
        for draft in drafts {
            match self.api.create(&draft).await {
                Ok(_) => report.imported += 1,
                Err(e) => {
                    log::warn!("import of {:?} failed: {e}", draft.title);
                    report.skipped += 1;
                }
            }
        }
        self.notify(
            NotificationKind::Info,
            format!(
                "Imported {} notes, skipped {}",
                report.imported, report.skipped
            ),
        );
        self.reload().await;
        report
    }
}

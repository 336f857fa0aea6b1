use chrono::{DateTime, Duration, SubsecRound, Utc};
use diesel::{AsChangeset, Insertable, Queryable};
use serde_derive::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::{errors::ServerError, schema::notes};

/// A note as stored and as sent over the wire.
#[derive(Clone, Debug, PartialEq, Eq, Queryable, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub important: bool,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.content.to_lowercase().contains(needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(needle))
    }
}

/// Body of `POST /notes` and `PUT /notes/:id`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub important: Option<bool>,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        NoteDraft {
            title: title.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_important(mut self, important: bool) -> Self {
        self.important = Some(important);
        self
    }

    fn checked_fields(&self) -> Result<(String, String), ServerError> {
        let title = self.title.trim();
        let content = self.content.trim();
        match (title.is_empty(), content.is_empty()) {
            (true, true) => Err(ServerError::UserError(
                "Title and content are required".to_owned(),
            )),
            (true, false) => Err(ServerError::UserError("title is empty".to_owned())),
            (false, true) => Err(ServerError::UserError("content is empty".to_owned())),
            (false, false) => Ok((title.to_owned(), content.to_owned())),
        }
    }

    fn clean_tags(&self) -> Option<Vec<String>> {
        self.tags.as_ref().map(|tags| {
            tags.iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(str::to_owned)
                .collect()
        })
    }

    /// Validates the draft for insertion, stamping both timestamps with `now`.
    pub fn into_insertable(self, now: DateTime<Utc>) -> Result<InsertNote, ServerError> {
        let (title, content) = self.checked_fields()?;
        Ok(InsertNote {
            title,
            content,
            tags: self.clean_tags().unwrap_or_default(),
            important: self.important.unwrap_or(false),
            deleted: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Validates the draft as an edit. Absent `tags`/`important` leave the
    /// stored values untouched.
    pub fn into_changeset(self) -> Result<NoteChangeset, ServerError> {
        let (title, content) = self.checked_fields()?;
        Ok(NoteChangeset {
            tags: self.clean_tags(),
            important: self.important,
            title,
            content,
        })
    }
}

#[derive(Clone, Debug, Insertable)]
#[diesel(table_name = notes)]
pub struct InsertNote {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub important: bool,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InsertNote {
    pub fn with_id(self, id: i64) -> Note {
        Note {
            id,
            title: self.title,
            content: self.content,
            tags: self.tags,
            important: self.important,
            deleted: self.deleted,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Clone, Debug, AsChangeset)]
#[diesel(table_name = notes)]
pub struct NoteChangeset {
    pub title: String,
    pub content: String,
    pub tags: Option<Vec<String>>,
    pub important: Option<bool>,
}

impl NoteChangeset {
    pub fn apply(self, note: &mut Note) {
        note.title = self.title;
        note.content = self.content;
        if let Some(tags) = self.tags {
            note.tags = tags;
        }
        if let Some(important) = self.important {
            note.important = important;
        }
    }
}

/// Current time at the precision PostgreSQL stores.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Stamp for a mutation of a note last touched at `previous`; always later.
pub fn next_stamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NoteFilter {
    #[default]
    Active,
    All,
    Important,
    Deleted,
}

impl NoteFilter {
    /// Unknown names fall back to the active filter.
    pub fn parse(name: &str) -> Self {
        match name {
            "all" => NoteFilter::All,
            "important" => NoteFilter::Important,
            "deleted" => NoteFilter::Deleted,
            _ => NoteFilter::Active,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NoteFilter::Active => "active",
            NoteFilter::All => "all",
            NoteFilter::Important => "important",
            NoteFilter::Deleted => "deleted",
        }
    }

    pub fn admits(&self, note: &Note) -> bool {
        match self {
            NoteFilter::Active => !note.deleted,
            NoteFilter::All => true,
            NoteFilter::Important => note.important && !note.deleted,
            NoteFilter::Deleted => note.deleted,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NoteSort {
    #[default]
    Newest,
    Oldest,
    AlphaAsc,
    AlphaDesc,
    Important,
}

impl NoteSort {
    /// Unknown names fall back to newest first.
    pub fn parse(name: &str) -> Self {
        match name {
            "oldest" => NoteSort::Oldest,
            "alpha-asc" => NoteSort::AlphaAsc,
            "alpha-desc" => NoteSort::AlphaDesc,
            "important" => NoteSort::Important,
            _ => NoteSort::Newest,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NoteSort::Newest => "newest",
            NoteSort::Oldest => "oldest",
            NoteSort::AlphaAsc => "alpha-asc",
            NoteSort::AlphaDesc => "alpha-desc",
            NoteSort::Important => "important",
        }
    }

    pub fn compare(&self, a: &Note, b: &Note) -> Ordering {
        let newest = || b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id));
        let alpha = || a.title.to_lowercase().cmp(&b.title.to_lowercase());
        match self {
            NoteSort::Newest => newest(),
            NoteSort::Oldest => a.updated_at.cmp(&b.updated_at).then(a.id.cmp(&b.id)),
            NoteSort::AlphaAsc => alpha().then(a.id.cmp(&b.id)),
            NoteSort::AlphaDesc => alpha().reverse().then(a.id.cmp(&b.id)),
            NoteSort::Important => b.important.cmp(&a.important).then_with(newest),
        }
    }
}

/// Parameters of a listing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NoteQuery {
    pub filter: NoteFilter,
    pub search: Option<String>,
    pub sort: NoteSort,
}

impl NoteQuery {
    pub fn new(filter: NoteFilter, search: Option<&str>, sort: NoteSort) -> Self {
        let search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);
        NoteQuery {
            filter,
            search,
            sort,
        }
    }

    pub fn admits(&self, note: &Note) -> bool {
        self.filter.admits(note)
            && match &self.search {
                Some(term) => note.matches(&term.to_lowercase()),
                None => true,
            }
    }

    /// `ILIKE` pattern for the search term with wildcards escaped.
    pub fn like_pattern(&self) -> Option<String> {
        self.search.as_ref().map(|term| {
            let mut pattern = String::with_capacity(term.len() + 2);
            pattern.push('%');
            for c in term.chars() {
                if matches!(c, '%' | '_' | '\\') {
                    pattern.push('\\');
                }
                pattern.push(c);
            }
            pattern.push('%');
            pattern
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: i64, title: &str, important: bool, deleted: bool, minute: u32) -> Note {
        use chrono::TimeZone;
        let stamp = Utc.with_ymd_and_hms(2024, 3, 2, 10, minute, 0).unwrap();
        Note {
            id,
            title: title.to_owned(),
            content: format!("content of {title}"),
            tags: vec!["Work".to_owned()],
            important,
            deleted,
            created_at: stamp,
            updated_at: stamp,
        }
    }

    #[test]
    fn draft_requires_title_and_content() {
        let err = NoteDraft::new("", "y").into_insertable(now()).unwrap_err();
        assert_eq!(err, ServerError::UserError("title is empty".to_owned()));

        let err = NoteDraft::new("a", "   ").into_changeset().unwrap_err();
        assert_eq!(err, ServerError::UserError("content is empty".to_owned()));
    }

    #[test]
    fn insertable_defaults_and_trims() {
        let stamp = now();
        let insert = NoteDraft::new("  Groceries ", "milk")
            .with_tags(["  food", "", " "])
            .into_insertable(stamp)
            .unwrap();
        assert_eq!(insert.title, "Groceries");
        assert_eq!(insert.tags, vec!["food".to_owned()]);
        assert!(!insert.important);
        assert!(!insert.deleted);
        assert_eq!(insert.created_at, insert.updated_at);
    }

    #[test]
    fn changeset_keeps_absent_fields() {
        let mut stored = note(1, "a", true, false, 0);
        NoteDraft::new("b", "c").into_changeset().unwrap().apply(&mut stored);
        assert_eq!(stored.title, "b");
        assert!(stored.important);
        assert_eq!(stored.tags, vec!["Work".to_owned()]);
    }

    #[test]
    fn stamps_always_move_forward() {
        let future = now() + Duration::seconds(60);
        assert_eq!(next_stamp(future), future + Duration::microseconds(1));
        let past = now() - Duration::seconds(60);
        assert!(next_stamp(past) > past);
    }

    #[test]
    fn unknown_names_fall_back_to_defaults() {
        assert_eq!(NoteFilter::parse("trash"), NoteFilter::Active);
        assert_eq!(NoteSort::parse(""), NoteSort::Newest);
        assert_eq!(NoteSort::parse("alpha-desc"), NoteSort::AlphaDesc);
    }

    #[test]
    fn important_filter_skips_trash() {
        let filter = NoteFilter::Important;
        assert!(filter.admits(&note(1, "a", true, false, 0)));
        assert!(!filter.admits(&note(2, "b", true, true, 0)));
    }

    #[test]
    fn search_covers_title_content_and_tags() {
        let n = note(1, "Shopping", false, false, 0);
        let query = |s| NoteQuery::new(NoteFilter::All, Some(s), NoteSort::Newest);
        assert!(query("shop").admits(&n));
        assert!(query("CONTENT OF").admits(&n));
        assert!(query("wor").admits(&n));
        assert!(!query("gym").admits(&n));
        assert_eq!(NoteQuery::new(NoteFilter::All, Some("  "), NoteSort::Newest).search, None);
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        let query = NoteQuery::new(NoteFilter::All, Some("50%_off\\"), NoteSort::Newest);
        assert_eq!(query.like_pattern().unwrap(), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn sort_orders() {
        let a = note(1, "beta", false, false, 5);
        let b = note(2, "Alpha", true, false, 1);
        let c = note(3, "gamma", false, false, 9);
        let ids = |sort: NoteSort| {
            let mut v = vec![a.clone(), b.clone(), c.clone()];
            v.sort_by(|x, y| sort.compare(x, y));
            v.iter().map(|n| n.id).collect::<Vec<_>>()
        };
        assert_eq!(ids(NoteSort::Newest), vec![3, 1, 2]);
        assert_eq!(ids(NoteSort::Oldest), vec![2, 1, 3]);
        assert_eq!(ids(NoteSort::AlphaAsc), vec![2, 1, 3]);
        assert_eq!(ids(NoteSort::AlphaDesc), vec![3, 1, 2]);
        assert_eq!(ids(NoteSort::Important), vec![2, 3, 1]);
    }
}

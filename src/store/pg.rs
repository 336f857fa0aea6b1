use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::dsl::sql;
use diesel::pg::PgConnection;
use diesel::r2d2::ConnectionManager;
use diesel::sql_types::{Bool, Text};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use super::NoteRepository;
use crate::{
    errors::ServerError,
    models::note::{next_stamp, InsertNote, Note, NoteChangeset, NoteFilter, NoteQuery, NoteSort},
    schema::notes::dsl::*,
};

pub type Pool = r2d2::Pool<ConnectionManager<PgConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

// Byte order on the lowered title, so sorting ignores the database locale.
const ALPHA_KEY: &str = r#"lower(notes.title) COLLATE "C""#;

/// Notes kept in PostgreSQL, reached through an r2d2 pool.
pub struct PgNoteStore {
    pool: Pool,
}

impl PgNoteStore {
    pub fn new(database_url: &str, max_size: u32) -> Result<Self, ServerError> {
        let manager = ConnectionManager::<PgConnection>::new(database_url);
        let pool = r2d2::Pool::builder().max_size(max_size).build(manager)?;
        Ok(PgNoteStore { pool })
    }

    pub fn run_migrations(&self) -> Result<(), ServerError> {
        let mut connection = self.pool.get()?;
        let applied = connection
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| {
                log::error!("{e}");
                ServerError::MigrationError
            })?;
        for version in applied {
            log::info!("applied migration {version}");
        }
        Ok(())
    }

    /// Locks the row, stamps a fresh `updated_at` and hands it to `apply`.
    fn touch<F>(&self, note_id: i64, apply: F) -> Result<Note, ServerError>
    where
        F: FnOnce(&mut PgConnection, DateTime<Utc>) -> QueryResult<Note>,
    {
        let mut connection = self.pool.get()?;
        connection.transaction::<Note, ServerError, _>(|conn| {
            let previous = notes
                .find(note_id)
                .select(updated_at)
                .for_update()
                .first::<DateTime<Utc>>(conn)
                .optional()?
                .ok_or_else(|| ServerError::not_found(note_id))?;
            Ok(apply(conn, next_stamp(previous))?)
        })
    }
}

impl NoteRepository for PgNoteStore {
    fn list(&self, query: &NoteQuery) -> Result<Vec<Note>, ServerError> {
        let mut connection = self.pool.get()?;

        let mut statement = notes.into_boxed();
        statement = match query.filter {
            NoteFilter::Active => statement.filter(deleted.eq(false)),
            NoteFilter::All => statement,
            NoteFilter::Important => statement.filter(important.eq(true).and(deleted.eq(false))),
            NoteFilter::Deleted => statement.filter(deleted.eq(true)),
        };
        if let Some(pattern) = query.like_pattern() {
            // Each tag on its own; a term must not span two tags.
            let in_tags = sql::<Bool>("EXISTS (SELECT 1 FROM unnest(notes.tags) AS tag WHERE tag ILIKE ")
                .bind::<Text, _>(pattern.clone())
                .sql(")");
            statement = statement.filter(
                title
                    .ilike(pattern.clone())
                    .or(content.ilike(pattern))
                    .or(in_tags),
            );
        }
        statement = match query.sort {
            NoteSort::Newest => statement.order((updated_at.desc(), id.desc())),
            NoteSort::Oldest => statement.order((updated_at.asc(), id.asc())),
            NoteSort::AlphaAsc => statement.order((sql::<Text>(ALPHA_KEY).asc(), id.asc())),
            NoteSort::AlphaDesc => statement.order((sql::<Text>(ALPHA_KEY).desc(), id.asc())),
            NoteSort::Important => {
                statement.order((important.desc(), updated_at.desc(), id.desc()))
            }
        };

        Ok(statement.load::<Note>(&mut connection)?)
    }

    fn find(&self, note_id: i64) -> Result<Note, ServerError> {
        let mut connection = self.pool.get()?;
        notes
            .find(note_id)
            .first::<Note>(&mut connection)
            .optional()?
            .ok_or_else(|| ServerError::not_found(note_id))
    }

    fn insert(&self, note: InsertNote) -> Result<Note, ServerError> {
        let mut connection = self.pool.get()?;
        Ok(diesel::insert_into(notes)
            .values(&note)
            .get_result::<Note>(&mut connection)?)
    }

    fn update(&self, note_id: i64, changes: NoteChangeset) -> Result<Note, ServerError> {
        self.touch(note_id, |conn, stamp| {
            diesel::update(notes.find(note_id))
                .set((changes, updated_at.eq(stamp)))
                .get_result(conn)
        })
    }

    fn set_important(&self, note_id: i64, value: bool) -> Result<Note, ServerError> {
        self.touch(note_id, |conn, stamp| {
            diesel::update(notes.find(note_id))
                .set((important.eq(value), updated_at.eq(stamp)))
                .get_result(conn)
        })
    }

    fn set_deleted(&self, note_id: i64, value: bool) -> Result<Note, ServerError> {
        self.touch(note_id, |conn, stamp| {
            diesel::update(notes.find(note_id))
                .set((deleted.eq(value), updated_at.eq(stamp)))
                .get_result(conn)
        })
    }

    fn remove(&self, note_id: i64) -> Result<Note, ServerError> {
        let mut connection = self.pool.get()?;
        diesel::delete(notes.find(note_id))
            .get_result::<Note>(&mut connection)
            .optional()?
            .ok_or_else(|| ServerError::not_found(note_id))
    }

    fn remove_all(&self) -> Result<usize, ServerError> {
        let mut connection = self.pool.get()?;
        let count = diesel::delete(notes).execute(&mut connection)?;
        log::info!("removed all {count} notes");
        Ok(count)
    }

    fn remove_deleted(&self) -> Result<usize, ServerError> {
        let mut connection = self.pool.get()?;
        let count = diesel::delete(notes.filter(deleted.eq(true))).execute(&mut connection)?;
        log::info!("emptied trash, {count} notes removed");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{contract, NoteStore};

    // Needs a disposable database; the suite wipes the notes table.
    #[test]
    fn satisfies_repository_contract() {
        let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
            eprintln!("TEST_DATABASE_URL not set, skipping");
            return;
        };
        let store = PgNoteStore::new(&url, 2).unwrap();
        store.run_migrations().unwrap();
        contract::run(NoteStore::new(store));
    }
}

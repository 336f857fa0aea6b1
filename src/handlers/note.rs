use actix_web::web;

use crate::{errors::ServerError, store::NoteStore};

pub mod mutate;
pub mod query;

/// Runs a store call on the blocking pool.
pub(crate) async fn blocking<F, T>(store: &web::Data<NoteStore>, f: F) -> Result<T, ServerError>
where
    F: FnOnce(&NoteStore) -> Result<T, ServerError> + Send + 'static,
    T: Send + 'static,
{
    let store = store.get_ref().clone();
    web::block(move || f(&store)).await?
}

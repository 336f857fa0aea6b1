//! Client side of the notes app: HTTP bindings plus the page state they feed.

pub mod api;
pub mod cache;
pub mod debounce;
pub mod session;
pub mod state;
pub mod transfer;
pub mod view;

pub use api::{ClientError, NotesApi};
pub use cache::NotesCache;
pub use session::{ImportReport, NotesSession};
pub use state::{Action, ClientState, Editor, Notification, NotificationKind};
pub use view::{CardAction, CardView};

//! Client-side state for the notes board: the local list of notes, optimistic
//! pinning and the debounced search filter, talking to the JSON API through
//! the `NotesApi` seam.

mod api;
mod board;
mod debounce;

pub use api::{HttpNotesApi, NotesApi};
pub use board::{Confirm, NoteBoard};
pub use debounce::Debounce;

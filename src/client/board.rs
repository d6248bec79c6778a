use super::{api::NotesApi, debounce::Debounce};
use crate::{
    config,
    models::{display_order, CreateNote, Note, UpdateNote},
};

/// Asked before a delete is sent. Any `Fn(&Note) -> bool` will do.
pub trait Confirm {
    fn confirm(&self, note: &Note) -> bool;
}

impl<F: Fn(&Note) -> bool> Confirm for F {
    fn confirm(&self, note: &Note) -> bool {
        self(note)
    }
}

/// Local view of the user's notes. Network failures are logged and leave the
/// board as it was, or resync it from the server.
pub struct NoteBoard<A> {
    api: A,
    notes: Vec<Note>,
    archived: Vec<Note>,
    search: Debounce<String>,
    loading: bool,
}

impl<A: NotesApi> NoteBoard<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            notes: vec![],
            archived: vec![],
            search: Debounce::new(config::SEARCH_DEBOUNCE, String::new()),
            loading: true,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Active notes, pinned first.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn archived(&self) -> &[Note] {
        &self.archived
    }

    /// True until the first fetch of active notes completes.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// What is in the search box right now, settled or not.
    pub fn search_text(&self) -> &str {
        self.search.latest()
    }

    pub async fn refresh(&mut self) {
        match self.api.list_active().await {
            Ok(notes) => self.notes = notes,
            Err(e) => tracing::error!("failed to fetch notes: {e:#}"),
        }
        self.loading = false;
    }

    pub async fn refresh_archive(&mut self) {
        match self.api.list_archived().await {
            Ok(notes) => self.archived = notes,
            Err(e) => tracing::error!("failed to fetch archived notes: {e:#}"),
        }
    }

    pub fn search(&mut self, text: impl Into<String>) {
        self.search.push(text.into());
    }

    /// Active notes matching the settled search text.
    pub fn visible(&mut self) -> Vec<&Note> {
        let query = self.search.settle();
        self.notes
            .iter()
            .filter(|n| n.matches_search(query))
            .collect()
    }

    /// Like `visible`, after waiting out any pending keystrokes.
    pub async fn settle_search(&mut self) -> Vec<&Note> {
        self.search.settled().await;
        self.visible()
    }

    /// Submitting a form with neither a title nor content does nothing.
    /// Returns whether a note was created.
    pub async fn create(&mut self, note: CreateNote) -> bool {
        let blank = |s: &Option<String>| {
            s.as_deref().map_or(true, |s| s.trim().is_empty())
        };
        let no_items = note.checklist_items.as_ref().map_or(true, Vec::is_empty);
        if blank(&note.title) && blank(&note.content) && no_items {
            return false;
        }

        let created = match self.api.create(&note).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!("failed to create note: {e:#}");
                false
            }
        };
        self.refresh().await;
        created
    }

    /// Flip a note's pin and move it to its new place. Returns the new pin
    /// state, or `None` if the note is not on the board.
    pub fn pin_locally(&mut self, id: i64) -> Option<bool> {
        let note = self.notes.iter_mut().find(|n| n.id == id)?;
        note.pinned = !note.pinned;
        let pinned = note.pinned;
        self.notes.sort_by(display_order);
        Some(pinned)
    }

    /// Optimistic: the board reorders before the server answers, and
    /// refetches if the server refuses.
    pub async fn toggle_pin(&mut self, id: i64) {
        let Some(pinned) = self.pin_locally(id) else {
            return;
        };
        match self.api.update(id, &UpdateNote::pinned(pinned)).await {
            Ok(note) => self.replace(note),
            Err(e) => {
                tracing::error!(id, "failed to update pin state: {e:#}");
                self.refresh().await;
            }
        }
    }

    pub async fn archive(&mut self, id: i64) {
        if let Err(e) = self.api.update(id, &UpdateNote::archived(true)).await
        {
            tracing::error!(id, "failed to archive note: {e:#}");
        }
        self.refresh().await;
    }

    pub async fn unarchive(&mut self, id: i64) {
        if let Err(e) = self.api.update(id, &UpdateNote::archived(false)).await
        {
            tracing::error!(id, "failed to unarchive note: {e:#}");
        }
        self.refresh_archive().await;
        self.refresh().await;
    }

    /// Nothing is sent unless `confirm` agrees. Returns whether the delete
    /// request went out.
    pub async fn delete(&mut self, id: i64, confirm: &impl Confirm) -> bool {
        let Some(note) = self.find(id) else {
            return false;
        };
        if !confirm.confirm(note) {
            return false;
        }
        if let Err(e) = self.api.delete(id).await {
            tracing::error!(id, "failed to delete note: {e:#}");
        }
        self.refresh().await;
        self.refresh_archive().await;
        true
    }

    /// Send an edit and take the server's copy of the note.
    pub async fn save_edit(&mut self, id: i64, patch: UpdateNote) {
        match self.api.update(id, &patch).await {
            Ok(note) => self.replace(note),
            Err(e) => tracing::error!(id, "failed to save note: {e:#}"),
        }
    }

    /// Sends the note's whole checklist with one item flipped.
    pub async fn toggle_item(&mut self, id: i64, item_id: &str) {
        let Some(items) = self.find(id).and_then(|n| n.toggled_item(item_id))
        else {
            return;
        };
        match self.api.update(id, &UpdateNote::checklist_items(items)).await {
            Ok(note) => self.replace(note),
            Err(e) => {
                tracing::error!(id, item_id, "failed to toggle item: {e:#}");
                self.refresh().await;
            }
        }
    }

    fn find(&self, id: i64) -> Option<&Note> {
        self.notes
            .iter()
            .chain(self.archived.iter())
            .find(|n| n.id == id)
    }

    fn replace(&mut self, note: Note) {
        let slot = self
            .notes
            .iter_mut()
            .chain(self.archived.iter_mut())
            .find(|n| n.id == note.id);
        if let Some(slot) = slot {
            *slot = note;
        }
        self.notes.sort_by(display_order);
    }
}

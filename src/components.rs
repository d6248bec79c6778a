// In many cases, we need to do a let binding to satisfy the borrow checker
// and for some reason, clippy identifies those as unnecessary.
#![allow(clippy::let_and_return)]

use super::{
    config,
    models::{ChecklistItem, Color, Note},
};
use ammonia::clean_text;
use std::fmt::Write;

pub trait Component {
    /// Render the component to a HTML string. By convention, the
    /// implementation should sanitize all string properties at render-time
    fn render(&self) -> String;
}

/// Escape user-provided text for both element and attribute positions.
fn esc(s: &str) -> String {
    clean_text(s)
}

fn bg_class(color: Color) -> &'static str {
    match color {
        Color::Yellow => "bg-amber-100",
        Color::Green => "bg-emerald-100",
        Color::Blue => "bg-blue-100",
        Color::Pink => "bg-pink-100",
        Color::Purple => "bg-violet-100",
        Color::Gray => "bg-gray-100",
    }
}

fn ring_class(color: Color) -> &'static str {
    match color {
        Color::Yellow => "peer-checked:ring-amber-300",
        Color::Green => "peer-checked:ring-emerald-300",
        Color::Blue => "peer-checked:ring-blue-300",
        Color::Pink => "peer-checked:ring-pink-300",
        Color::Purple => "peer-checked:ring-violet-300",
        Color::Gray => "peer-checked:ring-gray-300",
    }
}

pub struct Page<'a> {
    pub title: String,
    pub children: Box<dyn Component + 'a>,
}

impl Component for Page<'_> {
    fn render(&self) -> String {
        format!(
            r#"<!DOCTYPE html>
            <html>
                <head>
                    <meta name="viewport" content="width=device-width, initial-scale=1.0"></meta>
                    <title>{title}</title>
                    <script src="{tailwind}"></script>
                </head>
                <body class="min-h-screen bg-gray-50">
                    {body_html}
                    <div id="dialog"></div>
                    <script src="{htmx}"></script>
                </body>
            </html>
            "#,
            title = esc(&self.title),
            tailwind = config::TAILWIND_SRC,
            htmx = config::HTMX_SRC,
            body_html = self.children.render()
        )
    }
}

pub struct Home;
impl Component for Home {
    fn render(&self) -> String {
        let search = SearchBar.render();
        let create_form = CreateNoteForm::collapsed().render();
        format!(
            r##"
            <header class="bg-white border-b border-gray-200 sticky top-0 z-10">
                <div class="max-w-5xl mx-auto px-4 sm:px-6 py-4 flex items-center justify-between gap-4">
                    <h1 class="text-xl sm:text-2xl font-semibold text-gray-900">Notes</h1>
                    {search}
                    <a class="text-sm text-gray-600 hover:underline" href="/archive">Archive</a>
                </div>
            </header>
            <main class="max-w-5xl mx-auto px-4 sm:px-6 py-8">
                {create_form}
                <div
                    id="notes"
                    hx-get="/ui/notes"
                    hx-trigger="load, reload-notes from:body"
                    hx-include="#search"
                >
                    <p class="text-gray-500 text-center">Loading notes...</p>
                </div>
            </main>
            "##
        )
    }
}

pub struct SearchBar;
impl Component for SearchBar {
    fn render(&self) -> String {
        let delay = config::SEARCH_DEBOUNCE.as_millis();
        format!(
            r##"
            <input
                id="search"
                type="search"
                name="q"
                placeholder="Search notes"
                autocomplete="off"
                class="flex-1 max-w-md rounded-lg border border-gray-200 px-3 py-1.5 text-sm"
                hx-get="/ui/notes"
                hx-trigger="keyup changed delay:{delay}ms, search"
                hx-target="#notes"
            />
            "##
        )
    }
}

pub struct NoteGrid<'a> {
    pub notes: &'a [Note],
    pub query: &'a str,
}
impl Component for NoteGrid<'_> {
    fn render(&self) -> String {
        if self.notes.is_empty() {
            return if self.query.trim().is_empty() {
                EmptyState {
                    headline: "No notes yet",
                    hint: "Create your first note to get started",
                }
                .render()
            } else {
                EmptyState {
                    headline: "No matching notes",
                    hint: "Try a different search",
                }
                .render()
            };
        }
        let cards = self.notes.iter().fold(String::new(), |mut str, note| {
            let _ = write!(str, "{}", NoteCard { note }.render());
            str
        });
        format!(
            r#"<div class="grid grid-cols-1 md:grid-cols-2 lg:grid-cols-3 gap-4">{cards}</div>"#
        )
    }
}

struct EmptyState {
    headline: &'static str,
    hint: &'static str,
}
impl Component for EmptyState {
    fn render(&self) -> String {
        format!(
            r#"
            <div class="text-center py-16">
                <p class="text-gray-500 text-lg">{}</p>
                <p class="text-gray-400 text-sm mt-2">{}</p>
            </div>
            "#,
            self.headline, self.hint
        )
    }
}

pub struct NoteCard<'a> {
    pub note: &'a Note,
}
impl Component for NoteCard<'_> {
    fn render(&self) -> String {
        let note = self.note;
        let id = note.id;
        let bg = bg_class(note.color);
        let title = esc(&note.title);
        let pin_indicator = if note.pinned {
            format!(
                r#"<div class="absolute top-2 right-2">{}</div>"#,
                Icon::PinFilled.render()
            )
        } else {
            "".to_string()
        };
        let text = match note.content() {
            Some(content) => format!(
                r#"<p class="text-gray-700 text-sm whitespace-pre-wrap">{}</p>"#,
                esc(content)
            ),
            None => "".to_string(),
        };
        let checklist = match note.checklist_items() {
            Some(items) => ChecklistPreview {
                note_id: id,
                items,
                interactive: true,
            }
            .render(),
            None => "".to_string(),
        };
        let (pin_label, pin_icon) = if note.pinned {
            ("Unpin", Icon::PinFilled)
        } else {
            ("Pin", Icon::PinOutline)
        };
        let pin_icon = pin_icon.render();
        let archive_icon = Icon::Archive.render();
        let delete_icon = Icon::Delete.render();
        format!(
            r##"
            <div class="group relative rounded-lg p-4 pb-10 shadow-sm border border-gray-200 transition-shadow hover:shadow-md {bg}">
                {pin_indicator}
                <div
                    class="cursor-pointer"
                    hx-get="/ui/notes/{id}/edit"
                    hx-target="#dialog"
                >
                    <h3 class="font-medium text-gray-900 mb-2 pr-6">{title}</h3>
                    {text}
                </div>
                {checklist}
                <div class="absolute bottom-2 right-2 flex gap-1 opacity-0 group-hover:opacity-100 transition-opacity">
                    <button
                        hx-post="/ui/notes/{id}/pin"
                        hx-swap="none"
                        class="p-1.5 rounded-full hover:bg-black/10 transition-colors"
                        title="{pin_label}"
                        aria-label="{pin_label} note"
                    >{pin_icon}</button>
                    <button
                        hx-post="/ui/notes/{id}/archive"
                        hx-swap="none"
                        class="p-1.5 rounded-full hover:bg-black/10 transition-colors"
                        title="Archive"
                        aria-label="Archive note"
                    >{archive_icon}</button>
                    <button
                        hx-delete="/ui/notes/{id}"
                        hx-swap="none"
                        hx-confirm="{confirm}"
                        class="p-1.5 rounded-full hover:bg-black/10 transition-colors"
                        title="Delete"
                        aria-label="Delete note"
                    >{delete_icon}</button>
                </div>
            </div>
            "##,
            confirm = DELETE_CONFIRMATION,
        )
    }
}

pub const DELETE_CONFIRMATION: &str =
    "Are you sure you want to delete this note?";

pub struct ChecklistPreview<'a> {
    pub note_id: i64,
    pub items: &'a [ChecklistItem],
    /// Whether items can be ticked from the card. Archived cards are
    /// read-only.
    pub interactive: bool,
}
impl Component for ChecklistPreview<'_> {
    fn render(&self) -> String {
        let note_id = self.note_id;
        let visible = self.items.iter().take(config::MAX_VISIBLE_CHECKLIST_ITEMS);
        let rows = visible.fold(String::new(), |mut str, item| {
            let icon = Icon::Checkbox(item.checked).render();
            let text_class = if item.checked {
                "text-gray-500 line-through"
            } else {
                "text-gray-700"
            };
            let text = esc(&item.text);
            if self.interactive {
                let _ = write!(
                    str,
                    r#"
                    <form
                        class="flex items-center gap-2 text-sm"
                        hx-post="/ui/notes/{note_id}/items/toggle"
                        hx-swap="none"
                    >
                        <input type="hidden" name="item" value="{item_id}" />
                        <button type="submit" class="flex-shrink-0">{icon}</button>
                        <span class="{text_class}">{text}</span>
                    </form>
                    "#,
                    item_id = esc(&item.id),
                );
            } else {
                let _ = write!(
                    str,
                    r#"
                    <div class="flex items-center gap-2 text-sm">
                        {icon}
                        <span class="{text_class}">{text}</span>
                    </div>
                    "#
                );
            }
            str
        });
        let hidden = self
            .items
            .len()
            .saturating_sub(config::MAX_VISIBLE_CHECKLIST_ITEMS);
        let more = if hidden > 0 {
            format!(r#"<p class="text-xs text-gray-500 mt-1">+ {hidden} more</p>"#)
        } else {
            "".to_string()
        };
        format!(r#"<div class="space-y-1">{rows}{more}</div>"#)
    }
}

/// The "Take a note..." form. Collapsed it is a single clickable
/// placeholder; expanded it posts to `/ui/notes`.
#[derive(Default)]
pub struct CreateNoteForm<'a> {
    pub expanded: bool,
    pub title: &'a str,
    pub content: &'a str,
    pub color: Color,
    pub checklist: bool,
    pub error: Option<&'a str>,
}

impl CreateNoteForm<'_> {
    pub fn collapsed() -> Self {
        Self::default()
    }
}

impl Component for CreateNoteForm<'_> {
    fn render(&self) -> String {
        if !self.expanded {
            return r##"
            <div
                id="create-form"
                class="max-w-xl mx-auto mb-8"
                hx-get="/ui/create-form?expanded=true"
                hx-swap="outerHTML"
            >
                <div class="rounded-lg shadow border border-gray-200 bg-white p-4 cursor-text hover:shadow-md transition-shadow">
                    <span class="text-gray-500">Take a note...</span>
                </div>
            </div>
            "##
            .to_string();
        }
        let bg = bg_class(self.color);
        let title = esc(self.title);
        let content = esc(self.content);
        let checked = if self.checklist { "checked" } else { "" };
        let error = ErrorMessage(self.error).render();
        let colors = ColorPicker {
            selected: self.color,
        }
        .render();
        format!(
            r##"
            <form
                id="create-form"
                hx-post="/ui/notes"
                hx-swap="outerHTML"
                class="max-w-xl mx-auto mb-8 rounded-lg shadow-md border border-gray-200 overflow-hidden {bg}"
            >
                <div class="p-4">
                    <input
                        type="text"
                        name="title"
                        placeholder="Title"
                        value="{title}"
                        class="w-full bg-transparent border-none outline-none font-medium text-gray-900 placeholder-gray-500 mb-2"
                        autofocus
                    />
                    <textarea
                        name="content"
                        placeholder="Take a note..."
                        rows="3"
                        class="w-full bg-transparent border-none outline-none resize-none text-gray-700 placeholder-gray-500"
                    >{content}</textarea>
                    <label class="flex items-center gap-2 text-sm text-gray-600">
                        <input type="checkbox" name="checklist" {checked} />
                        Checklist (one item per line)
                    </label>
                    {error}
                </div>
                <div class="flex items-center justify-between px-4 py-2 border-t border-gray-200/50">
                    {colors}
                    <div class="flex gap-2">
                        <button
                            type="button"
                            hx-post="/ui/create-form/close"
                            hx-target="#create-form"
                            hx-swap="outerHTML"
                            class="px-4 py-1.5 text-sm text-gray-600 hover:bg-black/5 rounded transition-colors"
                        >Close</button>
                        <button
                            type="submit"
                            class="px-4 py-1.5 text-sm bg-gray-800 text-white rounded hover:bg-gray-700 transition-colors"
                        >Save</button>
                    </div>
                </div>
            </form>
            "##
        )
    }
}

pub struct EditNoteDialog<'a> {
    pub note: &'a Note,
    pub error: Option<&'a str>,
}
impl Component for EditNoteDialog<'_> {
    fn render(&self) -> String {
        let note = self.note;
        let id = note.id;
        let bg = bg_class(note.color);
        let title = esc(&note.title);
        let (body, placeholder) = match note.checklist_items() {
            Some(items) => (ChecklistItem::to_lines(items), "One item per line"),
            None => (
                note.content().unwrap_or_default().to_string(),
                "Note content...",
            ),
        };
        let body = esc(&body);
        let error = ErrorMessage(self.error).render();
        let colors = ColorPicker {
            selected: note.color,
        }
        .render();
        format!(
            r##"
            <div class="fixed inset-0 z-20 flex items-center justify-center bg-black/50 p-4">
                <form
                    hx-post="/ui/notes/{id}"
                    hx-target="#dialog"
                    class="w-full max-w-xl rounded-lg shadow-xl overflow-hidden {bg}"
                >
                    <div class="p-3 sm:p-4">
                        <input
                            type="text"
                            name="title"
                            placeholder="Title"
                            value="{title}"
                            class="w-full bg-transparent border-none outline-none font-medium text-gray-900 placeholder-gray-500 mb-2 text-base sm:text-lg"
                        />
                        <textarea
                            name="content"
                            placeholder="{placeholder}"
                            rows="6"
                            class="w-full bg-transparent border-none outline-none resize-none text-gray-700 placeholder-gray-500"
                        >{body}</textarea>
                        {error}
                    </div>
                    <div class="flex items-center justify-between px-3 sm:px-4 py-2 sm:py-3 border-t border-gray-200/50">
                        {colors}
                        <div class="flex gap-2">
                            <button
                                type="button"
                                onclick="document.getElementById('dialog').innerHTML = ''"
                                class="px-3 sm:px-4 py-1.5 text-sm text-gray-600 hover:bg-black/5 rounded transition-colors"
                            >Close</button>
                            <button
                                type="submit"
                                class="px-3 sm:px-4 py-1.5 text-sm bg-gray-800 text-white rounded hover:bg-gray-700 transition-colors"
                            >Save</button>
                        </div>
                    </div>
                </form>
            </div>
            "##
        )
    }
}

struct ColorPicker {
    selected: Color,
}
impl Component for ColorPicker {
    fn render(&self) -> String {
        let swatches = Color::PALETTE.iter().fold(String::new(), |mut str, c| {
            let checked = if *c == self.selected { "checked" } else { "" };
            let _ = write!(
                str,
                r#"
                <label title="{name}">
                    <input type="radio" name="color" value="{name}" class="sr-only peer" {checked} />
                    <span
                        class="block w-6 h-6 rounded-full border border-gray-300 cursor-pointer transition-all peer-checked:ring-2 {bg} {ring}"
                        aria-label="Set color to {name}"
                    ></span>
                </label>
                "#,
                name = c.as_str(),
                bg = bg_class(*c),
                ring = ring_class(*c),
            );
            str
        });
        format!(r#"<div class="flex gap-1">{swatches}</div>"#)
    }
}

struct ErrorMessage<'a>(Option<&'a str>);
impl Component for ErrorMessage<'_> {
    fn render(&self) -> String {
        match self.0 {
            Some(msg) => format!(
                r#"<p class="text-sm text-red-600 mt-2" role="alert">{}</p>"#,
                esc(msg)
            ),
            None => "".to_string(),
        }
    }
}

pub struct ArchivePage;
impl Component for ArchivePage {
    fn render(&self) -> String {
        let back = Icon::BackArrow.render();
        format!(
            r##"
            <header class="bg-white border-b border-gray-200 sticky top-0 z-10">
                <div class="max-w-5xl mx-auto px-4 sm:px-6 py-4 flex items-center gap-3 sm:gap-4">
                    <a
                        href="/"
                        class="p-2 -ml-2 rounded-full hover:bg-gray-100 transition-colors"
                        aria-label="Back to notes"
                    >{back}</a>
                    <h1 class="text-xl sm:text-2xl font-semibold text-gray-900">Archive</h1>
                </div>
            </header>
            <main class="max-w-5xl mx-auto px-4 sm:px-6 py-6 sm:py-8">
                <div
                    id="archived"
                    hx-get="/ui/archived"
                    hx-trigger="load, reload-notes from:body"
                >
                    <p class="text-gray-500 text-center">Loading archived notes...</p>
                </div>
            </main>
            "##
        )
    }
}

pub struct ArchivedGrid<'a> {
    pub notes: &'a [Note],
}
impl Component for ArchivedGrid<'_> {
    fn render(&self) -> String {
        if self.notes.is_empty() {
            return EmptyState {
                headline: "No archived notes",
                hint: "Notes you archive will appear here",
            }
            .render();
        }
        let cards = self.notes.iter().fold(String::new(), |mut str, note| {
            let _ = write!(str, "{}", ArchivedNoteCard { note }.render());
            str
        });
        format!(
            r#"<div class="grid grid-cols-1 md:grid-cols-2 lg:grid-cols-3 gap-4">{cards}</div>"#
        )
    }
}

struct ArchivedNoteCard<'a> {
    note: &'a Note,
}
impl Component for ArchivedNoteCard<'_> {
    fn render(&self) -> String {
        let note = self.note;
        let id = note.id;
        let bg = bg_class(note.color);
        let title = esc(&note.title);
        let body = match (note.checklist_items(), note.content()) {
            (Some(items), _) if !items.is_empty() => ChecklistPreview {
                note_id: id,
                items,
                interactive: false,
            }
            .render(),
            (_, Some(content)) => format!(
                r#"<p class="text-gray-700 text-sm whitespace-pre-wrap">{}</p>"#,
                esc(content)
            ),
            _ => "".to_string(),
        };
        let unarchive_icon = Icon::Unarchive.render();
        let delete_icon = Icon::Delete.render();
        format!(
            r##"
            <div class="group relative rounded-lg p-3 sm:p-4 pb-10 shadow-sm border border-gray-200/80 transition-all duration-200 ease-in-out hover:shadow-lg {bg}">
                <h3 class="font-medium text-gray-900 mb-2">{title}</h3>
                {body}
                <div class="absolute bottom-2 right-2 flex gap-1 opacity-0 group-hover:opacity-100 transition-opacity duration-200">
                    <button
                        hx-post="/ui/notes/{id}/unarchive"
                        hx-swap="none"
                        class="p-1.5 rounded-full hover:bg-black/10 transition-colors duration-150"
                        title="Unarchive"
                        aria-label="Unarchive note"
                    >{unarchive_icon}</button>
                    <button
                        hx-delete="/ui/notes/{id}"
                        hx-swap="none"
                        hx-confirm="{confirm}"
                        class="p-1.5 rounded-full hover:bg-black/10 transition-colors duration-150"
                        title="Delete"
                        aria-label="Delete note"
                    >{delete_icon}</button>
                </div>
            </div>
            "##,
            confirm = DELETE_CONFIRMATION,
        )
    }
}

enum Icon {
    PinFilled,
    PinOutline,
    Archive,
    Unarchive,
    Delete,
    BackArrow,
    Checkbox(bool),
}
impl Component for Icon {
    fn render(&self) -> String {
        const PIN: &str = "M16 4l3 3-1.5 1.5L16 7l-4 4 1 5-1.5 1.5-3-3-4.5 4.5-1-1 4.5-4.5-3-3L6 9l5 1 4-4-1.5-1.5L16 4z";
        let stroked = |d: &str, class: &str| {
            format!(
                r#"<svg class="{class}" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2"><path d="{d}" /></svg>"#
            )
        };
        match self {
            Icon::PinFilled => format!(
                r#"<svg class="h-4 w-4 text-gray-600" viewBox="0 0 24 24" fill="currentColor"><path d="{PIN}" /></svg>"#
            ),
            Icon::PinOutline => stroked(PIN, "h-4 w-4 text-gray-600"),
            Icon::Archive => stroked(
                "M21 8v13H3V8M1 3h22v5H1V3zM10 12h4",
                "h-4 w-4 text-gray-600",
            ),
            Icon::Unarchive => stroked(
                "M21 8v13H3V8M1 3h22v5H1V3zM12 11v6M9 14l3-3 3 3",
                "h-4 w-4 text-gray-600",
            ),
            Icon::Delete => stroked(
                "M3 6h18M8 6V4h8v2M19 6v14a2 2 0 01-2 2H7a2 2 0 01-2-2V6M10 11v6M14 11v6",
                "h-4 w-4 text-gray-600",
            ),
            Icon::BackArrow => stroked(
                "M19 12H5M12 19l-7-7 7-7",
                "h-5 w-5 sm:h-6 sm:w-6 text-gray-600",
            ),
            Icon::Checkbox(true) => r#"<svg class="h-4 w-4" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2"><rect x="3" y="3" width="18" height="18" rx="2" fill="currentColor" opacity="0.2" /><rect x="3" y="3" width="18" height="18" rx="2" /><path d="M9 12l2 2 4-4" stroke-linecap="round" stroke-linejoin="round" /></svg>"#.to_string(),
            Icon::Checkbox(false) => r#"<svg class="h-4 w-4" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2"><rect x="3" y="3" width="18" height="18" rx="2" /></svg>"#.to_string(),
        }
    }
}

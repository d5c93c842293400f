use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Duration;
use tracing::warn;

use crate::assistant::Conversation;
use crate::form::{CandidateForm, FormEvent};
use crate::models::{Candidate, Status};
use crate::storage::KeyValueStorage;
use crate::store::CandidateStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    Candidates,
    Assistant,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Dashboard, Tab::Candidates, Tab::Assistant];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Candidates => "Candidates",
            Tab::Assistant => "AI Assistant",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Tab::Dashboard => 0,
            Tab::Candidates => 1,
            Tab::Assistant => 2,
        }
    }

    fn next(self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    fn prev(self) -> Tab {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

/// Modal layered over the candidate list.
#[derive(Debug, Clone)]
pub enum Overlay {
    None,
    StatusPicker { selected: usize },
    ConfirmDelete,
    Form(CandidateForm),
}

pub struct App<S: KeyValueStorage> {
    pub store: CandidateStore<S>,
    pub tab: Tab,
    pub selected: usize,
    pub overlay: Overlay,
    pub chat: Conversation,
    pub chat_input: String,
    pub flash: Option<String>,
    pub should_quit: bool,
}

impl<S: KeyValueStorage> App<S> {
    pub fn new(store: CandidateStore<S>, reply_delay: Duration) -> Self {
        let delay = chrono::Duration::from_std(reply_delay).unwrap_or_else(|_| chrono::Duration::seconds(1));
        let chat = Conversation::new(delay, store.now());
        Self {
            store,
            tab: Tab::Dashboard,
            selected: 0,
            overlay: Overlay::None,
            chat,
            chat_input: String::new(),
            flash: None,
            should_quit: false,
        }
    }

    pub fn current(&self) -> Option<&Candidate> {
        self.store.candidates().get(self.selected)
    }

    /// Releases a pending assistant reply whose delay has passed.
    pub fn tick(&mut self) -> bool {
        let now = self.store.now();
        self.chat.deliver_due(now)
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        let overlay = std::mem::replace(&mut self.overlay, Overlay::None);
        let result = match overlay {
            Overlay::None => self.handle_view_key(key),
            Overlay::StatusPicker { selected } => self.handle_picker_key(key, selected),
            Overlay::ConfirmDelete => self.handle_confirm_key(key),
            Overlay::Form(form) => self.handle_form_key(key, form),
        };

        if let Err(e) = result {
            warn!(error = %e, "failed to apply change");
            self.flash = Some(format!("Error: {:#}", e));
        }
    }

    fn handle_view_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Tab => {
                self.tab = self.tab.next();
                return Ok(());
            }
            KeyCode::BackTab => {
                self.tab = self.tab.prev();
                return Ok(());
            }
            KeyCode::Esc => {
                self.should_quit = true;
                return Ok(());
            }
            _ => {}
        }

        if self.tab == Tab::Assistant {
            self.handle_chat_key(key);
            return Ok(());
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.tab = Tab::Dashboard,
            KeyCode::Char('2') => self.tab = Tab::Candidates,
            KeyCode::Char('3') => self.tab = Tab::Assistant,
            _ if self.tab == Tab::Candidates => self.handle_list_key(key),
            _ => {}
        }
        Ok(())
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.store.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Char('a') => {
                self.overlay = Overlay::Form(CandidateForm::new());
            }
            KeyCode::Char('e') => {
                if let Some(c) = self.current() {
                    self.overlay = Overlay::Form(CandidateForm::edit(c));
                }
            }
            KeyCode::Char('s') | KeyCode::Enter => {
                if let Some(c) = self.current() {
                    self.overlay = Overlay::StatusPicker {
                        selected: c.status.index(),
                    };
                }
            }
            KeyCode::Char('d') => {
                if self.current().is_some() {
                    self.overlay = Overlay::ConfirmDelete;
                }
            }
            _ => {}
        }
    }

    fn handle_picker_key(&mut self, key: KeyEvent, selected: usize) -> Result<()> {
        match key.code {
            KeyCode::Esc => {}
            KeyCode::Down | KeyCode::Char('j') => {
                self.overlay = Overlay::StatusPicker {
                    selected: (selected + 1).min(Status::ALL.len() - 1),
                };
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.overlay = Overlay::StatusPicker {
                    selected: selected.saturating_sub(1),
                };
            }
            KeyCode::Enter => {
                if let Some(id) = self.current().map(|c| c.id.clone()) {
                    self.store.set_status(&id, Status::ALL[selected])?;
                }
            }
            _ => {
                self.overlay = Overlay::StatusPicker { selected };
            }
        }
        Ok(())
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> Result<()> {
        if let KeyCode::Char('y') | KeyCode::Char('Y') = key.code {
            if let Some(c) = self.current() {
                let (id, name) = (c.id.clone(), c.name.clone());
                self.store.remove(&id)?;
                self.selected = self.selected.min(self.store.len().saturating_sub(1));
                self.flash = Some(format!("Deleted {}", name));
            }
        }
        Ok(())
    }

    fn handle_form_key(&mut self, key: KeyEvent, mut form: CandidateForm) -> Result<()> {
        match key.code {
            KeyCode::Esc => return Ok(()),
            KeyCode::Tab | KeyCode::Down => form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
            KeyCode::Left => form.cycle_status(false),
            KeyCode::Right => form.cycle_status(true),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(ch) => form.input(ch),
            KeyCode::Enter => {
                if let Some(event) = form.submit() {
                    return self.apply_form(event);
                }
            }
            _ => {}
        }
        self.overlay = Overlay::Form(form);
        Ok(())
    }

    fn apply_form(&mut self, event: FormEvent) -> Result<()> {
        match event {
            FormEvent::Create(fields) => {
                let created = self.store.create(fields)?;
                self.selected = self.store.len().saturating_sub(1);
                self.flash = Some(format!("Added {}", created.name));
            }
            FormEvent::Update { id, fields } => {
                if self.store.update(&id, fields.into())? {
                    self.flash = Some("Candidate updated".to_string());
                }
            }
        }
        Ok(())
    }

    fn handle_chat_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                let now = self.store.now();
                if self.chat.send(&self.chat_input, self.store.candidates(), now) {
                    self.chat_input.clear();
                }
            }
            KeyCode::Backspace => {
                self.chat_input.pop();
            }
            KeyCode::Char(ch) => self.chat_input.push(ch),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::{FALLBACK, Role};
    use crate::storage::MemoryStorage;
    use crate::store::Clock;
    use crate::store::test_support::ManualClock;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn new_app() -> (App<MemoryStorage>, ManualClock) {
        let clock = ManualClock::new();
        let store = CandidateStore::load(MemoryStorage::new(), Box::new(clock.clone())).unwrap();
        (App::new(store, Duration::from_millis(1000)), clock)
    }

    fn press_all(app: &mut App<MemoryStorage>, codes: &[KeyCode]) {
        for code in codes {
            app.handle_key(key(*code));
        }
    }

    #[test]
    fn test_tab_navigation() {
        let (mut app, _) = new_app();
        assert_eq!(app.tab, Tab::Dashboard);
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.tab, Tab::Candidates);
        app.handle_key(key(KeyCode::Char('3')));
        assert_eq!(app.tab, Tab::Assistant);
        // typed digits belong to the chat input here
        app.handle_key(key(KeyCode::Char('1')));
        assert_eq!(app.tab, Tab::Assistant);
        assert_eq!(app.chat_input, "1");
        app.handle_key(key(KeyCode::BackTab));
        assert_eq!(app.tab, Tab::Candidates);
    }

    #[test]
    fn test_status_picker_updates_store() {
        let (mut app, clock) = new_app();
        app.tab = Tab::Candidates;
        clock.advance(chrono::Duration::hours(1));

        // Emily Rodriguez, new
        press_all(&mut app, &[KeyCode::Char('j'), KeyCode::Char('j'), KeyCode::Char('s')]);
        assert!(matches!(app.overlay, Overlay::StatusPicker { selected: 0 }));
        press_all(&mut app, &[KeyCode::Down, KeyCode::Down, KeyCode::Enter]);

        let emily = app.current().unwrap();
        assert_eq!(emily.name, "Emily Rodriguez");
        assert_eq!(emily.status, Status::Interview);
        assert_eq!(emily.last_contact, Some(clock.now()));
        assert!(matches!(app.overlay, Overlay::None));
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let (mut app, _) = new_app();
        app.tab = Tab::Candidates;

        press_all(&mut app, &[KeyCode::Char('d'), KeyCode::Char('n')]);
        assert_eq!(app.store.len(), 3);

        press_all(&mut app, &[KeyCode::Char('d'), KeyCode::Char('y')]);
        assert_eq!(app.store.len(), 2);
        assert_eq!(app.flash.as_deref(), Some("Deleted Sarah Johnson"));
    }

    #[test]
    fn test_selection_clamped_after_deleting_last_row() {
        let (mut app, _) = new_app();
        app.tab = Tab::Candidates;
        press_all(&mut app, &[KeyCode::Char('j'), KeyCode::Char('j'), KeyCode::Char('j')]);
        assert_eq!(app.selected, 2);
        press_all(&mut app, &[KeyCode::Char('d'), KeyCode::Char('y')]);
        assert_eq!(app.selected, 1);
    }

    #[test]
    fn test_add_form_validates_then_creates() {
        let (mut app, _) = new_app();
        app.tab = Tab::Candidates;
        app.handle_key(key(KeyCode::Char('a')));
        app.handle_key(key(KeyCode::Enter));

        match &app.overlay {
            Overlay::Form(form) => assert!(!form.errors.is_empty()),
            other => panic!("form should stay open, got {:?}", other),
        }
        assert_eq!(app.store.len(), 3);

        for ch in "Ada".chars() {
            app.handle_key(key(KeyCode::Char(ch)));
        }
        app.handle_key(key(KeyCode::Tab));
        for ch in "ada@example.com".chars() {
            app.handle_key(key(KeyCode::Char(ch)));
        }
        press_all(&mut app, &[KeyCode::Tab, KeyCode::Tab]);
        for ch in "Engineer".chars() {
            app.handle_key(key(KeyCode::Char(ch)));
        }
        app.handle_key(key(KeyCode::Enter));

        assert!(matches!(app.overlay, Overlay::None));
        assert_eq!(app.store.len(), 4);
        assert_eq!(app.current().unwrap().name, "Ada");
    }

    #[test]
    fn test_edit_form_escape_discards() {
        let (mut app, _) = new_app();
        app.tab = Tab::Candidates;
        app.handle_key(key(KeyCode::Char('e')));
        app.handle_key(key(KeyCode::Char('!')));
        app.handle_key(key(KeyCode::Esc));
        assert!(matches!(app.overlay, Overlay::None));
        assert_eq!(app.store.candidates()[0].name, "Sarah Johnson");
        assert!(!app.should_quit);
    }

    #[test]
    fn test_chat_reply_arrives_after_delay() {
        let (mut app, clock) = new_app();
        app.tab = Tab::Assistant;
        for ch in "xyz123".chars() {
            app.handle_key(key(KeyCode::Char(ch)));
        }
        app.handle_key(key(KeyCode::Enter));
        assert!(app.chat_input.is_empty());
        assert!(app.chat.is_typing());
        assert!(!app.tick());

        clock.advance(chrono::Duration::milliseconds(1000));
        assert!(app.tick());
        let last = app.chat.messages().last().unwrap();
        assert_eq!(last.role, Role::Agent);
        assert_eq!(last.content, FALLBACK);
    }

    #[test]
    fn test_quit_keys() {
        let (mut app, _) = new_app();
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);

        let (mut app, _) = new_app();
        app.tab = Tab::Assistant;
        app.handle_key(key(KeyCode::Char('q')));
        assert!(!app.should_quit);
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }
}

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Style, Stylize},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, List, ListItem, ListState, Paragraph},
};
use tui_input::{Input, backend::crossterm::EventHandler};

use crate::{
    error::Result,
    storage::Persistence,
    store::{NoteStore, Submitted},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Input,
    List,
}

pub struct App<P: Persistence> {
    store: NoteStore<P>,
    input: Input,
    focus: Focus,
    list_index: usize,
    status: Option<String>,
}

impl<P: Persistence> App<P> {
    pub fn new(store: NoteStore<P>) -> Self {
        let input = Input::default().with_value(store.draft().to_string());
        App {
            store,
            input,
            focus: Focus::Input,
            list_index: 0,
            status: None,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> std::io::Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;
            let event = crossterm::event::read()?;

            if let Event::Key(key) = event {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if self.handle_key(key) {
                    return Ok(());
                }
            }
        }
    }

    /// Returns true when the app should exit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }

        match self.focus {
            Focus::Input => match key.code {
                KeyCode::Enter => {
                    let result = self.store.submit_draft();
                    if let Ok(Submitted::Added(index) | Submitted::Updated(index)) = result {
                        self.list_index = index;
                    }
                    self.report(result);
                    self.sync_input();
                }
                KeyCode::Tab => self.focus = Focus::List,
                KeyCode::Esc => {
                    if self.store.is_editing() {
                        self.store.cancel_edit();
                    } else if !self.store.draft().is_empty() {
                        self.store.set_draft("");
                    } else {
                        return true;
                    }
                    self.sync_input();
                }
                _ => {
                    self.input.handle_event(&Event::Key(key));
                    self.store.set_draft(self.input.value());
                }
            },
            Focus::List => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return true,
                KeyCode::Char('j') | KeyCode::Down => self.select_next(),
                KeyCode::Char('k') | KeyCode::Up => self.select_previous(),
                KeyCode::Char('e') | KeyCode::Enter => {
                    if !self.store.is_empty() {
                        let result = self.store.begin_edit(self.list_index);
                        self.report(result);
                        self.sync_input();
                        self.focus = Focus::Input;
                    }
                }
                KeyCode::Char('d') | KeyCode::Delete => {
                    if !self.store.is_empty() {
                        let result = self.store.delete(self.list_index);
                        self.report(result);
                        self.sync_input();
                        self.clamp_selection();
                    }
                }
                KeyCode::Tab | KeyCode::Char('i') | KeyCode::Char('a') => {
                    self.focus = Focus::Input;
                }
                _ => {}
            },
        }

        false
    }

    fn report<T>(&mut self, result: Result<T>) {
        self.status = match result {
            Ok(_) => None,
            Err(err) => {
                log::error!("{err}");
                Some(err.to_string())
            }
        };
    }

    /// Store operations may reset or replace the draft; mirror it in the input.
    fn sync_input(&mut self) {
        if self.input.value() != self.store.draft() {
            self.input = Input::default().with_value(self.store.draft().to_string());
        }
    }

    fn select_next(&mut self) {
        if self.store.is_empty() {
            return;
        }
        if self.list_index + 1 >= self.store.len() {
            self.list_index = 0;
        } else {
            self.list_index += 1;
        }
    }

    fn select_previous(&mut self) {
        if self.store.is_empty() {
            return;
        }
        if self.list_index == 0 {
            self.list_index = self.store.len() - 1;
        } else {
            self.list_index -= 1;
        }
    }

    fn clamp_selection(&mut self) {
        self.list_index = self.list_index.min(self.store.len().saturating_sub(1));
    }

    fn draw(&self, frame: &mut Frame) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![
                Constraint::Length(3),
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(frame.area());

        self.render_input(frame, layout[0]);
        self.render_list(frame, layout[1]);

        if let Some(status) = &self.status {
            frame.render_widget(Line::from(status.as_str()).red(), layout[2]);
        }
        frame.render_widget(self.help_message(), layout[3]);
    }

    fn render_input(&self, frame: &mut Frame, area: Rect) {
        let mut block = Block::bordered().title(self.store.submit_label());
        let mut input = Paragraph::new(self.input.value());

        if self.focus == Focus::Input {
            block = block.border_style(Style::new().yellow());
            let width = area.width.max(3) - 3;
            let scroll = self.input.visual_scroll(width as usize);
            input = input.scroll((0, scroll as u16));

            let x = self.input.visual_cursor().max(scroll) - scroll + 1;
            frame.set_cursor_position((area.x + x as u16, area.y + 1));
        }

        frame.render_widget(input.block(block), area);
    }

    fn render_list(&self, frame: &mut Frame, area: Rect) {
        let mut block = Block::bordered().title("Notes").border_set(border::THICK);
        if self.focus == Focus::List {
            block = block.border_style(Style::new().yellow());
        }

        if self.store.is_empty() {
            let placeholder = Paragraph::new(Line::from("No notes yet.").dark_gray().centered());
            frame.render_widget(placeholder.block(block), area);
            return;
        }

        let editing = self.store.editing_index();
        let items = self.store.notes().iter().enumerate().map(|(i, note)| {
            let mut spans = vec![Span::raw(note.text.as_str())];
            if editing == Some(i) {
                spans.push(" (editing)".italic());
            }
            if self.focus == Focus::List && i == self.list_index {
                spans.push("  [e]dit".yellow());
                spans.push(" [d]elete".red());
                ListItem::new(Line::from(spans)).bold()
            } else {
                ListItem::new(Line::from(spans))
            }
        });

        // Rebuilt every frame; List scrolls so the selected row stays visible.
        let mut state = ListState::default().with_selected(Some(self.list_index));
        frame.render_stateful_widget(List::new(items).block(block), area, &mut state);
    }

    fn help_message(&self) -> Line<'static> {
        match self.focus {
            Focus::Input => Line::from_iter([
                "Enter".bold().yellow(),
                Span::raw(format!(" {}, ", self.store.submit_label().to_lowercase())),
                "Tab".bold().yellow(),
                Span::raw(" notes, "),
                "Esc".bold().yellow(),
                Span::raw(if self.store.is_editing() {
                    " cancel edit"
                } else if !self.store.draft().is_empty() {
                    " clear"
                } else {
                    " exit"
                }),
            ]),
            Focus::List => Line::from_iter([
                "Esc/q".bold().yellow(),
                Span::raw(" exit, "),
                "e".bold().yellow(),
                Span::raw(" edit, "),
                "d".bold().red(),
                Span::raw(" delete, "),
                "Tab".bold().yellow(),
                Span::raw(" input"),
            ]),
        }
        .centered()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use pretty_assertions::assert_eq;
    use ratatui::{Terminal, backend::TestBackend};

    fn app_with(notes: &[&str]) -> App<MemoryStorage> {
        let bytes = serde_json::to_vec(notes).unwrap();
        App::new(NoteStore::load(MemoryStorage::with_contents(bytes)))
    }

    fn press(app: &mut App<MemoryStorage>, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut App<MemoryStorage>, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn texts(app: &App<MemoryStorage>) -> Vec<&str> {
        app.store.notes().iter().map(|n| n.text.as_str()).collect()
    }

    fn screen(app: &App<MemoryStorage>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn typing_and_enter_adds_a_note() {
        let mut app = app_with(&[]);
        type_text(&mut app, "Buy milk");
        assert_eq!(app.store.draft(), "Buy milk");

        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "Call mom");
        press(&mut app, KeyCode::Enter);
        assert_eq!(texts(&app), vec!["Buy milk", "Call mom"]);
        assert_eq!(app.list_index, 1);
        assert_eq!(app.input.value(), "");
        assert_eq!(app.store.storage().writes(), 2);
    }

    #[test]
    fn enter_on_blank_input_does_nothing() {
        let mut app = app_with(&[]);
        type_text(&mut app, "   ");
        press(&mut app, KeyCode::Enter);

        assert!(app.store.is_empty());
        assert_eq!(app.input.value(), "   ");
        assert_eq!(app.store.storage().writes(), 0);
    }

    #[test]
    fn edit_from_list_fills_input_and_updates_on_enter() {
        let mut app = app_with(&["one", "two"]);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('e'));

        assert_eq!(app.focus, Focus::Input);
        assert_eq!(app.input.value(), "two");

        type_text(&mut app, "!");
        press(&mut app, KeyCode::Enter);
        assert_eq!(texts(&app), vec!["one", "two!"]);
        assert!(!app.store.is_editing());
        assert_eq!(app.list_index, 1);
    }

    #[test]
    fn escape_cancels_edit_before_quitting() {
        let mut app = app_with(&["one"]);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Enter);
        assert!(app.store.is_editing());

        assert!(!press(&mut app, KeyCode::Esc));
        assert!(!app.store.is_editing());
        assert_eq!(app.input.value(), "");

        assert!(press(&mut app, KeyCode::Esc));
    }

    #[test]
    fn escape_clears_an_unsaved_draft_before_quitting() {
        let mut app = app_with(&[]);
        type_text(&mut app, "half a thought");

        assert!(!press(&mut app, KeyCode::Esc));
        assert_eq!(app.store.draft(), "");
        assert_eq!(app.input.value(), "");
        assert!(app.store.is_empty());

        assert!(press(&mut app, KeyCode::Esc));
    }

    #[test]
    fn deleting_the_edited_note_clears_the_input() {
        let mut app = app_with(&["one", "two"]);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('e'));
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('d'));

        assert_eq!(texts(&app), vec!["two"]);
        assert!(!app.store.is_editing());
        assert_eq!(app.input.value(), "");
    }

    #[test]
    fn selection_wraps_and_stays_in_bounds_after_delete() {
        let mut app = app_with(&["a", "b", "c"]);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.list_index, 2);

        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.list_index, 1);
        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('d'));
        assert!(app.store.is_empty());
        assert_eq!(app.list_index, 0);

        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.store.storage().writes(), 3);
    }

    #[test]
    fn list_keys_quit() {
        let mut app = app_with(&[]);
        press(&mut app, KeyCode::Tab);
        assert!(press(&mut app, KeyCode::Char('q')));
        assert!(app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
    }

    #[test]
    fn selected_note_stays_on_screen_in_a_long_list() {
        let names: Vec<String> = (0..20).map(|i| format!("note{i:02}")).collect();
        let notes: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut app = app_with(&notes);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.list_index, 19);

        let shown = screen(&app);
        assert!(shown.contains("note19"));
        assert!(shown.contains("[d]elete"));
        assert!(!shown.contains("note00"));

        press(&mut app, KeyCode::Char('j'));
        let shown = screen(&app);
        assert!(shown.contains("note00"));
        assert!(!shown.contains("note19"));
    }

    #[test]
    fn empty_list_shows_placeholder_and_add_label() {
        let app = app_with(&[]);
        let screen = screen(&app);
        assert!(screen.contains("No notes yet."));
        assert!(screen.contains("Add"));
        assert!(!screen.contains("Update"));
    }

    #[test]
    fn editing_switches_label_to_update() {
        let mut app = app_with(&["Call mom"]);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('e'));

        let screen = screen(&app);
        assert!(screen.contains("Update"));
        assert!(screen.contains("Call mom"));
        assert!(!screen.contains("No notes yet."));
    }
}

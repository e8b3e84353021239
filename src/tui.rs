//! Inline list selector built on crossterm.
//!
//! Renders a filterable list below the shell prompt, redrawn in place
//! after every key, and erased once the user confirms or cancels. Key
//! handling lives in [`Selector::handle_key`] so the state machine can
//! be driven in tests without a terminal.

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    style::{self, Stylize},
    terminal, QueueableCommand,
};
use std::io::{self, Write};

/// Maps items to the text the selector shows for them.
pub trait Formatter<T> {
    /// Row text for the item under the cursor (may carry styling).
    fn active(&self, item: &T) -> String;
    /// Row text for every other item.
    fn inactive(&self, item: &T) -> String;
    /// Extra line shown below the list for the cursor row; empty to omit.
    fn detail(&self, item: &T) -> String;
    /// Plain text the filter matches against.
    fn search_text(&self, item: &T) -> String;
}

/// Terminal result of a selector run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Carries the confirmed item's index into the original slice.
    Selected(usize),
    Cancelled,
}

/// Enter raw mode; returns a guard that restores it when dropped.
struct RawGuard;

impl RawGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(RawGuard)
    }
}

impl Drop for RawGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Move to the beginning of the current line, then clear everything below
/// (inclusive). Use this before a full redraw.
fn move_to_start_and_clear(out: &mut impl Write) -> io::Result<()> {
    out.queue(cursor::MoveToColumn(0))?;
    out.queue(terminal::Clear(terminal::ClearType::FromCursorDown))?;
    Ok(())
}

/// Move up `n` lines from the current position.
fn move_up(out: &mut impl Write, n: u16) -> io::Result<()> {
    if n > 0 {
        out.queue(cursor::MoveUp(n))?;
    }
    Ok(())
}

/// Single-select over `items` with arrow-key navigation and
/// type-to-filter. `visible` holds indices into `items`, recomputed on
/// every filter change.
pub struct Selector<'a, T, F: Formatter<T>> {
    label: &'a str,
    items: &'a [T],
    formatter: &'a F,
    cursor: usize,
    filter: String,
    visible: Vec<usize>,
}

impl<'a, T, F: Formatter<T>> Selector<'a, T, F> {
    /// `start` positions the cursor initially; out-of-range values fall
    /// back to the top of the list.
    pub fn new(label: &'a str, items: &'a [T], formatter: &'a F, start: usize) -> Self {
        Selector {
            label,
            items,
            formatter,
            cursor: if start < items.len() { start } else { 0 },
            filter: String::new(),
            visible: (0..items.len()).collect(),
        }
    }

    /// True once the user has typed filter text.
    pub fn is_filtering(&self) -> bool {
        !self.filter.is_empty()
    }

    /// Feed one key into the state machine. Returns `Some` when the run
    /// is over, `None` while browsing or filtering continues.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Outcome> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Outcome::Cancelled);
        }
        match key.code {
            KeyCode::Up => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                }
            }
            KeyCode::Down => {
                if self.cursor + 1 < self.visible.len() {
                    self.cursor += 1;
                }
            }
            KeyCode::Enter => {
                // No-op while the filter matches nothing.
                if let Some(&index) = self.visible.get(self.cursor) {
                    return Some(Outcome::Selected(index));
                }
            }
            KeyCode::Backspace => {
                self.filter.pop();
                self.refilter();
            }
            // Other ctrl chords (Ctrl-A etc.) arrive as Char + CONTROL;
            // they are not filter input.
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.filter.push(c);
                self.refilter();
            }
            KeyCode::Esc => return Some(Outcome::Cancelled),
            _ => {}
        }
        None
    }

    /// Case-insensitive substring match, preserving list order. The
    /// cursor resets to the top when it falls off the visible list.
    fn refilter(&mut self) {
        let query = self.filter.to_lowercase();
        self.visible = (0..self.items.len())
            .filter(|&i| {
                self.formatter
                    .search_text(&self.items[i])
                    .to_lowercase()
                    .contains(&query)
            })
            .collect();
        if self.cursor >= self.visible.len() {
            self.cursor = 0;
        }
    }

    /// Render the widget. Returns how many rows below the widget top the
    /// terminal cursor is parked, so the next redraw knows how far to
    /// move up.
    fn render<W: Write>(&self, out: &mut W, prev_lines: u16) -> io::Result<u16> {
        move_up(out, prev_lines)?;
        move_to_start_and_clear(out)?;

        // Label line doubles as the filter query display.
        out.queue(style::Print(style::style("? ").green().bold()))?;
        out.queue(style::Print(style::style(self.label).bold()))?;
        out.queue(style::Print(" "))?;
        if self.filter.is_empty() {
            out.queue(style::Print(style::style("(type to filter)").dark_grey()))?;
        } else {
            out.queue(style::Print(&self.filter))?;
        }
        out.queue(style::Print("\r\n"))?;

        let mut lines: u16 = 1;
        for (row, &index) in self.visible.iter().enumerate() {
            let item = &self.items[index];
            let text = if row == self.cursor {
                self.formatter.active(item)
            } else {
                self.formatter.inactive(item)
            };
            out.queue(style::Print(format!("  {text}\r\n")))?;
            lines += 1;
        }

        if let Some(&index) = self.visible.get(self.cursor) {
            let detail = self.formatter.detail(&self.items[index]);
            if !detail.is_empty() {
                out.queue(style::Print(style::style(format!("  {detail}")).dark_grey()))?;
                out.queue(style::Print("\r\n"))?;
                lines += 1;
            }
        }

        // Park the terminal cursor right after the query text so typing
        // reads naturally.
        move_up(out, lines)?;
        let col = 2 + self.label.chars().count() + 1 + self.filter.chars().count();
        out.queue(cursor::MoveToColumn(u16::try_from(col).unwrap_or(u16::MAX)))?;
        out.flush()?;
        // Parked at the widget's top row, so the next redraw moves up 0.
        Ok(0)
    }

    /// Blocking read-render loop. All terminal output goes through
    /// `out`; the caller decides what that writer is.
    fn run<W: Write>(mut self, out: &mut W) -> io::Result<Outcome> {
        let _guard = RawGuard::enter()?;
        let mut last_lines = self.render(out, 0)?;

        let outcome = loop {
            if let Event::Key(key) = event::read()? {
                if let Some(outcome) = self.handle_key(key) {
                    break outcome;
                }
                last_lines = self.render(out, last_lines)?;
            }
        };

        // Erase the widget; whatever the caller prints next starts
        // where the widget used to be.
        move_up(out, last_lines)?;
        move_to_start_and_clear(out)?;
        out.flush()?;
        Ok(outcome)
    }
}

/// Run the selector and return the chosen item's original index, or
/// `None` on cancel.
pub fn select<T, F: Formatter<T>, W: Write>(
    label: &str,
    items: &[T],
    formatter: &F,
    start: usize,
    out: &mut W,
) -> Result<Option<usize>, String> {
    let outcome = Selector::new(label, items, formatter, start)
        .run(out)
        .map_err(|e| e.to_string())?;
    Ok(match outcome {
        Outcome::Selected(index) => Some(index),
        Outcome::Cancelled => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Names;

    impl Formatter<String> for Names {
        fn active(&self, item: &String) -> String {
            format!("> {item}")
        }
        fn inactive(&self, item: &String) -> String {
            item.clone()
        }
        fn detail(&self, item: &String) -> String {
            if item.starts_with("gke") {
                format!("details for {item}")
            } else {
                String::new()
            }
        }
        fn search_text(&self, item: &String) -> String {
            item.clone()
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn items(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    static NAMES: Names = Names;

    fn selector(items: &[String], start: usize) -> Selector<'_, String, Names> {
        Selector::new("pick", items, &NAMES, start)
    }

    #[test]
    fn starts_at_the_given_cursor() {
        let list = items(&["a", "b", "c"]);
        let mut sel = selector(&list, 1);
        assert_eq!(sel.handle_key(key(KeyCode::Enter)), Some(Outcome::Selected(1)));
    }

    #[test]
    fn out_of_range_start_falls_back_to_top() {
        let list = items(&["a", "b"]);
        let mut sel = selector(&list, 9);
        assert_eq!(sel.handle_key(key(KeyCode::Enter)), Some(Outcome::Selected(0)));
    }

    #[test]
    fn cursor_clamps_at_both_ends() {
        let list = items(&["a", "b"]);
        let mut sel = selector(&list, 0);
        sel.handle_key(key(KeyCode::Up));
        assert_eq!(sel.cursor, 0);
        sel.handle_key(key(KeyCode::Down));
        sel.handle_key(key(KeyCode::Down));
        assert_eq!(sel.cursor, 1);
    }

    #[test]
    fn down_then_enter_selects_the_next_entry() {
        // Cursor starts on the active entry (index 1); one Down picks
        // the entry after it.
        let list = items(&["dev", "staging", "prod"]);
        let mut sel = selector(&list, 1);
        assert_eq!(sel.handle_key(key(KeyCode::Down)), None);
        assert_eq!(sel.handle_key(key(KeyCode::Enter)), Some(Outcome::Selected(2)));
    }

    #[test]
    fn filter_is_a_case_insensitive_substring_match() {
        let list = items(&["dev", "STAGING", "prod"]);
        let mut sel = selector(&list, 0);
        for c in "tag".chars() {
            sel.handle_key(key(KeyCode::Char(c)));
        }
        assert!(sel.is_filtering());
        assert_eq!(sel.visible, vec![1]);
        assert_eq!(sel.handle_key(key(KeyCode::Enter)), Some(Outcome::Selected(1)));
    }

    #[test]
    fn enter_returns_the_original_index_not_the_visible_row() {
        let list = items(&["alpha", "beta", "delta"]);
        let mut sel = selector(&list, 0);
        sel.handle_key(key(KeyCode::Char('l')));
        assert_eq!(sel.visible, vec![0, 2]);
        sel.handle_key(key(KeyCode::Down));
        assert_eq!(sel.handle_key(key(KeyCode::Enter)), Some(Outcome::Selected(2)));
    }

    #[test]
    fn cursor_resets_when_it_falls_off_the_filtered_list() {
        let list = items(&["aa", "ab", "zz"]);
        let mut sel = selector(&list, 2);
        sel.handle_key(key(KeyCode::Char('a')));
        assert_eq!(sel.visible, vec![0, 1]);
        assert_eq!(sel.cursor, 0);
    }

    #[test]
    fn unmatched_filter_makes_enter_a_noop() {
        let list = items(&["dev", "prod"]);
        let mut sel = selector(&list, 0);
        sel.handle_key(key(KeyCode::Char('x')));
        assert!(sel.visible.is_empty());
        assert_eq!(sel.handle_key(key(KeyCode::Enter)), None);
        assert!(sel.is_filtering());
    }

    #[test]
    fn backspace_restores_the_full_list() {
        let list = items(&["dev", "prod"]);
        let mut sel = selector(&list, 0);
        sel.handle_key(key(KeyCode::Char('x')));
        assert!(sel.visible.is_empty());
        sel.handle_key(key(KeyCode::Backspace));
        assert!(!sel.is_filtering());
        assert_eq!(sel.visible, vec![0, 1]);
    }

    #[test]
    fn escape_cancels() {
        let list = items(&["dev"]);
        let mut sel = selector(&list, 0);
        assert_eq!(sel.handle_key(key(KeyCode::Esc)), Some(Outcome::Cancelled));
    }

    #[test]
    fn ctrl_chords_do_not_enter_the_filter() {
        let list = items(&["dev", "prod"]);
        let mut sel = selector(&list, 0);
        let ctrl_a = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL);
        assert_eq!(sel.handle_key(ctrl_a), None);
        assert!(!sel.is_filtering());
        assert_eq!(sel.visible, vec![0, 1]);
    }

    #[test]
    fn multibyte_filter_input_renders() {
        let list = items(&["café", "prod"]);
        let mut sel = selector(&list, 0);
        sel.handle_key(key(KeyCode::Char('é')));
        assert_eq!(sel.visible, vec![0]);
        let mut buf = Vec::new();
        sel.render(&mut buf, 0).unwrap();
        let screen = String::from_utf8_lossy(&buf);
        assert!(screen.contains("café"));
    }

    #[test]
    fn ctrl_c_cancels() {
        let list = items(&["dev"]);
        let mut sel = selector(&list, 0);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(sel.handle_key(ctrl_c), Some(Outcome::Cancelled));
    }

    #[test]
    fn empty_list_confirm_is_a_noop_and_cancel_still_works() {
        let list = items(&[]);
        let mut sel = selector(&list, 0);
        assert_eq!(sel.handle_key(key(KeyCode::Enter)), None);
        assert_eq!(sel.handle_key(key(KeyCode::Esc)), Some(Outcome::Cancelled));
    }

    #[test]
    fn render_shows_rows_and_the_cursor_rows_detail() {
        let list = items(&["gke-a", "plain"]);
        let sel = selector(&list, 0);
        let mut buf = Vec::new();
        sel.render(&mut buf, 0).unwrap();
        let screen = String::from_utf8_lossy(&buf);
        assert!(screen.contains("(type to filter)"));
        assert!(screen.contains("> gke-a"));
        assert!(screen.contains("plain"));
        assert!(screen.contains("details for gke-a"));
    }

    #[test]
    fn render_omits_empty_detail_lines() {
        let list = items(&["plain", "gke-a"]);
        let sel = selector(&list, 0);
        let mut buf = Vec::new();
        sel.render(&mut buf, 0).unwrap();
        let screen = String::from_utf8_lossy(&buf);
        assert!(!screen.contains("details for"));
    }
}

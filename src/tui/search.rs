use crossterm::event::KeyCode;
use unicode_width::UnicodeWidthStr;

/// Search input state for the TUI.
///
/// The query text itself lives in the search view; this tracks the cursor
/// (a byte offset on a char boundary) and focus.
pub struct SearchState {
    pub cursor_pos: usize,
    pub focused: bool,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            cursor_pos: 0,
            focused: true,
        }
    }
}

impl SearchState {
    /// Place the cursor after the last character
    pub fn move_to_end(&mut self, query: &str) {
        self.cursor_pos = query.len();
    }

    /// Display columns between the start of the query and the cursor
    pub fn cursor_column(&self, query: &str) -> usize {
        query
            .get(..self.cursor_pos.min(query.len()))
            .map(UnicodeWidthStr::width)
            .unwrap_or(0)
    }

    /// Apply an editing key to `query`. Returns true when the text changed.
    pub fn apply_key(&mut self, query: &mut String, code: KeyCode) -> bool {
        self.cursor_pos = self.cursor_pos.min(query.len());
        match code {
            KeyCode::Char(c) => {
                query.insert(self.cursor_pos, c);
                self.cursor_pos += c.len_utf8();
                true
            }
            KeyCode::Backspace => {
                if self.cursor_pos > 0 {
                    let prev = prev_boundary(query, self.cursor_pos);
                    query.remove(prev);
                    self.cursor_pos = prev;
                    true
                } else {
                    false
                }
            }
            KeyCode::Delete => {
                if self.cursor_pos < query.len() {
                    query.remove(self.cursor_pos);
                    true
                } else {
                    false
                }
            }
            KeyCode::Left => {
                if self.cursor_pos > 0 {
                    self.cursor_pos = prev_boundary(query, self.cursor_pos);
                }
                false
            }
            KeyCode::Right => {
                if self.cursor_pos < query.len() {
                    self.cursor_pos = query[self.cursor_pos..]
                        .char_indices()
                        .nth(1)
                        .map(|(i, _)| self.cursor_pos + i)
                        .unwrap_or(query.len());
                }
                false
            }
            KeyCode::Home => {
                self.cursor_pos = 0;
                false
            }
            KeyCode::End => {
                self.cursor_pos = query.len();
                false
            }
            _ => false,
        }
    }

    /// Clear the query, returning true when there was something to clear
    pub fn clear(&mut self, query: &mut String) -> bool {
        self.cursor_pos = 0;
        if query.is_empty() {
            return false;
        }
        query.clear();
        true
    }
}

fn prev_boundary(query: &str, pos: usize) -> usize {
    query[..pos]
        .char_indices()
        .last()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_and_backspace_respect_char_boundaries() {
        let mut state = SearchState::default();
        let mut query = String::new();
        for c in "caf\u{e9}".chars() {
            state.apply_key(&mut query, KeyCode::Char(c));
        }
        assert_eq!(query, "caf\u{e9}");
        assert_eq!(state.cursor_pos, query.len());

        assert!(state.apply_key(&mut query, KeyCode::Backspace));
        assert_eq!(query, "caf");
    }

    #[test]
    fn insert_in_the_middle() {
        let mut state = SearchState::default();
        let mut query = "red dress".to_string();
        state.move_to_end(&query);
        for _ in 0.."dress".len() {
            state.apply_key(&mut query, KeyCode::Left);
        }
        for c in "silk ".chars() {
            state.apply_key(&mut query, KeyCode::Char(c));
        }
        assert_eq!(query, "red silk dress");
    }

    #[test]
    fn navigation_does_not_edit() {
        let mut state = SearchState::default();
        let mut query = "coat".to_string();
        assert!(!state.apply_key(&mut query, KeyCode::End));
        assert!(!state.apply_key(&mut query, KeyCode::Delete));
        assert!(!state.apply_key(&mut query, KeyCode::Home));
        assert!(state.apply_key(&mut query, KeyCode::Delete));
        assert_eq!(query, "oat");
    }

    #[test]
    fn cursor_column_counts_display_width() {
        let mut state = SearchState::default();
        let query = "\u{1F45F} shoes".to_string();
        state.move_to_end(&query);
        assert_eq!(state.cursor_column(&query), 8);
    }

    #[test]
    fn clear_resets_cursor() {
        let mut state = SearchState::default();
        let mut query = "boots".to_string();
        state.move_to_end(&query);
        assert!(state.clear(&mut query));
        assert_eq!(state.cursor_pos, 0);
        assert!(!state.clear(&mut query));
    }
}

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a key press did to a text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// The key was not for the field.
    Ignored,
    /// Text or cursor changed.
    Edited,
    /// Enter was pressed.
    Submit,
    /// Escape was pressed.
    Cancel,
}

/// Single-line text field with a byte-offset cursor.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TextInput {
    pub value: String,
    /// Byte offset into `value`, always on a char boundary.
    pub cursor: usize,
}

impl TextInput {
    /// A field holding `value` with the cursor at the end.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.len();
        Self { value, cursor }
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.len();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn insert_char(&mut self, c: char) {
        self.value.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Backspace.
    pub fn delete_char(&mut self) -> bool {
        let Some(prev) = self.value[..self.cursor].chars().next_back() else {
            return false;
        };
        self.cursor -= prev.len_utf8();
        self.value.remove(self.cursor);
        true
    }

    /// Delete the character under the cursor.
    pub fn delete_forward(&mut self) -> bool {
        if self.cursor >= self.value.len() {
            return false;
        }
        self.value.remove(self.cursor);
        true
    }

    pub fn move_left(&mut self) -> bool {
        let Some(prev) = self.value[..self.cursor].chars().next_back() else {
            return false;
        };
        self.cursor -= prev.len_utf8();
        true
    }

    pub fn move_right(&mut self) -> bool {
        let Some(next) = self.value[self.cursor..].chars().next() else {
            return false;
        };
        self.cursor += next.len_utf8();
        true
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.value.len();
    }

    /// Cursor position in characters, for placing the terminal cursor.
    pub fn cursor_column(&self) -> usize {
        self.value[..self.cursor].chars().count()
    }

    /// Apply an editing key.
    pub fn handle_key(&mut self, key: KeyEvent) -> InputOutcome {
        match key.code {
            KeyCode::Enter => InputOutcome::Submit,
            KeyCode::Esc => InputOutcome::Cancel,
            KeyCode::Backspace => {
                self.delete_char();
                InputOutcome::Edited
            }
            KeyCode::Delete => {
                self.delete_forward();
                InputOutcome::Edited
            }
            KeyCode::Left => {
                self.move_left();
                InputOutcome::Edited
            }
            KeyCode::Right => {
                self.move_right();
                InputOutcome::Edited
            }
            KeyCode::Home => {
                self.home();
                InputOutcome::Edited
            }
            KeyCode::End => {
                self.end();
                InputOutcome::Edited
            }
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.insert_char(c);
                InputOutcome::Edited
            }
            _ => InputOutcome::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn insert_and_backspace() {
        let mut input = TextInput::default();
        input.insert_char('a');
        input.insert_char('b');
        assert_eq!(input.value, "ab");
        assert!(input.delete_char());
        assert_eq!(input.value, "a");
        assert_eq!(input.cursor, 1);
    }

    #[test]
    fn backspace_at_start_is_noop() {
        let mut input = TextInput::new("x");
        input.home();
        assert!(!input.delete_char());
        assert_eq!(input.value, "x");
    }

    #[test]
    fn cursor_walks_multibyte_chars() {
        let mut input = TextInput::new("añb");
        assert!(input.move_left());
        assert!(input.move_left());
        assert_eq!(input.cursor, 1);
        assert_eq!(input.cursor_column(), 1);
        assert!(input.move_right());
        assert_eq!(input.cursor, 3);
        input.end();
        assert!(!input.move_right());
    }

    #[test]
    fn delete_forward_removes_under_cursor() {
        let mut input = TextInput::new("abc");
        input.home();
        assert!(input.delete_forward());
        assert_eq!(input.value, "bc");
        input.end();
        assert!(!input.delete_forward());
    }

    #[test]
    fn keys_map_to_outcomes() {
        let mut input = TextInput::new("/tmp");
        assert_eq!(input.handle_key(key(KeyCode::Char('/'))), InputOutcome::Edited);
        assert_eq!(input.value, "/tmp/");
        assert_eq!(input.handle_key(key(KeyCode::Enter)), InputOutcome::Submit);
        assert_eq!(input.handle_key(key(KeyCode::Esc)), InputOutcome::Cancel);
        assert_eq!(input.handle_key(key(KeyCode::Tab)), InputOutcome::Ignored);
        let ctrl = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(input.handle_key(ctrl), InputOutcome::Ignored);
    }

    #[test]
    fn set_value_moves_cursor_to_end() {
        let mut input = TextInput::default();
        input.set_value("hello");
        assert_eq!(input.cursor, 5);
        input.clear();
        assert_eq!((input.value.as_str(), input.cursor), ("", 0));
    }
}

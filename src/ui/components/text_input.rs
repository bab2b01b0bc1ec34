use crossterm::event::KeyCode;

/// Applies a key to a single-line text buffer. Returns true when it changed.
pub fn edit_text(buffer: &mut String, key: KeyCode) -> bool {
    match key {
        KeyCode::Char(c) => {
            buffer.push(c);
            true
        }
        KeyCode::Backspace => buffer.pop().is_some(),
        _ => false,
    }
}

/// Like `edit_text`, but Enter inserts a line break
pub fn edit_multiline(buffer: &mut String, key: KeyCode) -> bool {
    match key {
        KeyCode::Enter => {
            buffer.push('\n');
            true
        }
        other => edit_text(buffer, other),
    }
}

pub fn masked(buffer: &str) -> String {
    "*".repeat(buffer.chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_and_backspace() {
        let mut buf = String::new();
        assert!(edit_text(&mut buf, KeyCode::Char('h')));
        assert!(edit_text(&mut buf, KeyCode::Char('i')));
        assert!(edit_text(&mut buf, KeyCode::Backspace));
        assert_eq!(buf, "h");
        assert!(edit_text(&mut buf, KeyCode::Backspace));
        assert!(!edit_text(&mut buf, KeyCode::Backspace));
        assert!(!edit_text(&mut buf, KeyCode::Enter));
    }

    #[test]
    fn multiline_accepts_enter() {
        let mut buf = "a".to_string();
        edit_multiline(&mut buf, KeyCode::Enter);
        edit_multiline(&mut buf, KeyCode::Char('b'));
        assert_eq!(buf, "a\nb");
        assert_eq!(masked("secret"), "******");
    }
}

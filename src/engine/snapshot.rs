use std::borrow::Cow;

use ropey::Rope;

/// Line view over the text handed to one `highlight` call.
///
/// Only `\n` breaks lines; a `\r` before it belongs to the terminator and is
/// never part of the returned line text.
pub struct DocumentSnapshot {
    text: Rope,
}

impl DocumentSnapshot {
    pub fn new(text: &str) -> Self {
        Self {
            text: Rope::from_str(text),
        }
    }

    /// Lines present in the text. A trailing `\n` starts one more, empty line.
    pub fn line_count(&self) -> usize {
        self.text.len_lines()
    }

    /// Text of a line without its terminator
    pub fn line(&self, idx: usize) -> Option<Cow<'_, str>> {
        if idx >= self.line_count() {
            return None;
        }
        let line: Cow<'_, str> = self.text.line(idx).into();
        Some(match line {
            Cow::Borrowed(s) => Cow::Borrowed(strip_terminator(s)),
            Cow::Owned(mut s) => {
                let len = strip_terminator(&s).len();
                s.truncate(len);
                Cow::Owned(s)
            }
        })
    }
}

fn strip_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_one_line() {
        let snapshot = DocumentSnapshot::new("");
        assert_eq!(snapshot.line_count(), 1);
        assert_eq!(snapshot.line(0).as_deref(), Some(""));
        assert!(snapshot.line(1).is_none());
    }

    #[test]
    fn lines_exclude_terminators() {
        let snapshot = DocumentSnapshot::new("first\r\nsecond\n\nthird");
        assert_eq!(snapshot.line_count(), 4);
        assert_eq!(snapshot.line(0).as_deref(), Some("first"));
        assert_eq!(snapshot.line(1).as_deref(), Some("second"));
        assert_eq!(snapshot.line(2).as_deref(), Some(""));
        assert_eq!(snapshot.line(3).as_deref(), Some("third"));
    }

    #[test]
    fn trailing_newline_adds_empty_line() {
        let snapshot = DocumentSnapshot::new("a\nb\n");
        assert_eq!(snapshot.line_count(), 3);
        assert_eq!(snapshot.line(2).as_deref(), Some(""));
    }

    #[test]
    fn lone_carriage_return_is_not_a_break() {
        let snapshot = DocumentSnapshot::new("a\rb");
        assert_eq!(snapshot.line_count(), 1);
        assert_eq!(snapshot.line(0).as_deref(), Some("a\rb"));
    }
}

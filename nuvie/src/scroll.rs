//! The message scroll: game text and the single-line text prompt.

/// Prompt shown when the game waits for a new command.
pub const PROMPT: &str = ">";

const MAX_LINES: usize = 10000;

/// An active text prompt.
#[derive(Clone, Debug, Default)]
struct TextInput {
    /// Characters accepted; everything when `None`.
    allowed: Option<String>,
    buf: String,
}

/// The scrolling text log shown next to the map.
#[derive(Clone, Debug)]
pub struct MsgScroll {
    lines: Vec<String>,
    input: Option<TextInput>,
}

impl Default for MsgScroll {
    fn default() -> Self {
        Self::new()
    }
}

impl MsgScroll {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            input: None,
        }
    }

    /// Append text. Newlines start a new line.
    pub fn display_string(&mut self, text: &str) {
        let mut parts = text.split('\n');
        if let Some(first) = parts.next() {
            if let Some(last) = self.lines.last_mut() {
                last.push_str(first);
            }
        }
        for part in parts {
            self.lines.push(part.to_string());
        }
        if self.lines.len() > MAX_LINES {
            self.lines.drain(0..1000);
        }
    }

    pub fn display_prompt(&mut self) {
        self.display_string(PROMPT);
    }

    /// Everything shown so far.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// The line currently being written.
    pub fn current_line(&self) -> &str {
        self.lines.last().map_or("", String::as_str)
    }

    pub fn clear(&mut self) {
        self.lines = vec![String::new()];
    }

    // --- text input ---

    /// Start reading a line of text restricted to `allowed` characters.
    pub fn set_input_mode(&mut self, allowed: Option<&str>) {
        self.input = Some(TextInput {
            allowed: allowed.map(str::to_string),
            buf: String::new(),
        });
    }

    pub fn cancel_input(&mut self) {
        self.input = None;
    }

    pub fn is_input_active(&self) -> bool {
        self.input.is_some()
    }

    /// Whether anything has been typed at the active prompt.
    pub fn has_input(&self) -> bool {
        self.input.as_ref().is_some_and(|i| !i.buf.is_empty())
    }

    /// Type one character, echoing it. Returns false if it was refused.
    pub fn input_char(&mut self, c: char) -> bool {
        let Some(input) = self.input.as_mut() else {
            return false;
        };
        if input.allowed.as_ref().is_some_and(|a| !a.contains(c)) {
            return false;
        }
        input.buf.push(c);
        if let Some(last) = self.lines.last_mut() {
            last.push(c);
        }
        true
    }

    pub fn input_backspace(&mut self) {
        let Some(input) = self.input.as_mut() else {
            return;
        };
        if input.buf.pop().is_some() {
            if let Some(last) = self.lines.last_mut() {
                last.pop();
            }
        }
    }

    /// Finish the prompt and return what was typed.
    pub fn take_input(&mut self) -> String {
        self.input.take().map(|i| i.buf).unwrap_or_default()
    }

    /// The most recent lines word-wrapped to `width`, at most `max_lines`.
    pub fn recent_lines(&self, width: usize, max_lines: usize) -> Vec<String> {
        let width = width.max(1);
        let mut out: Vec<String> = Vec::new();
        for line in self.lines.iter().rev() {
            let mut wrapped: Vec<String> = Vec::new();
            let mut current = String::new();
            for word in line.split_whitespace() {
                if !current.is_empty() && current.len() + 1 + word.len() > width {
                    wrapped.push(std::mem::take(&mut current));
                }
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
            }
            wrapped.push(current);
            for l in wrapped.into_iter().rev() {
                out.push(l);
            }
            if out.len() >= max_lines {
                break;
            }
        }
        out.truncate(max_lines);
        out.reverse();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_string_splits_lines() {
        let mut s = MsgScroll::new();
        s.display_string("Look-");
        s.display_string("grass\n\n");
        s.display_prompt();
        assert_eq!(s.text(), "Look-grass\n\n>");
        assert_eq!(s.current_line(), ">");
    }

    #[test]
    fn test_input_filters_and_echoes() {
        let mut s = MsgScroll::new();
        s.display_string("How many? ");
        s.set_input_mode(Some("0123456789"));
        assert!(!s.has_input());
        assert!(s.input_char('4'));
        assert!(!s.input_char('x'), "not a digit");
        assert!(s.input_char('2'));
        s.input_backspace();
        assert_eq!(s.current_line(), "How many? 4");
        assert_eq!(s.take_input(), "4");
        assert!(!s.is_input_active());
    }

    #[test]
    fn test_recent_lines_wraps() {
        let mut s = MsgScroll::new();
        s.display_string("Thou dost see a very large wooden chest\n>");
        let lines = s.recent_lines(16, 3);
        assert_eq!(lines, vec!["very large", "wooden chest", ">"]);
    }
}

//! In-memory history recall for the line editor.

/// Navigation pointer over committed lines.
///
/// `position == None` means "past the end": the operator is editing a fresh
/// line. The first step back saves that line as the draft, and stepping
/// forward past the newest entry restores it.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HistoryCursor {
    entries: Vec<String>,
    position: Option<usize>,
    draft: Option<String>,
}

impl HistoryCursor {
    pub fn new(entries: Vec<String>) -> Self {
        Self {
            entries,
            position: None,
            draft: None,
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub fn is_navigating(&self) -> bool {
        self.position.is_some()
    }

    /// Appends a committed line and resets navigation.
    pub fn record(&mut self, text: impl Into<String>) {
        self.entries.push(text.into());
        self.reset();
    }

    pub fn reset(&mut self) {
        self.position = None;
        self.draft = None;
    }

    /// Steps toward older entries. Returns `None` when there is nothing older.
    pub fn previous(&mut self, current_input: &str) -> Option<&str> {
        let next = match self.position {
            None if self.entries.is_empty() => return None,
            None => {
                self.draft = Some(current_input.to_string());
                self.entries.len() - 1
            }
            Some(0) => return None,
            Some(index) => index - 1,
        };

        self.position = Some(next);
        Some(self.entries[next].as_str())
    }

    /// Steps toward newer entries, yielding the saved draft after the newest.
    /// Returns `None` when not navigating.
    pub fn next(&mut self) -> Option<String> {
        let current = self.position?;

        if current + 1 >= self.entries.len() {
            self.position = None;
            return Some(self.draft.take().unwrap_or_default());
        }

        self.position = Some(current + 1);
        Some(self.entries[current + 1].clone())
    }
}

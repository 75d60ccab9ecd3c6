//! Gate that only lets the transaction-detail block through.

use crate::types::SectionState;

#[derive(Debug, Clone)]
pub struct SectionTracker {
    start: String,
    ends: Vec<String>,
    state: SectionState,
}

impl SectionTracker {
    /// Markers are matched case-insensitively as substrings.
    pub fn new(start: &str, ends: &[&str]) -> Self {
        Self {
            start: start.to_lowercase(),
            ends: ends.iter().map(|e| e.to_lowercase()).collect(),
            state: SectionState::Waiting,
        }
    }

    pub fn state(&self) -> SectionState {
        self.state
    }

    /// Feed one line; returns true if the line sits inside the section.
    ///
    /// Marker lines themselves are never inside. `Done` is terminal.
    pub fn observe(&mut self, line: &str) -> bool {
        match self.state {
            SectionState::Done => false,
            SectionState::Waiting => {
                if line.to_lowercase().contains(&self.start) {
                    self.state = SectionState::InSection;
                }
                false
            }
            SectionState::InSection => {
                let lower = line.to_lowercase();
                if self.ends.iter().any(|e| lower.contains(e.as_str())) {
                    self.state = SectionState::Done;
                    return false;
                }
                true
            }
        }
    }
}

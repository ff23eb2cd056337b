//! Terminal lyric sheet that follows the sequencer's active note.

use crate::sequencer::{NoteSequencer, TextSpan, Transition};

/// Spans grouped by lyric line, keeping note indices
#[derive(Debug, Clone)]
pub struct LyricSheet {
    spans: Vec<TextSpan>,
}

impl LyricSheet {
    pub fn from_sequencer(sequencer: &NoteSequencer) -> Self {
        Self {
            spans: sequencer.spans().cloned().collect(),
        }
    }

    /// Text of `line` with the span of note `active` wrapped in brackets
    pub fn render_line(&self, line: usize, active: Option<usize>) -> String {
        let mut out = String::new();
        for (index, span) in self.spans.iter().enumerate() {
            if span.line != line {
                continue;
            }
            if Some(index) == active {
                let trimmed = span.text.trim_end();
                out.push('[');
                out.push_str(trimmed);
                out.push(']');
                out.push_str(&span.text[trimmed.len()..]);
            } else {
                out.push_str(&span.text);
            }
        }
        out
    }

    pub fn line_of(&self, index: usize) -> Option<usize> {
        self.spans.get(index).map(|span| span.line)
    }
}

/// Turns sequencer transitions into display lines
#[derive(Debug, Clone)]
pub struct LyricView {
    sheet: LyricSheet,
}

impl LyricView {
    pub fn new(sheet: LyricSheet) -> Self {
        Self { sheet }
    }

    /// One display line per highlight change
    pub fn observe(&self, transitions: &[Transition]) -> Vec<String> {
        transitions
            .iter()
            .filter_map(|transition| match *transition {
                Transition::Playing { index, .. } => {
                    let line = self.sheet.line_of(index)?;
                    Some(format!("♪ {}", self.sheet.render_line(line, Some(index))))
                }
                Transition::Finished => Some("♪ ~".to_string()),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::happy_birthday;

    #[test]
    fn test_render_marks_active_span() {
        let sequencer = NoteSequencer::build(happy_birthday());
        let sheet = LyricSheet::from_sequencer(&sequencer);

        assert_eq!(sheet.render_line(0, None), "Happy Birthday To You");
        assert_eq!(sheet.render_line(1, Some(8)), "Happy [Birth]day To You");
        assert_eq!(sheet.render_line(0, Some(1)), "Hap[py] Birthday To You");
    }

    #[test]
    fn test_view_reports_highlight_changes_only() {
        let sequencer = NoteSequencer::build(happy_birthday());
        let view = LyricView::new(LyricSheet::from_sequencer(&sequencer));
        let lines = view.observe(&[
            Transition::Playing {
                index: 23,
                duration_s: 2.0,
            },
            Transition::Ceased { index: 23 },
            Transition::Finished,
        ]);

        assert_eq!(lines, vec!["♪ Happy Birthday To [You]", "♪ ~"]);
    }
}

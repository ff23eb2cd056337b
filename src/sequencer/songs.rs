//! Built-in chains.

use super::note::{NoteSpec, TextSpan};

/// "Happy Birthday" in four lines, 24 notes
pub fn happy_birthday() -> Vec<NoteSpec> {
    const SYLLABLES: [&str; 6] = ["Hap", "py ", "Birth", "day ", "To ", "You"];
    const LINES: [[(f32, f32); 6]; 4] = [
        [(262.0, 0.5), (262.0, 0.5), (294.0, 1.0), (262.0, 1.0), (349.0, 1.0), (330.0, 2.0)],
        [(262.0, 0.5), (262.0, 0.5), (294.0, 1.0), (262.0, 1.0), (392.0, 1.0), (349.0, 2.0)],
        [(262.0, 0.5), (262.0, 0.5), (523.0, 1.0), (440.0, 1.0), (349.0, 1.0), (330.0, 3.0)],
        [(466.0, 0.5), (466.0, 0.5), (440.0, 1.0), (349.0, 1.0), (392.0, 1.0), (349.0, 2.0)],
    ];

    LINES
        .iter()
        .enumerate()
        .flat_map(|(line, notes)| {
            notes
                .iter()
                .zip(SYLLABLES)
                .map(move |(&(frequency_hz, duration_s), text)| {
                    NoteSpec::new(frequency_hz, duration_s, TextSpan::new(line, text))
                })
        })
        .collect()
}

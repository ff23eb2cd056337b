//! Event-driven note chain state machine.

use super::note::{NoteSpec, NoteState, TextSpan};
use crate::audio::{Tone, ToneId, ToneSink};
use crate::error::AudioError;
use crate::params::audio_constants::MIN_SPEED_MULTIPLIER;
use crate::params::SequencerParams;

/// Whole-chain state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    Stopped,
    Running,
}

/// Observable change, in the order it happened
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Note started and its span became active
    Playing { index: usize, duration_s: f32 },
    /// Note ended and its span was cleared
    Ceased { index: usize },
    /// Tone could not be played; the note was passed over
    Skipped { index: usize },
    /// Last note ceased (or the chain was stopped)
    Finished,
}

#[derive(Debug, Clone)]
struct Note {
    spec: NoteSpec,
    state: NoteState,
    /// Tone whose completion ceases this note
    tone: Option<ToneId>,
    /// Duration captured when the note started
    playback_s: Option<f32>,
}

/// Chain of notes that advance one at a time on tone completion
#[derive(Debug)]
pub struct NoteSequencer {
    notes: Vec<Note>,
    state: SequencerState,
    speed: f32,
    /// Index of the note currently playing
    current: Option<usize>,
    /// Frame time since the current note started (seconds)
    elapsed_s: f32,
    /// Slack past a note's duration before its completion is given up on
    grace_s: f32,
    transitions: Vec<Transition>,
}

impl NoteSequencer {
    /// Assemble the chain in playback order
    pub fn build(chain: Vec<NoteSpec>) -> Self {
        let notes = chain
            .into_iter()
            .map(|spec| Note {
                spec,
                state: NoteState::Idle,
                tone: None,
                playback_s: None,
            })
            .collect();
        Self {
            notes,
            state: SequencerState::Stopped,
            speed: 1.0,
            current: None,
            elapsed_s: 0.0,
            grace_s: SequencerParams::default().completion_grace_s,
            transitions: Vec::new(),
        }
    }

    /// Start the chain from note 0. Ignored while running.
    ///
    /// Returns `true` if a run began. If the sink refuses the first tone the
    /// sequencer stays stopped with every note idle, so a later call can retry.
    pub fn start<S: ToneSink + ?Sized>(&mut self, sink: &mut S) -> bool {
        if self.state == SequencerState::Running {
            log::debug!("sequencer already running, ignoring start");
            return false;
        }
        if self.notes.is_empty() {
            log::debug!("empty chain, nothing to start");
            return false;
        }

        for note in &mut self.notes {
            note.state = NoteState::Idle;
            note.tone = None;
            note.playback_s = None;
        }

        if let Err(e) = self.play(0, sink) {
            log::warn!("Sing-along unavailable: {}", e);
            return false;
        }
        self.state = SequencerState::Running;
        log::info!("Sing-along started ({} notes, speed {:.2})", self.notes.len(), self.speed);
        true
    }

    /// Set the multiplier applied to notes that start from now on.
    ///
    /// Non-positive or non-finite values are clamped to the minimum. Returns the value applied.
    pub fn set_speed(&mut self, multiplier: f32) -> f32 {
        self.speed = if multiplier.is_finite() {
            multiplier.max(MIN_SPEED_MULTIPLIER)
        } else {
            MIN_SPEED_MULTIPLIER
        };
        self.speed
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Set how long past its duration a note waits for its completion
    pub fn set_completion_grace(&mut self, grace_s: f32) {
        self.grace_s = if grace_s.is_finite() { grace_s.max(0.0) } else { 0.0 };
    }

    /// Advance the frame clock of the sounding note.
    ///
    /// A tone whose completion has not arrived `grace` seconds after its
    /// captured duration (a stream that died mid-note) is cancelled, its note
    /// ceases and the chain moves on. Returns `true` if a note timed out.
    pub fn tick<S: ToneSink + ?Sized>(&mut self, dt: f32, sink: &mut S) -> bool {
        if !(dt.is_finite() && dt > 0.0) {
            return false;
        }
        let Some(index) = self.current else {
            return false;
        };
        self.elapsed_s += dt;
        let deadline = self.notes[index].playback_s.unwrap_or(0.0) + self.grace_s;
        if self.elapsed_s <= deadline {
            return false;
        }

        log::warn!(
            "Note {} not reported finished after {:.2}s, moving on",
            index,
            self.elapsed_s
        );
        if let Some(id) = self.notes[index].tone {
            sink.cancel_tone(id);
        }
        self.cease(index);
        self.play_from(index + 1, sink);
        true
    }

    /// Completion event from the sink. Unknown or stale ids are ignored.
    pub fn on_tone_finished<S: ToneSink + ?Sized>(&mut self, id: ToneId, sink: &mut S) {
        let Some(index) = self.current else {
            return;
        };
        if self.notes[index].tone != Some(id) {
            return;
        }
        self.cease(index);
        self.play_from(index + 1, sink);
    }

    /// Drain the sink's completions and advance the chain. Returns how many were handled.
    pub fn pump<S: ToneSink + ?Sized>(&mut self, sink: &mut S) -> usize {
        let finished = sink.poll_finished();
        let count = finished.len();
        for id in finished {
            self.on_tone_finished(id, sink);
        }
        count
    }

    /// Cut the chain short: silence the current note and clear its span
    pub fn stop<S: ToneSink + ?Sized>(&mut self, sink: &mut S) {
        if self.state == SequencerState::Stopped {
            return;
        }
        if let Some(index) = self.current {
            if let Some(id) = self.notes[index].tone {
                sink.cancel_tone(id);
            }
            self.cease(index);
        }
        self.finish();
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SequencerState::Running
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn note_state(&self, index: usize) -> Option<NoteState> {
        self.notes.get(index).map(|note| note.state)
    }

    /// Whether the span of note `index` should be highlighted
    pub fn is_active(&self, index: usize) -> bool {
        self.note_state(index) == Some(NoteState::Playing)
    }

    /// Index of the note sounding now
    pub fn active_note(&self) -> Option<usize> {
        self.current
    }

    pub fn span(&self, index: usize) -> Option<&TextSpan> {
        self.notes.get(index).map(|note| &note.spec.span)
    }

    pub fn spans(&self) -> impl Iterator<Item = &TextSpan> {
        self.notes.iter().map(|note| &note.spec.span)
    }

    /// Duration captured when note `index` last started
    pub fn playback_duration(&self, index: usize) -> Option<f32> {
        self.notes.get(index).and_then(|note| note.playback_s)
    }

    /// Take every transition recorded since the last call
    pub fn drain_transitions(&mut self) -> Vec<Transition> {
        std::mem::take(&mut self.transitions)
    }

    /// Play notes from `index` on until one sounds or the chain runs out
    fn play_from<S: ToneSink + ?Sized>(&mut self, index: usize, sink: &mut S) {
        for next in index..self.notes.len() {
            match self.play(next, sink) {
                Ok(()) => return,
                Err(e) => {
                    log::warn!("Skipping note {}: {}", next, e);
                    self.notes[next].state = NoteState::Ceased;
                    self.transitions.push(Transition::Skipped { index: next });
                }
            }
        }
        self.finish();
    }

    fn play<S: ToneSink + ?Sized>(
        &mut self,
        index: usize,
        sink: &mut S,
    ) -> Result<(), AudioError> {
        let duration_s = self.notes[index].spec.playback_duration(self.speed);
        let tone = Tone::new(self.notes[index].spec.frequency_hz, duration_s);
        let id = sink.play_tone(tone)?;

        let note = &mut self.notes[index];
        note.state = NoteState::Playing;
        note.tone = Some(id);
        note.playback_s = Some(duration_s);
        self.current = Some(index);
        self.elapsed_s = 0.0;
        log::debug!(
            "note {} '{}' {:.0}Hz for {:.2}s",
            index,
            note.spec.span,
            tone.frequency_hz,
            duration_s
        );
        self.transitions.push(Transition::Playing { index, duration_s });
        Ok(())
    }

    fn cease(&mut self, index: usize) {
        let note = &mut self.notes[index];
        note.state = NoteState::Ceased;
        note.tone = None;
        self.current = None;
        self.transitions.push(Transition::Ceased { index });
    }

    fn finish(&mut self) {
        self.current = None;
        self.state = SequencerState::Stopped;
        self.transitions.push(Transition::Finished);
        log::info!("Sing-along finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::OfflineAudio;
    use crate::params::ToneParams;
    use crate::sequencer::happy_birthday;
    use approx::assert_relative_eq;

    const TICK: f32 = 0.001;

    fn chain(durations: &[f32]) -> Vec<NoteSpec> {
        durations
            .iter()
            .enumerate()
            .map(|(i, &d)| NoteSpec::new(262.0 + i as f32, d, TextSpan::new(0, format!("n{}", i))))
            .collect()
    }

    fn audio() -> OfflineAudio {
        OfflineAudio::new(ToneParams::default()).unwrap()
    }

    /// Advance synthetic audio time until the chain stops; returns elapsed seconds
    fn run_to_end(seq: &mut NoteSequencer, audio: &mut OfflineAudio) -> f64 {
        let start = audio.clock_s();
        while seq.is_running() {
            audio.advance(TICK).unwrap();
            seq.pump(audio);
            // At most one note sounding at any instant
            assert!(audio.active_voices() <= 1);
            let playing = (0..seq.len()).filter(|&i| seq.is_active(i)).count();
            assert!(playing <= 1);
            assert!(audio.clock_s() - start < 60.0, "chain never finished");
        }
        audio.clock_s() - start
    }

    /// Sink that refuses every tone
    struct Blocked;

    impl ToneSink for Blocked {
        fn play_tone(&mut self, _tone: Tone) -> Result<ToneId, AudioError> {
            Err(AudioError::NoDevice)
        }
        fn cancel_tone(&mut self, _id: ToneId) {}
        fn poll_finished(&mut self) -> Vec<ToneId> {
            Vec::new()
        }
    }

    /// Sink that accepts tones but never reports them finished
    #[derive(Default)]
    struct Stalled {
        next: u64,
        cancelled: Vec<ToneId>,
    }

    impl ToneSink for Stalled {
        fn play_tone(&mut self, _tone: Tone) -> Result<ToneId, AudioError> {
            self.next += 1;
            Ok(ToneId(self.next))
        }
        fn cancel_tone(&mut self, id: ToneId) {
            self.cancelled.push(id);
        }
        fn poll_finished(&mut self) -> Vec<ToneId> {
            Vec::new()
        }
    }

    #[test]
    fn test_chain_plays_in_order_with_matching_transitions() {
        let mut audio = audio();
        let mut seq = NoteSequencer::build(chain(&[0.05, 0.02, 0.03, 0.01]));
        assert!(seq.start(&mut audio));
        run_to_end(&mut seq, &mut audio);

        let transitions = seq.drain_transitions();
        let mut expected_index = 0;
        let mut playing_seen = false;
        for transition in &transitions {
            match *transition {
                Transition::Playing { index, .. } => {
                    assert!(!playing_seen, "two notes playing at once");
                    assert_eq!(index, expected_index);
                    playing_seen = true;
                }
                Transition::Ceased { index } => {
                    assert!(playing_seen);
                    assert_eq!(index, expected_index);
                    playing_seen = false;
                    expected_index += 1;
                }
                Transition::Finished => assert_eq!(expected_index, 4),
                Transition::Skipped { .. } => panic!("nothing should be skipped"),
            }
        }
        assert_eq!(transitions.len(), 4 * 2 + 1);
        assert_eq!(transitions.last(), Some(&Transition::Finished));
        for i in 0..4 {
            assert_eq!(seq.note_state(i), Some(NoteState::Ceased));
        }
    }

    #[test]
    fn test_three_note_chain_wall_time() {
        let mut audio = audio();
        let mut seq = NoteSequencer::build(chain(&[0.5, 1.0, 2.0]));
        seq.set_speed(1.0);
        seq.start(&mut audio);

        let elapsed = run_to_end(&mut seq, &mut audio);
        assert_relative_eq!(elapsed, 3.5, epsilon = 0.01);

        let activations: Vec<usize> = seq
            .drain_transitions()
            .into_iter()
            .filter_map(|t| match t {
                Transition::Playing { index, .. } => Some(index),
                _ => None,
            })
            .collect();
        assert_eq!(activations, vec![0, 1, 2]);
    }

    #[test]
    fn test_double_start_runs_one_chain() {
        let mut audio = audio();
        let mut seq = NoteSequencer::build(chain(&[0.02, 0.02]));
        assert!(seq.start(&mut audio));
        assert!(!seq.start(&mut audio));
        assert_eq!(audio.active_voices(), 1);

        run_to_end(&mut seq, &mut audio);
        let plays = seq
            .drain_transitions()
            .iter()
            .filter(|t| matches!(t, Transition::Playing { .. }))
            .count();
        assert_eq!(plays, 2);
    }

    #[test]
    fn test_speed_change_only_affects_later_notes() {
        let mut audio = audio();
        let mut seq = NoteSequencer::build(chain(&[0.1, 0.1]));
        seq.start(&mut audio);
        audio.advance(0.05).unwrap();
        seq.pump(&mut audio);

        seq.set_speed(2.0);
        assert_eq!(seq.playback_duration(0), Some(0.1));

        // First note still ends on its initial schedule
        audio.advance(0.051).unwrap();
        seq.pump(&mut audio);
        assert_eq!(seq.active_note(), Some(1));
        assert_relative_eq!(seq.playback_duration(1).unwrap(), 0.2);

        let elapsed = run_to_end(&mut seq, &mut audio);
        assert_relative_eq!(elapsed, 0.2, epsilon = 0.01);
    }

    #[test]
    fn test_non_positive_speed_is_clamped() {
        let mut seq = NoteSequencer::build(chain(&[1.0]));
        assert_eq!(seq.set_speed(0.0), MIN_SPEED_MULTIPLIER);
        assert_eq!(seq.set_speed(-3.0), MIN_SPEED_MULTIPLIER);
        assert_eq!(seq.set_speed(f32::NAN), MIN_SPEED_MULTIPLIER);
        assert_eq!(seq.set_speed(1.5), 1.5);
    }

    #[test]
    fn test_empty_chain_stays_stopped() {
        let mut audio = audio();
        let mut seq = NoteSequencer::build(Vec::new());
        assert!(!seq.start(&mut audio));
        assert_eq!(seq.state(), SequencerState::Stopped);
        assert!(seq.drain_transitions().is_empty());
    }

    #[test]
    fn test_blocked_audio_leaves_sequencer_retryable() {
        let mut seq = NoteSequencer::build(chain(&[0.01, 0.01]));
        assert!(!seq.start(&mut Blocked));
        assert_eq!(seq.state(), SequencerState::Stopped);
        assert_eq!(seq.note_state(0), Some(NoteState::Idle));

        let mut audio = audio();
        assert!(seq.start(&mut audio));
        run_to_end(&mut seq, &mut audio);
        assert_eq!(seq.note_state(1), Some(NoteState::Ceased));
    }

    #[test]
    fn test_failure_mid_chain_skips_tone() {
        let mut audio = audio();
        let mut seq = NoteSequencer::build(chain(&[0.01, 0.01, 0.01]));
        seq.start(&mut audio);
        audio.advance(0.02).unwrap();

        // Audio goes away between notes
        let finished = audio.poll_finished();
        for id in finished {
            seq.on_tone_finished(id, &mut Blocked);
        }

        assert_eq!(seq.state(), SequencerState::Stopped);
        let transitions = seq.drain_transitions();
        assert!(transitions.contains(&Transition::Skipped { index: 1 }));
        assert!(transitions.contains(&Transition::Skipped { index: 2 }));
        assert_eq!(transitions.last(), Some(&Transition::Finished));
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let mut audio = audio();
        let mut seq = NoteSequencer::build(chain(&[1.0, 1.0]));
        seq.start(&mut audio);
        let stray = audio
            .play_tone(Tone::new(100.0, 0.01))
            .unwrap();

        seq.on_tone_finished(stray, &mut audio);
        assert_eq!(seq.active_note(), Some(0));
    }

    #[test]
    fn test_stop_cancels_and_restart_replays() {
        let mut audio = audio();
        let mut seq = NoteSequencer::build(chain(&[0.5, 0.5]));
        seq.start(&mut audio);
        seq.stop(&mut audio);

        assert_eq!(seq.state(), SequencerState::Stopped);
        assert!(!seq.is_active(0));
        assert_eq!(audio.active_voices(), 0);

        seq.drain_transitions();
        assert!(seq.start(&mut audio));
        assert_eq!(seq.note_state(0), Some(NoteState::Playing));
        assert_eq!(seq.note_state(1), Some(NoteState::Idle));
    }

    #[test]
    fn test_full_song_at_tenth_duration() {
        let mut audio = audio();
        let mut seq = NoteSequencer::build(happy_birthday());
        seq.set_speed(0.1);
        seq.start(&mut audio);

        let elapsed = run_to_end(&mut seq, &mut audio);
        assert_relative_eq!(elapsed, 2.5, epsilon = 0.03);
    }

    #[test]
    fn test_missing_completion_times_out_and_chain_recovers() {
        let mut sink = Stalled::default();
        let mut seq = NoteSequencer::build(chain(&[0.5, 1.0]));
        assert!(seq.start(&mut sink));

        // Still waiting inside duration + grace
        for _ in 0..54 {
            seq.pump(&mut sink);
            assert!(!seq.tick(1.0 / 60.0, &mut sink));
        }
        assert_eq!(seq.active_note(), Some(0));

        let mut frames = 0;
        while seq.is_running() {
            seq.pump(&mut sink);
            seq.tick(1.0 / 60.0, &mut sink);
            frames += 1;
            assert!(frames < 600, "chain never gave up on a silent sink");
        }

        assert_eq!(seq.state(), SequencerState::Stopped);
        assert_eq!(seq.active_note(), None);
        assert_eq!(sink.cancelled, vec![ToneId(1), ToneId(2)]);
        assert_eq!(seq.note_state(0), Some(NoteState::Ceased));
        assert_eq!(seq.note_state(1), Some(NoteState::Ceased));
        assert_eq!(seq.drain_transitions().last(), Some(&Transition::Finished));

        // A later gesture can start over
        assert!(seq.start(&mut sink));
        assert_eq!(seq.active_note(), Some(0));
    }

    #[test]
    fn test_timely_completion_is_not_timed_out() {
        let mut audio = audio();
        let mut seq = NoteSequencer::build(chain(&[0.2, 0.2]));
        seq.set_completion_grace(0.05);
        seq.start(&mut audio);

        while seq.is_running() {
            audio.advance(1.0 / 60.0).unwrap();
            seq.pump(&mut audio);
            assert!(!seq.tick(1.0 / 60.0, &mut audio));
        }
        assert_eq!(audio.active_voices(), 0);
    }
}

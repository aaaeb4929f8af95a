use crate::util::round2;

/// Classification of a single prompt character.
///
/// Every index at or past the cursor is `Pending`; everything behind the
/// cursor has been classified exactly once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharState {
    Pending,
    Correct,
    Incorrect,
}

/// Lifecycle of a session. The countdown only runs in `Running`, and
/// `Finished` is terminal: keystrokes, backspaces and ticks all become
/// no-ops once it is reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Finished,
}

/// Default countdown length, matching the classic 60 second test.
pub const DEFAULT_DURATION_SECS: u64 = 60;

/// One typing attempt: the prompt being typed, the per-character
/// classification, and the derived metrics.
///
/// Invariants held after every operation:
/// - `total_typed == correct_count + wrong_count == cursor`
/// - `char_states[i]` is `Pending` iff `i >= cursor`
#[derive(Debug, Clone)]
pub struct Session {
    pub prompt: String,
    pub char_states: Vec<CharState>,
    pub cursor: usize,
    pub correct_count: usize,
    pub wrong_count: usize,
    pub total_typed: usize,
    pub duration_secs: u64,
    pub seconds_remaining: u64,
    pub phase: Phase,
    pub wpm: u64,
    pub accuracy: f64,
}

impl Session {
    pub fn new(prompt: String, duration_secs: u64) -> Self {
        let char_count = prompt.chars().count();
        Self {
            prompt,
            char_states: vec![CharState::Pending; char_count],
            cursor: 0,
            correct_count: 0,
            wrong_count: 0,
            total_typed: 0,
            duration_secs,
            seconds_remaining: duration_secs,
            // An empty prompt has nothing left to type.
            phase: if char_count == 0 {
                Phase::Finished
            } else {
                Phase::Idle
            },
            wpm: 0,
            accuracy: 100.0,
        }
    }

    pub fn char_count(&self) -> usize {
        self.char_states.len()
    }

    pub fn get_expected_char(&self, idx: usize) -> char {
        self.prompt.chars().nth(idx).unwrap()
    }

    pub fn has_started(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn has_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// Mistakes shown in the metrics bar; a backspaced error is forgiven.
    pub fn mistakes(&self) -> usize {
        self.wrong_count
    }

    /// Process one typed character against the prompt.
    pub fn write(&mut self, c: char) {
        if self.phase == Phase::Finished {
            return;
        }
        if self.phase == Phase::Idle {
            self.phase = Phase::Running;
        }
        // Stray input after the last character only seals the session.
        if self.cursor >= self.char_count() {
            self.phase = Phase::Finished;
            return;
        }

        if c == self.get_expected_char(self.cursor) {
            self.char_states[self.cursor] = CharState::Correct;
            self.correct_count += 1;
        } else {
            self.char_states[self.cursor] = CharState::Incorrect;
            self.wrong_count += 1;
        }
        self.total_typed += 1;
        self.cursor += 1;

        if self.cursor == self.char_count() {
            self.phase = Phase::Finished;
        }
        self.recompute_metrics();
    }

    /// Undo the most recent classification. Exact inverse of `write`:
    /// counters and cursor return to their prior values.
    pub fn backspace(&mut self) {
        if self.phase == Phase::Finished || self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        match self.char_states[self.cursor] {
            CharState::Correct => self.correct_count -= 1,
            CharState::Incorrect => self.wrong_count -= 1,
            CharState::Pending => {}
        }
        self.char_states[self.cursor] = CharState::Pending;
        self.total_typed -= 1;
        self.recompute_metrics();
    }

    /// Advance the countdown by one second of elapsed real time.
    pub fn on_tick(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        if self.seconds_remaining > 0 {
            self.seconds_remaining -= 1;
            if self.seconds_remaining == 0 {
                self.phase = Phase::Finished;
            }
        }
        self.recompute_metrics();
    }

    /// Minutes spent so far, with a 1/60 floor so WPM is defined at the
    /// very first instant.
    fn elapsed_minutes(&self) -> f64 {
        let minutes = (self.duration_secs - self.seconds_remaining) as f64 / 60.0;
        if minutes == 0.0 {
            1.0 / 60.0
        } else {
            minutes
        }
    }

    fn recompute_metrics(&mut self) {
        self.wpm = if self.correct_count == 0 {
            0
        } else {
            (self.correct_count as f64 / 5.0 / self.elapsed_minutes()).round() as u64
        };
        self.accuracy = if self.total_typed == 0 {
            100.0
        } else {
            round2(self.correct_count as f64 / self.total_typed as f64 * 100.0)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn assert_invariants(s: &Session) {
        assert_eq!(s.total_typed, s.correct_count + s.wrong_count);
        assert_eq!(s.total_typed, s.cursor);
        for (i, st) in s.char_states.iter().enumerate() {
            if i < s.cursor {
                assert_ne!(*st, CharState::Pending, "classified char at {i}");
            } else {
                assert_eq!(*st, CharState::Pending, "pending char at {i}");
            }
        }
    }

    #[test]
    fn test_new_session() {
        let s = Session::new("hello world".to_string(), 60);
        assert_eq!(s.prompt, "hello world");
        assert_eq!(s.char_count(), 11);
        assert_eq!(s.cursor, 0);
        assert_eq!(s.seconds_remaining, 60);
        assert_eq!(s.wpm, 0);
        assert_eq!(s.accuracy, 100.0);
        assert_matches!(s.phase, Phase::Idle);
        assert!(!s.has_started());
        assert!(!s.has_finished());
        assert_invariants(&s);
    }

    #[test]
    fn test_new_session_empty_prompt_is_finished() {
        let s = Session::new(String::new(), 60);
        assert_matches!(s.phase, Phase::Finished);
    }

    #[test]
    fn test_first_keystroke_starts_the_session() {
        let mut s = Session::new("test".to_string(), 60);
        s.write('t');
        assert_matches!(s.phase, Phase::Running);
        assert!(s.has_started());
    }

    #[test]
    fn test_write_correct_char() {
        let mut s = Session::new("test".to_string(), 60);
        s.write('t');
        assert_eq!(s.char_states[0], CharState::Correct);
        assert_eq!(s.correct_count, 1);
        assert_eq!(s.wrong_count, 0);
        assert_eq!(s.cursor, 1);
        assert_invariants(&s);
    }

    #[test]
    fn test_write_incorrect_char() {
        let mut s = Session::new("test".to_string(), 60);
        s.write('x');
        assert_eq!(s.char_states[0], CharState::Incorrect);
        assert_eq!(s.correct_count, 0);
        assert_eq!(s.wrong_count, 1);
        assert_eq!(s.cursor, 1);
        assert_invariants(&s);
    }

    #[test]
    fn test_whitespace_is_matched_exactly() {
        let mut s = Session::new("a b".to_string(), 60);
        s.write('a');
        s.write('x'); // expected a space
        assert_eq!(s.char_states[1], CharState::Incorrect);
        s.backspace();
        s.write(' ');
        assert_eq!(s.char_states[1], CharState::Correct);
    }

    #[test]
    fn test_case_is_matched_exactly() {
        let mut s = Session::new("Ab".to_string(), 60);
        s.write('a');
        assert_eq!(s.char_states[0], CharState::Incorrect);
    }

    #[test]
    fn test_completion_finishes_the_session() {
        let mut s = Session::new("hi".to_string(), 60);
        s.write('h');
        assert!(!s.has_finished());
        s.write('i');
        assert!(s.has_finished());
        assert_eq!(s.cursor, s.char_count());
    }

    #[test]
    fn test_write_after_finish_is_a_noop() {
        let mut s = Session::new("hi".to_string(), 60);
        s.write('h');
        s.write('i');
        let before = s.clone();
        s.write('x');
        assert_eq!(s.cursor, before.cursor);
        assert_eq!(s.correct_count, before.correct_count);
        assert_eq!(s.wrong_count, before.wrong_count);
        assert_eq!(s.total_typed, before.total_typed);
        assert_eq!(s.char_states, before.char_states);
    }

    #[test]
    fn test_backspace_round_trips_write() {
        let mut s = Session::new("abc".to_string(), 60);
        s.write('a');
        let snapshot = (
            s.cursor,
            s.correct_count,
            s.wrong_count,
            s.total_typed,
            s.char_states.clone(),
        );
        s.write('x');
        s.backspace();
        assert_eq!(
            (
                s.cursor,
                s.correct_count,
                s.wrong_count,
                s.total_typed,
                s.char_states.clone()
            ),
            snapshot
        );
        assert_invariants(&s);
    }

    #[test]
    fn test_backspace_at_start_is_a_noop() {
        let mut s = Session::new("abc".to_string(), 60);
        s.backspace();
        assert_eq!(s.cursor, 0);
        assert_eq!(s.total_typed, 0);
        assert_invariants(&s);
    }

    #[test]
    fn test_backspace_after_finish_is_a_noop() {
        let mut s = Session::new("hi".to_string(), 60);
        s.write('h');
        s.write('i');
        s.backspace();
        assert_eq!(s.cursor, 2);
        assert_eq!(s.total_typed, 2);
    }

    #[test]
    fn test_backspace_decrements_the_matching_counter() {
        let mut s = Session::new("ab".to_string(), 60);
        s.write('a'); // correct
        s.write('x'); // incorrect
        s.backspace();
        assert_eq!(s.wrong_count, 0);
        assert_eq!(s.correct_count, 1);
        s.backspace();
        assert_eq!(s.correct_count, 0);
        assert_invariants(&s);
    }

    #[test]
    fn test_tick_counts_down_and_finishes_at_zero() {
        let mut s = Session::new("hello".to_string(), 3);
        s.write('h'); // Idle -> Running
        s.on_tick();
        assert_eq!(s.seconds_remaining, 2);
        s.on_tick();
        s.on_tick();
        assert_eq!(s.seconds_remaining, 0);
        assert!(s.has_finished());
    }

    #[test]
    fn test_tick_is_inert_while_idle() {
        let mut s = Session::new("hello".to_string(), 60);
        s.on_tick();
        assert_eq!(s.seconds_remaining, 60);
        assert_matches!(s.phase, Phase::Idle);
    }

    #[test]
    fn test_tick_is_inert_after_finish() {
        let mut s = Session::new("hi".to_string(), 60);
        s.write('h');
        s.write('i');
        s.on_tick();
        assert_eq!(s.seconds_remaining, 60);
    }

    #[test]
    fn test_timer_expiry_rejects_further_keystrokes() {
        let mut s = Session::new("hello".to_string(), 1);
        s.write('h');
        s.on_tick();
        assert!(s.has_finished());
        let before = s.clone();
        s.write('e');
        assert_eq!(s.cursor, before.cursor);
        assert_eq!(s.total_typed, before.total_typed);
    }

    #[test]
    fn test_wpm_zero_without_correct_chars() {
        let mut s = Session::new("abc".to_string(), 60);
        s.write('x');
        s.on_tick();
        assert_eq!(s.wpm, 0);
    }

    #[test]
    fn test_wpm_at_first_instant_uses_floor() {
        // No seconds elapsed yet: elapsed minutes floor to 1/60, so one
        // correct char reads as 12 wpm (1 / 5 / (1/60)).
        let mut s = Session::new("abc".to_string(), 60);
        s.write('a');
        assert_eq!(s.wpm, 12);
    }

    #[test]
    fn test_wpm_after_elapsed_time() {
        // 7 correct chars over one elapsed second: 7 / 5 / (1/60) = 84.
        let mut s = Session::new("cat dog".to_string(), 60);
        s.write('c');
        s.on_tick();
        for c in "at dog".chars() {
            s.write(c);
        }
        assert_eq!(s.wpm, 84);
        assert_eq!(s.accuracy, 100.0);
        assert_eq!(s.wrong_count, 0);
        assert_eq!(s.cursor, 7);
        assert!(s.has_finished());
    }

    #[test]
    fn test_accuracy_two_decimals() {
        let mut s = Session::new("abc".to_string(), 60);
        s.write('a');
        s.write('x');
        s.write('c');
        assert_eq!(s.char_states[0], CharState::Correct);
        assert_eq!(s.char_states[1], CharState::Incorrect);
        assert_eq!(s.char_states[2], CharState::Correct);
        assert_eq!(s.correct_count, 2);
        assert_eq!(s.wrong_count, 1);
        assert_eq!(s.accuracy, 66.67);
    }

    #[test]
    fn test_accuracy_back_to_100_after_backspacing_error() {
        let mut s = Session::new("ab".to_string(), 60);
        s.write('x');
        assert!(s.accuracy < 100.0);
        s.backspace();
        assert_eq!(s.accuracy, 100.0);
    }

    #[test]
    fn test_perfect_run_full_prompt() {
        let prompt = "typing practice";
        let mut s = Session::new(prompt.to_string(), 60);
        for c in prompt.chars() {
            s.write(c);
            assert_invariants(&s);
        }
        assert_eq!(s.cursor, s.char_count());
        assert_eq!(s.correct_count, prompt.chars().count());
        assert_eq!(s.wrong_count, 0);
        assert_eq!(s.accuracy, 100.0);
        assert!(s.has_finished());
    }

    #[test]
    fn test_invariants_under_mixed_sequence() {
        let mut s = Session::new("one two three".to_string(), 60);
        for c in "onx".chars() {
            s.write(c);
            assert_invariants(&s);
        }
        s.backspace();
        assert_invariants(&s);
        for c in "e two".chars() {
            s.write(c);
            assert_invariants(&s);
        }
        s.on_tick();
        assert_invariants(&s);
        assert_eq!(s.total_typed, s.cursor);
    }

    #[test]
    fn test_multibyte_prompt_indexed_by_chars() {
        let mut s = Session::new("héllo".to_string(), 60);
        assert_eq!(s.char_count(), 5);
        s.write('h');
        s.write('é');
        assert_eq!(s.correct_count, 2);
        assert_eq!(s.get_expected_char(2), 'l');
    }
}

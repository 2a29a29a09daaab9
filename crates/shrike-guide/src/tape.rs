use shrike_witness::{ConcreteValue, TapeEntry};

/// In-order cursor over the replay tape extracted by normalization.
///
/// Each call site asks for the next entry; a mismatch on function or line
/// invalidates the tape permanently and the executor falls back to symbolic
/// inputs. Values are never reused.
#[derive(Debug)]
pub struct ReplayTape<'w> {
    entries: &'w [TapeEntry],
    position: usize,
    valid: bool,
}

impl<'w> ReplayTape<'w> {
    pub fn new(entries: &'w [TapeEntry]) -> Self {
        ReplayTape {
            entries,
            position: 0,
            valid: !entries.is_empty(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn remaining(&self) -> usize {
        self.entries.len().saturating_sub(self.position)
    }

    /// Consume the next entry for a call to `function` at `line`.
    ///
    /// Returns the concrete value when the head entry matches; otherwise
    /// invalidates the tape and returns `None`.
    pub fn next(&mut self, function: &str, line: u64) -> Option<ConcreteValue> {
        if !self.valid {
            return None;
        }
        let Some(entry) = self.entries.get(self.position) else {
            self.valid = false;
            return None;
        };
        if entry.function == function && entry.line == line {
            self.position += 1;
            Some(entry.value)
        } else {
            tracing::warn!(
                expected_function = %entry.function,
                expected_line = entry.line,
                got_function = %function,
                got_line = line,
                "replay tape diverged, falling back to symbolic inputs"
            );
            self.valid = false;
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<TapeEntry> {
        vec![
            TapeEntry {
                function: "__VERIFIER_nondet_int".into(),
                line: 4,
                ordinal: 0,
                value: ConcreteValue::from_i64(32, 1),
            },
            TapeEntry {
                function: "__VERIFIER_nondet_int".into(),
                line: 9,
                ordinal: 0,
                value: ConcreteValue::from_i64(32, 2),
            },
        ]
    }

    #[test]
    fn consumes_strictly_in_order() {
        let entries = entries();
        let mut tape = ReplayTape::new(&entries);
        assert_eq!(tape.remaining(), 2);
        assert_eq!(tape.next("__VERIFIER_nondet_int", 4).unwrap().bits, 1);
        assert_eq!(tape.next("__VERIFIER_nondet_int", 9).unwrap().bits, 2);
        assert_eq!(tape.remaining(), 0);
    }

    #[test]
    fn mismatch_invalidates_permanently() {
        let entries = entries();
        let mut tape = ReplayTape::new(&entries);
        assert!(tape.next("__VERIFIER_nondet_int", 9).is_none());
        assert!(!tape.is_valid());
        // Even a now-correct request stays unanswered.
        assert!(tape.next("__VERIFIER_nondet_int", 4).is_none());
    }

    #[test]
    fn exhausted_tape_invalidates_on_further_requests() {
        let entries = entries();
        let mut tape = ReplayTape::new(&entries);
        tape.next("__VERIFIER_nondet_int", 4);
        tape.next("__VERIFIER_nondet_int", 9);
        assert!(tape.is_valid());
        assert!(tape.next("__VERIFIER_nondet_int", 12).is_none());
        assert!(!tape.is_valid());
    }

    #[test]
    fn empty_tape_is_invalid_from_the_start() {
        let tape = ReplayTape::new(&[]);
        assert!(!tape.is_valid());
    }
}

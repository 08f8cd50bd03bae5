//! Chord resolution for multi-key bindings.
//!
//! Tokens are fed one at a time. A sequence that matches a binding exactly and
//! is not the start of a longer one resolves right away. A sequence that is the
//! start of a longer binding waits; the caller schedules a timeout carrying the
//! current generation, and [ChordResolver::on_timeout] settles it if no newer
//! input arrived in between.

use crate::app::keymap::{Action, Keymap};

use tracing::debug;

use std::time::Duration;

/// How long an ambiguous chord waits for the next key.
pub const CHORD_TIMEOUT: Duration = Duration::from_millis(350);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChordOutcome {
    Resolved(Action),
    /// Waiting for more input; schedule a timeout for this generation.
    Pending(u64),
    NoMatch,
}

#[derive(Debug, Default)]
pub struct ChordResolver {
    pending: Vec<String>,
    generation: u64,
}

impl ChordResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drops any partial chord and invalidates scheduled timeouts.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.generation += 1;
    }

    pub fn feed(&mut self, token: &str, keymap: &Keymap) -> ChordOutcome {
        self.pending.push(token.to_string());
        if let Some(outcome) = self.settle(keymap) {
            return outcome;
        }

        // broken chord: start over from the key just typed
        debug!(pending = ?self.pending, "chord broken, retrying last key");
        self.pending.clear();
        self.pending.push(token.to_string());
        if let Some(outcome) = self.settle(keymap) {
            return outcome;
        }

        self.reset();
        ChordOutcome::NoMatch
    }

    /// Applies the policy to the current pending sequence. `None` means neither
    /// an exact match nor a prefix.
    fn settle(&mut self, keymap: &Keymap) -> Option<ChordOutcome> {
        let m = keymap.match_sequence(&self.pending);
        if m.prefix {
            self.generation += 1;
            return Some(ChordOutcome::Pending(self.generation));
        }
        let action = m.exact?;
        self.reset();
        Some(ChordOutcome::Resolved(action))
    }

    /// Settles a pending chord when its timer fires. Stale generations are ignored.
    pub fn on_timeout(&mut self, generation: u64, keymap: &Keymap) -> Option<Action> {
        if generation != self.generation || self.pending.is_empty() {
            return None;
        }
        let exact = keymap.match_sequence(&self.pending).exact;
        debug!(pending = ?self.pending, ?exact, "chord timeout");
        self.reset();
        exact
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::keymap::{FileAction, NavAction};

    fn keymap(specs: &[(&str, &str)]) -> Keymap {
        Keymap::from_specs(specs.iter().copied())
    }

    #[test]
    fn gg_resolves_after_two_tokens() {
        let km = keymap(&[("gg", "top")]);
        let mut chord = ChordResolver::new();

        assert!(matches!(chord.feed("g", &km), ChordOutcome::Pending(_)));
        assert_eq!(
            chord.feed("g", &km),
            ChordOutcome::Resolved(Action::Nav(NavAction::Top))
        );
        assert!(!chord.is_pending());
    }

    #[test]
    fn prefix_only_chord_times_out_to_nothing() {
        let km = keymap(&[("cc", "copy")]);
        let mut chord = ChordResolver::new();

        let ChordOutcome::Pending(generation) = chord.feed("c", &km) else {
            panic!("expected pending chord");
        };
        assert_eq!(chord.on_timeout(generation, &km), None);
        assert!(!chord.is_pending());
    }

    #[test]
    fn exact_and_prefix_waits_then_resolves_on_timeout() {
        let km = keymap(&[("y", "copy-path"), ("yy", "copy")]);
        let mut chord = ChordResolver::new();

        let ChordOutcome::Pending(generation) = chord.feed("y", &km) else {
            panic!("expected pending chord");
        };
        assert_eq!(
            chord.on_timeout(generation, &km),
            Some(Action::File(FileAction::CopyPath))
        );
    }

    #[test]
    fn longer_chord_wins_within_window() {
        let km = keymap(&[("y", "copy-path"), ("yy", "copy")]);
        let mut chord = ChordResolver::new();

        let ChordOutcome::Pending(first) = chord.feed("y", &km) else {
            panic!("expected pending chord");
        };
        assert_eq!(
            chord.feed("y", &km),
            ChordOutcome::Resolved(Action::File(FileAction::Copy))
        );
        // the timer scheduled for the first key is now stale
        assert_eq!(chord.on_timeout(first, &km), None);
    }

    #[test]
    fn stale_timer_is_inert() {
        let km = keymap(&[("gg", "top"), ("gt", "next-tab")]);
        let mut chord = ChordResolver::new();

        let ChordOutcome::Pending(old) = chord.feed("g", &km) else {
            panic!("expected pending chord");
        };
        chord.reset();
        let ChordOutcome::Pending(new) = chord.feed("g", &km) else {
            panic!("expected pending chord");
        };
        assert_ne!(old, new);
        assert_eq!(chord.on_timeout(old, &km), None);
        assert!(chord.is_pending());
    }

    #[test]
    fn unrelated_key_aborts_chord_but_is_not_swallowed() {
        let km = keymap(&[("gg", "top"), ("j", "down")]);
        let mut chord = ChordResolver::new();

        assert!(matches!(chord.feed("g", &km), ChordOutcome::Pending(_)));
        assert_eq!(
            chord.feed("j", &km),
            ChordOutcome::Resolved(Action::Nav(NavAction::Down))
        );
        assert!(!chord.is_pending());
    }

    #[test]
    fn unknown_key_drops_everything() {
        let km = keymap(&[("gg", "top")]);
        let mut chord = ChordResolver::new();

        assert!(matches!(chord.feed("g", &km), ChordOutcome::Pending(_)));
        assert_eq!(chord.feed("z", &km), ChordOutcome::NoMatch);
        assert!(!chord.is_pending());
    }

    #[test]
    fn generation_bumps_on_every_resolution() {
        let km = keymap(&[("j", "down")]);
        let mut chord = ChordResolver::new();
        let before = chord.generation();
        chord.feed("j", &km);
        chord.feed("j", &km);
        assert_eq!(chord.generation(), before + 2);
    }
}

//! The daily warm-up drills and their completion tracker.
//!
//! Drill content is read-only reference data like the lessons. Completion is
//! session-local UI state with no persistence; it is keyed by drill title
//! rather than by position so reordering the drill list cannot silently
//! re-attribute a checkmark.

use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

/// One warm-up exercise.
#[derive(Debug, Clone, Serialize)]
pub struct Drill {
    pub title: &'static str,
    pub duration: &'static str,
    pub description: &'static str,
}

/// All drills in routine order.
pub fn all() -> &'static [Drill] {
    &DRILLS
}

static DRILLS: [Drill; 5] = [
    Drill {
        title: "Deep Breathing",
        duration: "1 min",
        description: "Inhale for 4 counts, hold for 4, exhale for 6. Repeat 3 times to calm nerves and control your pace.",
    },
    Drill {
        title: "Pausing Practice",
        duration: "1 min",
        description: "Say: “Your voice [pause] is your power [pause] in business.” Repeat 5 times, practicing clean, intentional pauses.",
    },
    Drill {
        title: "Speed Variation",
        duration: "1 min",
        description: "Say slowly: “This is important.” Then say quickly: “This is why it matters.” Alternate between the two 5 times.",
    },
    Drill {
        title: "Emphasis Training",
        duration: "1 min",
        description: "Pick a keyword like \"Results\". Say a sentence emphasizing it: “We focus on getting RESULTS for our clients.”",
    },
    Drill {
        title: "Warm Delivery",
        duration: "1 min",
        description: "Smile while saying: “You’ve got this. Let’s make your business visible, profitable, and fun.”",
    },
];

/// Tracks which drills have been completed in the current session.
///
/// Only titles present in the drill list are tracked; toggling an unknown
/// title is ignored.
#[derive(Debug)]
pub struct DrillProgress {
    completed: HashMap<&'static str, bool>,
}

impl DrillProgress {
    /// Starts with every drill unchecked.
    pub fn new() -> Self {
        let completed = DRILLS.iter().map(|d| (d.title, false)).collect();
        Self { completed }
    }

    /// Flips the completion state of one drill. Returns the new state, or
    /// `None` if the title does not name a known drill.
    pub fn toggle(&mut self, title: &str) -> Option<bool> {
        match self.completed.get_mut(title) {
            Some(state) => {
                *state = !*state;
                Some(*state)
            }
            None => {
                warn!(%title, "ignoring toggle for unknown drill");
                None
            }
        }
    }

    pub fn is_completed(&self, title: &str) -> bool {
        self.completed.get(title).copied().unwrap_or(false)
    }

    pub fn completed_count(&self) -> usize {
        self.completed.values().filter(|&&done| done).count()
    }

    /// Completion as a percentage of the full routine.
    pub fn percent(&self) -> f32 {
        if self.completed.is_empty() {
            return 0.0;
        }
        self.completed_count() as f32 / self.completed.len() as f32 * 100.0
    }
}

impl Default for DrillProgress {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routine_has_five_drills() {
        assert_eq!(all().len(), 5);
    }

    #[test]
    fn toggling_two_drills_yields_forty_percent() {
        let mut progress = DrillProgress::new();
        progress.toggle(all()[0].title);
        progress.toggle(all()[2].title);

        assert_eq!(progress.completed_count(), 2);
        assert_eq!(progress.percent(), 40.0);
    }

    #[test]
    fn toggle_flips_back_and_forth() {
        let mut progress = DrillProgress::new();
        assert_eq!(progress.toggle("Deep Breathing"), Some(true));
        assert_eq!(progress.toggle("Deep Breathing"), Some(false));
        assert_eq!(progress.completed_count(), 0);
    }

    #[test]
    fn unknown_title_is_ignored() {
        let mut progress = DrillProgress::new();
        assert_eq!(progress.toggle("Tongue Twisters"), None);
        assert_eq!(progress.completed_count(), 0);
        assert!(!progress.is_completed("Tongue Twisters"));
    }

    #[test]
    fn fresh_progress_is_zero() {
        let progress = DrillProgress::new();
        assert_eq!(progress.completed_count(), 0);
        assert_eq!(progress.percent(), 0.0);
        for drill in all() {
            assert!(!progress.is_completed(drill.title));
        }
    }
}

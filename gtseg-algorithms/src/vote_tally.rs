use std::collections::HashMap;

use gtseg_core::{ClassId, BACKGROUND};

/// Counts label votes and keeps track of the leading label while votes come in. When two labels reach the same
/// count, the label that reached it first stays in the lead.
///
/// ```
/// # use gtseg_algorithms::vote_tally::VoteTally;
/// let mut tally = VoteTally::new();
/// for label in vec![2, 5, 5, 2] {
///     tally.vote(label);
/// }
/// // both labels have two votes, 5 got there first
/// assert_eq!(tally.winner(), Some(5));
/// assert_eq!(tally.max_count(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct VoteTally {
    counts: HashMap<ClassId, usize>,
    leader: Option<(ClassId, usize)>,
}

impl VoteTally {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn vote(&mut self, label: ClassId) {
        let count = self.counts.entry(label).or_insert(0);
        *count += 1;
        let count = *count;
        match self.leader {
            Some((_, max)) if count <= max => {}
            _ => self.leader = Some((label, count)),
        }
    }

    /// The leading label, or `None` if no votes were cast
    pub fn winner(&self) -> Option<ClassId> {
        self.leader.map(|(label, _)| label)
    }

    /// The leading label, or `BACKGROUND` if no votes were cast
    pub fn winner_or_background(&self) -> ClassId {
        self.winner().unwrap_or(BACKGROUND)
    }

    /// Number of votes for the leading label
    pub fn max_count(&self) -> usize {
        self.leader.map(|(_, count)| count).unwrap_or(0)
    }
}

//! Record of contradictions met during a run.
//!
//! Contradictions never stop a run. They are logged here so callers (and
//! tests) can tell an intentional gap or a bad junction from a solver bug.

use super::direction::Direction;
use bevy::math::IVec3;

/// Where a contradiction came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContradictionKind {
    /// A ring cell had nothing left after boundary constraints.
    Authoring,
    /// Propagating from `from` across `direction` would have emptied the cell.
    /// The shrink was not applied.
    Propagation { from: IVec3, direction: Direction },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contradiction {
    /// Cell whose domain would be (or is) empty.
    pub pos: IVec3,
    pub kind: ContradictionKind,
}

/// All contradictions of one run, in the order they happened.
#[derive(Debug, Clone, Default)]
pub struct ContradictionLog {
    entries: Vec<Contradiction>,
}

impl ContradictionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, contradiction: Contradiction) {
        self.entries.push(contradiction);
    }

    pub fn entries(&self) -> &[Contradiction] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn authoring_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|c| c.kind == ContradictionKind::Authoring)
            .count()
    }

    /// Whether a propagation contradiction was logged across the shared face
    /// of `a` and `b`, in either direction.
    pub fn involves_edge(&self, a: IVec3, b: IVec3) -> bool {
        self.entries.iter().any(|c| match c.kind {
            ContradictionKind::Propagation { from, .. } => {
                (from == a && c.pos == b) || (from == b && c.pos == a)
            }
            ContradictionKind::Authoring => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_involves_edge_either_way() {
        let mut log = ContradictionLog::new();
        let a = IVec3::new(1, 0, 1);
        let b = IVec3::new(1, 0, 2);
        log.record(Contradiction {
            pos: b,
            kind: ContradictionKind::Propagation {
                from: a,
                direction: Direction::North,
            },
        });
        assert!(log.involves_edge(a, b));
        assert!(log.involves_edge(b, a));
        assert!(!log.involves_edge(a, IVec3::new(0, 0, 1)));
    }

    #[test]
    fn test_authoring_entries_are_not_edges() {
        let mut log = ContradictionLog::new();
        log.record(Contradiction {
            pos: IVec3::ZERO,
            kind: ContradictionKind::Authoring,
        });
        assert_eq!(log.authoring_count(), 1);
        assert!(!log.involves_edge(IVec3::ZERO, IVec3::X));
    }
}

//! Socket labels and the rules deciding which labels may face each other.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Per-face connector label of a tile.
///
/// `None` means the face has no connector and may only border another
/// vacant face (or the edge of the map).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SocketLabel {
    #[default]
    None,
    Named(String),
}

impl SocketLabel {
    /// Build a label from its authored name. `"None"` and `""` are vacant.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        if name.is_empty() || name.eq_ignore_ascii_case("none") {
            SocketLabel::None
        } else {
            SocketLabel::Named(name)
        }
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, SocketLabel::None)
    }

    pub fn name(&self) -> &str {
        match self {
            SocketLabel::None => "None",
            SocketLabel::Named(name) => name,
        }
    }
}

impl From<String> for SocketLabel {
    fn from(name: String) -> Self {
        SocketLabel::new(name)
    }
}

impl From<&str> for SocketLabel {
    fn from(name: &str) -> Self {
        SocketLabel::new(name)
    }
}

impl From<SocketLabel> for String {
    fn from(label: SocketLabel) -> Self {
        label.name().to_string()
    }
}

impl fmt::Display for SocketLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decides whether two sockets may face each other across a shared face.
///
/// `a` is the socket of the tile on one side, `b` the socket of the neighbor
/// facing back. Implementations must be pure and symmetric.
pub trait CompatibilityRule {
    fn compatible(&self, a: &SocketLabel, b: &SocketLabel) -> bool;
}

/// Baseline rule: equal labels connect, `None` only connects to `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatch;

impl CompatibilityRule for ExactMatch {
    fn compatible(&self, a: &SocketLabel, b: &SocketLabel) -> bool {
        a == b
    }
}

/// Exact matching plus an explicit list of label pairs that also connect.
///
/// Pairs are stored symmetrically, so `("RoadL", "RoadR")` also allows
/// `RoadR` facing `RoadL`. Pairs involving `None` are ignored: a vacant face
/// never accepts a connector.
#[derive(Debug, Clone, Default)]
pub struct PairTable {
    pairs: HashSet<(String, String)>,
}

impl PairTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow `a` and `b` to face each other. A label already matches itself,
    /// so `allow(a, a)` records nothing.
    pub fn allow(&mut self, a: &SocketLabel, b: &SocketLabel) {
        if a == b {
            return;
        }
        if let (SocketLabel::Named(a), SocketLabel::Named(b)) = (a, b) {
            self.pairs.insert((a.clone(), b.clone()));
            self.pairs.insert((b.clone(), a.clone()));
        }
    }

    /// Builder form of [`PairTable::allow`].
    pub fn with_pair(mut self, a: impl Into<SocketLabel>, b: impl Into<SocketLabel>) -> Self {
        self.allow(&a.into(), &b.into());
        self
    }

    pub fn len(&self) -> usize {
        self.pairs.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl CompatibilityRule for PairTable {
    fn compatible(&self, a: &SocketLabel, b: &SocketLabel) -> bool {
        if ExactMatch.compatible(a, b) {
            return true;
        }
        match (a, b) {
            (SocketLabel::Named(a), SocketLabel::Named(b)) => {
                self.pairs.contains(&(a.clone(), b.clone()))
            }
            _ => false,
        }
    }
}

//! Tile catalog: the immutable set of tile variants and their adjacency.
//!
//! A catalog is built once, wrapped in an `Arc` and shared by every cell of
//! every run. Cells refer to variants by [`TileIndex`]; the variants
//! themselves are never cloned or mutated after construction.
//!
//! Building a catalog also precomputes, for every direction, which variants
//! may sit next to which. The compatibility rule is only consulted here.

use super::direction::{Direction, DIRECTION_COUNT};
use super::socket::{CompatibilityRule, PairTable, SocketLabel};
use std::collections::HashMap;
use std::fmt;

/// Index of a variant inside its catalog.
pub type TileIndex = usize;

/// Errors raised while building or loading a catalog.
#[derive(Debug)]
pub enum CatalogError {
    /// File system error
    Io(std::io::Error),
    /// JSON parse error
    Json(serde_json::Error),
    /// Lua evaluation or shape error
    Lua(String),
    /// The catalog has no tiles
    Empty,
    /// Two tiles share an id
    DuplicateTile(String),
    /// The border tile is not one of the catalog's tiles
    UnknownBorder(String),
    /// Any other malformed definition
    InvalidDefinition(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Io(e) => write!(f, "IO error: {}", e),
            CatalogError::Json(e) => write!(f, "JSON error: {}", e),
            CatalogError::Lua(msg) => write!(f, "Lua error: {}", msg),
            CatalogError::Empty => write!(f, "catalog has no tiles"),
            CatalogError::DuplicateTile(id) => write!(f, "duplicate tile id '{}'", id),
            CatalogError::UnknownBorder(id) => {
                write!(f, "border tile '{}' is not in the catalog", id)
            }
            CatalogError::InvalidDefinition(msg) => write!(f, "invalid definition: {}", msg),
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<std::io::Error> for CatalogError {
    fn from(e: std::io::Error) -> Self {
        CatalogError::Io(e)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Json(e)
    }
}

impl From<mlua::Error> for CatalogError {
    fn from(e: mlua::Error) -> Self {
        CatalogError::Lua(e.to_string())
    }
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TileVariant {
    /// Opaque identifier, unique within the catalog.
    pub id: String,
    /// Visual reference owned by the rendering side (prefab name, mesh path...).
    pub payload: String,
    sockets: [SocketLabel; DIRECTION_COUNT],
}

impl TileVariant {
    /// A variant with every face vacant.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            payload: String::new(),
            sockets: Default::default(),
        }
    }

    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = payload.into();
        self
    }

    pub fn with_socket(mut self, dir: Direction, label: impl Into<SocketLabel>) -> Self {
        self.sockets[dir.index()] = label.into();
        self
    }

    #[inline]
    pub fn socket(&self, dir: Direction) -> &SocketLabel {
        &self.sockets[dir.index()]
    }
}

/// A tile face that no variant in the catalog can ever face.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadFace {
    pub tile: TileIndex,
    pub direction: Direction,
}

/// Immutable set of variants plus their precomputed adjacency.
#[derive(Debug)]
pub struct TileCatalog {
    variants: Vec<TileVariant>,
    by_id: HashMap<String, TileIndex>,
    border: Option<TileIndex>,
    /// `allowed[d][a * n + b]`: `b` may sit on face `d` of `a`.
    allowed: [Vec<bool>; DIRECTION_COUNT],
    /// `neighbors[d][a]`: every `b` allowed on face `d` of `a`.
    neighbors: [Vec<Vec<TileIndex>>; DIRECTION_COUNT],
}

impl TileCatalog {
    pub fn builder() -> TileCatalogBuilder {
        TileCatalogBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn variant(&self, tile: TileIndex) -> &TileVariant {
        &self.variants[tile]
    }

    pub fn variants(&self) -> &[TileVariant] {
        &self.variants
    }

    pub fn index_of(&self, id: &str) -> Option<TileIndex> {
        self.by_id.get(id).copied()
    }

    /// The designated border tile, if any.
    pub fn border(&self) -> Option<TileIndex> {
        self.border
    }

    /// Whether `b` may sit on face `dir` of `a`.
    #[inline]
    pub fn allows(&self, a: TileIndex, dir: Direction, b: TileIndex) -> bool {
        self.allowed[dir.index()][a * self.variants.len() + b]
    }

    /// Every variant allowed on face `dir` of `a`.
    #[inline]
    pub fn neighbors(&self, a: TileIndex, dir: Direction) -> &[TileIndex] {
        &self.neighbors[dir.index()][a]
    }

    /// Faces no variant can face. A non-empty result means some placements
    /// can only ever end in a contradiction.
    pub fn audit(&self) -> Vec<DeadFace> {
        let mut dead = Vec::new();
        for tile in 0..self.variants.len() {
            for direction in Direction::ALL {
                if self.neighbors(tile, direction).is_empty() {
                    dead.push(DeadFace { tile, direction });
                }
            }
        }
        dead
    }
}

/// Programmatic catalog construction.
///
/// ```ignore
/// let catalog = TileCatalog::builder()
///     .tile(TileVariant::new("Straight")
///         .with_socket(Direction::North, "Path")
///         .with_socket(Direction::South, "Path"))
///     .tile(TileVariant::new("Empty"))
///     .border("Empty")
///     .build()?;
/// ```
#[derive(Debug, Default)]
pub struct TileCatalogBuilder {
    variants: Vec<TileVariant>,
    border: Option<String>,
    pairs: PairTable,
}

impl TileCatalogBuilder {
    pub fn tile(mut self, variant: TileVariant) -> Self {
        self.variants.push(variant);
        self
    }

    /// Designate the border filler by id.
    pub fn border(mut self, id: impl Into<String>) -> Self {
        self.border = Some(id.into());
        self
    }

    /// Let two different labels connect in addition to exact matches.
    pub fn pair(mut self, a: impl Into<SocketLabel>, b: impl Into<SocketLabel>) -> Self {
        self.pairs.allow(&a.into(), &b.into());
        self
    }

    /// Build with exact matching extended by any declared pairs.
    pub fn build(self) -> Result<TileCatalog, CatalogError> {
        let rule = self.pairs.clone();
        self.build_with(&rule)
    }

    /// Build with a caller-supplied rule. Declared pairs are ignored.
    pub fn build_with(self, rule: &dyn CompatibilityRule) -> Result<TileCatalog, CatalogError> {
        if self.variants.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut by_id = HashMap::with_capacity(self.variants.len());
        for (i, variant) in self.variants.iter().enumerate() {
            if by_id.insert(variant.id.clone(), i).is_some() {
                return Err(CatalogError::DuplicateTile(variant.id.clone()));
            }
        }

        let border = match self.border {
            Some(id) => Some(
                by_id
                    .get(&id)
                    .copied()
                    .ok_or(CatalogError::UnknownBorder(id))?,
            ),
            None => None,
        };

        let n = self.variants.len();
        let mut allowed: [Vec<bool>; DIRECTION_COUNT] = Default::default();
        let mut neighbors: [Vec<Vec<TileIndex>>; DIRECTION_COUNT] = Default::default();

        for dir in Direction::ALL {
            let d = dir.index();
            allowed[d] = vec![false; n * n];
            neighbors[d] = vec![Vec::new(); n];
            for a in 0..n {
                let socket_a = self.variants[a].socket(dir);
                for b in 0..n {
                    let socket_b = self.variants[b].socket(dir.opposite());
                    if rule.compatible(socket_a, socket_b) {
                        allowed[d][a * n + b] = true;
                        neighbors[d][a].push(b);
                    }
                }
            }
        }

        Ok(TileCatalog {
            variants: self.variants,
            by_id,
            border,
            allowed,
            neighbors,
        })
    }
}

//! Tile catalog loading.
//!
//! Catalogs are authored in one of two formats with the same shape:
//! - `.lua` - a Lua 5.4 script returning the catalog table
//! - `.json` - the same object as JSON
//!
//! # Lua File Format
//!
//! ```lua
//! return {
//!     border = "Grass",
//!     tiles = {
//!         { id = "Grass", payload = "tiles/grass" },
//!         { id = "RoadNS", payload = "tiles/road_ns", north = "Road", south = "Road" },
//!     },
//!     pairs = {
//!         { "RoadLeft", "RoadRight" },
//!     },
//! }
//! ```
//!
//! Socket fields (`north`, `south`, `east`, `west`, `top`, `bottom`) are
//! optional; a missing socket is `"None"`. `pairs` lists extra labels that
//! may face each other besides identical ones.
//!
//! # Example
//!
//! ```ignore
//! let catalog = load_catalog("assets/tiles/town.lua")?;
//! println!("{} tiles", catalog.len());
//! ```

use crate::wfc::{CatalogError, Direction, SocketLabel, TileCatalog, TileVariant};
use bevy::log::info;
use mlua::{Lua, Table, Value};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One tile as authored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileDef {
    pub id: String,
    pub payload: String,
    pub north: SocketLabel,
    pub south: SocketLabel,
    pub east: SocketLabel,
    pub west: SocketLabel,
    pub top: SocketLabel,
    pub bottom: SocketLabel,
}

impl TileDef {
    fn socket_mut(&mut self, dir: Direction) -> &mut SocketLabel {
        match dir {
            Direction::North => &mut self.north,
            Direction::South => &mut self.south,
            Direction::East => &mut self.east,
            Direction::West => &mut self.west,
            Direction::Top => &mut self.top,
            Direction::Bottom => &mut self.bottom,
        }
    }

    fn socket(&self, dir: Direction) -> &SocketLabel {
        match dir {
            Direction::North => &self.north,
            Direction::South => &self.south,
            Direction::East => &self.east,
            Direction::West => &self.west,
            Direction::Top => &self.top,
            Direction::Bottom => &self.bottom,
        }
    }
}

/// A whole catalog as authored, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogDef {
    pub border: Option<String>,
    pub tiles: Vec<TileDef>,
    pub pairs: Vec<(String, String)>,
}

impl CatalogDef {
    /// Validate and precompute adjacency.
    pub fn build(self) -> Result<TileCatalog, CatalogError> {
        let mut builder = TileCatalog::builder();

        for tile in self.tiles {
            if tile.id.trim().is_empty() {
                return Err(CatalogError::InvalidDefinition(
                    "tile without an id".to_string(),
                ));
            }
            let mut variant = TileVariant::new(tile.id.clone()).with_payload(tile.payload.clone());
            for dir in Direction::ALL {
                variant = variant.with_socket(dir, tile.socket(dir).clone());
            }
            builder = builder.tile(variant);
        }

        if let Some(border) = self.border {
            builder = builder.border(border);
        }
        for (a, b) in self.pairs {
            builder = builder.pair(a, b);
        }

        builder.build()
    }
}

/// Load a catalog from a file.
///
/// Format is determined by file extension: `.lua` or `.json`.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<TileCatalog, CatalogError> {
    let path = path.as_ref();
    let path_str = path.to_string_lossy().to_lowercase();
    let src = std::fs::read_to_string(path)?;

    let def = if path_str.ends_with(".lua") {
        parse_catalog_lua(&src)?
    } else if path_str.ends_with(".json") {
        parse_catalog_json(&src)?
    } else {
        return Err(CatalogError::InvalidDefinition(format!(
            "unknown catalog format: {}",
            path.display()
        )));
    };

    let catalog = def.build()?;
    info!(
        "Loaded tile catalog from {}: {} tiles",
        path.display(),
        catalog.len()
    );
    Ok(catalog)
}

/// Parse a JSON catalog definition.
pub fn parse_catalog_json(src: &str) -> Result<CatalogDef, CatalogError> {
    Ok(serde_json::from_str(src)?)
}

/// Evaluate a Lua catalog script and read the table it returns.
pub fn parse_catalog_lua(src: &str) -> Result<CatalogDef, CatalogError> {
    let lua = Lua::new();
    let value: Value = lua.load(src).eval()?;
    let table = value
        .as_table()
        .ok_or_else(|| CatalogError::Lua("catalog script must return a table".into()))?;

    let mut def = CatalogDef {
        border: table.get::<Option<String>>("border")?,
        ..Default::default()
    };

    let tiles: Table = table
        .get::<Option<Table>>("tiles")?
        .ok_or_else(|| CatalogError::Lua("catalog has no `tiles` table".into()))?;
    for entry in tiles.sequence_values::<Value>() {
        let entry = entry?;
        let entry_table = entry
            .as_table()
            .ok_or_else(|| CatalogError::Lua("each tile must be a table".into()))?;
        def.tiles.push(parse_tile(entry_table)?);
    }

    if let Some(pairs) = table.get::<Option<Table>>("pairs")? {
        for entry in pairs.sequence_values::<Table>() {
            let entry = entry?;
            let a: String = entry.get(1)?;
            let b: String = entry.get(2)?;
            def.pairs.push((a, b));
        }
    }

    Ok(def)
}

fn parse_tile(table: &Table) -> Result<TileDef, CatalogError> {
    let mut tile = TileDef {
        id: table.get("id")?,
        payload: table.get::<Option<String>>("payload")?.unwrap_or_default(),
        ..Default::default()
    };
    for dir in Direction::ALL {
        if let Some(label) = table.get::<Option<String>>(dir.to_string())? {
            *tile.socket_mut(dir) = SocketLabel::new(label);
        }
    }
    Ok(tile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const PATH_LUA: &str = r#"
        return {
            border = "Empty",
            tiles = {
                { id = "Straight", payload = "prefabs/straight", north = "Path", south = "Path" },
                { id = "Empty", payload = "prefabs/empty" },
            },
        }
    "#;

    #[test]
    fn test_parse_lua_catalog() {
        let def = parse_catalog_lua(PATH_LUA).expect("Should parse");
        assert_eq!(def.border.as_deref(), Some("Empty"));
        assert_eq!(def.tiles.len(), 2);
        assert_eq!(def.tiles[0].id, "Straight");
        assert_eq!(def.tiles[0].payload, "prefabs/straight");
        assert_eq!(def.tiles[0].north, SocketLabel::new("Path"));
        assert!(def.tiles[0].east.is_none());
        assert!(def.tiles[1].north.is_none());
        assert!(def.pairs.is_empty());
    }

    #[test]
    fn test_lua_pairs_and_explicit_none() {
        let src = r#"
            return {
                tiles = {
                    { id = "L", east = "RoadLeft", west = "None" },
                    { id = "R", west = "RoadRight" },
                },
                pairs = { { "RoadLeft", "RoadRight" } },
            }
        "#;
        let def = parse_catalog_lua(src).unwrap();
        assert!(def.tiles[0].west.is_none());
        assert_eq!(
            def.pairs,
            vec![("RoadLeft".to_string(), "RoadRight".to_string())]
        );

        let catalog = def.build().unwrap();
        let (l, r) = (catalog.index_of("L").unwrap(), catalog.index_of("R").unwrap());
        assert!(catalog.allows(l, Direction::East, r));
        assert!(catalog.allows(r, Direction::West, l));
        assert!(!catalog.allows(l, Direction::East, l));
    }

    #[test]
    fn test_lua_errors() {
        assert!(matches!(
            parse_catalog_lua("return 42"),
            Err(CatalogError::Lua(_))
        ));
        assert!(matches!(
            parse_catalog_lua("return { border = \"x\" }"),
            Err(CatalogError::Lua(_))
        ));
        assert!(matches!(
            parse_catalog_lua("this is not lua"),
            Err(CatalogError::Lua(_))
        ));
    }

    #[test]
    fn test_parse_json_catalog() {
        let src = r#"{
            "border": "Empty",
            "tiles": [
                { "id": "Straight", "payload": "prefabs/straight", "north": "Path", "south": "Path" },
                { "id": "Empty" }
            ]
        }"#;
        let def = parse_catalog_json(src).unwrap();
        assert_eq!(def.border.as_deref(), Some("Empty"));
        assert_eq!(def.tiles[0].south, SocketLabel::new("Path"));
        assert!(def.tiles[1].payload.is_empty());
        assert!(def.tiles[1].top.is_none());
    }

    #[test]
    fn test_build_rejects_bad_definitions() {
        let unknown_border = CatalogDef {
            border: Some("Lava".into()),
            tiles: vec![TileDef {
                id: "Grass".into(),
                ..Default::default()
            }],
            pairs: Vec::new(),
        };
        assert!(matches!(
            unknown_border.build(),
            Err(CatalogError::UnknownBorder(id)) if id == "Lava"
        ));

        assert!(matches!(
            CatalogDef::default().build(),
            Err(CatalogError::Empty)
        ));

        let blank_id = CatalogDef {
            tiles: vec![TileDef::default()],
            ..Default::default()
        };
        assert!(matches!(
            blank_id.build(),
            Err(CatalogError::InvalidDefinition(_))
        ));
    }

    #[test]
    fn test_load_catalog_from_files() {
        let mut lua_file = NamedTempFile::with_suffix(".lua").unwrap();
        lua_file.write_all(PATH_LUA.as_bytes()).unwrap();
        let catalog = load_catalog(lua_file.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.border(), catalog.index_of("Empty"));

        let def = parse_catalog_lua(PATH_LUA).unwrap();
        let mut json_file = NamedTempFile::with_suffix(".json").unwrap();
        json_file
            .write_all(serde_json::to_string(&def).unwrap().as_bytes())
            .unwrap();
        let from_json = load_catalog(json_file.path()).unwrap();
        assert_eq!(from_json.variants(), catalog.variants());
    }

    #[test]
    fn test_load_catalog_errors() {
        let txt = NamedTempFile::with_suffix(".txt").unwrap();
        assert!(matches!(
            load_catalog(txt.path()),
            Err(CatalogError::InvalidDefinition(_))
        ));
        assert!(matches!(
            load_catalog("does/not/exist.lua"),
            Err(CatalogError::Io(_))
        ));
    }
}

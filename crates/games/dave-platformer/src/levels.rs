use serde::{Deserialize, Serialize};

/// One stage as text rows of level symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDef {
    pub name: String,
    pub rows: Vec<String>,
}

impl LevelDef {
    pub fn new(name: &str, rows: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            rows: rows.iter().map(|r| r.to_string()).collect(),
        }
    }
}

/// Errors from loading a level pack file.
#[derive(Debug)]
pub enum LevelPackError {
    Io(String),
    Parse(String),
    /// The pack parsed but contains no `[[level]]` tables.
    Empty,
}

impl std::fmt::Display for LevelPackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "level pack io error: {e}"),
            Self::Parse(e) => write!(f, "level pack parse error: {e}"),
            Self::Empty => write!(f, "level pack contains no levels"),
        }
    }
}

impl std::error::Error for LevelPackError {}

/// Ordered list of stages for one play-through.
///
/// TOML form:
///
/// ```toml
/// [[level]]
/// name = "Cellar"
/// rows = ["#####", "#P.D#", "#####"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelPack {
    #[serde(rename = "level", default)]
    pub levels: Vec<LevelDef>,
}

impl LevelPack {
    /// The three stock stages.
    pub fn builtin() -> Self {
        Self {
            levels: vec![
                LevelDef::new("Stage 1", STAGE_1),
                LevelDef::new("Stage 2", STAGE_2),
                LevelDef::new("Stage 3", STAGE_3),
            ],
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, LevelPackError> {
        let pack: LevelPack =
            toml::from_str(content).map_err(|e| LevelPackError::Parse(e.to_string()))?;
        if pack.levels.is_empty() {
            return Err(LevelPackError::Empty);
        }
        Ok(pack)
    }

    pub fn load(path: &std::path::Path) -> Result<Self, LevelPackError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| LevelPackError::Io(e.to_string()))?;
        let pack = Self::from_toml_str(&content)?;
        tracing::info!(path = %path.display(), levels = pack.len(), "Loaded level pack");
        Ok(pack)
    }

    /// Load the pack at `path`, or the built-in stages if it cannot be loaded.
    pub fn load_or_builtin(path: &std::path::Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load {}: {e}, using built-in stages", path.display());
            Self::builtin()
        })
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LevelDef> {
        self.levels.get(index)
    }
}

impl Default for LevelPack {
    fn default() -> Self {
        Self::builtin()
    }
}

const STAGE_1: &[&str] = &[
    "################################################################################",
    "#P....T...............M.............T..............G......................K..D#",
    "#........######.............###########.............#####......................#",
    "#............................H.................................................#",
    "#.............T..............H................M...............................#",
    "#.........##########.........H..............######...........########..........#",
    "#............................H.................................................#",
    "#...M........................H............T.........................M..........#",
    "#..##########.............#########..............###########...................#",
    "#...........................................J..................................#",
    "#.................T...............M............................................#",
    "#...........##########.......#############...................###########.......#",
    "#........................................................T.....................#",
    "#..S......S......S.......S.............S...................S...........S.......#",
    "#..............................................................................#",
    "#.....................M......................T..................................#",
    "#..............................................................................#",
    "################################################################################",
];

const STAGE_2: &[&str] = &[
    "################################################################################",
    "#P.......T...................M..........T...............G.................K..D#",
    "#.............#########.............#########.................#########........#",
    "#.......................H..........................H...........................#",
    "#......M................H........T.................H.............M.............#",
    "#....######.............H......######..............H...........######..........#",
    "#.......................H..........................H...........................#",
    "#...............S.......H............S.............H...............S...........#",
    "#..########........##########....##########....##########....##########........#",
    "#.............................................J................................#",
    "#.............T..............M...........T.....................................#",
    "#......#############.....#############....................#############.........#",
    "#..............................................................................#",
    "#....S.......S........S........S........S........S........S........S...........#",
    "#..............................................................................#",
    "#...................M...........................T...................M..........#",
    "#..............................................................................#",
    "################################################################################",
];

const STAGE_3: &[&str] = &[
    "################################################################################",
    "#P.....T..........M....................T....................G..............K.D#",
    "#...........##########............###########...........###########............#",
    "#......................H........................................H...............#",
    "#........M.............H.............T..................M......H...............#",
    "#....##########........H......###########..........#########....H..............#",
    "#......................H........................................H...............#",
    "#...............S......H......S...............S.................H......S.......#",
    "#..##########..###########..##########..##########..##########..##########.....#",
    "#...............................................J...............................#",
    "#.....T....................M.........................T.........................#",
    "#..#############.....#############.....#############.....#############..........#",
    "#..............................................................................#",
    "#....S....S....S....S....S....S....S....S....S....S....S....S....S............#",
    "#..............................................................................#",
    "#............M...............T......................M.........................#",
    "#..............................................................................#",
    "################################################################################",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pickups::PickupKind;
    use crate::tiles::{Marker, parse_level};

    #[test]
    fn builtin_stages_are_complete() {
        let pack = LevelPack::builtin();
        assert_eq!(pack.len(), 3);
        for def in &pack.levels {
            let level = parse_level(&def.rows);
            assert_eq!(level.grid.width(), 81, "{} padded to widest row", def.name);
            assert_eq!(level.grid.height(), 18);
            assert_eq!(level.player_start, (1, 1));
            assert!(level.door.is_some(), "{} has a door", def.name);
            let keys = level
                .spawns
                .iter()
                .filter(|s| s.marker == Marker::Pickup(PickupKind::Key))
                .count();
            assert_eq!(keys, 1, "{} has one key", def.name);
        }
    }

    #[test]
    fn toml_pack_parses_in_order() {
        let pack = LevelPack::from_toml_str(
            r#"
            [[level]]
            name = "One"
            rows = ['#####', '#P.D#', '#####']

            [[level]]
            name = "Two"
            rows = ['####', '#PD#', '####']
            "#,
        )
        .unwrap();
        assert_eq!(pack.len(), 2);
        assert_eq!(pack.get(0).unwrap().name, "One");
        assert_eq!(pack.get(1).unwrap().rows[1], "#PD#");
        assert!(pack.get(2).is_none());
    }

    #[test]
    fn empty_pack_is_rejected() {
        let err = LevelPack::from_toml_str("").unwrap_err();
        assert!(matches!(err, LevelPackError::Empty));
    }

    #[test]
    fn malformed_pack_is_rejected() {
        let err = LevelPack::from_toml_str("[[level]]\nname = 3").unwrap_err();
        assert!(matches!(err, LevelPackError::Parse(_)));
        assert!(err.to_string().starts_with("level pack parse error"));
    }

    #[test]
    fn missing_file_falls_back_to_builtin() {
        let path = std::path::Path::new("/nonexistent/dave/levels.toml");
        assert!(matches!(LevelPack::load(path), Err(LevelPackError::Io(_))));
        assert_eq!(LevelPack::load_or_builtin(path), LevelPack::builtin());
    }

    #[test]
    fn shipped_training_pack_loads() {
        let pack = LevelPack::from_toml_str(include_str!("../../../../levels/training.toml"))
            .unwrap();
        assert_eq!(pack.len(), 3);
        for def in &pack.levels {
            let level = parse_level(&def.rows);
            assert!(level.door.is_some(), "{} has a door", def.name);
            assert!(
                level
                    .spawns
                    .iter()
                    .any(|s| s.marker == Marker::Pickup(PickupKind::Key)),
                "{} has a key",
                def.name
            );
        }
    }
}

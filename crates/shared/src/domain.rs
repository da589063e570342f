use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(GameId);
id_newtype!(PlayerId);
id_newtype!(SiteId);

/// Dimensions of the prospecting field. A site index addresses one cell
/// as `row * FIELD_COLS + col`.
pub const FIELD_ROWS: i64 = 24;
pub const FIELD_COLS: i64 = 80;
pub const FIELD_SITES: i64 = FIELD_ROWS * FIELD_COLS;

/// The active game screen. Authoritative on the server; the client mirrors
/// whatever the last response reported in its `name` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Lobby,
    Survey,
    Report,
    Drill,
    Wells,
    Score,
}

impl SiteId {
    pub fn row(self) -> i64 {
        self.0.div_euclid(FIELD_COLS)
    }

    pub fn col(self) -> i64 {
        self.0.rem_euclid(FIELD_COLS)
    }

    pub fn from_row_col(row: i64, col: i64) -> Self {
        Self(row * FIELD_COLS + col)
    }
}

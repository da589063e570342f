//! Pure index-space model of the prospecting field: cursor movement over a
//! toroidal 24x80 grid and cycling of the survey data layers. No I/O; the
//! session controller owns the mutable cursor and layer fields.

use shared::{
    domain::{SiteId, FIELD_COLS, FIELD_ROWS},
    protocol::GameState,
};

/// Offset used by accelerated (jump) navigation bindings.
pub const JUMP_STEP: i64 = 3;

/// Moves the cursor by `dy` rows and `dx` columns, wrapping at every edge.
///
/// Both axes use floor modulo (`rem_euclid`), which stays in `[0, n)` for
/// negative operands where `%` would not. Total for any integer offsets.
pub fn move_cursor(site: SiteId, dy: i64, dx: i64) -> SiteId {
    let row = (site.row() + dy).rem_euclid(FIELD_ROWS);
    let col = (site.col() + dx).rem_euclid(FIELD_COLS);
    SiteId::from_row_col(row, col)
}

/// The survey data layer currently shown. Client-local; the server never
/// sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewLayer {
    #[default]
    Probability,
    Cost,
    Tax,
    Oil,
}

const LAYER_ORDER: [ViewLayer; 4] = [
    ViewLayer::Probability,
    ViewLayer::Cost,
    ViewLayer::Tax,
    ViewLayer::Oil,
];

impl ViewLayer {
    /// Steps `delta` positions through the layer list, wrapping in both
    /// directions.
    pub fn cycle(self, delta: i64) -> ViewLayer {
        let index = LAYER_ORDER
            .iter()
            .position(|layer| *layer == self)
            .unwrap_or(0) as i64;
        LAYER_ORDER[(index + delta).rem_euclid(LAYER_ORDER.len() as i64) as usize]
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewLayer::Probability => "probability",
            ViewLayer::Cost => "cost",
            ViewLayer::Tax => "tax",
            ViewLayer::Oil => "oil",
        }
    }

    /// Projects the matching per-site array out of the state. Empty when
    /// the server omitted the layer for the current phase.
    pub fn values(self, state: &GameState) -> &[i64] {
        match self {
            ViewLayer::Probability => &state.prob,
            ViewLayer::Cost => &state.cost,
            ViewLayer::Tax => &state.tax,
            ViewLayer::Oil => &state.oil,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::FIELD_SITES;

    #[test]
    fn single_steps_wrap_at_every_edge() {
        // up from row 0 lands on row 23, same column
        assert_eq!(move_cursor(SiteId(0), -1, 0), SiteId(1840));
        assert_eq!(move_cursor(SiteId(1840), 1, 0), SiteId(0));
        // left from column 0 lands on column 79
        assert_eq!(move_cursor(SiteId(0), 0, -1), SiteId(79));
        assert_eq!(move_cursor(SiteId(79), 0, 1), SiteId(0));
    }

    #[test]
    fn moves_round_trip_and_stay_in_range() {
        let offsets = [
            (1, 0),
            (-1, 0),
            (0, 1),
            (0, -1),
            (JUMP_STEP, -JUMP_STEP),
            (-25, 81),
            (240, -800),
        ];
        let starts = [SiteId(0), SiteId(79), SiteId(1840), SiteId(1919), SiteId(961)];
        for start in starts {
            for (dy, dx) in offsets {
                let moved = move_cursor(start, dy, dx);
                assert!(
                    (0..FIELD_SITES).contains(&moved.0),
                    "site {} out of range after ({dy},{dx})",
                    moved.0
                );
                assert_eq!(move_cursor(moved, -dy, -dx), start);
            }
        }
    }

    #[test]
    fn jump_steps_cover_three_cells() {
        assert_eq!(move_cursor(SiteId(0), 0, JUMP_STEP), SiteId(3));
        assert_eq!(move_cursor(SiteId(0), -JUMP_STEP, 0), SiteId(21 * 80));
    }

    #[test]
    fn layer_cycle_returns_to_start_after_full_loop() {
        let mut layer = ViewLayer::Probability;
        for _ in 0..4 {
            layer = layer.cycle(1);
        }
        assert_eq!(layer, ViewLayer::Probability);

        let mut layer = ViewLayer::Tax;
        for _ in 0..4 {
            layer = layer.cycle(-1);
        }
        assert_eq!(layer, ViewLayer::Tax);
    }

    #[test]
    fn layer_cycle_wraps_backwards_and_for_large_deltas() {
        assert_eq!(ViewLayer::Probability.cycle(-1), ViewLayer::Oil);
        assert_eq!(ViewLayer::Oil.cycle(1), ViewLayer::Probability);
        assert_eq!(
            ViewLayer::Cost.cycle(9),
            ViewLayer::Cost.cycle(1),
            "deltas congruent mod 4 agree"
        );
    }
}

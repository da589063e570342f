//! Plain-text projection of the game state onto a raw-mode terminal.
//! Everything here is presentation; the session controller decides what
//! screen is shown and when.

use client_core::{grid::ViewLayer, session::Presenter};
use shared::{
    domain::{Phase, SiteId, FIELD_COLS, FIELD_ROWS},
    protocol::GameState,
};

pub struct TextPresenter;

impl TextPresenter {
    pub fn new() -> Self {
        Self
    }

    // raw mode needs explicit carriage returns
    fn line(&self, text: &str) {
        print!("{text}\r\n");
    }

    fn header(&self, state: &GameState, extra: &str) {
        self.line("");
        self.line(&format!(
            "== week {}  oil at {} {}",
            state.week,
            format_cents(state.price),
            extra
        ));
    }
}

/// Buckets a layer value into a display digit using the layer's value
/// range from the survey.
fn bucket(value: i64, min: i64, max: i64) -> char {
    if max <= min {
        return '?';
    }
    let step = ((value - min) * 10 / (max - min + 1)).clamp(0, 9);
    char::from_digit(step as u32, 10).unwrap_or('?')
}

fn layer_cell(layer: ViewLayer, value: i64) -> char {
    match layer {
        ViewLayer::Probability => bucket(value, 1, 100),
        ViewLayer::Cost => bucket(value, 1, 25),
        ViewLayer::Tax => bucket(value, 100, 550),
        ViewLayer::Oil if value == 0 => '.',
        ViewLayer::Oil => bucket(value, 1, 9),
    }
}

fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.abs();
    format!("{sign}${}.{:02}", cents / 100, cents % 100)
}

fn value_at(values: &[i64], site: SiteId) -> Option<i64> {
    values.get(site.0 as usize).copied()
}

impl Presenter for TextPresenter {
    fn show_lobby(&mut self, players: &[String]) {
        self.line("");
        if players.is_empty() {
            self.line("waiting in the lobby... (space starts the game)");
        } else {
            self.line(&format!(
                "waiting in the lobby with: {} (space starts the game)",
                players.join(", ")
            ));
        }
    }

    fn show_survey(&mut self, state: &GameState, cursor: SiteId, layer: ViewLayer) {
        self.header(state, &format!("[surveying: {}]", layer.label()));
        if let Some(fact) = &state.fact {
            self.line(&format!("   {fact}"));
        }

        let values = layer.values(state);
        if values.is_empty() {
            self.line("   (no survey data for this layer)");
        } else {
            for row in 0..FIELD_ROWS {
                let mut rendered = String::with_capacity(FIELD_COLS as usize);
                for col in 0..FIELD_COLS {
                    let site = SiteId::from_row_col(row, col);
                    if site == cursor {
                        rendered.push('@');
                    } else {
                        rendered.push(layer_cell(layer, values[site.0 as usize]));
                    }
                }
                self.line(&rendered);
            }
        }

        let describe = |values: &[i64]| {
            value_at(values, cursor)
                .map(|v| v.to_string())
                .unwrap_or_else(|| "?".to_string())
        };
        self.line(&format!(
            "site ({},{})  prob {}%  cost {}/ft  tax {}   arrows move, shift jumps, tab cycles, enter confirms",
            cursor.row(),
            cursor.col(),
            describe(&state.prob),
            describe(&state.cost),
            describe(&state.tax),
        ));
    }

    fn show_report(&mut self, state: &GameState) {
        self.header(state, "[surveyor's report]");
        let Some(site) = state.site else {
            self.line("   report pending...");
            return;
        };
        let describe = |values: &[i64]| {
            value_at(values, site)
                .map(|v| v.to_string())
                .unwrap_or_else(|| "?".to_string())
        };
        self.line(&format!(
            "site ({},{}): probability {}%, drilling cost {} per 100 ft, tax {}",
            site.row(),
            site.col(),
            describe(&state.prob),
            describe(&state.cost),
            describe(&state.tax),
        ));
        self.line("drill here? (y/n)");
    }

    fn show_drill(&mut self, state: &GameState) {
        self.header(state, "[drilling]");
        let depth = state.depth.unwrap_or(0);
        // running cost is a projection: strokes so far times per-foot cost
        let spent = state
            .site
            .and_then(|site| value_at(&state.cost, site))
            .map(|per_stroke| per_stroke * depth / 100);
        match spent {
            Some(spent) => self.line(&format!(
                "depth {depth} ft, {} sunk so far   space drills deeper, q gives up",
                format_cents(spent)
            )),
            None => self.line(&format!(
                "depth {depth} ft   space drills deeper, q gives up"
            )),
        }
    }

    fn show_wells(&mut self, state: &GameState) {
        self.header(state, "[your wells]");
        let Some(wells) = state.wells.as_ref().filter(|wells| !wells.is_empty()) else {
            self.line("   no producing wells yet   space continues");
            return;
        };
        self.line("  site      depth   cost    tax     income  p&l");
        for well in wells {
            self.line(&format!(
                "  ({:>2},{:>2})  {:>5}  {:>7} {:>7} {:>8} {:>8}{}",
                well.site.row(),
                well.site.col(),
                well.depth,
                format_cents(well.cost),
                format_cents(well.tax),
                format_cents(well.income),
                format_cents(well.pnl),
                if well.sold == Some(true) { "  (sold)" } else { "" },
            ));
        }
        self.line("space continues");
    }

    fn show_score(&mut self, state: &GameState) {
        self.header(state, "[weekly standings]");
        if let Some(player) = &state.player {
            self.line(&format!("   {player}"));
        }
        if let Some(wells) = &state.wells {
            let pnl: i64 = wells.iter().map(|well| well.pnl).sum();
            self.line(&format!("   running p&l {}", format_cents(pnl)));
        }
        self.line("space starts the next week");
    }

    fn hide(&mut self, _phase: Phase) {
        self.line("");
    }

    fn notice(&mut self, message: &str) {
        self.line(&format!("!! {message}"));
    }
}

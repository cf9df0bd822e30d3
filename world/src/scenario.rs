//! Built-in cell layouts.

use neon_conquest_core::{CellSpec, Owner};

/// Opening layout: one red and one blue stronghold among three neutral ones.
pub fn default_layout() -> Vec<CellSpec> {
    vec![
        CellSpec::new(150, 150, 32, Owner::Red, 10),
        CellSpec::new(400, 120, 28, Owner::Neutral, 0),
        CellSpec::new(650, 180, 40, Owner::Blue, 20),
        CellSpec::new(200, 400, 32, Owner::Neutral, 0),
        CellSpec::new(500, 380, 36, Owner::Neutral, 0),
    ]
}

//! Numeric coercion of quantity cells.
//!
//! The two quantity roles coerce differently: an unparseable system quantity
//! is zero stock, an unparseable counted quantity means "not counted yet".

use crate::model::{Cell, CountedQuantity};

/// Parse a cell as a finite number. Booleans count as 1/0.
pub fn parse_number(cell: &Cell) -> Option<f64> {
    let n = match cell {
        Cell::Empty => return None,
        Cell::Number(n) => *n,
        Cell::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Cell::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
    };
    n.is_finite().then_some(n)
}

pub fn system_quantity(cell: &Cell) -> f64 {
    parse_number(cell).unwrap_or(0.0)
}

pub fn counted_quantity(cell: &Cell) -> CountedQuantity {
    match parse_number(cell) {
        Some(n) => CountedQuantity::Counted(n),
        None => CountedQuantity::NotCounted,
    }
}

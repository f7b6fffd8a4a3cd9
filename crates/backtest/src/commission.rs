//! Brokerage commission model.
//!
//! Interactive Brokers style US directed-order fees, computed entirely in
//! price sub-units so replayed commissions are bit-identical across runs.

use tape_core::{FixedPrice, Quantity};

/// Minimum commission per order, in sub-units (1.30).
const MIN_COMMISSION: i64 = 1_300_000;
/// Per-unit rate at or below the small-order break, in sub-units (0.013).
const SMALL_ORDER_RATE: i64 = 13_000;
/// Per-unit rate above the small-order break, in sub-units (0.008).
const LARGE_ORDER_RATE: i64 = 8_000;
/// Largest quantity billed at the small-order rate.
const SMALL_ORDER_MAX: Quantity = 500;

/// Commission for `quantity` units filled at `fill_cost` per unit.
///
/// `max(1.30, rate × quantity)` with rate 0.013 up to 500 units and 0.008
/// above, capped at 0.5% of the fill's notional value. Pure function of
/// its arguments.
pub fn calculate(quantity: Quantity, fill_cost: FixedPrice) -> FixedPrice {
    let rate = if quantity <= SMALL_ORDER_MAX {
        SMALL_ORDER_RATE
    } else {
        LARGE_ORDER_RATE
    };
    let base = (rate * quantity as i64).max(MIN_COMMISSION);
    let cap = fill_cost.raw() * quantity as i64 * 5 / 1000;
    FixedPrice(base.min(cap))
}

/// Commission for a fill, honoring an explicit brokerage value when given.
pub fn for_fill(
    explicit: Option<FixedPrice>,
    quantity: Quantity,
    fill_cost: FixedPrice,
) -> FixedPrice {
    explicit.unwrap_or_else(|| calculate(quantity, fill_cost))
}

//! Document totals
//!
//! ```text
//! subtotal = Σ quantity × unit_price
//! discount = percent of subtotal | fixed amount, clamped to 0..=subtotal
//! taxable  = subtotal - discount
//! tax      = taxable × tax_rate / 100
//! total    = taxable + tax + shipping
//! ```
//!
//! Every figure is rounded to 2 decimal places, midpoint away from zero.

use docket_core::{ComposeError, ComposeResult, Discount, DocumentBody};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Monetary totals of a document body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Number of line items
    pub item_count: usize,
    /// Sum of line amounts
    pub subtotal: Decimal,
    /// Discount actually applied
    pub discount: Decimal,
    /// Subtotal after discount
    pub taxable: Decimal,
    /// Tax on the taxable amount
    pub tax: Decimal,
    /// Shipping charge
    pub shipping: Decimal,
    /// Amount payable
    pub total: Decimal,
}

impl Totals {
    /// Compute totals for a body
    ///
    /// Fails with [`ComposeError::Totals`] when a figure overflows the
    /// decimal range.
    pub fn compute(body: &DocumentBody) -> ComposeResult<Self> {
        let sum = body
            .line_items
            .iter()
            .try_fold(Decimal::ZERO, |acc, item| {
                item.amount().and_then(|amount| acc.checked_add(amount))
            })
            .ok_or(ComposeError::Totals("subtotal"))?;
        let subtotal = round_money(sum);

        let requested = match body.discount {
            Some(Discount::Percent(pct)) => subtotal
                .checked_mul(pct)
                .and_then(|d| d.checked_div(Decimal::ONE_HUNDRED))
                .ok_or(ComposeError::Totals("discount"))?,
            Some(Discount::Amount(amount)) => amount,
            None => Decimal::ZERO,
        };
        let discount = round_money(requested.max(Decimal::ZERO).min(subtotal.max(Decimal::ZERO)));

        // 0 <= discount <= max(subtotal, 0)
        let taxable = round_money(subtotal - discount);
        let rate = body.tax_rate.unwrap_or(Decimal::ZERO);
        let tax = taxable
            .checked_mul(rate)
            .and_then(|t| t.checked_div(Decimal::ONE_HUNDRED))
            .map(round_money)
            .ok_or(ComposeError::Totals("tax"))?;
        let shipping = round_money(body.shipping.unwrap_or(Decimal::ZERO));
        let total = taxable
            .checked_add(tax)
            .and_then(|t| t.checked_add(shipping))
            .map(round_money)
            .ok_or(ComposeError::Totals("total"))?;

        Ok(Totals {
            item_count: body.line_items.len(),
            subtotal,
            discount,
            taxable,
            tax,
            shipping,
            total,
        })
    }
}

/// Round to cents and fix the scale at 2 (`5` → `5.00`)
pub fn round_money(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

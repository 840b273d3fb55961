//! Reconciliation of extracted items against printed totals.

use std::collections::HashSet;

use rust_decimal::Decimal;

use super::rules::patterns::SUBTOTAL;
use super::rules::{parse_amount, round_money};
use crate::models::{LineItem, SubTotal, TaxCode, Taxes, TotalKey, TotalsMap};

/// Anomaly reported when the printed final amount disagrees with the
/// computed total by more than the configured tolerance.
pub const FINAL_TOTAL_MISMATCH: &str =
    "Final total mismatch: printed amount differs from computed total.";

/// Anomaly reported when item or tax amounts sum past the decimal range.
/// The affected totals are clamped to the largest representable value.
pub const AMOUNT_OVERFLOW: &str =
    "Amount overflow: totals exceed the representable range and were clamped.";

/// Drop repeated items, keeping the first occurrence.
///
/// Two items are the same when their trimmed, lower-cased descriptions match
/// and their amounts agree to two decimal places.
pub fn deduplicate_items(items: Vec<LineItem>) -> Vec<LineItem> {
    let mut seen = HashSet::new();

    items
        .into_iter()
        .filter(|item| {
            let key = (
                item.description.trim().to_lowercase(),
                round_money(item.amount).normalize(),
            );
            seen.insert(key)
        })
        .collect()
}

/// Find the printed subtotal, if any. At most one is reported.
pub fn compute_subtotals(text: &str) -> Vec<SubTotal> {
    SUBTOTAL
        .captures(text)
        .and_then(|caps| {
            Some(SubTotal {
                label: caps.get(1)?.as_str().to_string(),
                amount: parse_amount(caps.get(2)?.as_str())?,
            })
        })
        .into_iter()
        .collect()
}

/// Exact sum of `amounts`, or `None` when it leaves the decimal range.
pub fn checked_sum(amounts: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
}

fn saturating_sum(amounts: impl IntoIterator<Item = Decimal>) -> Decimal {
    amounts
        .into_iter()
        .fold(Decimal::ZERO, |acc, amount| acc.saturating_add(amount))
}

/// Sum of item amounts, rounded to two decimal places.
///
/// Saturates at the decimal bounds; see [`checked_sum`] to detect that.
pub fn sum_items(items: &[LineItem]) -> Decimal {
    round_money(saturating_sum(items.iter().map(|item| item.amount)))
}

/// Build the tax breakdown from printed totals.
///
/// A printed total tax is used as-is; otherwise the per-code amounts are
/// summed. With neither, the total stays absent.
pub fn build_taxes(totals: &TotalsMap) -> Taxes {
    let details: std::collections::BTreeMap<TaxCode, Decimal> = TaxCode::ALL
        .iter()
        .filter_map(|code| totals.get(code.total_key()).map(|amount| (*code, amount)))
        .collect();

    let total_tax = totals.get(TotalKey::TotalTax).or_else(|| {
        if details.is_empty() {
            None
        } else {
            Some(saturating_sum(details.values().copied()))
        }
    });

    Taxes { details, total_tax }
}

/// `items_sum - discount + taxes + round_off`, or `None` on overflow.
pub fn checked_computed_total(
    items_sum: Decimal,
    discount: Option<Decimal>,
    taxes_total: Option<Decimal>,
    round_off: Option<Decimal>,
) -> Option<Decimal> {
    items_sum
        .checked_sub(discount.unwrap_or_default())?
        .checked_add(taxes_total.unwrap_or_default())?
        .checked_add(round_off.unwrap_or_default())
        .map(round_money)
}

/// `items_sum - discount + taxes + round_off`, rounded to two places and
/// saturating at the decimal bounds.
pub fn computed_total(
    items_sum: Decimal,
    discount: Option<Decimal>,
    taxes_total: Option<Decimal>,
    round_off: Option<Decimal>,
) -> Decimal {
    round_money(
        items_sum
            .saturating_sub(discount.unwrap_or_default())
            .saturating_add(taxes_total.unwrap_or_default())
            .saturating_add(round_off.unwrap_or_default()),
    )
}

/// Whether any step of totalling the bill leaves the decimal range.
pub fn totals_overflow(
    items: &[LineItem],
    taxes: &Taxes,
    discount: Option<Decimal>,
    round_off: Option<Decimal>,
) -> bool {
    let Some(items_sum) = checked_sum(items.iter().map(|item| item.amount)) else {
        return true;
    };
    if checked_sum(taxes.details.values().copied()).is_none() {
        return true;
    }
    checked_computed_total(round_money(items_sum), discount, taxes.total_tax, round_off).is_none()
}

/// The bill's final total: the printed amount verbatim when present,
/// otherwise the computed total.
pub fn compute_final_total(
    items_sum: Decimal,
    discount: Option<Decimal>,
    taxes_total: Option<Decimal>,
    round_off: Option<Decimal>,
    printed_final: Option<Decimal>,
) -> Decimal {
    printed_final.unwrap_or_else(|| computed_total(items_sum, discount, taxes_total, round_off))
}

/// Compare a printed final amount against the computed total.
///
/// Returns the mismatch message when they differ by more than `tolerance`,
/// or when the difference itself is out of range. Nothing is corrected.
pub fn cross_check(
    printed_final: Option<Decimal>,
    computed: Decimal,
    tolerance: Decimal,
) -> Option<&'static str> {
    let printed = printed_final?;
    let within = printed
        .checked_sub(computed)
        .is_some_and(|diff| diff.abs() <= tolerance);
    (!within).then_some(FINAL_TOTAL_MISMATCH)
}

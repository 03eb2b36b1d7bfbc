use crate::revenue::fees_paid;
use crate::schema::{amount_of, Asset, CashRecord, Liability, LooseAmount, Payment};
use crate::temporal::ReportingWindow;
use serde::Serialize;

/// First-defined-wins over an ordered field chain. The source systems vary in
/// which field they populate, so a defined-but-unreadable field still wins the
/// chain and then degrades to zero.
fn first_defined(chain: &[&Option<LooseAmount>]) -> f64 {
    chain
        .iter()
        .find_map(|field| field.as_ref())
        .map_or(0.0, LooseAmount::to_f64)
}

/// Carrying value of an asset: `value ?? amount ?? purchasePrice ?? costPrice ?? 0`.
pub fn asset_carrying_value(asset: &Asset) -> f64 {
    first_defined(&[
        &asset.value,
        &asset.amount,
        &asset.purchase_price,
        &asset.cost_price,
    ])
}

/// Carrying value of a liability: `amount ?? value ?? 0`.
pub fn liability_carrying_value(liability: &Liability) -> f64 {
    first_defined(&[&liability.amount, &liability.value])
}

/// One record's contribution to a statement, kept so the printable report can
/// reference source documents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportLine {
    pub id: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BalanceSheetReport {
    pub total_assets: f64,
    pub total_liabilities: f64,
    pub retained_earnings: f64,
    pub equity: f64,
    pub asset_lines: Vec<ReportLine>,
    pub liability_lines: Vec<ReportLine>,
}

/// Derives the balance sheet. Each of the four sums windows its own
/// collection independently; retained earnings is fees collected minus
/// expenses, and equity balances the other three.
pub fn balance_sheet(
    assets: &[Asset],
    liabilities: &[Liability],
    payments: &[Payment],
    expenses: &[CashRecord],
    window: &ReportingWindow,
) -> BalanceSheetReport {
    let asset_lines: Vec<ReportLine> = window
        .filtered(assets)
        .map(|asset| ReportLine {
            id: asset.id.clone(),
            value: asset_carrying_value(asset),
        })
        .collect();

    let liability_lines: Vec<ReportLine> = window
        .filtered(liabilities)
        .map(|liability| ReportLine {
            id: liability.id.clone(),
            value: liability_carrying_value(liability),
        })
        .collect();

    let total_assets: f64 = asset_lines.iter().map(|line| line.value).sum();
    let total_liabilities: f64 = liability_lines.iter().map(|line| line.value).sum();

    let expense_total: f64 = window
        .filtered(expenses)
        .map(|expense| amount_of(&expense.amount))
        .sum();
    let retained_earnings = fees_paid(payments, window) - expense_total;

    BalanceSheetReport {
        total_assets,
        total_liabilities,
        retained_earnings,
        equity: total_assets - total_liabilities + retained_earnings,
        asset_lines,
        liability_lines,
    }
}

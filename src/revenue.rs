use crate::schema::{amount_of, LooseAmount, Payment, Sale};
use crate::temporal::ReportingWindow;
use serde::Serialize;

/// Amount collected on one fee receipt. A payment reports either a numeric
/// `totalAmount` or itemized lines; when the total is absent or non-numeric
/// the itemized amounts are summed instead.
pub fn payment_amount(payment: &Payment) -> f64 {
    match payment.total_amount.as_ref().and_then(LooseAmount::as_numeric) {
        Some(total) => total,
        None => payment
            .items
            .iter()
            .map(|item| amount_of(&item.amount))
            .sum(),
    }
}

/// Total fees collected inside the window.
pub fn fees_paid(payments: &[Payment], window: &ReportingWindow) -> f64 {
    window.filtered(payments).map(payment_amount).sum()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeLine {
    pub payment_id: String,
    pub student_id: Option<String>,
    pub amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeesReport {
    pub total_fees_paid: f64,
    pub per_transaction: Vec<FeeLine>,
}

pub fn fees_report(payments: &[Payment], window: &ReportingWindow) -> FeesReport {
    let per_transaction: Vec<FeeLine> = window
        .filtered(payments)
        .map(|payment| FeeLine {
            payment_id: payment.id.clone(),
            student_id: payment.student_id.clone(),
            amount: payment_amount(payment),
        })
        .collect();

    FeesReport {
        total_fees_paid: per_transaction.iter().map(|line| line.amount).sum(),
        per_transaction,
    }
}

/// Revenue over window-filtered sales: the sum of each receipt's line
/// amounts. The receipt's own `totalAmount` is ignored here; line amounts are
/// what the statement reconciles against.
pub fn sales_revenue(sales: &[Sale], window: &ReportingWindow) -> f64 {
    window
        .filtered(sales)
        .flat_map(|sale| sale.products.iter())
        .map(|line| amount_of(&line.amount))
        .sum()
}

/// Cost of goods sold over window-filtered sales.
///
/// Sale lines store `costPrice` as the extended cost for the line, so the sum
/// is taken directly and never multiplied by a quantity.
pub fn cogs(sales: &[Sale], window: &ReportingWindow) -> f64 {
    window
        .filtered(sales)
        .flat_map(|sale| sale.products.iter())
        .map(|line| amount_of(&line.cost_price))
        .sum()
}

use crate::revenue::sales_revenue;
use crate::schema::{amount_of, Asset, CashRecord, Liability, LoanDirection, Sale, Share};
use crate::series::reduce_series;
use crate::temporal::{resolve_first, Dated, ReportingWindow};
use log::warn;
use serde::Serialize;

/// Direction-tagged view of a liability.
///
/// The two directions carry their cash history in different event arrays, and
/// conflating them silently corrupts the financing section. Each view exposes
/// only the series legitimate for its direction, so the statement cannot reach
/// the wrong one.
#[derive(Debug, Clone, Copy)]
pub enum LoanPosition<'a> {
    Received(ReceivedLoan<'a>),
    Disbursed(DisbursedLoan<'a>),
}

/// A loan the organization received: an obligation, settled through
/// `amountPaid` and `interestPaid`.
#[derive(Debug, Clone, Copy)]
pub struct ReceivedLoan<'a>(&'a Liability);

impl ReceivedLoan<'_> {
    pub fn principal(&self) -> f64 {
        crate::balance_sheet::liability_carrying_value(self.0)
    }

    pub fn repayments(&self, window: &ReportingWindow) -> f64 {
        reduce_series(&self.0.amount_paid, window)
    }

    pub fn interest_paid(&self, window: &ReportingWindow) -> f64 {
        reduce_series(&self.0.interest_paid, window)
    }

    pub fn outstanding(&self) -> f64 {
        self.principal() - self.repayments(&ReportingWindow::unbounded())
    }
}

/// A loan the organization disbursed: a receivable, recovered through
/// `receivedLoan` and `receivedInterest`.
#[derive(Debug, Clone, Copy)]
pub struct DisbursedLoan<'a>(&'a Liability);

impl DisbursedLoan<'_> {
    pub fn principal(&self) -> f64 {
        crate::balance_sheet::liability_carrying_value(self.0)
    }

    pub fn recoveries(&self, window: &ReportingWindow) -> f64 {
        reduce_series(&self.0.received_loan, window)
    }

    pub fn interest_received(&self, window: &ReportingWindow) -> f64 {
        reduce_series(&self.0.received_interest, window)
    }

    pub fn outstanding(&self) -> f64 {
        self.principal() - self.recoveries(&ReportingWindow::unbounded())
    }
}

impl Liability {
    /// `None` when the record carries no recognizable `loanType`; such a
    /// liability is excluded from direction-dependent sums, never guessed.
    pub fn position(&self) -> Option<LoanPosition<'_>> {
        match self.loan_type {
            Some(LoanDirection::Received) => Some(LoanPosition::Received(ReceivedLoan(self))),
            Some(LoanDirection::Disbursed) => Some(LoanPosition::Disbursed(DisbursedLoan(self))),
            None => None,
        }
    }

    /// Remaining balance per the direction rules: a received loan is reduced
    /// by repayments, a disbursed one by recoveries.
    pub fn outstanding_balance(&self) -> Option<f64> {
        match self.position()? {
            LoanPosition::Received(loan) => Some(loan.outstanding()),
            LoanPosition::Disbursed(loan) => Some(loan.outstanding()),
        }
    }

    pub fn is_settled(&self) -> Option<bool> {
        self.outstanding_balance().map(|balance| balance <= 0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OperatingSection {
    pub revenue: f64,
    pub operating_expenses: f64,
    pub taxes_paid: f64,
    pub net: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FinancingSection {
    pub share_issuance_proceeds: f64,
    pub loan_drawdowns: f64,
    pub loan_repayments: f64,
    pub interest_paid: f64,
    pub dividends_paid: f64,
    pub net: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InvestingSection {
    pub asset_sale_proceeds: f64,
    pub interest_received: f64,
    pub dividends_received: f64,
    pub asset_purchases: f64,
    pub net: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CashFlowReport {
    pub operating: OperatingSection,
    pub financing: FinancingSection,
    pub investing: InvestingSection,
    pub net_change: f64,
}

/// Derives the cash-flow statement. The three sections are summed
/// independently, and every figure windows its own governing date field:
/// sales by sale date, repayment and interest events by their own dates,
/// asset proceeds by `soldDate`, asset purchases by `purchaseDate`.
pub fn cash_flow(
    sales: &[Sale],
    expenses: &[CashRecord],
    taxes: &[CashRecord],
    liabilities: &[Liability],
    shares: &[Share],
    assets: &[Asset],
    window: &ReportingWindow,
) -> CashFlowReport {
    let operating = operating_section(sales, expenses, taxes, window);
    let financing = financing_section(liabilities, shares, window);
    let investing = investing_section(assets, window);

    let net_change = operating.net + financing.net + investing.net;
    CashFlowReport {
        operating,
        financing,
        investing,
        net_change,
    }
}

fn operating_section(
    sales: &[Sale],
    expenses: &[CashRecord],
    taxes: &[CashRecord],
    window: &ReportingWindow,
) -> OperatingSection {
    let revenue = sales_revenue(sales, window);
    let operating_expenses: f64 = window
        .filtered(expenses)
        .map(|expense| amount_of(&expense.amount))
        .sum();
    let taxes_paid: f64 = window
        .filtered(taxes)
        .map(|tax| amount_of(&tax.amount))
        .sum();

    OperatingSection {
        revenue,
        operating_expenses,
        taxes_paid,
        net: revenue - operating_expenses - taxes_paid,
    }
}

fn financing_section(
    liabilities: &[Liability],
    shares: &[Share],
    window: &ReportingWindow,
) -> FinancingSection {
    let mut loan_drawdowns = 0.0;
    let mut loan_repayments = 0.0;
    let mut interest_paid = 0.0;

    for liability in liabilities {
        match liability.position() {
            Some(LoanPosition::Disbursed(loan)) => {
                if window.contains(liability.recorded_at()) {
                    loan_drawdowns += loan.principal();
                }
            }
            Some(LoanPosition::Received(loan)) => {
                loan_repayments += loan.repayments(window);
                interest_paid += loan.interest_paid(window);
            }
            None => {
                warn!(
                    "Liability {} has no loan direction; excluded from financing",
                    liability.id
                );
            }
        }
    }

    let share_issuance_proceeds: f64 = shares
        .iter()
        .map(|share| reduce_series(&share.share_issuance_proceeds, window))
        .sum();
    let dividends_paid: f64 = shares
        .iter()
        .map(|share| reduce_series(&share.amount_paid, window))
        .sum();

    FinancingSection {
        share_issuance_proceeds,
        loan_drawdowns,
        loan_repayments,
        interest_paid,
        dividends_paid,
        net: share_issuance_proceeds + loan_drawdowns
            - loan_repayments
            - interest_paid
            - dividends_paid,
    }
}

fn investing_section(assets: &[Asset], window: &ReportingWindow) -> InvestingSection {
    let mut asset_sale_proceeds = 0.0;
    let mut asset_purchases = 0.0;
    let mut interest_received = 0.0;
    let mut dividends_received = 0.0;

    for asset in assets {
        if let Some(price) = asset.sold_price.as_ref() {
            if window.contains(resolve_first(&[asset.sold_date.as_ref()])) {
                asset_sale_proceeds += price.to_f64();
            }
        }

        if let Some(price) = asset.purchase_price.as_ref() {
            if window.contains(resolve_first(&[asset.purchase_date.as_ref()])) {
                asset_purchases += price.to_f64();
            }
        }

        interest_received += reduce_series(&asset.interest_received, window);
        dividends_received += reduce_series(&asset.dividend_received, window);
    }

    InvestingSection {
        asset_sale_proceeds,
        interest_received,
        dividends_received,
        asset_purchases,
        net: asset_sale_proceeds + interest_received + dividends_received - asset_purchases,
    }
}

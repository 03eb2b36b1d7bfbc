//! # Financial Report Engine
//!
//! A library for deriving balance sheets, cash-flow statements, fee summaries
//! and inventory valuations from the heterogeneous transaction records of a
//! school/business operations application.
//!
//! ## Core Concepts
//!
//! - **Source records**: immutable document-store snapshots (products, assets,
//!   liabilities, shares, payments, expenses, taxes, purchases, sales), each
//!   embedding its own dated event history rather than flat ledger entries
//! - **Reporting window**: an inclusive `[from, to]` calendar interval; every
//!   figure filters by the date field that governs it
//! - **Running totals index**: a per-snapshot, name-keyed stock index built
//!   once and shared by every report of an aggregation pass
//! - **Degrade, don't fail**: missing fields read as zero, malformed values
//!   are logged and read as zero; bad data under-counts a total, it never
//!   aborts a report
//!
//! ## Example
//!
//! ```rust,ignore
//! use financial_report_engine::*;
//!
//! let source: SourceCollections = load_snapshot();
//! let window = ReportingWindow::parse(Some("2023-01-01"), Some("2023-12-31"))?;
//!
//! let reports = assemble_reports(&source, &window, None);
//! println!("equity: {}", reports.balance_sheet.equity);
//! println!("net cash change: {}", reports.cash_flow.net_change);
//! ```

pub mod balance_sheet;
pub mod cash_flow;
pub mod error;
pub mod inventory;
pub mod keyword;
pub mod report;
pub mod revenue;
pub mod schema;
pub mod series;
pub mod temporal;

pub use balance_sheet::{
    asset_carrying_value, balance_sheet, liability_carrying_value, BalanceSheetReport, ReportLine,
};
pub use cash_flow::{
    cash_flow, CashFlowReport, DisbursedLoan, FinancingSection, InvestingSection, LoanPosition,
    OperatingSection, ReceivedLoan,
};
pub use error::{ReportError, Result};
pub use inventory::{
    inventory_valuation, InventoryValuation, ProductBalance, RunningTotalsIndex, StockTotals,
};
pub use keyword::record_matches;
pub use report::{assemble_reports, FinancialReports, Kpis, ReportAssembler};
pub use revenue::{cogs, fees_paid, fees_report, payment_amount, sales_revenue, FeeLine, FeesReport};
pub use schema::*;
pub use series::{reduce_series, SeriesEvent};
pub use temporal::{resolve_first, Dated, DocumentDate, ReportingWindow};

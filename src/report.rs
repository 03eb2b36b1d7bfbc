use crate::balance_sheet::{balance_sheet, BalanceSheetReport};
use crate::cash_flow::{cash_flow, CashFlowReport};
use crate::inventory::{inventory_valuation, InventoryValuation, RunningTotalsIndex};
use crate::revenue::{cogs, fees_report, sales_revenue, FeesReport};
use crate::schema::{amount_of, SourceCollections};
use crate::temporal::ReportingWindow;
use log::{debug, info};
use serde::Serialize;

/// Scalar figures the dashboard renders directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Kpis {
    pub inventory_value: f64,
    pub sold_asset_value: f64,
    pub revenue: f64,
    pub cost_of_goods_sold: f64,
    pub gross_profit: f64,
    pub fees_collected: f64,
    pub total_purchases: f64,
}

/// Everything the presentation layer consumes for one window.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FinancialReports {
    pub balance_sheet: BalanceSheetReport,
    pub cash_flow: CashFlowReport,
    pub fees: FeesReport,
    pub inventory: InventoryValuation,
    pub kpis: Kpis,
}

/// Composes the calculators over one collection snapshot.
///
/// The running-totals index is built once per assembler, so every report and
/// KPI derived through it reads the same totals; a new snapshot means a new
/// assembler, never a mutated one.
pub struct ReportAssembler<'a> {
    source: &'a SourceCollections,
    stock_index: RunningTotalsIndex,
}

impl<'a> ReportAssembler<'a> {
    pub fn new(source: &'a SourceCollections) -> Self {
        debug!(
            "Indexing {} products, {} assets, {} liabilities, {} payments, {} sales",
            source.products.len(),
            source.assets.len(),
            source.liabilities.len(),
            source.payments.len(),
            source.sales.len()
        );

        Self {
            source,
            stock_index: RunningTotalsIndex::build(&source.products),
        }
    }

    pub fn stock_index(&self) -> &RunningTotalsIndex {
        &self.stock_index
    }

    pub fn assemble(&self, window: &ReportingWindow, keyword: Option<&str>) -> FinancialReports {
        info!("Assembling financial reports");

        let source = self.source;
        let balance_sheet = balance_sheet(
            &source.assets,
            &source.liabilities,
            &source.payments,
            &source.expenses,
            window,
        );
        let cash_flow = cash_flow(
            &source.sales,
            &source.expenses,
            &source.taxes,
            &source.liabilities,
            &source.shares,
            &source.assets,
            window,
        );
        let fees = fees_report(&source.payments, window);
        let inventory =
            inventory_valuation(&source.products, &self.stock_index, window, keyword);

        let revenue = sales_revenue(&source.sales, window);
        let cost_of_goods_sold = cogs(&source.sales, window);
        let total_purchases: f64 = window
            .filtered(&source.purchases)
            .map(|purchase| amount_of(&purchase.amount))
            .sum();

        let kpis = Kpis {
            inventory_value: inventory.total_value,
            sold_asset_value: cash_flow.investing.asset_sale_proceeds,
            revenue,
            cost_of_goods_sold,
            gross_profit: revenue - cost_of_goods_sold,
            fees_collected: fees.total_fees_paid,
            total_purchases,
        };

        FinancialReports {
            balance_sheet,
            cash_flow,
            fees,
            inventory,
            kpis,
        }
    }
}

/// One-shot convenience over [`ReportAssembler`].
pub fn assemble_reports(
    source: &SourceCollections,
    window: &ReportingWindow,
    keyword: Option<&str>,
) -> FinancialReports {
    ReportAssembler::new(source).assemble(window, keyword)
}

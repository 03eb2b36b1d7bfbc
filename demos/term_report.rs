use anyhow::Result;
use financial_report_engine::{assemble_reports, ReportingWindow, SourceCollections};
use serde_json::json;

/// Assembles the first-term reports for a small school snapshot and writes
/// the balance sheet lines to `term_report.csv`.
fn main() -> Result<()> {
    let source: SourceCollections = serde_json::from_value(json!({
        "products": [{
            "id": "prod-1",
            "name": "Exercise Book",
            "costPrice": 25,
            "quantityRestocked": [{ "quantity": 200, "time": "2023-01-10" }],
            "quantitySold": [{ "quantitySold": 150, "timestamp": "2023-03-12" }]
        }],
        "payments": [
            { "id": "pay-1", "studentId": "stu-1", "totalAmount": 5000, "timestamp": "2023-02-15" },
            { "id": "pay-2", "studentId": "stu-2", "timestamp": "2023-03-02",
              "items": [{ "itemName": "Boarding", "amount": 1500 },
                        { "itemName": "Tuition", "amount": 2500 }] }
        ],
        "expenses": [{ "amount": 800, "date": "2023-02-20" }],
        "taxes": [{ "paidAmount": 320, "date": "2023-03-31" }],
        "sales": [
            { "id": "sale-1", "date": "2023-04-01", "products": [{ "Amount": 500, "costPrice": 300 }] },
            { "id": "sale-2", "date": "2023-04-15", "products": [{ "Amount": 700, "costPrice": 450 }] }
        ],
        "liabilities": [{
            "id": "loan-bank", "amount": 10000, "loanType": "Received",
            "timestamp": "2023-01-08",
            "amountPaid": [{ "amount": 2000, "date": "2023-04-20" }]
        }],
        "assets": [{
            "id": "asset-building", "value": 50000, "purchasePrice": 45000,
            "purchaseDate": "2023-01-02"
        }]
    }))?;

    let window = ReportingWindow::parse(Some("2023-01-01"), Some("2023-04-30"))?;
    let reports = assemble_reports(&source, &window, None);

    println!("First term report");
    println!("  fees collected:   {:>12.2}", reports.fees.total_fees_paid);
    println!("  revenue:          {:>12.2}", reports.kpis.revenue);
    println!("  gross profit:     {:>12.2}", reports.kpis.gross_profit);
    println!("  inventory value:  {:>12.2}", reports.inventory.total_value);
    println!("  total assets:     {:>12.2}", reports.balance_sheet.total_assets);
    println!("  equity:           {:>12.2}", reports.balance_sheet.equity);
    println!("  net cash change:  {:>12.2}", reports.cash_flow.net_change);

    let mut writer = csv::Writer::from_path("term_report.csv")?;
    writer.write_record(["Section", "Record", "Value"])?;
    for line in &reports.balance_sheet.asset_lines {
        let value = format!("{:.2}", line.value);
        writer.write_record(["Assets", line.id.as_str(), value.as_str()])?;
    }
    for line in &reports.balance_sheet.liability_lines {
        let value = format!("{:.2}", line.value);
        writer.write_record(["Liabilities", line.id.as_str(), value.as_str()])?;
    }
    for line in &reports.fees.per_transaction {
        let amount = format!("{:.2}", line.amount);
        writer.write_record(["Fees", line.payment_id.as_str(), amount.as_str()])?;
    }
    writer.flush()?;

    println!("Wrote term_report.csv");
    Ok(())
}

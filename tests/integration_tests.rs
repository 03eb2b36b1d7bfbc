use chrono::{Days, NaiveDate};
use financial_report_engine::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn money(amount: f64, date: &str) -> MoneyEvent {
    MoneyEvent {
        amount: Some(LooseAmount::Number(amount)),
        date: Some(DocumentDate::Text(date.to_string())),
    }
}

fn random_events(rng: &mut StdRng, count: usize) -> Vec<MoneyEvent> {
    (0..count)
        .map(|_| {
            let offset = rng.gen_range(0..365u64);
            let date = day(2023, 1, 1) + Days::new(offset);
            money(rng.gen_range(0.0..500.0), &date.format("%Y-%m-%d").to_string())
        })
        .collect()
}

/// The full snapshot of a school year, shaped exactly as the document store
/// delivers it: camelCase fields, mixed amount representations, embedded
/// event histories.
fn school_year_snapshot() -> SourceCollections {
    serde_json::from_value(json!({
        "products": [
            {
                "id": "prod-1",
                "name": "Pen",
                "costPrice": 10,
                "quantityRestocked": [
                    { "quantity": 100, "time": "2023-01-05" },
                    { "quantity": 50, "time": "2023-04-02" }
                ],
                "quantitySold": [
                    { "quantitySold": 40, "timestamp": "2023-02-01" },
                    { "quantitySold": 20, "timestamp": "2023-05-01" }
                ]
            },
            {
                "id": "prod-2",
                "name": "Exercise Book",
                "costPrice": "25",
                "quantityRestocked": [{ "quantity": 200, "time": "2023-01-10" }],
                "quantitySold": [{ "quantitySold": 150, "timestamp": "2023-03-12" }]
            }
        ],
        "payments": [
            { "id": "pay-1", "studentId": "stu-1", "totalAmount": 5000,
              "timestamp": "2023-02-15" },
            { "id": "pay-2", "studentId": "stu-2",
              "items": [{ "itemName": "Boarding", "amount": 1500 },
                        { "type": "Tuition", "amount": 2500 }],
              "timestamp": "2023-03-02" },
            { "id": "pay-3", "studentId": "stu-3", "totalAmount": 3000,
              "timestamp": "2023-09-10" }
        ],
        "expenses": [
            { "amount": 800, "date": "2023-02-20" },
            { "amount": 1200, "date": "2023-08-05" }
        ],
        "taxes": [
            { "paidAmount": 320, "date": "2023-03-31" },
            { "paidAmount": 280, "date": "2023-09-30" }
        ],
        "purchases": [
            { "amount": 1500, "date": "2023-01-20" }
        ],
        "sales": [
            { "id": "sale-1", "date": "2023-04-01",
              "products": [{ "Amount": 500, "costPrice": 300 }] },
            { "id": "sale-2", "date": "2023-04-15",
              "products": [{ "Amount": 700, "costPrice": 450 }] },
            { "id": "sale-3", "date": "2023-10-05",
              "products": [{ "Amount": 900, "costPrice": 600 }] }
        ],
        "liabilities": [
            { "id": "loan-bank", "amount": 10000, "loanType": "Received",
              "timestamp": "2023-01-08",
              "amountPaid": [{ "amount": 2000, "date": "2023-06-01" }],
              "interestPaid": [{ "amount": 150, "date": "2023-06-01" }] },
            { "id": "loan-staff", "amount": 4000, "loanType": "Disbursed",
              "timestamp": "2023-02-01",
              "receivedLoan": [{ "amount": 1000, "date": "2023-07-01" }],
              "receivedInterest": [{ "amount": 80, "date": "2023-07-01" }] }
        ],
        "shares": [
            { "id": "share-1", "numberOfShares": 200, "sharePrice": 100,
              "shareIssuanceProceeds": [{ "amount": 20000, "date": "2023-01-03" }],
              "amountPaid": [{ "amount": 500, "date": "2023-12-01" }] }
        ],
        "assets": [
            { "id": "asset-building", "value": 50000, "purchasePrice": 45000,
              "purchaseDate": "2023-01-02",
              "interestReceived": [{ "amount": 200, "date": "2023-05-05" }] },
            { "id": "asset-van", "purchasePrice": 12000,
              "purchaseDate": "2023-02-10" },
            { "id": "asset-generator", "purchasePrice": 6000,
              "purchaseDate": "2019-03-10", "status": "sold",
              "soldPrice": 8000, "soldDate": "2023-07-01" }
        ]
    }))
    .unwrap()
}

#[test]
fn test_school_year_unbounded() {
    let source = school_year_snapshot();
    let reports = assemble_reports(&source, &ReportingWindow::unbounded(), None);

    // Inventory: Pen (150 - 60) * 10, Exercise Book (200 - 150) * 25.
    assert_eq!(reports.inventory.total_value, 900.0 + 1250.0);
    assert_eq!(reports.inventory.per_product["Pen"].balance, 90.0);
    assert_eq!(reports.inventory.per_product["Exercise Book"].sold, 150.0);

    // Fees accept both receipt shapes.
    assert_eq!(reports.fees.total_fees_paid, 12_000.0);
    assert_eq!(reports.fees.per_transaction.len(), 3);

    // Balance sheet.
    assert_eq!(reports.balance_sheet.total_assets, 68_000.0);
    assert_eq!(reports.balance_sheet.total_liabilities, 14_000.0);
    assert_eq!(reports.balance_sheet.retained_earnings, 10_000.0);
    assert_eq!(reports.balance_sheet.equity, 64_000.0);

    // Cash flow, section by section.
    assert_eq!(reports.cash_flow.operating.net, 2100.0 - 2000.0 - 600.0);
    assert_eq!(
        reports.cash_flow.financing.net,
        20_000.0 + 4_000.0 - 2_000.0 - 150.0 - 500.0
    );
    assert_eq!(
        reports.cash_flow.investing.net,
        8_000.0 + 200.0 - 63_000.0
    );
    assert_eq!(
        reports.cash_flow.net_change,
        reports.cash_flow.operating.net
            + reports.cash_flow.financing.net
            + reports.cash_flow.investing.net
    );

    // KPIs.
    assert_eq!(reports.kpis.revenue, 2100.0);
    assert_eq!(reports.kpis.cost_of_goods_sold, 1350.0);
    assert_eq!(reports.kpis.gross_profit, 750.0);
    assert_eq!(reports.kpis.sold_asset_value, 8000.0);
    assert_eq!(reports.kpis.total_purchases, 1500.0);
}

#[test]
fn test_school_year_first_term_window() {
    let source = school_year_snapshot();
    let term = ReportingWindow::new(Some(day(2023, 1, 1)), Some(day(2023, 4, 30)));
    let reports = assemble_reports(&source, &term, None);

    assert_eq!(reports.fees.total_fees_paid, 9_000.0);
    assert_eq!(reports.kpis.revenue, 1200.0);
    assert_eq!(reports.kpis.cost_of_goods_sold, 750.0);

    assert_eq!(reports.cash_flow.operating.net, 1200.0 - 800.0 - 320.0);

    // Repayments and dividends fall after April; the disbursed loan and the
    // share issuance fall inside.
    assert_eq!(reports.cash_flow.financing.loan_repayments, 0.0);
    assert_eq!(reports.cash_flow.financing.net, 20_000.0 + 4_000.0);

    // The generator was bought in 2019 and sold in July: neither leg counts.
    assert_eq!(reports.cash_flow.investing.asset_purchases, 57_000.0);
    assert_eq!(reports.cash_flow.investing.asset_sale_proceeds, 0.0);

    // The 2019 asset also drops off the windowed balance sheet.
    assert_eq!(reports.balance_sheet.total_assets, 62_000.0);
    assert_eq!(reports.balance_sheet.retained_earnings, 9_000.0 - 800.0);
    assert_eq!(reports.balance_sheet.equity, 62_000.0 - 14_000.0 + 8_200.0);

    // Both products were first restocked in January; their lifetime totals
    // are unchanged by the window.
    assert_eq!(reports.inventory.total_value, 2150.0);
}

#[test]
fn test_keyword_narrows_inventory() {
    let source = school_year_snapshot();
    let reports = assemble_reports(&source, &ReportingWindow::unbounded(), Some("pen"));

    assert_eq!(reports.inventory.per_product.len(), 1);
    assert!(reports.inventory.per_product.contains_key("Pen"));
    assert_eq!(reports.inventory.total_value, 900.0);
}

#[test]
fn test_settled_loan_scenario() {
    let liability: Liability = serde_json::from_value(json!({
        "id": "loan-1",
        "amount": 1000,
        "loanType": "Received",
        "amountPaid": [{ "amount": 400, "date": "2023-01-10" },
                       { "amount": 600, "date": "2023-02-10" }]
    }))
    .unwrap();

    assert_eq!(liability.outstanding_balance(), Some(0.0));
    assert_eq!(liability.is_settled(), Some(true));
}

#[test]
fn test_sold_outside_purchased_inside_window() {
    let source: SourceCollections = serde_json::from_value(json!({
        "assets": [{
            "id": "asset-1",
            "purchasePrice": 6000, "purchaseDate": "2023-03-10",
            "soldPrice": 8000, "soldDate": "2023-07-01"
        }]
    }))
    .unwrap();

    let march = ReportingWindow::new(Some(day(2023, 3, 1)), Some(day(2023, 3, 31)));
    let reports = assemble_reports(&source, &march, None);

    assert_eq!(reports.cash_flow.investing.asset_purchases, 6000.0);
    assert_eq!(reports.cash_flow.investing.asset_sale_proceeds, 0.0);
    assert_eq!(reports.kpis.sold_asset_value, 0.0);
}

#[test]
fn test_empty_collections_produce_zeroed_reports() {
    let source = SourceCollections::default();
    let window = ReportingWindow::new(Some(day(2023, 1, 1)), Some(day(2023, 12, 31)));
    let reports = assemble_reports(&source, &window, Some("anything"));

    assert_eq!(reports.balance_sheet.equity, 0.0);
    assert_eq!(reports.cash_flow.net_change, 0.0);
    assert_eq!(reports.fees.total_fees_paid, 0.0);
    assert_eq!(reports.inventory.total_value, 0.0);
    assert!(reports.inventory.per_product.is_empty());
    assert_eq!(reports.kpis.total_purchases, 0.0);
}

#[test]
fn test_dateless_records_only_appear_unbounded() {
    let source: SourceCollections = serde_json::from_value(json!({
        "payments": [{ "id": "pay-1", "totalAmount": 750 }]
    }))
    .unwrap();

    let open = assemble_reports(&source, &ReportingWindow::unbounded(), None);
    assert_eq!(open.fees.total_fees_paid, 750.0);

    let past = ReportingWindow::new(Some(day(2020, 1, 1)), Some(day(2020, 12, 31)));
    let bounded = assemble_reports(&source, &past, None);
    assert_eq!(bounded.fees.total_fees_paid, 0.0);
}

#[test]
fn test_idempotence_over_random_data() {
    let mut rng = StdRng::seed_from_u64(7);
    let liabilities: Vec<Liability> = (0..20)
        .map(|i| Liability {
            id: format!("loan-{}", i),
            amount: Some(LooseAmount::Number(rng.gen_range(100.0..10_000.0))),
            loan_type: Some(if rng.gen_bool(0.5) {
                LoanDirection::Received
            } else {
                LoanDirection::Disbursed
            }),
            amount_paid: random_events(&mut rng, 5),
            received_loan: random_events(&mut rng, 5),
            date: Some(DocumentDate::Text("2023-06-15".to_string())),
            ..Default::default()
        })
        .collect();

    let source = SourceCollections {
        liabilities,
        ..Default::default()
    };
    let window = ReportingWindow::new(Some(day(2023, 1, 1)), Some(day(2023, 12, 31)));

    let first = assemble_reports(&source, &window, None);
    let second = assemble_reports(&source, &window, None);
    assert_eq!(first, second);
}

#[test]
fn test_window_monotonicity() {
    let mut rng = StdRng::seed_from_u64(11);

    for _ in 0..25 {
        let series = random_events(&mut rng, 120);

        // Nested windows: inner bounds sit inside outer bounds.
        let outer_from = rng.gen_range(0..100u64);
        let outer_to = rng.gen_range(265..365u64);
        let inner_from = outer_from + rng.gen_range(0..80u64);
        let inner_to = outer_to - rng.gen_range(0..80u64);

        let base = day(2023, 1, 1);
        let inner = ReportingWindow::new(
            Some(base + Days::new(inner_from)),
            Some(base + Days::new(inner_to)),
        );
        let outer = ReportingWindow::new(
            Some(base + Days::new(outer_from)),
            Some(base + Days::new(outer_to)),
        );

        let narrow = reduce_series(&series, &inner);
        let wide = reduce_series(&series, &outer);
        assert!(
            narrow <= wide + 1e-9,
            "nested window summed more: {} > {}",
            narrow,
            wide
        );
    }
}

#[test]
fn test_unbounded_filter_is_same_reference() {
    let source = school_year_snapshot();
    let filtered = ReportingWindow::unbounded().filter(&source.payments);

    assert!(matches!(filtered, std::borrow::Cow::Borrowed(_)));
    assert!(std::ptr::eq(filtered.as_ptr(), source.payments.as_ptr()));
}

#[test]
fn test_index_matches_fresh_reduction() {
    let mut rng = StdRng::seed_from_u64(23);
    let products: Vec<Product> = (0..15)
        .map(|i| {
            let restocks: Vec<RestockEvent> = (0..rng.gen_range(0..6))
                .map(|_| RestockEvent {
                    quantity: Some(LooseAmount::Number(rng.gen_range(0.0..50.0))),
                    time: Some(DocumentDate::Text("2023-03-01".to_string())),
                    timestamp: None,
                })
                .collect();
            let sales: Vec<SaleEvent> = (0..rng.gen_range(0..6))
                .map(|_| SaleEvent {
                    quantity_sold: Some(LooseAmount::Number(rng.gen_range(0.0..50.0))),
                    ..Default::default()
                })
                .collect();

            Product {
                id: format!("prod-{}", i),
                name: format!("Product {}", i % 10),
                quantity_restocked: restocks,
                quantity_sold: sales,
                ..Default::default()
            }
        })
        .collect();

    let index = RunningTotalsIndex::build(&products);
    let everything = ReportingWindow::unbounded();

    for name in index.names() {
        let fresh_restocked: f64 = products
            .iter()
            .filter(|p| p.name == name)
            .map(|p| reduce_series(&p.quantity_restocked, &everything))
            .sum();
        let fresh_sold: f64 = products
            .iter()
            .filter(|p| p.name == name)
            .map(|p| reduce_series(&p.quantity_sold, &everything))
            .sum();

        assert!((index.restocked(name) - fresh_restocked).abs() < 1e-9);
        assert!((index.sold(name) - fresh_sold).abs() < 1e-9);
        assert!((index.balance(name) - (fresh_restocked - fresh_sold)).abs() < 1e-9);
    }
}

#[test]
fn test_direction_invariant_end_to_end() {
    // Identical histories, opposite directions: only the direction-legitimate
    // series may reach the financing section.
    let histories = json!({
        "amount": 5000,
        "timestamp": "2023-04-01",
        "amountPaid": [{ "amount": 300, "date": "2023-05-01" }],
        "interestPaid": [{ "amount": 40, "date": "2023-05-01" }],
        "receivedLoan": [{ "amount": 700, "date": "2023-05-02" }],
        "receivedInterest": [{ "amount": 60, "date": "2023-05-02" }]
    });

    let mut as_received = histories.clone();
    as_received["id"] = json!("loan-r");
    as_received["loanType"] = json!("Received");
    let mut as_disbursed = histories;
    as_disbursed["id"] = json!("loan-d");
    as_disbursed["loanType"] = json!("Disbursed");

    let source: SourceCollections = serde_json::from_value(json!({
        "liabilities": [as_received, as_disbursed]
    }))
    .unwrap();

    let reports = assemble_reports(&source, &ReportingWindow::unbounded(), None);
    let financing = &reports.cash_flow.financing;

    // Outflows come only from the received loan, the drawdown only from the
    // disbursed one.
    assert_eq!(financing.loan_repayments, 300.0);
    assert_eq!(financing.interest_paid, 40.0);
    assert_eq!(financing.loan_drawdowns, 5000.0);
    assert_eq!(financing.net, 5000.0 - 300.0 - 40.0);
}

#[test]
fn test_directionless_liability_still_counts_on_balance_sheet() {
    let source: SourceCollections = serde_json::from_value(json!({
        "liabilities": [{ "id": "loan-x", "amount": 900, "date": "2023-02-01" }]
    }))
    .unwrap();

    let reports = assemble_reports(&source, &ReportingWindow::unbounded(), None);

    // Excluded from financing (no direction to trust)...
    assert_eq!(reports.cash_flow.financing.net, 0.0);
    // ...but its carrying value still appears as an obligation.
    assert_eq!(reports.balance_sheet.total_liabilities, 900.0);
}

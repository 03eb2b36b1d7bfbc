use crate::error::Result;
use crate::temporal::{resolve_first, Dated, DocumentDate};
use chrono::{DateTime, Utc};
use log::warn;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A monetary or quantity field as it appears in source documents.
///
/// Data-entry clients store some amounts as JSON numbers and some as free
/// text, so every amount deserializes as either. Non-numeric text degrades to
/// zero at read time rather than failing the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum LooseAmount {
    Number(f64),
    Text(String),

    #[schemars(description = "Any other shape; reads as zero")]
    Other(Value),
}

impl LooseAmount {
    /// Numeric value, if one can be read. Text is parsed by its longest
    /// leading numeric prefix ("12.5kg" reads as 12.5); non-finite numbers and
    /// text with no numeric prefix yield `None`.
    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            LooseAmount::Number(n) if n.is_finite() => Some(*n),
            LooseAmount::Number(_) => None,
            LooseAmount::Text(raw) => parse_float_prefix(raw),
            LooseAmount::Other(_) => None,
        }
    }

    /// Numeric value with the malformed-input contract applied: anything
    /// unreadable contributes 0 and is logged as a data-quality signal.
    pub fn to_f64(&self) -> f64 {
        match self.as_numeric() {
            Some(value) => value,
            None => {
                warn!("Non-numeric amount {:?} treated as 0", self);
                0.0
            }
        }
    }
}

/// Longest leading prefix of `raw` that parses as a finite float.
fn parse_float_prefix(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let mut best = None;

    for end in 1..=trimmed.len() {
        if !trimmed.is_char_boundary(end) {
            continue;
        }
        if let Ok(value) = trimmed[..end].parse::<f64>() {
            if value.is_finite() {
                best = Some(value);
            }
        }
    }

    best
}

pub(crate) fn amount_of(field: &Option<LooseAmount>) -> f64 {
    field.as_ref().map_or(0.0, LooseAmount::to_f64)
}

/// Lenient deserializer for embedded event series.
///
/// A missing field or a non-array value becomes the empty series, and a
/// malformed element is skipped; both are logged, neither fails the document.
/// This distinguishes "field absent" (legal, new record) from "field
/// malformed" (tolerated, visible in the logs).
fn lenient_series<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(series_from_value(raw.unwrap_or(Value::Null)))
}

pub(crate) fn series_from_value<T: DeserializeOwned>(raw: Value) -> Vec<T> {
    match raw {
        Value::Null => Vec::new(),
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<T>(item) {
                Ok(event) => Some(event),
                Err(err) => {
                    warn!("Skipping malformed series entry: {}", err);
                    None
                }
            })
            .collect(),
        other => {
            warn!(
                "Expected an event array, found {}; treating as empty",
                json_kind(&other)
            );
            Vec::new()
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Which way a loan runs. The two directions must never be conflated: a
/// `Received` loan is an obligation repaid through `amountPaid`, a `Disbursed`
/// loan is a receivable recovered through `receivedLoan`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum LoanDirection {
    #[schemars(description = "Loan the organization disbursed to a counterparty (a receivable)")]
    Disbursed,

    #[schemars(description = "Loan the organization received from a lender (an obligation)")]
    Received,
}

/// A liability with an unrecognized or missing `loanType` carries no
/// direction; it is excluded from financing sums rather than guessed.
fn lenient_direction<'de, D>(deserializer: D) -> std::result::Result<Option<LoanDirection>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => {
            let trimmed = text.trim();
            if trimmed.eq_ignore_ascii_case("disbursed") {
                Some(LoanDirection::Disbursed)
            } else if trimmed.eq_ignore_ascii_case("received") {
                Some(LoanDirection::Received)
            } else {
                warn!("Unrecognized loanType {:?}; liability carries no direction", trimmed);
                None
            }
        }
        Some(other) => {
            warn!("loanType should be a string, found {}", json_kind(&other));
            None
        }
    })
}

/// A dated money movement embedded in a parent record: one payment made, one
/// interest receipt, one dividend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct MoneyEvent {
    pub amount: Option<LooseAmount>,
    pub date: Option<DocumentDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SaleEvent {
    #[schemars(description = "Units sold in this event")]
    pub quantity_sold: Option<LooseAmount>,
    pub timestamp: Option<DocumentDate>,
    pub time: Option<DocumentDate>,
    pub date: Option<DocumentDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RestockEvent {
    #[schemars(description = "Units added to stock in this event")]
    pub quantity: Option<LooseAmount>,
    pub time: Option<DocumentDate>,
    pub timestamp: Option<DocumentDate>,
}

/// An inventory item. Stock levels are never stored; they are derived from the
/// embedded restock and sale histories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    pub id: String,
    pub name: String,

    #[schemars(description = "Unit cost used for inventory valuation")]
    pub cost_price: Option<LooseAmount>,

    #[schemars(description = "Unit selling price")]
    pub price: Option<LooseAmount>,

    #[serde(deserialize_with = "lenient_series")]
    pub quantity_sold: Vec<SaleEvent>,

    #[serde(deserialize_with = "lenient_series")]
    pub quantity_restocked: Vec<RestockEvent>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Asset {
    pub id: String,

    #[schemars(description = "Current value, when the source system recorded one")]
    pub value: Option<LooseAmount>,

    #[schemars(description = "Recorded amount; second choice after value")]
    pub amount: Option<LooseAmount>,

    pub purchase_price: Option<LooseAmount>,
    pub cost_price: Option<LooseAmount>,
    pub salvage_value: Option<LooseAmount>,
    pub market_value: Option<LooseAmount>,

    #[schemars(description = "Lifecycle status, e.g. \"active\" or \"sold\"")]
    pub status: Option<String>,

    pub sold_price: Option<LooseAmount>,
    pub sold_date: Option<DocumentDate>,
    pub purchase_date: Option<DocumentDate>,

    pub timestamp: Option<DocumentDate>,
    pub created_at: Option<DocumentDate>,

    #[serde(deserialize_with = "lenient_series")]
    pub interest_received: Vec<MoneyEvent>,

    #[serde(deserialize_with = "lenient_series")]
    pub dividend_received: Vec<MoneyEvent>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Liability {
    pub id: String,

    #[schemars(description = "Principal amount of the loan")]
    pub amount: Option<LooseAmount>,

    pub value: Option<LooseAmount>,

    #[serde(deserialize_with = "lenient_direction")]
    #[schemars(with = "Option<LoanDirection>")]
    pub loan_type: Option<LoanDirection>,

    #[schemars(description = "Repayments made on a received loan")]
    #[serde(deserialize_with = "lenient_series")]
    pub amount_paid: Vec<MoneyEvent>,

    #[schemars(description = "Interest paid on a received loan")]
    #[serde(deserialize_with = "lenient_series")]
    pub interest_paid: Vec<MoneyEvent>,

    #[schemars(description = "Recoveries collected on a disbursed loan")]
    #[serde(deserialize_with = "lenient_series")]
    pub received_loan: Vec<MoneyEvent>,

    #[schemars(description = "Interest collected on a disbursed loan")]
    #[serde(deserialize_with = "lenient_series")]
    pub received_interest: Vec<MoneyEvent>,

    pub status: Option<String>,

    pub timestamp: Option<DocumentDate>,
    pub created_at: Option<DocumentDate>,
    pub date: Option<DocumentDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Share {
    pub id: String,

    pub number_of_shares: Option<LooseAmount>,
    pub share_price: Option<LooseAmount>,

    #[schemars(description = "Dividends paid out to the shareholder")]
    #[serde(deserialize_with = "lenient_series")]
    pub amount_paid: Vec<MoneyEvent>,

    #[schemars(description = "Cash received when the shares were issued")]
    #[serde(deserialize_with = "lenient_series")]
    pub share_issuance_proceeds: Vec<MoneyEvent>,

    #[serde(deserialize_with = "lenient_series")]
    pub dividends_received: Vec<MoneyEvent>,

    pub timestamp: Option<DocumentDate>,
    pub created_at: Option<DocumentDate>,
    pub date: Option<DocumentDate>,
}

/// One fee line on a receipt. Older records label the line with `type`, newer
/// ones with `itemName`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct LineItem {
    #[serde(rename = "type", alias = "itemName")]
    pub kind: Option<String>,

    pub amount: Option<LooseAmount>,
}

/// A fee receipt. A payment reports either a flat `totalAmount` or itemized
/// `items`; consumers must accept both shapes without knowing which.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Payment {
    pub id: String,
    pub student_id: Option<String>,

    pub total_amount: Option<LooseAmount>,

    #[serde(deserialize_with = "lenient_series")]
    pub items: Vec<LineItem>,

    pub timestamp: Option<DocumentDate>,
    pub created_at: Option<DocumentDate>,
    pub date: Option<DocumentDate>,
}

/// The flat record shape behind the expenses, taxes and purchases
/// collections: one amount, one date. Tax documents call the amount
/// `paidAmount`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CashRecord {
    pub id: Option<String>,

    #[serde(alias = "paidAmount")]
    pub amount: Option<LooseAmount>,

    pub date: Option<DocumentDate>,
    pub timestamp: Option<DocumentDate>,
}

/// One product line on a point-of-sale receipt. `Amount` is the extended line
/// total; `costPrice` is the extended cost recorded at sale time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SaleLine {
    #[serde(rename = "Amount", alias = "amount")]
    pub amount: Option<LooseAmount>,

    pub cost_price: Option<LooseAmount>,

    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Sale {
    pub id: String,

    pub date: Option<DocumentDate>,
    pub timestamp: Option<DocumentDate>,

    pub total_amount: Option<LooseAmount>,

    #[serde(deserialize_with = "lenient_series")]
    pub products: Vec<SaleLine>,
}

/// The point-in-time snapshot of every collection the engine aggregates,
/// as loaded by the data-access layer. The engine never mutates it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceCollections {
    pub products: Vec<Product>,
    pub assets: Vec<Asset>,
    pub liabilities: Vec<Liability>,
    pub shares: Vec<Share>,
    pub payments: Vec<Payment>,
    pub expenses: Vec<CashRecord>,
    pub taxes: Vec<CashRecord>,
    pub purchases: Vec<CashRecord>,
    pub sales: Vec<Sale>,
}

impl SourceCollections {
    /// JSON schema of the document shapes, published to the data-entry client.
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(SourceCollections)
    }

    pub fn schema_as_json() -> Result<String> {
        let schema = Self::generate_json_schema();
        Ok(serde_json::to_string_pretty(&schema)?)
    }
}

impl Dated for MoneyEvent {
    fn recorded_at(&self) -> DateTime<Utc> {
        resolve_first(&[self.date.as_ref()])
    }
}

impl Dated for SaleEvent {
    fn recorded_at(&self) -> DateTime<Utc> {
        resolve_first(&[self.timestamp.as_ref(), self.time.as_ref(), self.date.as_ref()])
    }
}

impl Dated for RestockEvent {
    fn recorded_at(&self) -> DateTime<Utc> {
        resolve_first(&[self.time.as_ref(), self.timestamp.as_ref()])
    }
}

impl Dated for Asset {
    fn recorded_at(&self) -> DateTime<Utc> {
        resolve_first(&[
            self.timestamp.as_ref(),
            self.created_at.as_ref(),
            self.purchase_date.as_ref(),
        ])
    }
}

impl Dated for Liability {
    fn recorded_at(&self) -> DateTime<Utc> {
        resolve_first(&[
            self.timestamp.as_ref(),
            self.created_at.as_ref(),
            self.date.as_ref(),
        ])
    }
}

impl Dated for Share {
    fn recorded_at(&self) -> DateTime<Utc> {
        resolve_first(&[
            self.timestamp.as_ref(),
            self.created_at.as_ref(),
            self.date.as_ref(),
        ])
    }
}

impl Dated for Payment {
    fn recorded_at(&self) -> DateTime<Utc> {
        resolve_first(&[
            self.timestamp.as_ref(),
            self.created_at.as_ref(),
            self.date.as_ref(),
        ])
    }
}

impl Dated for CashRecord {
    fn recorded_at(&self) -> DateTime<Utc> {
        resolve_first(&[self.date.as_ref(), self.timestamp.as_ref()])
    }
}

impl Dated for Sale {
    fn recorded_at(&self) -> DateTime<Utc> {
        resolve_first(&[self.date.as_ref(), self.timestamp.as_ref()])
    }
}

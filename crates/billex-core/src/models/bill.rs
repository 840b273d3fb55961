//! Bill data models for both output variants.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single product/service line extracted from the bill text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Item description as printed.
    pub description: String,

    /// Price per unit, when the line states one.
    pub unit_price: Option<Decimal>,

    /// Quantity, when the line states one.
    pub quantity: Option<Decimal>,

    /// Line amount.
    pub amount: Decimal,
}

impl LineItem {
    /// Create an item that only carries a description and an amount.
    pub fn new(description: impl Into<String>, amount: Decimal) -> Self {
        Self {
            description: description.into(),
            unit_price: None,
            quantity: None,
            amount,
        }
    }

    /// Attach unit price and quantity.
    pub fn with_quantity(mut self, unit_price: Decimal, quantity: Decimal) -> Self {
        self.unit_price = Some(unit_price);
        self.quantity = Some(quantity);
        self
    }
}

/// Keys of the printed summary figures a bill may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TotalKey {
    #[serde(rename = "total_amount")]
    TotalAmount,
    #[serde(rename = "discount")]
    Discount,
    #[serde(rename = "CGST")]
    Cgst,
    #[serde(rename = "SGST")]
    Sgst,
    #[serde(rename = "IGST")]
    Igst,
    #[serde(rename = "total_tax")]
    TotalTax,
    #[serde(rename = "grand_total")]
    GrandTotal,
    #[serde(rename = "round_off")]
    RoundOff,
    #[serde(rename = "final_amount_printed")]
    FinalAmountPrinted,
}

impl TotalKey {
    /// Key name as it appears in JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TotalAmount => "total_amount",
            Self::Discount => "discount",
            Self::Cgst => "CGST",
            Self::Sgst => "SGST",
            Self::Igst => "IGST",
            Self::TotalTax => "total_tax",
            Self::GrandTotal => "grand_total",
            Self::RoundOff => "round_off",
            Self::FinalAmountPrinted => "final_amount_printed",
        }
    }
}

impl fmt::Display for TotalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Printed summary figures found in a document. Any key may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TotalsMap(BTreeMap<TotalKey, Decimal>);

impl TotalsMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: TotalKey) -> Option<Decimal> {
        self.0.get(&key).copied()
    }

    pub fn contains(&self, key: TotalKey) -> bool {
        self.0.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TotalKey, Decimal)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }
}

impl FromIterator<(TotalKey, Decimal)> for TotalsMap {
    fn from_iter<I: IntoIterator<Item = (TotalKey, Decimal)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Indian GST components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaxCode {
    Cgst,
    Sgst,
    Igst,
}

impl TaxCode {
    pub const ALL: [TaxCode; 3] = [TaxCode::Cgst, TaxCode::Sgst, TaxCode::Igst];

    /// The totals key this tax code is read from.
    pub fn total_key(&self) -> TotalKey {
        match self {
            Self::Cgst => TotalKey::Cgst,
            Self::Sgst => TotalKey::Sgst,
            Self::Igst => TotalKey::Igst,
        }
    }
}

/// Tax breakdown derived from the totals map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Taxes {
    /// Per-code amounts that were printed on the bill.
    pub details: BTreeMap<TaxCode, Decimal>,

    /// Printed total tax, or the sum of `details` when not printed.
    pub total_tax: Option<Decimal>,
}

/// A labelled subtotal figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubTotal {
    pub label: String,
    pub amount: Decimal,
}

/// Terminal result of invoice-style extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceOutput {
    pub bill_no: Option<String>,
    pub bill_date: Option<String>,
    pub patient_name: Option<String>,
    pub line_items: Vec<LineItem>,
    pub sub_totals: Vec<SubTotal>,
    pub discount: Option<Decimal>,
    pub taxes: Taxes,
    pub grand_total: Option<Decimal>,
    pub round_off: Option<Decimal>,

    /// Printed final amount when present, otherwise the computed total.
    pub final_total: Decimal,

    /// Stringified figures kept for audit.
    pub meta: BTreeMap<String, String>,

    /// Advisory anomaly messages.
    pub anomalies: Vec<String>,
}

/// Page classification used by the pagewise output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageType {
    #[serde(rename = "Pharmacy")]
    Pharmacy,
    #[serde(rename = "Final Bill")]
    FinalBill,
    #[serde(rename = "Bill Detail")]
    BillDetail,
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageType::Pharmacy => write!(f, "Pharmacy"),
            PageType::FinalBill => write!(f, "Final Bill"),
            PageType::BillDetail => write!(f, "Bill Detail"),
        }
    }
}

/// A table row found on a page (pagewise variant).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillItem {
    pub item_name: String,
    pub item_quantity: Decimal,
    pub item_rate: Decimal,
    pub item_amount: Decimal,
}

/// Items found on one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLineItems {
    /// 1-based page number.
    pub page_no: String,
    pub page_type: PageType,
    pub bill_items: Vec<BillItem>,
}

/// Token accounting. No language model is involved, so every count is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub total_tokens: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagewiseData {
    pub pagewise_line_items: Vec<PageLineItems>,
    pub total_item_count: usize,
}

/// Terminal result of pagewise extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagewiseResponse {
    pub is_success: bool,
    pub token_usage: TokenUsage,
    pub data: PagewiseData,
}

impl PagewiseResponse {
    /// Wrap page results, counting items across all pages.
    pub fn from_pages(pages: Vec<PageLineItems>) -> Self {
        let total_item_count = pages.iter().map(|p| p.bill_items.len()).sum();
        Self {
            is_success: true,
            token_usage: TokenUsage::default(),
            data: PagewiseData {
                pagewise_line_items: pages,
                total_item_count,
            },
        }
    }
}

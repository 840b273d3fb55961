//! Data models for extraction output and pipeline configuration.

pub mod bill;
pub mod config;

pub use bill::{
    BillItem, InvoiceOutput, LineItem, PageLineItems, PageType, PagewiseData, PagewiseResponse,
    SubTotal, TaxCode, Taxes, TokenUsage, TotalKey, TotalsMap,
};
pub use config::BillexConfig;

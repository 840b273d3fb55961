//! Bill field extraction and reconciliation.

mod parser;
pub mod reconcile;
pub mod rules;

pub use parser::BillParser;
pub use reconcile::{AMOUNT_OVERFLOW, FINAL_TOTAL_MISMATCH};

//! Deductions — claimed expenses and edits to the stored list.

pub mod ledger;
pub mod model;

pub use ledger::{add_deduction, remove_deduction, update_deduction};
pub use model::{Deduction, DeductionCategory, MAX_DEDUCTION_AMOUNT};

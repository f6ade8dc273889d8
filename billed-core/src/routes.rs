//! Hash routes the pages navigate between.

pub const BILLS: &str = "#employee/bills";
pub const NEW_BILL: &str = "#employee/bill/new";

//! Types that represent the core data model, such as `Ledger`, `Catalog` and `Suggestion`.
mod amount;
mod catalog;
mod ledger;
mod suggestion;
mod target;

pub use amount::{Amount, AmountError};
pub use catalog::{Catalog, Denomination};
pub use ledger::Ledger;
pub use suggestion::Suggestion;
pub use target::TargetTracker;

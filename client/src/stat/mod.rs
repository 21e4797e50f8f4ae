pub mod datatype;
pub mod ledger;
pub mod sync;

pub use ledger::{CategoryBreakdown, Ledger, MonthKey, bar_heights};
pub use sync::{ApiClient, ApiError, download_ledger_from_server};

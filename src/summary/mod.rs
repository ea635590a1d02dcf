//! The income summary: totals over a date range and the split of the
//! revenue between the manager and the owner.

mod aggregation;
mod page;
mod split;
mod split_endpoint;
mod view;

pub use aggregation::{Totals, aggregate};
pub use page::get_summary_page;
pub use split_endpoint::post_split;

pub mod date;
pub mod duration;

pub use date::{format_date, parse_date_expr};
pub use duration::parse_duration;

pub mod filter_state;

pub use filter_state::{parse_date, parse_usernames, FilterState};

//! Output helpers shared by commands.

mod printer;
mod table;

pub use printer::{print_info, print_json, print_key_value, print_success, print_warning};
pub use table::{join_or_dash, truncate, validate_limit};

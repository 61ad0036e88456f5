//! One module per subcommand.

pub mod address;
pub mod change_password;
pub mod completions;
pub mod config_cmd;
pub mod create;
pub mod import;
pub mod info;
pub mod sign;

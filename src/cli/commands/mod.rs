//! One module per subcommand.

pub mod add;
pub mod audit_cmd;
pub mod generate;
pub mod get;
pub mod init;
pub mod list;

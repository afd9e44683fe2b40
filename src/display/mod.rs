//! Terminal display and formatting utilities.
//!
//! Handles colorized JSON output and init-data freshness rendering for
//! human-readable terminal output.

pub mod init_data_status;
pub mod json_printer;

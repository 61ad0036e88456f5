//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.  Results go to stdout;
//! errors, warnings, notes and hints go to stderr so stdout stays
//! safe to pipe.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::config::Validation;
use crate::errors::WalletError;
use crate::provider::WalletInfo;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info note on stderr: "info_sign {msg}"
pub fn info(msg: &str) {
    eprintln!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint on stderr: "arrow {msg}"
pub fn tip(msg: &str) {
    eprintln!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print an error and, for retry failures, the chain of causes.
pub fn error_chain(err: &WalletError) {
    error(&err.to_string());

    let mut current = err;
    while let WalletError::RetryExhausted { last_error, .. }
    | WalletError::Cancelled { last_error, .. } = current
    {
        eprintln!("  {} {}", style("caused by:").dim(), last_error);
        current = &**last_error;
    }
}

/// Print a recovery phrase as a numbered grid, four words per row.
pub fn print_mnemonic(phrase: &str) {
    let words: Vec<&str> = phrase.split_whitespace().collect();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    for row in words.chunks(4).enumerate() {
        let (row_index, chunk) = row;
        table.add_row(
            chunk
                .iter()
                .enumerate()
                .map(|(i, word)| format!("{:>2}. {word}", row_index * 4 + i + 1))
                .collect::<Vec<_>>(),
        );
    }

    println!("{table}");
}

/// Print the provider/address/location summary.
pub fn print_wallet_info(info: &WalletInfo) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec!["Provider".to_string(), info.provider.to_string()]);
    table.add_row(vec!["Address".to_string(), info.address.clone()]);
    table.add_row(vec!["Location".to_string(), info.location.clone()]);
    println!("{table}");
}

/// Print a settings validation report.
pub fn print_validation(report: &Validation) {
    for e in &report.errors {
        error(e);
    }
    for w in &report.warnings {
        warning(w);
    }
    if report.is_valid() && report.warnings.is_empty() {
        success("Configuration is valid");
    }
}

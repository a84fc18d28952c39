use clap::Parser;

/// Outer CLI shell. Everything except --help/--version is collected as raw
/// tokens and resolved by the dispatcher, so an unknown keyword lands on the
/// listing fallback path instead of becoming a parse error.
#[derive(Parser)]
#[command(
    name = "st",
    about = concat!("[*] stint v", env!("CARGO_PKG_VERSION"), " - template-stamped task tracking"),
    version
)]
pub struct Cli {
    /// Raw command tokens; the first token selects the operation
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub tokens: Vec<String>,
}

// aprecon CLI - batch accounts-payable reconciliation

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aprecon_engine::{ReconInput, ReconcileConfig};
use aprecon_io::load_table;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_DIVERGENT: u8 = 2;
pub const EXIT_INVALID_CONFIG: u8 = 3;

#[derive(Parser)]
#[command(name = "aprecon")]
#[command(about = "Reconcile an accounts-payable extract against a general-ledger extract")]
#[command(version)]
struct Cli {
    /// Verbose diagnostics (overridden by RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a reconciliation and emit the JSON result
    #[command(after_help = "\
Examples:
  aprecon run --config recon.toml --financial titulos.xlsx --ledger razao.csv --account 2.01.01.001
  aprecon run --config recon.toml --financial titulos.csv --ledger razao.csv --account 2.01.01.001 --output result.json --pretty")]
    Run {
        /// Path to the TOML run configuration
        #[arg(long)]
        config: PathBuf,

        /// Financial (accounts-payable) extract, CSV or Excel
        #[arg(long)]
        financial: PathBuf,

        /// General-ledger extract, CSV or Excel
        #[arg(long)]
        ledger: PathBuf,

        /// Account code under reconciliation, e.g. 2.01.01.001
        #[arg(long)]
        account: String,

        /// Write the JSON result to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print the JSON result
        #[arg(long)]
        pretty: bool,
    },

    /// Validate a run configuration without executing
    Validate {
        /// Path to the TOML run configuration
        config: PathBuf,
    },
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
}

fn cli_err(code: u8, message: impl Into<String>) -> CliError {
    CliError {
        code,
        message: message.into(),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match cli.command {
        Commands::Run {
            config,
            financial,
            ledger,
            account,
            output,
            pretty,
        } => cmd_run(config, financial, ledger, account, output, pretty),
        Commands::Validate { config } => cmd_validate(config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("error: {}", e.message);
            ExitCode::from(e.code)
        }
    }
}

fn load_config(path: &PathBuf) -> Result<ReconcileConfig, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| cli_err(EXIT_ERROR, format!("cannot read {}: {e}", path.display())))?;
    ReconcileConfig::from_toml(&text).map_err(|e| cli_err(EXIT_INVALID_CONFIG, e.to_string()))
}

fn cmd_run(
    config_path: PathBuf,
    financial_path: PathBuf,
    ledger_path: PathBuf,
    account: String,
    output: Option<PathBuf>,
    pretty: bool,
) -> Result<u8, CliError> {
    let config = load_config(&config_path)?;

    let financial = load_table(&financial_path).map_err(|e| cli_err(EXIT_ERROR, e.to_string()))?;
    let ledger = load_table(&ledger_path).map_err(|e| cli_err(EXIT_ERROR, e.to_string()))?;

    let input = ReconInput {
        financial_headers: financial.headers,
        financial: financial.rows,
        ledger_headers: ledger.headers,
        ledger: ledger.rows,
        account_code: account,
    };

    let result =
        aprecon_engine::run(&input, &config).map_err(|e| cli_err(EXIT_ERROR, e.to_string()))?;

    let json = if pretty {
        serde_json::to_string_pretty(&result)
    } else {
        serde_json::to_string(&result)
    }
    .map_err(|e| cli_err(EXIT_ERROR, format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = output {
        std::fs::write(path, &json)
            .map_err(|e| cli_err(EXIT_ERROR, format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    } else {
        println!("{json}");
    }

    // Human summary to stderr
    let s = &result.summary;
    eprintln!(
        "account {}: {} suppliers, {} matched, {} divergent ({}% reconciled)",
        result.meta.account_code, s.total_suppliers, s.matched, s.divergent, s.pct_reconciled,
    );
    for alert in &s.alerts {
        eprintln!("alert: {alert}");
    }

    if s.divergent > 0 {
        return Ok(EXIT_DIVERGENT);
    }
    Ok(EXIT_SUCCESS)
}

fn cmd_validate(config_path: PathBuf) -> Result<u8, CliError> {
    load_config(&config_path)?;
    eprintln!("{}: ok", config_path.display());
    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn validate_accepts_good_config() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[thresholds]\nreconcile = \"0.05\"").unwrap();
        let path = file.into_temp_path();
        assert_eq!(cmd_validate(path.to_path_buf()).unwrap(), EXIT_SUCCESS);
    }

    #[test]
    fn validate_rejects_bad_thresholds() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[thresholds]\nhigh_pct = \"5\"\nmedium_pct = \"2\"").unwrap();
        let path = file.into_temp_path();
        let err = cmd_validate(path.to_path_buf()).unwrap_err();
        assert_eq!(err.code, EXIT_INVALID_CONFIG);
    }
}

//! JSON:API OpenAPI CLI
//!
//! Command-line interface for validating generator configurations and
//! producing OpenAPI documents from them.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use jsonapi_openapi::{
    check_references, generate, load_config_auto, render, write_document, ConfigError,
    OutputFormat,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jsonapi-openapi")]
#[command(about = "Generate OpenAPI documents for JSON:API services")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an OpenAPI document from a configuration
    Generate {
        /// Configuration source: file path or URL (http:// or https://)
        config: String,

        /// Server URL written into the document and relationship link examples
        #[arg(long, default_value = "http://localhost:8080")]
        base_url: String,

        /// Output file (stdout if not specified)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Output format (default: inferred from --output, else yaml)
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
    },

    /// Validate a configuration without generating anything
    Validate {
        /// Configuration source: file path or URL (http:// or https://)
        config: String,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,

        /// Treat warnings (unknown attribute names) as errors
        #[arg(long)]
        strict: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Yaml,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Yaml => OutputFormat::Yaml,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Generate {
            config,
            base_url,
            output,
            format,
        } => run_generate(&config, &base_url, output, format),

        Commands::Validate {
            config,
            json,
            strict,
        } => run_validate(&config, json, strict),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

/// Logs go to stderr so generated documents can be piped from stdout.
/// `RUST_LOG` overrides the level picked by `-v`.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_generate(
    config_source: &str,
    base_url: &str,
    output: Option<PathBuf>,
    format: Option<FormatArg>,
) -> Result<(), u8> {
    let config = load_config_auto(config_source).map_err(|e| {
        report_config_error(&e);
        e.exit_code() as u8
    })?;

    for warning in check_references(&config) {
        tracing::warn!(path = %warning.path, "{}", warning.message);
    }

    let document = generate(&config, base_url).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let format = format
        .map(OutputFormat::from)
        .or_else(|| output.as_deref().and_then(OutputFormat::from_path))
        .unwrap_or_default();

    match output {
        Some(path) => write_document(&document, &path, format).map_err(|e| {
            eprintln!("Error: {}", e);
            e.exit_code() as u8
        }),
        None => {
            let rendered = render(&document, format).map_err(|e| {
                eprintln!("Error: {}", e);
                e.exit_code() as u8
            })?;
            print!("{}", rendered);
            Ok(())
        }
    }
}

fn run_validate(config_source: &str, json_output: bool, strict: bool) -> Result<(), u8> {
    match load_config_auto(config_source) {
        Ok(config) => {
            let warnings = check_references(&config);
            let valid = !strict || warnings.is_empty();
            if json_output {
                let output = serde_json::json!({
                    "valid": valid,
                    "warnings": warnings
                });
                println!("{}", output);
            } else {
                for warning in &warnings {
                    eprintln!("warning: {}", warning);
                }
                if valid {
                    println!("Valid ({} resources)", config.resources.len());
                } else {
                    eprintln!("Validation failed: {} warning(s) in strict mode", warnings.len());
                }
            }
            if valid {
                Ok(())
            } else {
                Err(1)
            }
        }
        Err(ConfigError::Invalid { errors }) => {
            if json_output {
                let output = serde_json::json!({
                    "valid": false,
                    "errors": errors
                });
                println!("{}", output);
            } else {
                eprintln!("Validation failed:");
                for error in errors {
                    eprintln!("  {}", error);
                }
            }
            Err(1)
        }
        Err(e) => {
            if json_output {
                let output = serde_json::json!({
                    "valid": false,
                    "error": e.to_string()
                });
                println!("{}", output);
            } else {
                eprintln!("Error: {}", e);
            }
            Err(e.exit_code() as u8)
        }
    }
}

/// Print a configuration error, listing each violation when there are several.
fn report_config_error(e: &ConfigError) {
    eprintln!("Error: {}", e);
    if let ConfigError::Invalid { errors } = e {
        for error in errors {
            eprintln!("  {}", error);
        }
    }
}

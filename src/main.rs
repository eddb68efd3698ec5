use anyhow::Context;
use clap::{Parser, Subcommand};
use cppcheck_action::command::ANALYZER;
use cppcheck_action::config::DEFAULT_CONFIG_FILE;
use cppcheck_action::executor::exit_codes;
use cppcheck_action::{compile, telemetry, AnalyzerOptions, Config, ConfigError, Executor};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "cppcheck-action")]
#[command(about = "Run cppcheck with options taken from the CI environment")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a source tree (the default when no subcommand is given)
    Run(RunArgs),
    /// Write a documented options file
    Config {
        /// Where to write the file
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        output: PathBuf,
    },
}

#[derive(clap::Args, Clone)]
struct RunArgs {
    /// Source tree to analyze
    #[arg(default_value = ".")]
    path: String,

    /// Options file; INPUT_* environment variables override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log `cppcheck --version` before analyzing
    #[arg(
        long,
        env = "INPUT_SHOW_VERSION",
        default_value_t = true,
        action = clap::ArgAction::Set,
        value_parser = switch_or::<true>
    )]
    show_version: bool,

    /// Log `cppcheck --help` before analyzing
    #[arg(
        long,
        env = "INPUT_SHOW_HELP",
        default_value_t = false,
        action = clap::ArgAction::Set,
        value_parser = switch_or::<false>
    )]
    show_help: bool,
}

/// Parse a `true`/`false` switch. Runners pass unset inputs as empty strings,
/// so a blank value means `DEFAULT`.
fn switch_or<const DEFAULT: bool>(value: &str) -> Result<bool, String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(DEFAULT);
    }
    match value.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(format!("expected `true` or `false`, got `{}`", value)),
    }
}

fn main() -> ExitCode {
    telemetry::init_tracing("info");
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Run(args)) => run(&args),
        Some(Commands::Config { output }) => generate_config(output),
        None => run(&cli.run),
    };

    match result {
        Ok(code) => exit_code(code),
        Err(e) => {
            error!("{:#}", e);
            if e.downcast_ref::<ConfigError>().is_some() {
                exit_code(exit_codes::CONFIG_ERROR)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

fn run(args: &RunArgs) -> cppcheck_action::Result<i32> {
    let config = Config::from_env(args.config.as_deref())?;

    if config.is_unauthorized_pull_request() {
        warn!(
            "skipping analysis: pull request by {} is not from repository owner {}",
            config.github.actor, config.github.repository_owner
        );
        return Ok(exit_codes::SKIPPED_UNAUTHORIZED);
    }

    info!(
        "event {} on {} ({})",
        config.github.event_name,
        config.repository(),
        config.branch()
    );

    let compiled = compile(ANALYZER, &config.options);
    let outcome = Executor::new(args.show_version, args.show_help).run(compiled, &args.path);

    if outcome.is_failure() {
        error!("cppcheck run failed: {:?}", outcome);
    }
    Ok(outcome.exit_code())
}

fn generate_config(output: PathBuf) -> cppcheck_action::Result<i32> {
    AnalyzerOptions::write_documented_config(&output)
        .with_context(|| format!("generating {}", output.display()))?;
    info!("wrote options file {}", output.display());
    Ok(exit_codes::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_switch_falls_back_to_default() {
        assert_eq!(switch_or::<true>(""), Ok(true));
        assert_eq!(switch_or::<false>("  "), Ok(false));
    }

    #[test]
    fn test_switch_values() {
        assert_eq!(switch_or::<false>("true"), Ok(true));
        assert_eq!(switch_or::<true>("False"), Ok(false));
        assert!(switch_or::<true>("yes").is_err());
    }
}

//! CLIF QC command-line tool.

use anyhow::Result;
use clap::{ColorChoice, Parser};
use std::io::{self, IsTerminal};
use tracing::Level;

use clif_cli::logging::{LogConfig, LogFormat, init_logging};
use clif_cli::pipeline::{run_directory, run_table};
use clif_cli::session::QcSession;
use clif_model::SchemaRegistry;
use clif_report::print_qc_summary;

mod cli;

use crate::cli::{CheckArgs, Cli, Command, LogFormatArg};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    if let Err(error) = init_logging(&log_config_from_cli(&cli)) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match cli.command {
        Command::Check(args) => match run_check(&args) {
            Ok(()) => 0,
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::Tables => {
            for name in SchemaRegistry::embedded().table_names() {
                println!("{name}");
            }
            0
        }
    };
    std::process::exit(exit_code);
}

fn run_check(args: &CheckArgs) -> Result<()> {
    let mut session = QcSession::new(SchemaRegistry::embedded());
    session.sample_fraction = args.sample_fraction;
    session.seed = args.seed;
    session.thresholds_dir = args.thresholds_dir.clone();
    session.output_dir = args.output_dir.clone();
    session.export_revised = args.export_revised;
    session.show_all_missingness = args.show_all_missingness;

    match &args.table {
        Some(table) => {
            session.load_hospitalization_lookup(&args.data_dir)?;
            let path = table_file(&args.data_dir, table)?;
            let outcome = run_table(&session, table, &path)?;
            print_qc_summary(&outcome.report);
            if let Some(output_dir) = &session.output_dir {
                clif_report::write_report_json(output_dir, &[outcome.report])?;
            }
        }
        None => {
            run_directory(&mut session, &args.data_dir)?;
        }
    }
    Ok(())
}

fn table_file(data_dir: &std::path::Path, table: &str) -> Result<std::path::PathBuf> {
    for extension in ["csv", "parquet"] {
        let path = data_dir.join(format!("clif_{}.{extension}", table.to_lowercase()));
        if path.is_file() {
            return Ok(path);
        }
    }
    anyhow::bail!(
        "no clif_{}.csv or clif_{}.parquet in {}",
        table.to_lowercase(),
        table.to_lowercase(),
        data_dir.display()
    )
}

/// Build logging configuration from CLI flags.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let level = cli
        .verbosity
        .tracing_level_filter()
        .into_level()
        .unwrap_or(Level::ERROR);
    LogConfig {
        level,
        format: match cli.log_format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        },
        log_file: cli.log_file.clone(),
        with_ansi: match cli.color.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
        },
        ..LogConfig::default()
    }
}

use std::{io::Write, path::PathBuf};

use chia_koinly::{
    parser::{Options, ParseMode},
    report::Report,
};
use clap::Parser;
use log::info;

/// Read `chia wallet get_transactions --no-paginate --sort-by-height` output
/// from stdin and convert it to Koinly CSV.
#[derive(Parser)]
#[clap(version, about)]
struct Cli {
    /// Write the CSV to this file instead of stdout
    output: Option<PathBuf>,
    /// Reformat dates as MM/DD/YY HH:MM
    #[clap(long)]
    normalize_date: bool,
    /// Fail on malformed lines instead of passing them through
    #[clap(long)]
    strict: bool,
}

/// Stdout gets a blank line after the CSV, which already ends with a newline.
fn print_csv(mut output: impl Write, csv: &str) -> std::io::Result<()> {
    writeln!(output, "{}", csv)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();
    let options = Options {
        mode: if cli.strict {
            ParseMode::Strict
        } else {
            ParseMode::Lenient
        },
        normalize_date: cli.normalize_date,
    };

    let input = std::io::read_to_string(std::io::stdin())?;
    let report = Report::from_text(&input, options)?;
    match cli.output {
        Some(path) => {
            report.write_to(&path)?;
            info!(
                "wrote {} transactions to {}",
                report.records().len(),
                path.display()
            );
        }
        None => print_csv(std::io::stdout().lock(), &report.to_csv()?)?,
    }
    Ok(())
}

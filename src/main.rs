use std::error::Error;
use std::process::ExitCode;

use clap::Parser;
use simple_logger::SimpleLogger;

use cloud_csv::*;

#[derive(clap::ValueEnum, Debug, Clone, Copy)]
enum Format {
    Text,
    Json,
}

const ABOUT: &'static str = r#"Downloads a CSV blob through a pre-signed URL (e.g. an Azure SAS URL) and prints its first rows.
Exits with 0 when data was loaded (even if empty) and 1 when nothing usable could be loaded.
"#;

#[derive(Parser, Debug)]
#[command(author, version, about = ABOUT)]
struct Cli {
    /// The pre-signed URL of the blob
    #[arg(long, env = "CLOUD_DATA_URL", hide_env_values = true)]
    url: Option<String>,
    /// The number of rows to preview
    #[arg(short, long, default_value_t = 5)]
    rows: usize,
    /// The field delimiter
    #[arg(long, default_value_t = ',')]
    delimiter: char,
    /// How to print the preview
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
    /// The log level
    #[arg(long, default_value_t = log::LevelFilter::Info)]
    log_level: log::LevelFilter,
}

fn print(table: &Table, rows: usize, format: Format) -> Result<(), Box<dyn Error>> {
    match format {
        Format::Text => println!("{}", report::preview(table, rows)),
        Format::Json => println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "columns": report::json_columns(table),
                "rows": report::json_rows(table, rows),
            }))?
        ),
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    let cli = Cli::parse();

    SimpleLogger::new()
        .with_level(cli.log_level)
        .with_module_level("reqwest", log::LevelFilter::Warn)
        .with_module_level("hyper", log::LevelFilter::Warn)
        .with_module_level("hyper_util", log::LevelFilter::Warn)
        .init()?;

    if !cli.delimiter.is_ascii() {
        return Err("the delimiter must be a single ASCII character".into());
    }
    let dialect = Dialect {
        delimiter: cli.delimiter as u8,
        ..Default::default()
    };

    let logger = Logger::global();
    let fetcher = HttpFetcher::new()?;

    match fetch_and_load(cli.url.as_deref(), &fetcher, &dialect, &logger).await? {
        Outcome::Table(table) => {
            log::info!("{}", report::summary(&table));
            print(&table, cli.rows, cli.format)?;
            Ok(ExitCode::SUCCESS)
        }
        Outcome::Empty(_) => {
            log::info!("Data loaded but the table is empty.");
            Ok(ExitCode::SUCCESS)
        }
        Outcome::Failed(_) => {
            log::info!("Failed to load data.");
            Ok(ExitCode::FAILURE)
        }
    }
}

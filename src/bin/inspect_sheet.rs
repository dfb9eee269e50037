use clap::Parser;
use loopsheet_etl::adapters::xlsx;
use loopsheet_etl::core::Storage;
use loopsheet_etl::domain::model::Cell;
use loopsheet_etl::utils::logger;
use loopsheet_etl::LocalStorage;

/// Print the decoded column list and shape of a loop-list workbook, the way
/// the cleaning pipeline will see it.
#[derive(Parser)]
#[command(name = "inspect-sheet")]
#[command(about = "Inspect a loop-list workbook without cleaning it")]
struct Args {
    /// Workbook to inspect
    file: String,

    /// Physical rows skipped before the header row
    #[arg(long, default_value = "1")]
    skip_rows: usize,

    /// Column whose filled-cell count is reported
    #[arg(long, default_value = "Loop Component")]
    count_column: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logger::init_cli_logger(false);

    let storage = LocalStorage::new(String::new());
    let bytes = storage.read_file(&args.file).await?;
    let sheet = xlsx::decode_first_worksheet(&bytes, args.skip_rows)?;

    let (rows, cols) = sheet.shape();
    println!("📄 {}", args.file);
    println!("📐 {} rows x {} columns", rows, cols);
    println!("📋 Columns: {}", sheet.columns.join(", "));

    if let Some(idx) = sheet.column_index(&args.count_column) {
        let filled = sheet
            .rows
            .iter()
            .filter(|row| !matches!(row[idx], Cell::Empty))
            .count();
        println!("🔢 '{}' has {} filled cells", args.count_column, filled);
    } else {
        println!("⚠️ No '{}' column found", args.count_column);
    }

    Ok(())
}

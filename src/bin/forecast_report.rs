use coursecast::{dataset, report};
use std::{env, path::Path, process::exit};

fn main() {
    // Expect exactly one CLI argument: path to an enrollment CSV.
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <CSV_FILE>", args[0]);
        exit(1);
    }
    if let Err(e) = print_report(Path::new(&args[1])) {
        eprintln!("Error: {:#}", e);
        exit(1);
    }
}

/// Load the CSV, build the forecast report and print it as JSON.
fn print_report(path: &Path) -> anyhow::Result<()> {
    let records = dataset::load_records(path)?;
    let report = report::assemble_forecast_report(&records);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

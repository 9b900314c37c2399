//! Utility to bulk-import spreadsheet rows into the SNA database
//!
//! Usage: import_data <meals|foods> <rows.json>
//!
//! The file holds a JSON array of row objects, as exported from the meal
//! service or food composition spreadsheets.

use tracing_subscriber::EnvFilter;

use sna::config::Config;
use sna::tools::{food_items, load_rows, meals};

fn usage() -> ! {
    eprintln!("Usage: import_data <meals|foods> <rows.json>");
    std::process::exit(2);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("sna=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (kind, file_path) = match args.as_slice() {
        [kind, file_path] => (kind.as_str(), file_path.as_str()),
        _ => usage(),
    };

    let config = Config::from_env()?;
    println!("Database path: {}", config.database_path.display());
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = sna::db::Database::new(&config.database_path)?;
    database.with_conn(|conn| {
        sna::db::migrations::run_migrations(conn)?;
        Ok(())
    })?;

    let rows = load_rows(file_path)?;
    println!("Read {} rows from {}", rows.len(), file_path);

    let errors = match kind {
        "meals" => {
            let result = meals::import_meals(&database, &rows)?;
            println!("Meal import:");
            println!("  Schools: {}", result.schools_imported);
            println!("  Meals: {}", result.meals_imported);
            result.errors
        }
        "foods" => {
            let result = food_items::import_food_items(&database, &rows)?;
            println!("Food import:");
            println!("  Imported: {}", result.imported);
            println!("  Skipped (no name): {}", result.skipped);
            result.errors
        }
        _ => usage(),
    };

    for error in &errors {
        println!("  {}", error);
    }
    if !errors.is_empty() {
        println!("{} rows rejected", errors.len());
    }

    Ok(())
}

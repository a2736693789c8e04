use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;

use finance_tracker::{Transaction, TransactionType, create_transaction, initialize_db};

/// A utility for creating a test database for the REST API server of finance_tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// How many transactions to add to the database.
    #[arg(long, short = 'n', default_value_t = 50)]
    count: u32,
}

const INCOME_CATEGORIES: [&str; 2] = ["Salary", "Freelance"];
const EXPENSE_CATEGORIES: [&str; 5] = ["Groceries", "Rent", "Transport", "Utilities", "Dining"];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating {} test transactions...", args.count);

    for i in 0..args.count as usize {
        // Roughly one in five transactions is income.
        let builder = if i % 5 == 0 {
            let category = INCOME_CATEGORIES[i / 5 % INCOME_CATEGORIES.len()];
            Transaction::build(TransactionType::Income, category, 2500.0 + (i * 10) as f64)
        } else {
            let category = EXPENSE_CATEGORIES[i % EXPENSE_CATEGORIES.len()];
            Transaction::build(TransactionType::Expense, category, 5.0 + (i * 7 % 150) as f64)
                .description(Some(format!("Test expense #{i}").as_str()))
        };

        create_transaction(builder, &conn)?;
    }

    println!("Success!");

    Ok(())
}

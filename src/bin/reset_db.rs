use std::{
    error::Error,
    io::{self, Write},
    path::Path,
    process::exit,
};

use clap::Parser;
use rusqlite::Connection;

use hustle_hub::{drop_all_tables, initialize_db};

/// Delete all data in a Hustle Hub database and re-create the empty tables.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let db_path = Path::new(&args.db_path);

    if !db_path.is_file() {
        eprintln!("No database found at {db_path:#?}.");
        exit(1);
    }

    print!("This will delete ALL data in {db_path:#?}. Continue? [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;

    if !answer.trim().eq_ignore_ascii_case("y") {
        println!("Aborted, nothing was changed.");
        return Ok(());
    }

    let connection = Connection::open(db_path)?;

    println!("Dropping tables...");
    drop_all_tables(&connection)?;

    println!("Creating tables...");
    initialize_db(&connection)?;

    println!("Success!");

    Ok(())
}

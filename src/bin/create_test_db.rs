use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use hustle_hub::{
    Email, NewHustle, NewTransaction, NewUser, PasswordHash, TransactionType, User, Username,
    ValidatedPassword, count_users, create_hustle, create_transaction, create_user, initialize_db,
};

/// A utility for creating a test database for the REST API server of Hustle Hub.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Username, password and whether the user is an admin.
const TEST_USERS: [(&str, &str, bool); 5] = [
    ("admin", "admin123", true),
    ("john_doe", "password123", false),
    ("jane_smith", "securepass", false),
    ("test_user", "testpass123", false),
    ("demo_user", "demo123456", false),
];

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
    let connection = Connection::open(output_path)?;

    initialize_db(&connection)?;

    println!("Creating test users...");

    let mut users = Vec::with_capacity(TEST_USERS.len());
    for (username, password, is_admin) in TEST_USERS {
        let user = create_user(
            NewUser {
                username: Username::new(username)?,
                email: Email::new(&format!("{username}@example.com"))?,
                password_hash: PasswordHash::new(
                    ValidatedPassword::new(password)?,
                    PasswordHash::DEFAULT_COST,
                )?,
                is_admin,
                verification_token_hash: None,
            },
            &connection,
        )?;
        println!("  {username} / {password}");
        users.push(user);
    }
    println!("Created {} users.", count_users(&connection)?);

    if let Some(john) = users.iter().find(|user| user.username.as_ref() == "john_doe") {
        println!("Creating sample hustles and transactions for {}...", john.username);
        create_sample_finances(john, &connection)?;
    }

    println!("Success!");

    Ok(())
}

fn create_sample_finances(user: &User, connection: &Connection) -> Result<(), Box<dyn Error>> {
    let today = OffsetDateTime::now_utc().date();

    let hustles = [
        ("Freelance Design", "Freelancing", "Logo and web design for small businesses"),
        ("Food Delivery", "Gig Work", "Evening and weekend delivery shifts"),
        ("Etsy Shop", "E-commerce", "Handmade candles"),
    ];

    for (index, (title, hustle_type, description)) in hustles.into_iter().enumerate() {
        let hustle = create_hustle(
            NewHustle {
                title: title.to_owned(),
                hustle_type: hustle_type.to_owned(),
                description: Some(description.to_owned()),
                is_active: true,
                user_id: user.id,
            },
            connection,
        )?;

        // One income and one expense per month for the last six months.
        for month in 0..6_i64 {
            let date = today - Duration::days(month * 30 + index as i64 * 3);
            let income = 250.0 + 50.0 * (index as f64) + 20.0 * (month as f64);
            let expense = 40.0 + 15.0 * (index as f64);

            for (transaction_type, amount, description) in [
                (TransactionType::Income, income, format!("{title} earnings")),
                (TransactionType::Expense, expense, format!("{title} costs")),
            ] {
                create_transaction(
                    NewTransaction {
                        description,
                        amount,
                        transaction_type,
                        date,
                        user_id: user.id,
                        hustle_id: Some(hustle.id),
                    },
                    connection,
                )?;
            }
        }
    }

    create_transaction(
        NewTransaction {
            description: "Groceries".to_owned(),
            amount: 85.5,
            transaction_type: TransactionType::Expense,
            date: today,
            user_id: user.id,
            hustle_id: None,
        },
        connection,
    )?;

    Ok(())
}

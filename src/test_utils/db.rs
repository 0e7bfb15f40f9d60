use rusqlite::Connection;

use time::Date;

use crate::{
    auth::PasswordHash,
    db::initialize,
    debt::{Debt, DebtStatus, NewDebt, create_debt},
    goal::{Goal, GoalStatus, NewGoal, create_goal},
    hustle::{Hustle, NewHustle, create_hustle},
    transaction::{NewTransaction, Transaction, TransactionType, create_transaction},
    user::{Email, NewUser, User, Username, create_user},
};

/// The password given to every user created by [insert_test_user].
pub(crate) const TEST_PASSWORD: &str = "password123";

/// The bcrypt cost used in tests.
pub(crate) const TEST_HASH_COST: u32 = 4;

#[track_caller]
pub(crate) fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().expect("Could not open database in memory.");
    initialize(&connection).expect("Could not initialize database.");
    connection
}

#[track_caller]
fn insert_user(connection: &Connection, username: &str, is_admin: bool) -> User {
    create_user(
        NewUser {
            username: Username::new_unchecked(username),
            email: Email::new_unchecked(&format!("{username}@example.com")),
            password_hash: PasswordHash::from_raw_password(TEST_PASSWORD, TEST_HASH_COST)
                .expect("Could not hash password"),
            is_admin,
            verification_token_hash: None,
        },
        connection,
    )
    .expect("Could not create test user")
}

/// Create a regular user with the email `<username>@example.com` and the password [TEST_PASSWORD].
#[track_caller]
pub(crate) fn insert_test_user(connection: &Connection, username: &str) -> User {
    insert_user(connection, username, false)
}

/// Create an admin with the email `<username>@example.com` and the password [TEST_PASSWORD].
#[track_caller]
pub(crate) fn insert_test_admin(connection: &Connection, username: &str) -> User {
    insert_user(connection, username, true)
}

#[track_caller]
pub(crate) fn insert_test_hustle(connection: &Connection, user: &User, title: &str) -> Hustle {
    create_hustle(
        NewHustle {
            title: title.to_owned(),
            hustle_type: "side hustle".to_owned(),
            description: None,
            is_active: true,
            user_id: user.id,
        },
        connection,
    )
    .expect("Could not create test hustle")
}

#[track_caller]
pub(crate) fn insert_test_transaction(
    connection: &Connection,
    new_transaction: NewTransaction,
) -> Transaction {
    create_transaction(new_transaction, connection).expect("Could not create test transaction")
}

/// A transaction for `user` with the description "test".
pub(crate) fn new_test_transaction(
    user: &User,
    transaction_type: TransactionType,
    amount: f64,
    date: Date,
) -> NewTransaction {
    NewTransaction {
        description: "test".to_owned(),
        amount,
        transaction_type,
        date,
        user_id: user.id,
        hustle_id: None,
    }
}

/// A pending debt of 100 owed to `creditor`.
#[track_caller]
pub(crate) fn insert_test_debt(
    connection: &Connection,
    user: &User,
    creditor: &str,
    due_date: Date,
) -> Debt {
    create_debt(
        NewDebt {
            amount: 100.0,
            creditor: creditor.to_owned(),
            description: None,
            due_date,
            status: DebtStatus::Pending,
            user_id: user.id,
            hustle_id: None,
        },
        connection,
    )
    .expect("Could not create test debt")
}

/// A pending goal with the description "test".
#[track_caller]
pub(crate) fn insert_test_goal(
    connection: &Connection,
    user: &User,
    title: &str,
    due_date: Date,
) -> Goal {
    create_goal(
        NewGoal {
            title: title.to_owned(),
            description: "test".to_owned(),
            due_date,
            status: GoalStatus::Pending,
            user_id: user.id,
            hustle_id: None,
        },
        connection,
    )
    .expect("Could not create test goal")
}

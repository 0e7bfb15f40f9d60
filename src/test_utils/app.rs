use std::sync::{Arc, Mutex, MutexGuard};

use axum_test::TestServer;
use rusqlite::Connection;

use crate::{
    AppState,
    auth::issue_token_pair,
    build_router,
    config::AuthConfig,
    hustle::Hustle,
    mail::{EmailMessage, Mailer},
    test_utils::{TEST_HASH_COST, insert_test_admin, insert_test_hustle, insert_test_user},
    user::User,
};

pub(crate) fn test_auth_config() -> AuthConfig {
    AuthConfig {
        password_hash_cost: TEST_HASH_COST,
        ..AuthConfig::default()
    }
}

/// The full router backed by an in-memory database, with emails kept in memory.
pub(crate) struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    outbox: Arc<Mutex<Vec<EmailMessage>>>,
}

impl TestApp {
    #[track_caller]
    pub fn new() -> Self {
        let outbox = Arc::new(Mutex::new(Vec::new()));
        let connection =
            Connection::open_in_memory().expect("Could not open database in memory.");
        let state = AppState::new(
            connection,
            "foobar",
            test_auth_config(),
            Mailer::Outbox(outbox.clone()),
        )
        .expect("Could not create app state.");
        let server =
            TestServer::try_new(build_router(state.clone())).expect("Could not create test server.");

        Self {
            server,
            state,
            outbox,
        }
    }

    /// Lock the database. Drop the guard before awaiting a request.
    #[track_caller]
    pub fn connection(&self) -> MutexGuard<'_, Connection> {
        self.state
            .db_connection
            .lock()
            .expect("Could not lock database")
    }

    #[track_caller]
    pub fn insert_user(&self, username: &str) -> User {
        insert_test_user(&self.connection(), username)
    }

    #[track_caller]
    pub fn insert_admin(&self, username: &str) -> User {
        insert_test_admin(&self.connection(), username)
    }

    #[track_caller]
    pub fn insert_hustle(&self, user: &User, title: &str) -> Hustle {
        insert_test_hustle(&self.connection(), user, title)
    }

    /// A valid access token for `user`.
    #[track_caller]
    pub fn access_token(&self, user: &User) -> String {
        issue_token_pair(
            user.id,
            user.is_admin,
            &self.state.auth_config,
            &self.state.jwt_keys,
        )
        .expect("Could not create tokens")
        .access_token
    }

    pub fn sent_emails(&self) -> Vec<EmailMessage> {
        self.outbox.lock().expect("Could not lock outbox").clone()
    }

    /// The code in the last email sent to `address`.
    #[track_caller]
    pub fn last_code_sent_to(&self, address: &str) -> String {
        self.sent_emails()
            .iter()
            .rev()
            .find(|message| message.to == address)
            .and_then(|message| {
                message
                    .body
                    .lines()
                    .find_map(|line| line.strip_prefix("Code: "))
            })
            .unwrap_or_else(|| panic!("No code was emailed to {address}"))
            .to_owned()
    }
}

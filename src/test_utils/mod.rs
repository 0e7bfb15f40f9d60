#![allow(missing_docs)]

pub(crate) mod app;
pub(crate) mod db;

pub(crate) use app::{TestApp, test_auth_config};
pub(crate) use db::{
    TEST_HASH_COST, TEST_PASSWORD, get_test_connection, insert_test_admin, insert_test_debt,
    insert_test_goal, insert_test_hustle, insert_test_transaction, insert_test_user,
    new_test_transaction,
};

//! Set up, access and tear down the application's SQLite database.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{Error, transaction::create_transaction_table};

/// Create the tables for the domain models if they do not already exist.
///
/// All tables are created in a single exclusive transaction, so either every
/// table is created or none are. Calling this on an initialized database is a
/// no-op.
///
/// # Errors
/// Returns an [Error::SqlError] if a table cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Acquire the shared database connection.
///
/// # Errors
/// Returns an [Error::DatabaseLockError] if another thread panicked while
/// holding the lock.
pub(crate) fn lock(
    connection: &Mutex<Connection>,
) -> Result<MutexGuard<'_, Connection>, Error> {
    connection.lock().map_err(|error| {
        tracing::error!("Could not acquire database lock: {error}");
        Error::DatabaseLockError
    })
}

/// Close the shared database connection.
///
/// This should be called once the server has shut down and every other
/// reference to the connection has been dropped.
///
/// # Errors
/// Returns an [Error::DatabaseInUse] if the connection is still shared, or an
/// [Error::SqlError] if SQLite could not close the connection.
pub fn close(connection: Arc<Mutex<Connection>>) -> Result<(), Error> {
    let connection = Arc::try_unwrap(connection)
        .map_err(|_| Error::DatabaseInUse)?
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner);

    connection.close().map_err(|(_, error)| error.into())
}

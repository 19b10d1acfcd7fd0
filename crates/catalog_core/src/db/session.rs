//! Scoped transaction helpers.
//!
//! Every repository write goes through [`with_transaction`] and every page
//! read (rows plus total count) through [`with_read_transaction`], so one
//! logical operation maps to exactly one transaction and no transaction
//! outlives the call that opened it.

use rusqlite::{Connection, Transaction, TransactionBehavior};

/// SQL expression for "now" in epoch milliseconds.
const NOW_EPOCH_MS_SQL: &str =
    "SELECT CAST((julianday('now') - 2440587.5) * 86400000.0 AS INTEGER);";

/// Runs `body` inside an `IMMEDIATE` transaction on `conn`.
///
/// Commits when `body` returns `Ok`. On `Err` (or a panic unwinding through
/// the call) the transaction guard is dropped, which rolls back.
///
/// # Errors
/// - Propagates `body` errors unchanged.
/// - Returns begin/commit failures converted into `E`.
pub fn with_transaction<T, E, F>(conn: &Connection, body: F) -> Result<T, E>
where
    E: From<rusqlite::Error>,
    F: FnOnce(&Transaction<'_>) -> Result<T, E>,
{
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let value = body(&tx)?;
    tx.commit()?;
    Ok(value)
}

/// Runs a read-only `body` inside a `DEFERRED` transaction.
///
/// Used where several statements must observe one snapshot, such as a page
/// of rows and the total count that goes with it. Does not take the write
/// lock, so concurrent readers are not serialized behind writers.
pub fn with_read_transaction<T, E, F>(conn: &Connection, body: F) -> Result<T, E>
where
    E: From<rusqlite::Error>,
    F: FnOnce(&Transaction<'_>) -> Result<T, E>,
{
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Deferred)?;
    let value = body(&tx)?;
    tx.commit()?;
    Ok(value)
}

/// Reads the storage clock once, in epoch milliseconds.
///
/// Batch writes read it once per transaction so every row of one flush
/// shares the same `updated_at`.
pub fn current_epoch_ms(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row(NOW_EPOCH_MS_SQL, [], |row| row.get(0))
}

#[cfg(test)]
mod tests {
    use super::{current_epoch_ms, with_transaction};
    use rusqlite::Connection;

    fn scratch() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (v INTEGER NOT NULL);")
            .unwrap();
        conn
    }

    fn row_count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM t;", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn commits_when_body_succeeds() {
        let conn = scratch();
        with_transaction::<_, rusqlite::Error, _>(&conn, |tx| {
            tx.execute("INSERT INTO t (v) VALUES (1);", [])?;
            Ok(())
        })
        .unwrap();
        assert_eq!(row_count(&conn), 1);
    }

    #[test]
    fn rolls_back_when_body_fails() {
        let conn = scratch();
        let result = with_transaction::<(), rusqlite::Error, _>(&conn, |tx| {
            tx.execute("INSERT INTO t (v) VALUES (1);", [])?;
            tx.execute("INSERT INTO t (v) VALUES (NULL);", [])?;
            Ok(())
        });
        assert!(result.is_err());
        assert_eq!(row_count(&conn), 0);
        assert!(conn.is_autocommit());
    }

    #[test]
    fn clock_reads_a_plausible_epoch() {
        let conn = Connection::open_in_memory().unwrap();
        let now = current_epoch_ms(&conn).unwrap();
        // 2020-01-01T00:00:00Z
        assert!(now > 1_577_836_800_000);
    }
}

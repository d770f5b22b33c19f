mod common;

use common::{ScriptedTransport, eof, field_packet, parse_fields};
use pretty_assertions::assert_eq;
use rowset_mysql::ResultOpts;
use rowset_mysql::factory::{StringFactory, U64Factory};
use rowset_mysql::result::ResultSet;

const STMT_ID: u32 = 0x0000_002A;
const LAST_ROW_SENT: u16 = 0x0080;

fn user_fields() -> Vec<rowset_mysql::column::Field> {
    parse_fields(&[
        field_packet("users", "id", "id", 0x08, 0x0020), // BIGINT UNSIGNED
        field_packet("users", "name", "name", 0xfd, 0),  // VAR_STRING
    ])
}

/// Binary protocol row with both columns present: header, 1-byte bitmask,
/// 8-byte id, lenenc name.
fn user_row(id: u64, name: &str) -> Vec<u8> {
    let mut payload = vec![0x00, 0x00];
    payload.extend_from_slice(&id.to_le_bytes());
    payload.push(name.len() as u8);
    payload.extend_from_slice(name.as_bytes());
    payload
}

fn fetch_command(num_rows: u32) -> Vec<u8> {
    let mut command = vec![0x1C];
    command.extend_from_slice(&STMT_ID.to_le_bytes());
    command.extend_from_slice(&num_rows.to_le_bytes());
    command
}

#[test]
fn fetches_pages_on_demand() {
    let (inner, shared) = ScriptedTransport::shared(vec![
        // First page: two rows.
        user_row(1, "alice"),
        user_row(2, "bob"),
        eof(0),
        // Second page: one row, then the cursor is exhausted.
        user_row(3, "carol"),
        eof(LAST_ROW_SENT),
    ]);
    let opts = ResultOpts {
        fetch_size: 2,
        ..ResultOpts::default()
    };
    let mut result = ResultSet::cursored(user_fields(), shared, STMT_ID, &opts).unwrap();

    // Construction does no I/O; the first advance fetches a page.
    assert_eq!(inner.lock().unwrap().sent.len(), 0);
    assert!(result.rows_mut().is_before_first());

    let row = result.next().unwrap().unwrap();
    assert_eq!(row.value(0, &U64Factory).unwrap(), 1);
    assert_eq!(row.value(1, &StringFactory).unwrap(), "alice");
    assert_eq!(inner.lock().unwrap().sent.len(), 1);
    assert_eq!(inner.lock().unwrap().sent[0], fetch_command(2));

    assert_eq!(result.next().unwrap().unwrap().value(0, &U64Factory).unwrap(), 2);
    // Page exhausted: the next advance issues another fetch.
    let row = result.next().unwrap().unwrap();
    assert_eq!(row.value(1, &StringFactory).unwrap(), "carol");
    assert!(result.rows_mut().is_last());
    assert_eq!(inner.lock().unwrap().sent.len(), 2);
}

#[test]
fn fetch_after_last_row_sent_is_silent() {
    let (inner, shared) = ScriptedTransport::shared(vec![user_row(1, "a"), eof(LAST_ROW_SENT)]);
    let opts = ResultOpts::default();
    let mut result = ResultSet::cursored(user_fields(), shared, STMT_ID, &opts).unwrap();

    assert!(result.next().unwrap().is_some());
    // The server already sent the last row: no further fetch goes out.
    assert!(!result.has_next().unwrap());
    assert!(result.next().unwrap().is_none());
    assert!(result.rows_mut().is_after_last());
    assert!(result.next().unwrap().is_none());
    assert_eq!(inner.lock().unwrap().sent.len(), 1);

    // Closing a finished cursor reads nothing further.
    let reads_before = inner.lock().unwrap().reads;
    result.close().unwrap();
    assert_eq!(inner.lock().unwrap().reads, reads_before);
    assert!(inner.lock().unwrap().is_usable_flag());
}

#[test]
fn empty_batch_without_flag_ends_the_cursor() {
    // The terminator omits the last-row flag but the page carries no rows.
    let (inner, shared) = ScriptedTransport::shared(vec![eof(0)]);
    let opts = ResultOpts::default();
    let mut result = ResultSet::cursored(user_fields(), shared, STMT_ID, &opts).unwrap();

    assert!(!result.has_next().unwrap());
    assert!(result.next().unwrap().is_none());
    assert_eq!(inner.lock().unwrap().sent.len(), 1);
}

#[test]
fn closing_early_drains_remaining_pages() {
    common::init_tracing();
    let (inner, shared) = ScriptedTransport::shared(vec![
        user_row(1, "a"),
        user_row(2, "b"),
        eof(0),
        user_row(3, "c"),
        eof(LAST_ROW_SENT),
    ]);
    let opts = ResultOpts {
        fetch_size: 2,
        ..ResultOpts::default()
    };
    let mut result = ResultSet::cursored(user_fields(), shared, STMT_ID, &opts).unwrap();

    result.next().unwrap();
    result.close().unwrap();

    let inner = inner.lock().unwrap();
    // The remaining pages were fetched and discarded; the stream is aligned.
    assert_eq!(inner.remaining(), 0);
    assert_eq!(inner.sent.len(), 2);
    assert!(inner.is_usable_flag());
}

#[test]
fn backward_navigation_is_unsupported() {
    let (_inner, shared) = ScriptedTransport::shared(vec![user_row(1, "a"), eof(LAST_ROW_SENT)]);
    let opts = ResultOpts::default();
    let mut result = ResultSet::cursored(user_fields(), shared, STMT_ID, &opts).unwrap();

    result.next().unwrap();
    assert!(matches!(
        result.rows_mut().previous(),
        Err(rowset_mysql::Error::UnsupportedNavigation { op: "previous" })
    ));
    assert!(matches!(
        result.rows_mut().relative(-1),
        Err(rowset_mysql::Error::UnsupportedNavigation { op: "relative" })
    ));
}

#[test]
fn fetch_failure_poisons_the_cursor() {
    // The script ends mid-page, before any terminator.
    let (inner, shared) = ScriptedTransport::shared(vec![user_row(1, "a")]);
    let opts = ResultOpts::default();
    let mut result = ResultSet::cursored(user_fields(), shared, STMT_ID, &opts).unwrap();

    assert!(result.next().is_err());
    let reads_after_error = inner.lock().unwrap().reads;
    assert!(matches!(
        result.next(),
        Err(rowset_mysql::Error::ProtocolDesync(_))
    ));
    assert_eq!(inner.lock().unwrap().reads, reads_after_error);

    assert!(result.close().is_ok());
    assert!(!inner.lock().unwrap().is_usable_flag());
}

#[test]
fn server_error_during_fetch_surfaces() {
    let mut err_packet = vec![0xFF, 0x28, 0x04, b'#']; // 1064
    err_packet.extend_from_slice(b"42000");
    err_packet.extend_from_slice(b"Cursor is no longer valid");

    let (_inner, shared) = ScriptedTransport::shared(vec![err_packet]);
    let opts = ResultOpts::default();
    let mut result = ResultSet::cursored(user_fields(), shared, STMT_ID, &opts).unwrap();

    match result.next() {
        Err(rowset_mysql::Error::Server(err)) => {
            assert_eq!(err.error_code, 1064);
            assert_eq!(err.sql_state, "42000");
        }
        other => panic!("expected server error, got {other:?}"),
    }
}

//! Outgoing command payloads used while iterating results.
//!
//! Each payload starts with its command byte; the transport frames it into a
//! packet with sequence id 0.
use crate::constant::CommandByte;
use crate::protocol::primitive::*;

/// Write COM_QUERY command
pub fn write_query(out: &mut Vec<u8>, sql: &str) {
    write_int_1(out, CommandByte::Query as u8);
    out.extend_from_slice(sql.as_bytes());
}

/// Write COM_STMT_FETCH command: request `num_rows` more rows from a
/// server-side cursor.
pub fn write_fetch(out: &mut Vec<u8>, statement_id: u32, num_rows: u32) {
    write_int_1(out, CommandByte::StmtFetch as u8);
    write_int_4(out, statement_id);
    write_int_4(out, num_rows);
}

/// Write COM_STMT_CLOSE command
pub fn write_close_statement(out: &mut Vec<u8>, statement_id: u32) {
    write_int_1(out, CommandByte::StmtClose as u8);
    write_int_4(out, statement_id);
}

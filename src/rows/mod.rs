//! Result-set iteration: one cursor-like contract over three row sources.
//!
//! [`MaterializedRows`] holds every row in memory, [`StreamingRows`] reads
//! rows off the open connection one at a time, and [`CursorRows`] fetches
//! fixed-size pages from a server-side cursor. All three move through the
//! same [`Position`] states and report end-of-rows the same way: `next()`
//! returns `Ok(None)` once the rows are exhausted and keeps returning it on
//! every further call.
use std::sync::Arc;

use crate::column::ColumnDefinition;
use crate::error::{Error, Result};
use crate::row::Row;

mod cursor;
mod materialized;
mod streaming;

pub use cursor::CursorRows;
pub use materialized::MaterializedRows;
pub use streaming::StreamingRows;

/// Read position of a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    BeforeFirst,
    /// On the row at this 0-based index.
    At(usize),
    AfterLast,
}

impl Position {
    pub fn is_on_row(&self) -> bool {
        matches!(self, Position::At(_))
    }
}

/// The position after consuming one more row.
pub(crate) fn advanced(position: Position) -> Position {
    match position {
        Position::BeforeFirst => Position::At(0),
        Position::At(i) => Position::At(i + 1),
        Position::AfterLast => Position::AfterLast,
    }
}

/// A sequence of rows with positional state and mandatory cleanup.
///
/// A returned `&Row` borrows from the result source and is invalidated by
/// the next call that advances it; buffer-backed rows do not survive a
/// refill of their packet buffer.
///
/// Streaming and cursor sources must be drained (or closed, which drains)
/// before the underlying connection is reused for another command.
pub trait ResultRows {
    fn columns(&self) -> &Arc<ColumnDefinition>;

    fn position(&self) -> Position;

    /// Whether another row is available, without advancing.
    fn has_next(&mut self) -> Result<bool>;

    /// Advance to the next row. `Ok(None)` signals the end, idempotently.
    fn next(&mut self) -> Result<Option<&Row>>;

    /// The row the result is currently positioned on, if any.
    fn current(&self) -> Option<&Row>;

    fn previous(&mut self) -> Result<Option<&Row>> {
        Err(Error::UnsupportedNavigation { op: "previous" })
    }

    /// Move to a 1-based row number; 0 moves before the first row, negative
    /// numbers count from the end (-1 is the last row).
    fn absolute(&mut self, _row: i64) -> Result<Option<&Row>> {
        Err(Error::UnsupportedNavigation { op: "absolute" })
    }

    fn relative(&mut self, _delta: i64) -> Result<Option<&Row>> {
        Err(Error::UnsupportedNavigation { op: "relative" })
    }

    fn is_before_first(&self) -> bool {
        matches!(self.position(), Position::BeforeFirst)
    }

    fn is_after_last(&self) -> bool {
        matches!(self.position(), Position::AfterLast)
    }

    fn is_first(&self) -> bool {
        matches!(self.position(), Position::At(0))
    }

    fn is_last(&self) -> bool;

    /// Release the rows and the column metadata. Undrained streaming/cursor
    /// sources first discard their remaining rows so the connection's read
    /// stream stays aligned on the next command's response.
    fn close(&mut self) -> Result<()>;
}

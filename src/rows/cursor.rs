//! Forward-only rows fetched page by page from a server-side cursor.
use std::sync::Arc;

use tracing::{debug, warn};

use crate::column::ColumnDefinition;
use crate::constant::ServerStatusFlags;
use crate::error::{Error, Result};
use crate::opts::ResultOpts;
use crate::protocol::command::write_fetch;
use crate::protocol::response::{ErrPayload, Terminator, is_terminator};
use crate::row::Row;
use crate::rows::{Position, ResultRows, advanced};
use crate::transport::{self, SharedTransport};

/// Cursor rows hold one fetched page at a time. When the page is exhausted,
/// the next `has_next()`/`next()` issues a COM_STMT_FETCH for another batch,
/// unless the server already signaled `SERVER_STATUS_LAST_ROW_SENT`; after
/// that, further fetch attempts yield empty pages silently. Cursor result
/// rows are always binary protocol.
pub struct CursorRows {
    columns: Arc<ColumnDefinition>,
    transport: SharedTransport,
    statement_id: u32,
    fetch_size: u32,
    page: Vec<Row>,
    /// Index of the next unconsumed row within `page`.
    page_next: usize,
    position: Position,
    last_row_sent: bool,
    poisoned: bool,
}

impl CursorRows {
    /// No I/O happens here; the first page is fetched on demand.
    pub fn new(
        columns: Arc<ColumnDefinition>,
        transport: SharedTransport,
        statement_id: u32,
        opts: &ResultOpts,
    ) -> Self {
        Self {
            columns,
            transport,
            statement_id,
            fetch_size: opts.fetch_size.max(1),
            page: Vec::new(),
            page_next: 0,
            position: Position::BeforeFirst,
            last_row_sent: false,
            poisoned: false,
        }
    }

    fn check_poisoned(&self) -> Result<()> {
        if self.poisoned {
            Err(Error::ProtocolDesync(
                "cursor result abandoned after a failed fetch".to_owned(),
            ))
        } else {
            Ok(())
        }
    }

    /// Replace the current page with the next batch from the server. After
    /// the last row was sent this is a no-op yielding an empty page.
    fn fetch_page(&mut self) -> Result<()> {
        self.page.clear();
        self.page_next = 0;
        if self.last_row_sent {
            return Ok(());
        }
        match self.read_page() {
            Ok(()) => {
                debug!(rows = self.page.len(), "fetched cursor page");
                Ok(())
            }
            Err(err) => {
                self.page.clear();
                self.poisoned = true;
                self.last_row_sent = true;
                Err(err)
            }
        }
    }

    fn read_page(&mut self) -> Result<()> {
        let mut command = Vec::new();
        write_fetch(&mut command, self.statement_id, self.fetch_size);

        let mut conn = transport::lock(&self.transport)?;
        conn.send_command(&command)?;

        let mut payload = Vec::new();
        loop {
            conn.read_packet(&mut payload)?;
            if payload.first() == Some(&0xFF) {
                return Err(Error::Server(ErrPayload::parse(&payload)?));
            }
            if is_terminator(&payload) {
                let terminator = Terminator::parse(&payload)?;
                if terminator
                    .status_flags
                    .contains(ServerStatusFlags::SERVER_STATUS_LAST_ROW_SENT)
                {
                    self.last_row_sent = true;
                }
                break;
            }
            self.page
                .push(Row::binary(Arc::clone(&self.columns), std::mem::take(&mut payload))?);
        }
        // A batch with no rows means the cursor is exhausted even when the
        // server omitted the last-row flag.
        if self.page.is_empty() {
            self.last_row_sent = true;
        }
        Ok(())
    }
}

impl ResultRows for CursorRows {
    fn columns(&self) -> &Arc<ColumnDefinition> {
        &self.columns
    }

    fn position(&self) -> Position {
        self.position
    }

    fn current(&self) -> Option<&Row> {
        if self.position.is_on_row() && self.page_next > 0 {
            self.page.get(self.page_next - 1)
        } else {
            None
        }
    }

    fn has_next(&mut self) -> Result<bool> {
        self.check_poisoned()?;
        if self.page_next < self.page.len() {
            return Ok(true);
        }
        if self.last_row_sent {
            return Ok(false);
        }
        self.fetch_page()?;
        Ok(self.page_next < self.page.len())
    }

    fn next(&mut self) -> Result<Option<&Row>> {
        if !self.has_next()? {
            self.position = Position::AfterLast;
            return Ok(None);
        }
        let index = self.page_next;
        self.page_next += 1;
        self.position = advanced(self.position);
        Ok(self.page.get(index))
    }

    fn is_last(&self) -> bool {
        self.position.is_on_row() && self.page_next == self.page.len() && self.last_row_sent
    }

    fn close(&mut self) -> Result<()> {
        if self.poisoned {
            transport::lock(&self.transport)?.mark_unusable();
        } else {
            // Drain remaining pages so the connection stream stays aligned.
            let mut discarded = 0usize;
            while !self.last_row_sent {
                if let Err(err) = self.fetch_page() {
                    transport::lock(&self.transport)?.mark_unusable();
                    warn!(error = %err, "cursor drain failed; marking connection unusable");
                    return Err(Error::ProtocolDesync(err.to_string()));
                }
                discarded += self.page.len();
            }
            if discarded > 0 {
                debug!(discarded, "drained abandoned cursor result");
            }
        }
        self.page = Vec::new();
        self.page_next = 0;
        self.position = Position::AfterLast;
        self.columns = Arc::new(ColumnDefinition::default());
        Ok(())
    }
}

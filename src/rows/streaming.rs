//! Forward-only rows read live off the open connection.
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::column::ColumnDefinition;
use crate::error::{Error, Result};
use crate::opts::ResultOpts;
use crate::protocol::command::write_query;
use crate::protocol::response::{ErrPayload, Terminator, is_terminator};
use crate::row::{Row, WireFormat};
use crate::rows::{Position, ResultRows, advanced};
use crate::transport::{self, SharedTransport};

/// Streaming rows keep a single look-ahead row. Each `next()` promotes the
/// look-ahead to the current row and immediately reads one more packet, so
/// `has_next()` never touches the network. Only forward iteration is
/// possible; nothing is retained.
pub struct StreamingRows {
    columns: Arc<ColumnDefinition>,
    transport: SharedTransport,
    wire: WireFormat,
    opts: ResultOpts,
    current: Option<Row>,
    look_ahead: Option<Row>,
    position: Position,
    /// The terminator packet has been consumed; the connection is free.
    done: bool,
    /// A refill failed; the remaining stream position is unknown.
    poisoned: bool,
    terminator: Option<Terminator>,
}

impl StreamingRows {
    /// Start streaming. Reads the first row (or the terminator) immediately
    /// to fill the look-ahead slot.
    pub fn new(
        columns: Arc<ColumnDefinition>,
        wire: WireFormat,
        transport: SharedTransport,
        opts: ResultOpts,
    ) -> Result<Self> {
        let mut rows = Self {
            columns,
            transport,
            wire,
            opts,
            current: None,
            look_ahead: None,
            position: Position::BeforeFirst,
            done: false,
            poisoned: false,
            terminator: None,
        };
        rows.refill()?;
        Ok(rows)
    }

    /// Status flags and warnings from the terminator packet, once the stream
    /// has ended.
    pub fn terminator(&self) -> Option<&Terminator> {
        self.terminator.as_ref()
    }

    fn check_poisoned(&self) -> Result<()> {
        if self.poisoned {
            Err(Error::ProtocolDesync(
                "streaming result abandoned after a failed read".to_owned(),
            ))
        } else {
            Ok(())
        }
    }

    fn refill(&mut self) -> Result<()> {
        if self.done {
            return Ok(());
        }
        match self.read_one() {
            Ok(()) => Ok(()),
            // A server error ends the result set with the stream still
            // aligned; anything else leaves it in an unknown position.
            Err(err @ Error::Server(_)) => {
                self.done = true;
                self.look_ahead = None;
                Err(err)
            }
            Err(err) => {
                self.done = true;
                self.poisoned = true;
                self.look_ahead = None;
                Err(err)
            }
        }
    }

    fn read_one(&mut self) -> Result<()> {
        let mut payload = Vec::new();
        transport::lock(&self.transport)?.read_packet(&mut payload)?;

        if payload.first() == Some(&0xFF) {
            return Err(Error::Server(ErrPayload::parse(&payload)?));
        }
        if is_terminator(&payload) {
            let terminator = Terminator::parse(&payload)?;
            trace!(warnings = terminator.warnings, "streaming result ended");
            self.terminator = Some(terminator);
            self.done = true;
            self.look_ahead = None;
            return Ok(());
        }

        self.look_ahead = Some(match self.wire {
            WireFormat::Text => Row::text(Arc::clone(&self.columns), payload),
            WireFormat::Binary => Row::binary(Arc::clone(&self.columns), payload)?,
        });
        Ok(())
    }

    /// Discard the remaining rows so the connection's read stream is left on
    /// the next command's response.
    fn drain(&mut self) -> Result<()> {
        let mut discarded = 0usize;
        let result = (|| -> Result<()> {
            let mut conn = transport::lock(&self.transport)?;
            let mut payload = Vec::new();
            loop {
                conn.read_packet(&mut payload)?;
                if payload.first() == Some(&0xFF) {
                    return Err(Error::Server(ErrPayload::parse(&payload)?));
                }
                if is_terminator(&payload) {
                    self.terminator = Some(Terminator::parse(&payload)?);
                    return Ok(());
                }
                discarded += 1;
            }
        })();

        match result {
            Ok(()) => {
                self.done = true;
                debug!(discarded, "drained abandoned streaming result");
                // Restores the server-side write timeout a slow consumer may
                // have exhausted before abandoning the stream.
                if let Some(timeout) = self.opts.drain_net_write_timeout {
                    let mut command = Vec::new();
                    write_query(&mut command, &format!("SET net_write_timeout={timeout}"));
                    let mut conn = transport::lock(&self.transport)?;
                    conn.send_command(&command)?;
                    let mut response = Vec::new();
                    conn.read_packet(&mut response)?;
                }
                Ok(())
            }
            Err(err) => {
                self.done = true;
                self.poisoned = true;
                transport::lock(&self.transport)?.mark_unusable();
                warn!(error = %err, "stream drain failed; marking connection unusable");
                Err(Error::ProtocolDesync(err.to_string()))
            }
        }
    }
}

impl ResultRows for StreamingRows {
    fn columns(&self) -> &Arc<ColumnDefinition> {
        &self.columns
    }

    fn position(&self) -> Position {
        self.position
    }

    fn current(&self) -> Option<&Row> {
        self.current.as_ref()
    }

    fn has_next(&mut self) -> Result<bool> {
        self.check_poisoned()?;
        Ok(self.look_ahead.is_some())
    }

    fn next(&mut self) -> Result<Option<&Row>> {
        self.check_poisoned()?;
        match self.look_ahead.take() {
            None => {
                self.current = None;
                self.position = Position::AfterLast;
                Ok(None)
            }
            Some(row) => {
                self.current = Some(row);
                self.position = advanced(self.position);
                self.refill()?;
                Ok(self.current.as_ref())
            }
        }
    }

    fn is_last(&self) -> bool {
        self.position.is_on_row() && self.done && self.look_ahead.is_none()
    }

    fn close(&mut self) -> Result<()> {
        self.current = None;
        self.look_ahead = None;
        if self.poisoned {
            transport::lock(&self.transport)?.mark_unusable();
        } else if !self.done {
            self.drain()?;
        }
        self.position = Position::AfterLast;
        self.columns = Arc::new(ColumnDefinition::default());
        Ok(())
    }
}

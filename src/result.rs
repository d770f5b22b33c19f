//! The result of one statement execution: column metadata, a row source,
//! and the OK-packet metadata of non-row-returning statements.
use std::sync::Arc;

use crate::column::{ColumnDefinition, Field};
use crate::error::{Error, Result};
use crate::factory::ValueFactory;
use crate::opts::ResultOpts;
use crate::protocol::response::OkPayload;
use crate::row::{Row, WireFormat};
use crate::rows::{CursorRows, MaterializedRows, ResultRows, StreamingRows};
use crate::transport::SharedTransport;

pub struct ResultSet {
    columns: Arc<ColumnDefinition>,
    rows: Box<dyn ResultRows>,
    affected_rows: u64,
    last_insert_id: u64,
    warnings: u16,
    info: String,
}

impl ResultSet {
    fn assemble(fields: Vec<Field>, opts: &ResultOpts) -> Arc<ColumnDefinition> {
        Arc::new(ColumnDefinition::new(fields).with_original_names(opts.use_original_names))
    }

    /// A result whose rows were all buffered by the caller.
    pub fn materialized(
        fields: Vec<Field>,
        wire: WireFormat,
        payloads: Vec<Vec<u8>>,
        opts: &ResultOpts,
    ) -> Result<Self> {
        let columns = Self::assemble(fields, opts);
        let rows = MaterializedRows::from_payloads(Arc::clone(&columns), wire, payloads)?;
        Ok(Self {
            columns,
            rows: Box::new(rows),
            affected_rows: 0,
            last_insert_id: 0,
            warnings: 0,
            info: String::new(),
        })
    }

    /// A result consumed one row at a time off the open connection. This
    /// reads the first row immediately.
    pub fn streaming(
        fields: Vec<Field>,
        wire: WireFormat,
        transport: SharedTransport,
        opts: &ResultOpts,
    ) -> Result<Self> {
        let columns = Self::assemble(fields, opts);
        let rows = StreamingRows::new(Arc::clone(&columns), wire, transport, opts.clone())?;
        Ok(Self {
            columns,
            rows: Box::new(rows),
            affected_rows: 0,
            last_insert_id: 0,
            warnings: 0,
            info: String::new(),
        })
    }

    /// A result fetched page by page from a server-side cursor opened for
    /// `statement_id`.
    pub fn cursored(
        fields: Vec<Field>,
        transport: SharedTransport,
        statement_id: u32,
        opts: &ResultOpts,
    ) -> Result<Self> {
        let columns = Self::assemble(fields, opts);
        let rows = CursorRows::new(Arc::clone(&columns), transport, statement_id, opts);
        Ok(Self {
            columns,
            rows: Box::new(rows),
            affected_rows: 0,
            last_insert_id: 0,
            warnings: 0,
            info: String::new(),
        })
    }

    /// The result of a statement that returned no rows.
    pub fn from_ok(ok: OkPayload) -> Self {
        let columns = Arc::new(ColumnDefinition::default());
        Self {
            rows: Box::new(MaterializedRows::new(Arc::clone(&columns), Vec::new())),
            columns,
            affected_rows: ok.affected_rows,
            last_insert_id: ok.last_insert_id,
            warnings: ok.warnings,
            info: ok.info,
        }
    }

    pub fn columns(&self) -> &Arc<ColumnDefinition> {
        &self.columns
    }

    pub fn rows_mut(&mut self) -> &mut dyn ResultRows {
        &mut *self.rows
    }

    pub fn has_next(&mut self) -> Result<bool> {
        self.rows.has_next()
    }

    pub fn next(&mut self) -> Result<Option<&Row>> {
        self.rows.next()
    }

    /// See [`ColumnDefinition::find_column`]: 1-based, 0 when absent.
    pub fn find_column(&self, name: &str) -> usize {
        self.columns.find_column(name)
    }

    /// The row the result is currently positioned on.
    pub fn current(&self) -> Option<&Row> {
        self.rows.current()
    }

    /// Decode the named column of the current row.
    pub fn value_by_name<F: ValueFactory>(&self, name: &str, factory: &F) -> Result<F::Output> {
        let index = self
            .columns
            .index_of(name)
            .ok_or_else(|| Error::NoSuchColumn(name.to_owned()))?;
        let row = self.rows.current().ok_or(Error::NotOnRow)?;
        row.value(index, factory)
    }

    pub fn affected_rows(&self) -> u64 {
        self.affected_rows
    }

    pub fn last_insert_id(&self) -> u64 {
        self.last_insert_id
    }

    pub fn warnings(&self) -> u16 {
        self.warnings
    }

    pub fn info(&self) -> &str {
        &self.info
    }

    pub fn close(&mut self) -> Result<()> {
        self.rows.close()
    }
}

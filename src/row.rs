//! Row storage: locating a column's byte range inside a packet or cached
//! buffer.
//!
//! The three representations behave identically through [`Row`]: cached rows
//! own one byte range per column, text rows scan length-prefixed cells, and
//! binary rows combine a NULL bitmask with per-type field widths. The variant
//! is chosen once per result set when rows are constructed.
use std::cell::Cell;
use std::sync::Arc;

use crate::column::ColumnDefinition;
use crate::constant::ColumnType;
use crate::decode::{decode_binary, decode_text};
use crate::error::{Error, Result};
use crate::factory::ValueFactory;
use crate::protocol::primitive::{read_int_lenenc, read_string_lenenc};
use crate::protocol::value::NullBitmap;

/// Which protocol encoded the row's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    Text,
    Binary,
}

/// NULL cell marker in text protocol rows.
const NULL_CELL: u8 = 0xFB;

/// One record of a result set.
///
/// Column access is 0-based. An out-of-range index is a caller bug, not a
/// recoverable condition; bounds are only debug-asserted.
#[derive(Debug)]
pub enum Row {
    Cached(CachedRow),
    Text(TextRow),
    Binary(BinaryRow),
}

impl Row {
    /// Wrap a text protocol row packet payload.
    pub fn text(columns: Arc<ColumnDefinition>, payload: Vec<u8>) -> Self {
        Row::Text(TextRow {
            columns,
            payload,
            seek: Cell::new((0, 0)),
            last_null: Cell::new(false),
        })
    }

    /// Wrap a binary protocol row packet payload. The NULL bitmask is parsed
    /// here, once; rows with a malformed header or truncated bitmask are
    /// rejected up front.
    pub fn binary(columns: Arc<ColumnDefinition>, payload: Vec<u8>) -> Result<Self> {
        BinaryRow::new(columns, payload).map(Row::Binary)
    }

    pub fn columns(&self) -> &Arc<ColumnDefinition> {
        match self {
            Row::Cached(row) => &row.columns,
            Row::Text(row) => &row.columns,
            Row::Binary(row) => &row.columns,
        }
    }

    pub fn wire_format(&self) -> WireFormat {
        match self {
            Row::Cached(row) => row.wire,
            Row::Text(_) => WireFormat::Text,
            Row::Binary(_) => WireFormat::Binary,
        }
    }

    fn set_last_null(&self, null: bool) {
        match self {
            Row::Cached(row) => row.last_null.set(null),
            Row::Text(row) => row.last_null.set(null),
            Row::Binary(row) => row.last_null.set(null),
        }
    }

    /// Whether the most recently accessed column was NULL.
    pub fn was_null(&self) -> bool {
        match self {
            Row::Cached(row) => row.last_null.get(),
            Row::Text(row) => row.last_null.get(),
            Row::Binary(row) => row.last_null.get(),
        }
    }

    /// Whether column `i` is NULL. Also updates [`was_null`](Row::was_null).
    pub fn is_null(&self, i: usize) -> Result<bool> {
        debug_assert!(i < self.columns().len());
        let null = match self {
            Row::Cached(row) => row.cells[i].is_none(),
            Row::Text(row) => row.cell(i)?.is_none(),
            // The bitmask answers without seeking.
            Row::Binary(row) => row.bitmap().is_null(i),
        };
        self.set_last_null(null);
        Ok(null)
    }

    /// The raw byte range of column `i`, or `None` for NULL. Also updates
    /// [`was_null`](Row::was_null).
    pub fn raw_bytes(&self, i: usize) -> Result<Option<&[u8]>> {
        debug_assert!(i < self.columns().len());
        let cell = match self {
            Row::Cached(row) => row.cells[i].as_deref(),
            Row::Text(row) => row.cell(i)?,
            Row::Binary(row) => row.cell(i)?,
        };
        self.set_last_null(cell.is_none());
        Ok(cell)
    }

    /// Decode column `i` through `factory`.
    pub fn value<F: ValueFactory>(&self, i: usize, factory: &F) -> Result<F::Output> {
        match self.raw_bytes(i)? {
            None => factory.from_null(),
            Some(raw) => {
                let field = self.columns().field(i);
                match self.wire_format() {
                    WireFormat::Text => decode_text(field, raw, factory),
                    WireFormat::Binary => decode_binary(field, raw, factory),
                }
            }
        }
    }

    /// Copy every column's byte range into an independently owned
    /// [`CachedRow`], detaching the record from its packet buffer.
    pub fn to_cached(&self) -> Result<Row> {
        let n = self.columns().len();
        let mut cells = Vec::with_capacity(n);
        for i in 0..n {
            cells.push(self.raw_bytes(i)?.map(<[u8]>::to_vec));
        }
        Ok(Row::Cached(CachedRow {
            columns: Arc::clone(self.columns()),
            wire: self.wire_format(),
            cells,
            last_null: Cell::new(false),
        }))
    }
}

/// Row backed by one owned byte range per column. Access is O(1); the row
/// outlives any packet buffer.
#[derive(Debug)]
pub struct CachedRow {
    columns: Arc<ColumnDefinition>,
    wire: WireFormat,
    cells: Vec<Option<Vec<u8>>>,
    last_null: Cell<bool>,
}

/// Row backed by a text protocol packet: cells are length-prefixed in
/// sequence, NULL is the 0xFB marker.
///
/// Locating column `i` scans from the start or from the last located column,
/// whichever is closer without overshooting, so monotonically increasing
/// access is O(1) amortized.
#[derive(Debug)]
pub struct TextRow {
    columns: Arc<ColumnDefinition>,
    payload: Vec<u8>,
    /// (column index, byte offset) of the last located cell.
    seek: Cell<(usize, usize)>,
    last_null: Cell<bool>,
}

impl TextRow {
    fn locate(&self, target: usize) -> Result<usize> {
        let (mut index, mut offset) = self.seek.get();
        if index > target {
            index = 0;
            offset = 0;
        }
        while index < target {
            let data = &self.payload[offset..];
            match data.first() {
                None => return Err(Error::UnexpectedEof),
                Some(&NULL_CELL) => offset += 1,
                Some(_) => {
                    let (len, rest) = read_int_lenenc(data)?;
                    let prefix = data.len() - rest.len();
                    if rest.len() < len as usize {
                        return Err(Error::UnexpectedEof);
                    }
                    offset += prefix + len as usize;
                }
            }
            index += 1;
        }
        self.seek.set((target, offset));
        Ok(offset)
    }

    fn cell(&self, i: usize) -> Result<Option<&[u8]>> {
        let offset = self.locate(i)?;
        let data = &self.payload[offset..];
        match data.first() {
            None => Err(Error::UnexpectedEof),
            Some(&NULL_CELL) => Ok(None),
            Some(_) => {
                let (bytes, _rest) = read_string_lenenc(data)?;
                Ok(Some(bytes))
            }
        }
    }
}

/// Row backed by a binary protocol packet: a 0x00 header byte, the NULL
/// bitmask, then field data with type-specific widths.
///
/// The bitmask is parsed at construction; it both marks NULL columns
/// (skipped while seeking) and fixes the home offset where field data
/// begins.
#[derive(Debug)]
pub struct BinaryRow {
    columns: Arc<ColumnDefinition>,
    payload: Vec<u8>,
    /// First byte of field data, right after the bitmask.
    home: usize,
    /// (column index, byte offset) of the last located cell.
    seek: Cell<(usize, usize)>,
    last_null: Cell<bool>,
}

impl BinaryRow {
    fn new(columns: Arc<ColumnDefinition>, payload: Vec<u8>) -> Result<Self> {
        let bitmap_len = NullBitmap::len_for(columns.len());
        if payload.len() < 1 + bitmap_len || payload[0] != 0x00 {
            return Err(Error::InvalidPacket);
        }
        let home = 1 + bitmap_len;
        Ok(Self {
            columns,
            payload,
            home,
            seek: Cell::new((0, home)),
            last_null: Cell::new(false),
        })
    }

    fn bitmap(&self) -> NullBitmap<'_> {
        NullBitmap::new(&self.payload[1..self.home])
    }

    fn locate(&self, target: usize) -> Result<usize> {
        let (mut index, mut offset) = self.seek.get();
        if index > target {
            index = 0;
            offset = self.home;
        }
        let bitmap = self.bitmap();
        while index < target {
            if !bitmap.is_null(index) {
                let column_type = self.columns.field(index).column_type;
                offset += field_span(column_type, &self.payload[offset..])?;
            }
            index += 1;
        }
        self.seek.set((target, offset));
        Ok(offset)
    }

    fn cell(&self, i: usize) -> Result<Option<&[u8]>> {
        if self.bitmap().is_null(i) {
            return Ok(None);
        }
        let offset = self.locate(i)?;
        let data = &self.payload[offset..];
        match binary_width(self.columns.field(i).column_type) {
            FieldWidth::Fixed(w) => {
                if data.len() < w {
                    return Err(Error::UnexpectedEof);
                }
                Ok(Some(&data[..w]))
            }
            FieldWidth::LengthPrefixed => {
                let (bytes, _rest) = read_string_lenenc(data)?;
                Ok(Some(bytes))
            }
        }
    }
}

enum FieldWidth {
    Fixed(usize),
    LengthPrefixed,
}

/// Field width class in binary protocol rows: numerics are fixed-width,
/// everything else (temporals included) carries a length prefix.
fn binary_width(column_type: ColumnType) -> FieldWidth {
    match column_type {
        ColumnType::MYSQL_TYPE_NULL => FieldWidth::Fixed(0),
        ColumnType::MYSQL_TYPE_TINY => FieldWidth::Fixed(1),
        ColumnType::MYSQL_TYPE_SHORT | ColumnType::MYSQL_TYPE_YEAR => FieldWidth::Fixed(2),
        ColumnType::MYSQL_TYPE_INT24 | ColumnType::MYSQL_TYPE_LONG | ColumnType::MYSQL_TYPE_FLOAT => {
            FieldWidth::Fixed(4)
        }
        ColumnType::MYSQL_TYPE_LONGLONG | ColumnType::MYSQL_TYPE_DOUBLE => FieldWidth::Fixed(8),
        _ => FieldWidth::LengthPrefixed,
    }
}

/// Total bytes column data occupies at `data`, length prefix included.
fn field_span(column_type: ColumnType, data: &[u8]) -> Result<usize> {
    match binary_width(column_type) {
        FieldWidth::Fixed(w) => {
            if data.len() < w {
                return Err(Error::UnexpectedEof);
            }
            Ok(w)
        }
        FieldWidth::LengthPrefixed => {
            let (len, rest) = read_int_lenenc(data)?;
            let prefix = data.len() - rest.len();
            if rest.len() < len as usize {
                return Err(Error::UnexpectedEof);
            }
            Ok(prefix + len as usize)
        }
    }
}

//! Column metadata for one result set.
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use zerocopy::FromBytes;
use zerocopy::byteorder::little_endian::{U16 as U16LE, U32 as U32LE};
use zerocopy::{Immutable, KnownLayout};

use crate::constant::{ColumnFlags, ColumnType};
use crate::error::{Error, Result};
use crate::protocol::primitive::*;

/// MySQL binary charset number - indicates binary/non-text data
const BINARY_CHARSET: u16 = 63;

/// Fixed-size tail of a column definition packet (12 bytes)
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable)]
struct FieldTail {
    charset: U16LE,
    column_length: U32LE,
    column_type: u8,
    flags: U16LE,
    decimals: u8,
    reserved: U16LE,
}

/// One column's metadata, parsed from a column definition packet.
#[derive(Debug, Clone)]
pub struct Field {
    pub schema: String,
    /// Table alias in the query (may equal `org_table`).
    pub table: String,
    pub org_table: String,
    /// Column label: the alias if the query used one.
    pub name: String,
    /// Original column name without aliasing.
    pub org_name: String,
    pub charset: u16,
    pub column_length: u32,
    pub column_type: ColumnType,
    pub flags: ColumnFlags,
    pub decimals: u8,
}

impl Field {
    /// Parse a column definition packet payload.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let (_catalog, data) = read_string_lenenc(payload)?;
        let (schema, data) = read_string_lenenc(data)?;
        let (table, data) = read_string_lenenc(data)?;
        let (org_table, data) = read_string_lenenc(data)?;
        let (name, data) = read_string_lenenc(data)?;
        let (org_name, data) = read_string_lenenc(data)?;

        // length of the fixed fields, always 0x0c
        let (_length, data) = read_int_lenenc(data)?;
        let tail = FieldTail::ref_from_bytes(data.get(..12).ok_or(Error::UnexpectedEof)?)
            .map_err(|_| Error::InvalidPacket)?;

        let column_type =
            ColumnType::from_u8(tail.column_type).ok_or(Error::InvalidPacket)?;

        Ok(Self {
            schema: utf8_owned(schema)?,
            table: utf8_owned(table)?,
            org_table: utf8_owned(org_table)?,
            name: utf8_owned(name)?,
            org_name: utf8_owned(org_name)?,
            charset: tail.charset.get(),
            column_length: tail.column_length.get(),
            column_type,
            flags: ColumnFlags::from_bits_truncate(tail.flags.get()),
            decimals: tail.decimals,
        })
    }

    pub fn is_unsigned(&self) -> bool {
        self.flags.contains(ColumnFlags::UNSIGNED_FLAG)
    }

    /// Whether the column carries binary (non-text) data.
    pub fn is_binary(&self) -> bool {
        self.charset == BINARY_CHARSET
    }

    pub fn is_primary_key(&self) -> bool {
        self.flags.contains(ColumnFlags::PRI_KEY_FLAG)
    }

    pub fn is_unique_key(&self) -> bool {
        self.flags.contains(ColumnFlags::UNIQUE_KEY_FLAG)
    }

    pub fn is_auto_increment(&self) -> bool {
        self.flags.contains(ColumnFlags::AUTO_INCREMENT_FLAG)
    }

    /// `table.name`, using the aliases visible to the query.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.table, self.name)
    }
}

fn utf8_owned(bytes: &[u8]) -> Result<String> {
    simdutf8::basic::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|_| Error::InvalidPacket)
}

#[derive(Debug)]
struct NameMaps {
    by_label: HashMap<String, usize>,
    by_full: HashMap<String, usize>,
    by_org: HashMap<String, usize>,
}

impl NameMaps {
    fn build(fields: &[Field]) -> Self {
        let mut by_label = HashMap::with_capacity(fields.len());
        let mut by_full = HashMap::with_capacity(fields.len());
        let mut by_org = HashMap::with_capacity(fields.len());
        // Insert back-to-front so that on duplicate names the earliest
        // column's index survives (first match wins).
        for (i, field) in fields.iter().enumerate().rev() {
            by_label.insert(field.name.clone(), i);
            by_full.insert(field.full_name(), i);
            by_org.insert(field.org_name.clone(), i);
        }
        Self {
            by_label,
            by_full,
            by_org,
        }
    }
}

/// Ordered column metadata shared by every row of a result set.
///
/// The name lookup maps are built once, on the first name-based lookup, and
/// reused for the lifetime of the result set.
#[derive(Debug, Default)]
pub struct ColumnDefinition {
    fields: Vec<Field>,
    use_original_names: bool,
    maps: OnceLock<NameMaps>,
    last_lookup: Mutex<Option<(String, usize)>>,
}

impl ColumnDefinition {
    pub fn new(fields: Vec<Field>) -> Self {
        Self {
            fields,
            use_original_names: false,
            maps: OnceLock::new(),
            last_lookup: Mutex::new(None),
        }
    }

    pub fn with_original_names(mut self, enabled: bool) -> Self {
        self.use_original_names = enabled;
        self
    }

    /// Parse one `Field` per column definition packet payload.
    pub fn from_packets<P: AsRef<[u8]>>(payloads: &[P]) -> Result<Self> {
        let fields = payloads
            .iter()
            .map(|p| Field::parse(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(fields))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// The field at 0-based `i`. Out-of-range indexes are a caller bug.
    pub fn field(&self, i: usize) -> &Field {
        &self.fields[i]
    }

    /// 0-based index of the first column matching `name`.
    ///
    /// Lookup order: label, then (if enabled) original name, then the full
    /// `table.name`, then a case-insensitive scan over all of those. When
    /// duplicate names exist the first matching column wins.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        if let Ok(cache) = self.last_lookup.lock()
            && let Some((cached, index)) = cache.as_ref()
            && cached == name
        {
            return Some(*index);
        }

        let maps = self.maps.get_or_init(|| NameMaps::build(&self.fields));
        let found = maps
            .by_label
            .get(name)
            .or_else(|| {
                self.use_original_names
                    .then(|| maps.by_org.get(name))
                    .flatten()
            })
            .or_else(|| maps.by_full.get(name))
            .copied()
            .or_else(|| self.scan_case_insensitive(name));

        if let Some(index) = found
            && let Ok(mut cache) = self.last_lookup.lock()
        {
            *cache = Some((name.to_owned(), index));
        }
        found
    }

    fn scan_case_insensitive(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| {
            f.name.eq_ignore_ascii_case(name)
                || (self.use_original_names && f.org_name.eq_ignore_ascii_case(name))
                || f.full_name().eq_ignore_ascii_case(name)
        })
    }

    /// 1-based index of the first column matching `name`, or 0 if there is
    /// no such column. Callers coming from ANSI-SQL APIs count columns from
    /// 1; all internal row access is 0-based, so subtract 1 before indexing
    /// a row.
    pub fn find_column(&self, name: &str) -> usize {
        self.index_of(name).map_or(0, |i| i + 1)
    }
}

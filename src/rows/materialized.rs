//! Fully materialized rows: every navigation is an O(1) index move.
use std::sync::Arc;

use crate::column::ColumnDefinition;
use crate::error::Result;
use crate::row::{Row, WireFormat};
use crate::rows::{Position, ResultRows};

pub struct MaterializedRows {
    columns: Arc<ColumnDefinition>,
    rows: Vec<Row>,
    position: Position,
}

impl MaterializedRows {
    pub fn new(columns: Arc<ColumnDefinition>, rows: Vec<Row>) -> Self {
        Self {
            columns,
            rows,
            position: Position::BeforeFirst,
        }
    }

    /// Materialize one row per packet payload. Each row is copied into its
    /// own cached storage, so the payloads can be dropped afterwards.
    pub fn from_payloads(
        columns: Arc<ColumnDefinition>,
        wire: WireFormat,
        payloads: Vec<Vec<u8>>,
    ) -> Result<Self> {
        let rows = payloads
            .into_iter()
            .map(|payload| {
                let row = match wire {
                    WireFormat::Text => Row::text(Arc::clone(&columns), payload),
                    WireFormat::Binary => Row::binary(Arc::clone(&columns), payload)?,
                };
                row.to_cached()
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(columns, rows))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl ResultRows for MaterializedRows {
    fn columns(&self) -> &Arc<ColumnDefinition> {
        &self.columns
    }

    fn position(&self) -> Position {
        self.position
    }

    fn current(&self) -> Option<&Row> {
        match self.position {
            Position::At(i) => self.rows.get(i),
            _ => None,
        }
    }

    fn has_next(&mut self) -> Result<bool> {
        Ok(match self.position {
            Position::BeforeFirst => !self.rows.is_empty(),
            Position::At(i) => i + 1 < self.rows.len(),
            Position::AfterLast => false,
        })
    }

    fn next(&mut self) -> Result<Option<&Row>> {
        self.position = match self.position {
            Position::BeforeFirst if !self.rows.is_empty() => Position::At(0),
            Position::At(i) if i + 1 < self.rows.len() => Position::At(i + 1),
            _ => Position::AfterLast,
        };
        Ok(self.current())
    }

    fn previous(&mut self) -> Result<Option<&Row>> {
        self.position = match self.position {
            Position::At(i) if i > 0 => Position::At(i - 1),
            Position::AfterLast if !self.rows.is_empty() => Position::At(self.rows.len() - 1),
            _ => Position::BeforeFirst,
        };
        Ok(self.current())
    }

    fn absolute(&mut self, row: i64) -> Result<Option<&Row>> {
        let len = self.rows.len() as i64;
        self.position = if row == 0 {
            Position::BeforeFirst
        } else if row > 0 {
            if row <= len {
                Position::At((row - 1) as usize)
            } else {
                Position::AfterLast
            }
        } else if len + row >= 0 {
            Position::At((len + row) as usize)
        } else {
            Position::BeforeFirst
        };
        Ok(self.current())
    }

    fn relative(&mut self, delta: i64) -> Result<Option<&Row>> {
        let len = self.rows.len() as i64;
        let cursor = match self.position {
            Position::BeforeFirst => -1,
            Position::At(i) => i as i64,
            Position::AfterLast => len,
        };
        let target = cursor.saturating_add(delta);
        self.position = if target < 0 {
            Position::BeforeFirst
        } else if target >= len {
            Position::AfterLast
        } else {
            Position::At(target as usize)
        };
        Ok(self.current())
    }

    fn is_last(&self) -> bool {
        matches!(self.position, Position::At(i) if i + 1 == self.rows.len())
    }

    fn close(&mut self) -> Result<()> {
        self.rows = Vec::new();
        self.columns = Arc::new(ColumnDefinition::default());
        self.position = Position::AfterLast;
        Ok(())
    }
}

#![allow(dead_code)]
use std::sync::{Arc, Mutex};

use rowset_mysql::Result;
use rowset_mysql::column::Field;
use rowset_mysql::transport::{SharedTransport, Transport};

/// Route tracing output through the test harness so `--nocapture` shows the
/// drain/refill diagnostics. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// A transport that replays a scripted list of packet payloads and records
/// every command sent through it.
pub struct ScriptedTransport {
    packets: Vec<Vec<u8>>,
    cursor: usize,
    pub sent: Vec<Vec<u8>>,
    pub reads: usize,
    usable: bool,
}

impl ScriptedTransport {
    pub fn new(packets: Vec<Vec<u8>>) -> Self {
        Self {
            packets,
            cursor: 0,
            sent: Vec::new(),
            reads: 0,
            usable: true,
        }
    }

    /// The concrete handle plus its `SharedTransport` coercion, so tests can
    /// inspect the script position after the result set consumed it.
    pub fn shared(packets: Vec<Vec<u8>>) -> (Arc<Mutex<ScriptedTransport>>, SharedTransport) {
        let inner = Arc::new(Mutex::new(ScriptedTransport::new(packets)));
        let shared: SharedTransport = inner.clone();
        (inner, shared)
    }

    pub fn remaining(&self) -> usize {
        self.packets.len() - self.cursor
    }

    pub fn is_usable_flag(&self) -> bool {
        self.usable
    }
}

impl Transport for ScriptedTransport {
    fn send_command(&mut self, payload: &[u8]) -> Result<()> {
        self.sent.push(payload.to_vec());
        Ok(())
    }

    fn read_packet(&mut self, buffer: &mut Vec<u8>) -> Result<()> {
        self.reads += 1;
        let packet = self.packets.get(self.cursor).ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "script exhausted")
        })?;
        self.cursor += 1;
        buffer.clear();
        buffer.extend_from_slice(packet);
        Ok(())
    }

    fn mark_unusable(&mut self) {
        self.usable = false;
    }

    fn is_usable(&self) -> bool {
        self.usable
    }
}

/// Build a column definition packet payload.
pub fn field_packet(table: &str, name: &str, org_name: &str, column_type: u8, flags: u16) -> Vec<u8> {
    let mut payload = Vec::new();
    for s in ["def", "testdb", table, table, name, org_name] {
        payload.push(s.len() as u8);
        payload.extend_from_slice(s.as_bytes());
    }
    payload.push(0x0c);
    payload.extend_from_slice(&255u16.to_le_bytes()); // charset
    payload.extend_from_slice(&255u32.to_le_bytes()); // column_length
    payload.push(column_type);
    payload.extend_from_slice(&flags.to_le_bytes());
    payload.push(0); // decimals
    payload.extend_from_slice(&0u16.to_le_bytes()); // reserved
    payload
}

pub fn parse_fields(packets: &[Vec<u8>]) -> Vec<Field> {
    packets.iter().map(|p| Field::parse(p).unwrap()).collect()
}

/// Build a text protocol row payload; `None` encodes NULL (0xFB).
pub fn text_row(cells: &[Option<&[u8]>]) -> Vec<u8> {
    let mut payload = Vec::new();
    for cell in cells {
        match cell {
            None => payload.push(0xFB),
            Some(bytes) => {
                payload.push(bytes.len() as u8);
                payload.extend_from_slice(bytes);
            }
        }
    }
    payload
}

/// Legacy EOF packet payload with the given status flags.
pub fn eof(status_flags: u16) -> Vec<u8> {
    let mut payload = vec![0xFE, 0x00, 0x00];
    payload.extend_from_slice(&status_flags.to_le_bytes());
    payload
}

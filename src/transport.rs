//! Boundary to the connection layer.
//!
//! The core never opens sockets. Streaming and cursor results pull packet
//! payloads through this trait; the connection layer owns framing (packet
//! headers, 16MB continuation, sequence ids) and the socket itself.
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Error, Result};

pub trait Transport {
    /// Send one command packet (sequence id 0). `payload` starts with the
    /// command byte.
    fn send_command(&mut self, payload: &[u8]) -> Result<()>;

    /// Read the next packet payload into `buffer`, replacing its contents.
    /// Payloads spanning multiple 16MB packets arrive already concatenated.
    fn read_packet(&mut self, buffer: &mut Vec<u8>) -> Result<()>;

    /// Mark the connection unusable. Called when a failed drain may have
    /// left the byte stream misaligned.
    fn mark_unusable(&mut self);

    fn is_usable(&self) -> bool;
}

/// The per-connection lock. All socket reads for one connection serialize
/// through this mutex; two result sets advancing concurrently on the same
/// connection block each other instead of corrupting the byte stream.
pub type SharedTransport = Arc<Mutex<dyn Transport + Send>>;

pub(crate) fn lock(transport: &SharedTransport) -> Result<MutexGuard<'_, dyn Transport + Send + 'static>> {
    transport
        .lock()
        .map_err(|_| Error::ProtocolDesync("connection lock poisoned".to_owned()))
}

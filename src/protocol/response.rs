use crate::constant::ServerStatusFlags;
use crate::error::{Error, Result};
use crate::protocol::primitive::*;
use zerocopy::byteorder::little_endian::U16 as U16LE;
use zerocopy::{FromBytes, Immutable, KnownLayout};

/// Maximum payload length of a single packet. A row payload of exactly this
/// size continues in the next packet; the transport concatenates those before
/// handing the payload to this crate.
pub const MAX_PAYLOAD_LEN: usize = 0xFF_FFFF;

/// OK packet response
///
/// Layout: signature byte (0x00, or 0xFE when used as a result terminator),
/// lenenc affected rows, lenenc last insert id, 2-byte status flags, 2-byte
/// warning count, optional info string.
#[derive(Debug, Clone)]
pub struct OkPayload {
    pub affected_rows: u64,
    pub last_insert_id: u64,
    pub status_flags: ServerStatusFlags,
    pub warnings: u16,
    pub info: String,
}

impl OkPayload {
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let (header, data) = read_int_1(payload)?;
        if header != 0x00 && header != 0xFE {
            return Err(Error::InvalidPacket);
        }

        let (affected_rows, rest) = read_int_lenenc(data)?;
        let (last_insert_id, rest) = read_int_lenenc(rest)?;
        let (status_flags, rest) = read_int_2(rest)?;
        let (warnings, rest) = read_int_2(rest)?;

        let (info, _rest) = read_string_null(rest);
        let info = String::from_utf8_lossy(info).into_owned();

        Ok(OkPayload {
            affected_rows,
            last_insert_id,
            status_flags: ServerStatusFlags::from_bits_truncate(status_flags),
            warnings,
            info,
        })
    }
}

/// ERR packet response
#[derive(Debug, Clone, thiserror::Error)]
#[error("ERROR {} ({}): {}", self.error_code, self.sql_state, self.message)]
pub struct ErrPayload {
    pub error_code: u16,
    pub sql_state: String,
    pub message: String,
}

impl ErrPayload {
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let (header, data) = read_int_1(payload)?;
        if header != 0xFF {
            return Err(Error::InvalidPacket);
        }

        let (error_code, data) = read_int_2(data)?;

        // Optional SQL state marker '#'
        let (sql_state, rest) = if !data.is_empty() && data[0] == b'#' {
            let (state_bytes, rest) = read_string_fix(&data[1..], 5)?;
            (String::from_utf8_lossy(state_bytes).into_owned(), rest)
        } else {
            (String::new(), data)
        };

        let message = String::from_utf8_lossy(rest).into_owned();

        Ok(ErrPayload {
            error_code,
            sql_state,
            message,
        })
    }
}

/// Legacy EOF packet tail (after the 0xFE header byte)
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable)]
pub struct EofTail {
    pub warnings: U16LE,
    pub status_flags: U16LE,
}

/// A result terminator: either a legacy EOF packet (0xFE, payload < 9 bytes)
/// or an OK packet with a 0xFE signature (CLIENT_DEPRECATE_EOF).
#[derive(Debug, Clone)]
pub struct Terminator {
    pub status_flags: ServerStatusFlags,
    pub warnings: u16,
    pub ok: Option<OkPayload>,
}

impl Terminator {
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let (header, data) = read_int_1(payload)?;
        if header != 0xFE {
            return Err(Error::InvalidPacket);
        }

        if payload.len() < 9 {
            let eof = EofTail::ref_from_bytes(data.get(..4).ok_or(Error::UnexpectedEof)?)
                .map_err(|_| Error::InvalidPacket)?;
            Ok(Terminator {
                status_flags: ServerStatusFlags::from_bits_truncate(eof.status_flags.get()),
                warnings: eof.warnings.get(),
                ok: None,
            })
        } else {
            let ok = OkPayload::parse(payload)?;
            Ok(Terminator {
                status_flags: ok.status_flags,
                warnings: ok.warnings,
                ok: Some(ok),
            })
        }
    }
}

/// Whether a row-phase payload terminates the result set.
///
/// A valid row's first item is NULL (0xFB) or string<lenenc>, and a lenenc
/// length cannot start with 0xFF. A 0xFE first byte in a row would mean the
/// field is at least 2^24 bytes long, which forces the payload itself to the
/// maximum packet size, so 0xFE with a shorter payload is always a
/// terminator. The same reasoning holds for binary rows (header byte 0x00).
pub fn is_terminator(payload: &[u8]) -> bool {
    payload.first() == Some(&0xFE) && payload.len() < MAX_PAYLOAD_LEN
}

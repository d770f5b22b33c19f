use crate::error::{Error, Result};
use zerocopy::FromBytes;
use zerocopy::byteorder::little_endian::{U16 as U16LE, U32 as U32LE, U64 as U64LE};

/// Read 1-byte integer
pub fn read_int_1(data: &[u8]) -> Result<(u8, &[u8])> {
    if data.is_empty() {
        return Err(Error::UnexpectedEof);
    }
    Ok((data[0], &data[1..]))
}

/// Read 2-byte little-endian integer
pub fn read_int_2(data: &[u8]) -> Result<(u16, &[u8])> {
    if data.len() < 2 {
        return Err(Error::UnexpectedEof);
    }
    let value = U16LE::ref_from_bytes(&data[..2])
        .map_err(|_| Error::InvalidPacket)?
        .get();
    Ok((value, &data[2..]))
}

/// Read 3-byte little-endian integer
pub fn read_int_3(data: &[u8]) -> Result<(u32, &[u8])> {
    if data.len() < 3 {
        return Err(Error::UnexpectedEof);
    }
    let value = u32::from_le_bytes([data[0], data[1], data[2], 0]);
    Ok((value, &data[3..]))
}

/// Read 4-byte little-endian integer
pub fn read_int_4(data: &[u8]) -> Result<(u32, &[u8])> {
    if data.len() < 4 {
        return Err(Error::UnexpectedEof);
    }
    let value = U32LE::ref_from_bytes(&data[..4])
        .map_err(|_| Error::InvalidPacket)?
        .get();
    Ok((value, &data[4..]))
}

/// Read 8-byte little-endian integer
pub fn read_int_8(data: &[u8]) -> Result<(u64, &[u8])> {
    if data.len() < 8 {
        return Err(Error::UnexpectedEof);
    }
    let value = U64LE::ref_from_bytes(&data[..8])
        .map_err(|_| Error::InvalidPacket)?
        .get();
    Ok((value, &data[8..]))
}

/// Read length-encoded integer
pub fn read_int_lenenc(data: &[u8]) -> Result<(u64, &[u8])> {
    if data.is_empty() {
        return Err(Error::UnexpectedEof);
    }

    match data[0] {
        0xFC => {
            let (val, rest) = read_int_2(&data[1..])?;
            Ok((val as u64, rest))
        }
        0xFD => {
            let (val, rest) = read_int_3(&data[1..])?;
            Ok((val as u64, rest))
        }
        0xFE => {
            let (val, rest) = read_int_8(&data[1..])?;
            Ok((val, rest))
        }
        val => Ok((val as u64, &data[1..])),
    }
}

/// Read fixed-length string
pub fn read_string_fix(data: &[u8], len: usize) -> Result<(&[u8], &[u8])> {
    if data.len() < len {
        return Err(Error::UnexpectedEof);
    }
    Ok((&data[..len], &data[len..]))
}

/// Read null-terminated string; without a terminator the rest of the payload is taken.
pub fn read_string_null(data: &[u8]) -> (&[u8], &[u8]) {
    match data.iter().position(|&b| b == 0) {
        Some(i) => (&data[..i], &data[i + 1..]),
        None => (data, &[]),
    }
}

/// Read length-encoded string
pub fn read_string_lenenc(data: &[u8]) -> Result<(&[u8], &[u8])> {
    let (len, rest) = read_int_lenenc(data)?;
    read_string_fix(rest, len as usize)
}

/// Write 1-byte integer
pub fn write_int_1(out: &mut Vec<u8>, value: u8) {
    out.push(value);
}

/// Write 4-byte little-endian integer
pub fn write_int_4(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

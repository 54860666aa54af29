use crate::util::{Result, Status};

/// Table log file format
///
/// A table log is a flat sequence of frames, one per mutation:
///
/// +----------+--------+------------+-----------+
/// | Checksum | Length | Length CRC | Payload   |
/// +----------+--------+------------+-----------+
/// | 4 bytes  | 4 bytes| 4 bytes    | N bytes   |
/// +----------+--------+------------+-----------+
///
/// Checksum is the CRC32 of the payload, Length CRC the CRC32 of the four
/// length bytes; all integers are little endian. A frame cut short by a
/// crash can only be the last one in the file, and its header is always
/// intact once all of it is on disk.

/// Header size: checksum(4) + length(4) + length crc(4) = 12 bytes
pub const HEADER_SIZE: usize = 12;

/// Largest payload a frame may carry
pub const MAX_PAYLOAD: usize = 64 << 20;

#[inline]
pub fn calculate_checksum(payload: &[u8]) -> u32 {
    crc32fast::hash(payload)
}

/// Encode frame header
/// Returns: [checksum(4), length(4), length crc(4)]
pub fn encode_header(checksum: u32, length: u32) -> [u8; HEADER_SIZE] {
    let length = length.to_le_bytes();
    let mut header = [0u8; HEADER_SIZE];
    header[0..4].copy_from_slice(&checksum.to_le_bytes());
    header[4..8].copy_from_slice(&length);
    header[8..12].copy_from_slice(&crc32fast::hash(&length).to_le_bytes());
    header
}

/// Decode frame header
/// Returns: (checksum, length), or Corruption if the length field is damaged
pub fn decode_header(header: &[u8; HEADER_SIZE]) -> Result<(u32, u32)> {
    let checksum = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    let length_bytes = [header[4], header[5], header[6], header[7]];
    let length_crc = u32::from_le_bytes([header[8], header[9], header[10], header[11]]);

    if crc32fast::hash(&length_bytes) != length_crc {
        return Err(Status::corruption("Frame length checksum mismatch"));
    }
    let length = u32::from_le_bytes(length_bytes);
    if length as usize > MAX_PAYLOAD {
        return Err(Status::corruption(format!(
            "Frame length {length} exceeds the {MAX_PAYLOAD} byte limit"
        )));
    }
    Ok((checksum, length))
}

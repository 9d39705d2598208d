//! Streaming frame extraction and validation.
//!
//! Stream transports (TCP, serial) accumulate bytes in a per-endpoint
//! buffer and call [`next_frame`] until it reports that more bytes are
//! needed. Datagram transports hand each datagram to [`datagram_frame`].
//! Extraction is purely length-based; checksum and payload validation
//! happen afterwards in [`validate`], so that a frame with a bad checksum
//! consumes its whole span instead of being rescanned byte by byte.

use log::debug;

use crate::error::FrameError;
use crate::frame::RawFrame;
use crate::{MavlinkVersion, Message, MAV_STX, MAV_STX_V2};

/// Smallest complete frame: a v1 frame with an empty payload (STX, 5
/// header bytes, checksum trailer). A stream buffer shorter than this can
/// never yield a frame.
pub const MIN_FRAME_SIZE: usize = 8;

enum Scan {
    /// A complete frame spanning `total` bytes starting at the scan offset.
    Frame { version: MavlinkVersion, total: usize },
    /// A start byte with an incomplete body; keep the buffer from here.
    Need,
    /// A complete v2 frame with unsupported incompatibility flags.
    BadFlags { flags: u8, total: usize },
}

/// Examine `buf`, whose first byte must be a start byte.
fn scan_at(buf: &[u8]) -> Scan {
    match buf[0] {
        MAV_STX => {
            if buf.len() < 2 {
                return Scan::Need;
            }
            let total = 1 + RawFrame::V1_HEADER_SIZE + buf[1] as usize + 2;
            if buf.len() < total {
                return Scan::Need;
            }
            Scan::Frame {
                version: MavlinkVersion::V1,
                total,
            }
        }
        MAV_STX_V2 => {
            if buf.len() < 2 {
                return Scan::Need;
            }
            let total = 1 + RawFrame::V2_HEADER_SIZE + buf[1] as usize + 2;
            if buf.len() < total {
                return Scan::Need;
            }
            if buf[2] != 0 {
                return Scan::BadFlags {
                    flags: buf[2],
                    total,
                };
            }
            Scan::Frame {
                version: MavlinkVersion::V2,
                total,
            }
        }
        _ => unreachable!("scan_at called off a start byte"),
    }
}

fn find_start(buf: &[u8]) -> Option<usize> {
    buf.iter().position(|&b| b == MAV_STX || b == MAV_STX_V2)
}

/// Extract the next frame from the front of a stream buffer.
///
/// Bytes preceding the first start byte are discarded (resynchronization),
/// as are complete v2 frames carrying unsupported incompatibility flags.
/// Returns `None` when the buffer is empty or holds only the prefix of a
/// frame; the buffer is left intact from the start byte so the caller can
/// retry once more bytes arrive.
pub fn next_frame(buf: &mut Vec<u8>) -> Option<RawFrame> {
    let mut start = 0;
    loop {
        let Some(stx) = find_start(&buf[start..]) else {
            // nothing but garbage
            start = buf.len();
            break;
        };
        start += stx;
        match scan_at(&buf[start..]) {
            Scan::Frame { version, total } => {
                if start > 0 {
                    debug!("skipped {start} bytes of garbage before frame");
                }
                let data = buf[start..start + total].to_vec();
                buf.drain(..start + total);
                return Some(RawFrame::from_wire(version, data));
            }
            Scan::Need => break,
            Scan::BadFlags { flags, total } => {
                debug!("dropping v2 frame with incompatibility flags {flags:#04x}");
                buf.drain(..start + total);
                start = 0;
                continue;
            }
        }
    }
    if start > 0 {
        debug!("discarded {start} bytes of garbage");
        buf.drain(..start);
    }
    None
}

/// Extract exactly one frame from a datagram.
///
/// Datagram transports never buffer across packets: either the datagram
/// holds a complete frame (after any leading garbage) or it is reported as
/// an error and discarded whole.
pub fn datagram_frame(datagram: &[u8]) -> Result<RawFrame, FrameError> {
    let start = find_start(datagram).ok_or(FrameError::NotAFrame)?;
    match scan_at(&datagram[start..]) {
        Scan::Frame { version, total } => Ok(RawFrame::from_wire(
            version,
            datagram[start..start + total].to_vec(),
        )),
        Scan::Need => Err(FrameError::Incomplete),
        Scan::BadFlags { flags, .. } => Err(FrameError::IncompatibleFlags { flags }),
    }
}

/// Validate an extracted frame against the dialect and decode it.
///
/// On success returns the typed message and its resolved
/// `(target_system, target_component)`. Unknown ids are reported as
/// [`FrameError::UnknownMessage`] before any checksum comparison, since the
/// CRC_EXTRA seed is not known for them; such frames may still be forwarded
/// opaquely.
pub fn validate<M: Message>(frame: &RawFrame) -> Result<(M, (u8, u8)), FrameError> {
    let id = frame.message_id();
    let spec = M::spec(id).ok_or(FrameError::UnknownMessage { id })?;

    let computed = crate::calculate_crc(frame.crc_region(), spec.extra_crc);
    if computed != frame.checksum() {
        return Err(FrameError::ChecksumInvalid {
            found: frame.checksum(),
            computed,
        });
    }

    let message: M = frame.decode()?;
    let target = message.target();
    Ok((message, target))
}

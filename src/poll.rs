//! Ready-made receivers covering common reception patterns.
//!
//! The functions in this module are suited to receiving packets from a live
//! demodulated data line, or decoding them from a recorded capture.
//!
//! A successful receive fills the caller's packet buffer with the complete
//! frame and returns its byte count; wrap the filled region in a [`Packet`]
//! to pick it apart.

pub mod line;
pub mod trace;

pub use line::receive as receive_line;
pub use trace::decode as decode_trace;

use zerocopy::FromBytes;

/// A parsed view over a decoded frame buffer.
///
/// Splits the buffer filled by a receiver into its synchronization word,
/// declared length, payload, and check trailer.
#[derive(Debug, Clone, Copy)]
pub struct Packet<'a> {
    sync_word: u16,
    payload: &'a [u8],
    check: u16,
}

#[repr(C, packed)]
#[derive(FromBytes)]
struct Header {
    sync_word: [u8; 2],
    length: u8,
}

impl<'a> Packet<'a> {
    /// Split a decoded frame into its parts.
    ///
    /// Returns `None` if the slice is not shaped like a frame: shorter than
    /// the fixed overhead, or inconsistent with its own length byte.
    pub fn parse(r: &'a [u8]) -> Option<Self> {
        let header: [u8; 3] = r.get(..3)?.try_into().ok()?;
        let Header { sync_word, length } = zerocopy::transmute!(header);

        let payload = r.get(3..3 + length as usize)?;
        let check = r.get(length as usize + 3..)?.try_into().ok()?;

        Some(Self {
            sync_word: u16::from_be_bytes(sync_word),
            payload,
            check: u16::from_be_bytes(check),
        })
    }

    /// The frame's synchronization word.
    pub fn sync_word(&self) -> u16 {
        self.sync_word
    }

    /// The application payload.
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// The check trailer, read big-endian.
    pub fn check(&self) -> u16 {
        self.check
    }
}

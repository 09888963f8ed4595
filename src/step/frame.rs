//! States assembling and gating frame bytes.
//!
//! A frame is, in order: a two-byte synchronization word, a one-byte payload
//! length, the payload, and a two-byte check trailer. Bits arrive
//! most-significant first, one sampled level per `advance` call.

use either::Either::{self, Left, Right};
use thiserror::Error;

use crate::Wire;

/// Fixed per-frame overhead: synchronization word, length byte, and check
/// trailer.
pub const OVERHEAD: usize = 5;

/// An error advancing over the synchronization word.
#[derive(Debug, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncWordError {
    /// Assembled word does not match the expected constant.
    #[error("Incorrect synchronization word ({found:#06x}).")]
    Mismatch { found: u16 },
}

/// State token to assemble and gate the synchronization word.
#[derive(Debug)]
pub struct SyncWord {
    word: u16,
    bits: u8,
}

impl SyncWord {
    pub(super) fn begin() -> Self {
        Self { word: 0, bits: 0 }
    }

    /// Transition to another state by shifting in one sampled bit.
    ///
    /// The assembled word is compared against [`Wire::sync_word`] as soon as
    /// its sixteenth bit arrives; a mismatch aborts the attempt before any
    /// further bytes are read.
    ///
    /// Returns the two big-endian word bytes and a successor state token.
    pub fn advance(
        self,
        w: &Wire,
        high: bool,
    ) -> Result<Either<SyncWord, ([u8; 2], Length)>, SyncWordError> {
        let word = self.word << 1 | w.polarity.bit(high) as u16;
        let bits = self.bits + 1;

        if bits < 16 {
            return Ok(Left(SyncWord { word, bits }));
        }

        if word != w.sync_word {
            Err(SyncWordError::Mismatch { found: word })?;
        }

        Ok(Right((word.to_be_bytes(), Length { byte: 0, bits: 0 })))
    }
}

/// State token to assemble the payload length byte.
#[derive(Debug)]
pub struct Length {
    byte: u8,
    bits: u8,
}

impl Length {
    /// Transition to another state by shifting in one sampled bit.
    ///
    /// Returns the declared payload length and a successor state token. The
    /// declared length plus [`OVERHEAD`] must be bounded against the packet
    /// buffer's capacity before any byte is stored.
    pub fn advance(self, w: &Wire, high: bool) -> Either<Length, (u8, Body)> {
        let byte = self.byte << 1 | w.polarity.bit(high);
        let bits = self.bits + 1;

        if bits < 8 {
            Left(Length { byte, bits })
        } else {
            // Payload bytes plus the check trailer remain.
            let body = Body {
                byte: 0,
                bits: 0,
                remaining: byte as u16 + 2,
            };
            Right((byte, body))
        }
    }
}

/// State token to assemble payload and check trailer bytes.
#[derive(Debug)]
pub struct Body {
    byte: u8,
    bits: u8,
    remaining: u16,
}

impl Body {
    /// Transition to another state by shifting in one sampled bit.
    ///
    /// Returns a byte each time one completes, and a successor state token.
    pub fn advance(self, w: &Wire, high: bool) -> (Option<u8>, Either<Body, Done>) {
        let byte = self.byte << 1 | w.polarity.bit(high);
        let bits = self.bits + 1;

        if bits < 8 {
            return (None, Left(Body { byte, bits, ..self }));
        }

        let remaining = self.remaining - 1;

        let successor = if remaining != 0 {
            Left(Body {
                byte: 0,
                bits: 0,
                remaining,
            })
        } else {
            Right(Done(()))
        };

        (Some(byte), successor)
    }
}

/// Terminal token marking a structurally complete frame.
///
/// Completion means the declared byte count was reached, not that the frame
/// is intact; the check trailer has yet to be validated. See [`super::check`].
#[derive(Debug)]
pub struct Done(pub(super) ());

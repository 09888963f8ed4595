//! Capture-based receiver implementation.
//!
//! Decodes a packet from a recorded line capture, stored as a sequence of
//! constant-level spans. Suited to replaying logic-analyzer exports, and to
//! exercising decoder changes without hardware.

use either::Either::{Left, Right};
use thiserror::Error;

use crate::{
    Wire,
    step::{
        Receiver,
        check::{compute_crc, finish_crc},
        frame::{OVERHEAD, SyncWordError},
        sync::Pulse,
    },
};

/// A constant-level span of a recorded capture.
///
/// Each span is fed to the training detector as one observed phase; adjacent
/// same-level spans are not merged.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Span {
    /// Line level held over the span.
    pub high: bool,
    /// Span width, in microseconds.
    pub width_us: u32,
}

/// Errors occurring while decoding from a capture.
#[derive(Debug, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Unexpectedly reached the end of the capture.
    #[error("Unexpectedly reached the end of the capture.")]
    EndOfCapture,
    /// Incorrect synchronization word.
    #[error("Incorrect synchronization word: {0}.")]
    SyncWord(#[from] SyncWordError),
    /// Declared payload length exceeds the packet buffer.
    #[error("Declared payload length ({length}) exceeds the packet buffer.")]
    Overflow { length: u8 },
    /// Calculated and found check values do not match.
    #[error("Calculated ({calculated}) and found ({found}) check values do not match.")]
    Check { found: u16, calculated: u16 },
}

/// Decode one packet from a capture into a packet buffer.
///
/// Returns the number of frame bytes written. The buffer is not written to
/// before the synchronization word has matched and the declared length has
/// been bounded against its capacity, so those failures leave it untouched.
///
/// This method is also re-exported as `pennine::poll::decode_trace`.
pub fn decode(r: &[Span], w: &Wire, o: &mut [u8]) -> Result<usize, Error> {
    let t = &mut Tape::new(r);

    // Establish bit-timing lock from the training sequence.
    let mut training = Receiver::default();
    let state = loop {
        match training.advance(w, t.pulse()?) {
            Left(next) => training = next,
            Right(state) => break state,
        }
    };

    // Offset sampling into the stable region of each bit.
    t.skip(w.align_us());

    let mut sync = state;
    let (word, state) = loop {
        let successor = sync.advance(w, t.level()?)?;
        t.skip(w.bit_us);
        match successor {
            Left(next) => sync = next,
            Right(x) => break x,
        }
    };

    let mut length = state;
    let (n, state) = loop {
        let successor = length.advance(w, t.level()?);
        t.skip(w.bit_us);
        match successor {
            Left(next) => length = next,
            Right(x) => break x,
        }
    };

    // Bound the declared length before storing anything.
    let total = n as usize + OVERHEAD;
    if total > o.len() {
        Err(Error::Overflow { length: n })?;
    }

    o[..2].copy_from_slice(&word);
    o[2] = n;

    let mut i = 3;
    let mut body = state;
    loop {
        let (byte, successor) = body.advance(w, t.level()?);

        if let Some(byte) = byte {
            o[i] = byte;
            i += 1;
        }

        match successor {
            Left(next) => {
                body = next;
                t.skip(w.bit_us);
            }
            Right(_) => break,
        }
    }

    // Apply the cyclic redundancy check before reporting the frame.
    let calculated = finish_crc(compute_crc(0, &o[..total - 2]));
    let found = u16::from_be_bytes([o[total - 2], o[total - 1]]);

    if found != calculated {
        Err(Error::Check { found, calculated })?;
    }

    Ok(total)
}

/// Cursor over a capture, tracking a position in time.
struct Tape<'a> {
    spans: &'a [Span],
    index: usize,
    offset_us: u32,
}

impl<'a> Tape<'a> {
    fn new(spans: &'a [Span]) -> Self {
        Self {
            spans,
            index: 0,
            offset_us: 0,
        }
    }

    /// Take the rest of the current span as one observed phase.
    fn pulse(&mut self) -> Result<Pulse, Error> {
        let span = self.spans.get(self.index).ok_or(Error::EndOfCapture)?;

        let pulse = Pulse {
            high: span.high,
            width_us: span.width_us - self.offset_us,
        };

        self.index += 1;
        self.offset_us = 0;

        Ok(pulse)
    }

    /// The line level at the current position.
    fn level(&self) -> Result<bool, Error> {
        let span = self.spans.get(self.index).ok_or(Error::EndOfCapture)?;
        Ok(span.high)
    }

    /// Advance the position in time.
    fn skip(&mut self, us: u32) {
        let mut us = us;
        while let Some(span) = self.spans.get(self.index) {
            let remaining = span.width_us - self.offset_us;
            if us < remaining {
                self.offset_us += us;
                return;
            }
            us -= remaining;
            self.index += 1;
            self.offset_us = 0;
        }
    }
}

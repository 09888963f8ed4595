//! States establishing bit-timing lock from the training sequence.

use either::Either::{self, Left, Right};

use crate::Wire;

use super::frame::SyncWord;

/// Minimum run of valid high pulses before lock can be declared.
pub const TRAINING_PULSES: u8 = 8;

/// A constant-level phase observed on the line, with its measured width.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pulse {
    /// Line level held over the phase.
    pub high: bool,
    /// Measured phase width, in microseconds.
    pub width_us: u32,
}

/// State token to detect the training sequence.
#[derive(Debug, Default)]
pub struct Training {
    highs: u8,
    lows: u8,
}

impl Training {
    /// Transition to another state by classifying one observed phase.
    ///
    /// A phase narrower than [`Wire::pulse_min_us`] is not a real training
    /// pulse and discards any partial lock. Lock is declared once at least
    /// [`TRAINING_PULSES`] valid high pulses have been counted and the low
    /// count trails by exactly one, the trailing edge of a training byte
    /// boundary.
    ///
    /// Returns the successor state token. On lock, the first data-bit sample
    /// is due [`Wire::align_us`] later, and one every [`Wire::bit_us`]
    /// thereafter.
    pub fn advance(self, w: &Wire, p: Pulse) -> Either<Training, SyncWord> {
        if p.width_us < w.pulse_min_us() {
            return Left(Training::default());
        }

        let (highs, lows) = if p.high {
            (self.highs.saturating_add(1), self.lows)
        } else {
            (self.highs, self.lows.saturating_add(1))
        };

        if highs >= TRAINING_PULSES && lows == highs - 1 {
            Right(SyncWord::begin())
        } else {
            Left(Training { highs, lows })
        }
    }
}

//! Line-polling receiver implementation.
//!
//! Busy-polls a demodulated data line through `embedded-hal` digital and
//! delay capabilities. Phase widths are measured by sampling the line every
//! [`Wire::step_us`] microseconds; after lock, data bits are sampled once
//! per bit period.

use either::Either::{Left, Right};
use embedded_hal::{delay::DelayNs, digital::InputPin};
use thiserror::Error;

use crate::{
    Wire,
    step::{
        Receiver,
        check::{compute_crc, finish_crc},
        frame::{OVERHEAD, SyncWord, SyncWordError},
        sync::Pulse,
    },
};

/// Errors occurring while receiving from a line.
#[derive(Debug, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// An error from the supplied input pin.
    #[error("Input pin failed.")]
    Pin(E),
    /// Incorrect synchronization word.
    #[error("Incorrect synchronization word: {0}.")]
    SyncWord(#[from] SyncWordError),
    /// Declared payload length exceeds the packet buffer.
    #[error("Declared payload length ({length}) exceeds the packet buffer.")]
    Overflow { length: u8 },
    /// Calculated and found check values do not match.
    #[error("Calculated ({calculated}) and found ({found}) check values do not match.")]
    Check { found: u16, calculated: u16 },
    /// Training lock was not achieved within the allowed wait.
    #[error("Training lock was not achieved within the allowed wait.")]
    Timeout,
}

/// Receive one packet from a line into a packet buffer.
///
/// Blocks until a transmission trains the receiver, then decodes a single
/// frame attempt; the wait for a transmitter is unbounded. Returns the number
/// of frame bytes written. The buffer is not written to before the
/// synchronization word has matched and the declared length has been bounded
/// against its capacity, so those failures leave it untouched.
///
/// The receiver does not retry internally. Callers wanting more than one
/// attempt drive this in a loop, typically with a fixed inter-attempt delay.
///
/// This method is also re-exported as `pennine::poll::receive_line`.
pub fn receive<P: InputPin>(
    line: &mut P,
    delay: &mut impl DelayNs,
    w: &Wire,
    o: &mut [u8],
) -> Result<usize, Error<P::Error>> {
    let state = lock(line, delay, w, None)?;
    read(line, delay, w, state, o)
}

/// Receive one packet from a line, bounding the wait for a transmitter.
///
/// As [`receive`], but gives up with [`Error::Timeout`] if training lock is
/// not achieved within `wait_us` microseconds. Once locked, the frame read
/// itself is bounded by the frame length and needs no budget.
pub fn receive_within<P: InputPin>(
    line: &mut P,
    delay: &mut impl DelayNs,
    w: &Wire,
    o: &mut [u8],
    wait_us: u32,
) -> Result<usize, Error<P::Error>> {
    let state = lock(line, delay, w, Some(wait_us))?;
    read(line, delay, w, state, o)
}

/// Poll the line until the training detector declares lock.
fn lock<P: InputPin>(
    line: &mut P,
    delay: &mut impl DelayNs,
    w: &Wire,
    mut wait: Option<u32>,
) -> Result<SyncWord, Error<P::Error>> {
    let step = w.step_us();

    let mut training = Receiver::default();
    let mut high = line.is_high().map_err(Error::Pin)?;
    let mut width = 0u32;

    loop {
        if let Some(budget) = wait {
            wait = Some(budget.checked_sub(step).ok_or(Error::Timeout)?);
        }

        delay.delay_us(step);
        width = width.saturating_add(step);

        let now = line.is_high().map_err(Error::Pin)?;
        if now == high {
            continue;
        }

        // Edge: the phase just ended, hand it to the detector.
        training = match training.advance(w, Pulse { high, width_us: width }) {
            Left(next) => next,
            Right(state) => return Ok(state),
        };

        high = now;
        width = 0;
    }
}

/// Sample and store one frame attempt after lock.
fn read<P: InputPin>(
    line: &mut P,
    delay: &mut impl DelayNs,
    w: &Wire,
    state: SyncWord,
    o: &mut [u8],
) -> Result<usize, Error<P::Error>> {
    // Offset sampling into the stable region of each bit.
    delay.delay_us(w.align_us());

    let mut sync = state;
    let (word, state) = loop {
        let high = line.is_high().map_err(Error::Pin)?;
        let successor = sync.advance(w, high)?;
        delay.delay_us(w.bit_us);
        match successor {
            Left(next) => sync = next,
            Right(x) => break x,
        }
    };

    let mut length = state;
    let (n, state) = loop {
        let high = line.is_high().map_err(Error::Pin)?;
        let successor = length.advance(w, high);
        delay.delay_us(w.bit_us);
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
        let high = line.is_high().map_err(Error::Pin)?;
        let (byte, successor) = body.advance(w, high);

        if let Some(byte) = byte {
            o[i] = byte;
            i += 1;
        }

        match successor {
            Left(next) => {
                body = next;
                delay.delay_us(w.bit_us);
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

/// Slope of the demodulator's RSSI output, in dB per volt.
pub const RSSI_SLOPE_DB_PER_V: f32 = 30.0;

/// Input power at zero RSSI voltage, in dBm.
pub const RSSI_INTERCEPT_DBM: f32 = -125.0;

/// Convert the demodulator's RSSI output voltage to an input power estimate.
///
/// The mapping is linear over the demodulator's useful range (roughly 0.5 V
/// at -110 dBm to 2.5 V at -50 dBm). Diagnostic only; reception does not
/// depend on it.
pub fn strength_dbm(volts: f32) -> f32 {
    volts * RSSI_SLOPE_DB_PER_V + RSSI_INTERCEPT_DBM
}

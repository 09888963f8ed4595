//! Sample-level finite-state machine for implementing receivers.
//!
//! This module is intended for advanced applications that need fine control
//! over how and when the line is read. See [`crate::poll`] for receivers
//! covering common reception patterns.
//!
//! # Architecture
//!
//! All states are represented by a small, non-copy token. Once an observation
//! is ready, transition to another state by calling the token's `advance`
//! method. This will return a successor state token, along with any extracted
//! data.
//!
//! The [`sync::Training`] detector consumes one observed constant-level phase
//! per call; the [`frame`] states consume one sampled line level per call,
//! taken once per bit period. Only the initial state, re-exported for
//! convenience as [`Receiver`], can be constructed.
//!
//! This architecture enables the compiler and type system to guide
//! applications toward a correct implementation. However, some areas of the
//! reception process are not represented in the finite-state machine and must
//! be carefully written:
//!
//! - Measuring phase widths and sampling the line at the correct instants,
//! including the post-lock alignment offset.
//!
//! - Bounding the declared payload length against the packet buffer before
//! storing bytes past the synchronization word.
//!
//! - Applying cyclic redundancy checks. Helper functions are provided in the
//! [`check`] module.
//!
//! Implementers are recommended to begin by studying and modifying a receiver
//! from the [`crate::poll`] module.

pub mod check;
pub mod frame;
pub mod sync;

/// Entrypoint to the finite-state machine.
pub type Receiver = sync::Training;

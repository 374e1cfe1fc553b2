//! Primitives for synchronization in audio contexts.
//!
//! This crate provides mechanisms whereby an audio thread can communicate with other threads without ever entering the
//! kernel or blocking for an unbounded amount of time.  The audio half of a communication process is never blocked;
//! control threads may spin briefly against each other, but never against the audio thread.

pub mod snapshot_cell;
mod sync;

pub use snapshot_cell::SnapshotCell;

//! A fixed set of `f64` values which can be written from any thread and read as a consistent snapshot from one
//! realtime thread.
//!
//! This is a sequence lock.  Each slot is an `AtomicU64` holding the bits of an `f64`, and a sequence counter is odd
//! while a write is in progress.  Writers claim the counter with a CAS, so they serialize among themselves by spinning,
//! but writers are never audio threads.  The reader never spins for long: it makes at most [MAX_READ_ATTEMPTS] attempts
//! and then gives up, leaving it to the caller to reuse whatever it read last time.
use crate::sync::{fence, yield_now, AtomicU64, Ordering};

/// How many times [SnapshotCell::try_read] will retry when it races a writer before giving up.
pub const MAX_READ_ATTEMPTS: usize = 8;

pub struct SnapshotCell<const N: usize> {
    sequence: AtomicU64,
    slots: [AtomicU64; N],
}

impl<const N: usize> SnapshotCell<N> {
    pub fn new(initial: [f64; N]) -> Self {
        Self {
            sequence: AtomicU64::new(0),
            slots: std::array::from_fn(|i| AtomicU64::new(initial[i].to_bits())),
        }
    }

    /// Claim the sequence counter, making it odd.  Returns the (even) value it had before.
    fn begin_write(&self) -> u64 {
        loop {
            let seq = self.sequence.load(Ordering::Relaxed);
            if seq & 1 == 0
                && self
                    .sequence
                    .compare_exchange_weak(seq, seq + 1, Ordering::Acquire, Ordering::Relaxed)
                    .is_ok()
            {
                // Orders the odd counter before any of the slot stores below.
                fence(Ordering::Release);
                return seq;
            }

            yield_now();
        }
    }

    fn end_write(&self, claimed: u64) {
        self.sequence.store(claimed + 2, Ordering::Release);
    }

    /// Read-modify-write the values as one unit.
    ///
    /// Readers will either see all of the changes made by `updater` or none of them.
    pub fn update(&self, updater: impl FnOnce(&mut [f64; N])) {
        let claimed = self.begin_write();

        // We hold the write claim, so nobody else is storing.
        let mut values: [f64; N] =
            std::array::from_fn(|i| f64::from_bits(self.slots[i].load(Ordering::Relaxed)));
        updater(&mut values);
        for (slot, value) in self.slots.iter().zip(values.iter()) {
            slot.store(value.to_bits(), Ordering::Relaxed);
        }

        self.end_write(claimed);
    }

    /// Replace a single slot.
    ///
    /// # Panics
    ///
    /// Panics if `index >= N`.
    pub fn store(&self, index: usize, value: f64) {
        assert!(index < N);
        self.update(|values| values[index] = value);
    }

    /// Try to read a consistent snapshot without blocking.
    ///
    /// Returns `None` if every attempt raced a writer.  Safe to call from the audio thread.
    pub fn try_read(&self) -> Option<[f64; N]> {
        for _ in 0..MAX_READ_ATTEMPTS {
            let before = self.sequence.load(Ordering::Acquire);
            if before & 1 == 1 {
                continue;
            }

            let values: [f64; N] =
                std::array::from_fn(|i| f64::from_bits(self.slots[i].load(Ordering::Relaxed)));

            fence(Ordering::Acquire);
            let after = self.sequence.load(Ordering::Relaxed);
            if before == after {
                return Some(values);
            }
        }

        None
    }

    /// Read a consistent snapshot, yielding until one is available.
    ///
    /// Not for audio threads; use [SnapshotCell::try_read] there.
    pub fn read(&self) -> [f64; N] {
        loop {
            if let Some(values) = self.try_read() {
                return values;
            }

            yield_now();
        }
    }
}

impl<const N: usize> std::fmt::Debug for SnapshotCell<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotCell")
            .field("values", &self.try_read())
            .finish()
    }
}

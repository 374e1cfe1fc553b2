//! The atomics and threads used by this crate, from `std` normally and from `loom` when model checking.
//!
//! Build with `RUSTFLAGS="--cfg loom"` to run the tests under loom.
#[cfg(not(loom))]
mod imp {
    pub(crate) use std::sync::atomic::{fence, AtomicU64, Ordering};
    pub(crate) use std::thread::yield_now;

    #[cfg(test)]
    pub(crate) use std::{sync::Arc, thread::spawn};

    /// Run a test body once.
    #[cfg(test)]
    pub(crate) fn wrap_test(body: impl Fn() + Sync + Send + 'static) {
        body()
    }
}

#[cfg(loom)]
mod imp {
    pub(crate) use loom::sync::atomic::{fence, AtomicU64, Ordering};
    pub(crate) use loom::thread::yield_now;

    #[cfg(test)]
    pub(crate) use loom::{sync::Arc, thread::spawn};

    /// Run a test body under every interleaving loom can find.
    #[cfg(test)]
    pub(crate) fn wrap_test(body: impl Fn() + Sync + Send + 'static) {
        loom::model(body)
    }
}

pub(crate) use imp::*;

thread_local! {
    static IS_AUDIO_THREAD: std::cell::Cell<bool> = const { std::cell::Cell::new(false) };
}

pub(crate) fn is_audio_thread() -> bool {
    IS_AUDIO_THREAD.with(|x| x.get())
}

/// Mark this thread as one which renders audio.
///
/// From then on, logging from this thread goes through the realtime-safe path in [crate::logging].  There is no way to
/// unmark a thread: hosts call us from the same thread for the life of the stream.
#[inline(always)]
pub(crate) fn mark_audio_thread() {
    IS_AUDIO_THREAD.with(|x| x.set(true));
}

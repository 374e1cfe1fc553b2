//! Logging from the render path.
//!
//! The renderer runs inside a host's audio callback, where allocating, locking, or writing to a terminal can miss the
//! deadline.  The `log` crate can't promise any of that: whether a log call blocks is up to whichever logger the
//! application installed.  So code on the render path logs through the `rt_*` macros defined here:
//!
//! - On a thread which has not been marked as an audio thread, they simply forward to `log`.
//! - On an audio thread, the message is formatted into a fixed-size inline buffer and pushed onto a bounded ring.  A
//!   background thread drains the ring into `log`.
//!
//! Nothing is lost silently.  Messages too long for the buffer are marked as truncated.  If the ring is full, the
//! pushing thread counts what it dropped and the next message which makes it through reports the count.  Messages
//! which sat in the ring for a long time say how late they are, since the timestamp a logger attaches is when the
//! background thread got to them rather than when they happened.
use std::fmt::Arguments as FmtArgs;
use std::thread::{park, JoinHandle};
use std::time::{Duration, Instant};

use arrayvec::ArrayString;
use thingbuf::{recycling::Recycle, ThingBuf};

/// Longest message, in bytes, which survives the trip from the audio thread intact.
const MESSAGE_CAPACITY: usize = 256;

/// How many messages may be waiting for the background thread at once.
const QUEUE_LENGTH: usize = 1024;

/// Messages delivered later than this mention their delay.
const REPORT_LATENCY: Duration = Duration::from_millis(250);

type MessageText = ArrayString<MESSAGE_CAPACITY>;

/// Message bodies which are string literals never need formatting, so they skip the buffer entirely.
#[derive(Debug)]
#[allow(clippy::large_enum_variant)] // This is a Cow that can't allocate.
pub(crate) enum MessageBody {
    Literal(&'static str),
    Formatted(MessageText),
}

pub(crate) struct QueuedMessage {
    level: log::Level,

    /// Output of `module_path!` where the macro was invoked.
    target: &'static str,

    body: MessageBody,

    truncated: bool,

    /// Messages this thread failed to enqueue before this one.
    dropped_before: u64,

    queued_at: Instant,
}

/// Writes into a [MessageText] until it fills, then quietly discards the rest and remembers that it did so.
///
/// `ArrayString`'s own `fmt::Write` impl errors on overflow, which would lose the whole message.
struct BoundedWriter<'a> {
    text: &'a mut MessageText,
    truncated: &'a mut bool,
}

impl std::fmt::Write for BoundedWriter<'_> {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        if *self.truncated {
            return Ok(());
        }

        if s.len() <= self.text.remaining_capacity() {
            self.text.push_str(s);
            return Ok(());
        }

        *self.truncated = true;

        // Capacity is in bytes, so go a character at a time to stay on a char boundary.
        for c in s.chars() {
            if self.text.try_push(c).is_err() {
                break;
            }
        }

        Ok(())
    }
}

/// Format a message without allocating.
pub(crate) fn format_message(
    level: log::Level,
    args: FmtArgs<'_>,
    target: &'static str,
) -> QueuedMessage {
    use std::fmt::Write;

    let mut truncated = false;
    let body = match args.as_str() {
        Some(literal) => MessageBody::Literal(literal),
        None => {
            let mut text = MessageText::new();
            let mut writer = BoundedWriter {
                text: &mut text,
                truncated: &mut truncated,
            };
            // BoundedWriter never returns an error, but a Display impl inside args could.  Then we keep what we got.
            let _ = write!(writer, "{}", args);
            MessageBody::Formatted(text)
        }
    };

    QueuedMessage {
        level,
        target,
        body,
        truncated,
        dropped_before: 0,
        queued_at: Instant::now(),
    }
}

struct MessageRecycler;

impl Recycle<QueuedMessage> for MessageRecycler {
    fn new_element(&self) -> QueuedMessage {
        QueuedMessage {
            level: log::Level::Trace,
            target: module_path!(),
            body: MessageBody::Literal(""),
            truncated: false,
            dropped_before: 0,
            queued_at: Instant::now(),
        }
    }

    fn recycle(&self, _element: &mut QueuedMessage) {
        // Every field is overwritten by the next push.
    }
}

struct Drain {
    thread: JoinHandle<()>,
    queue: ThingBuf<QueuedMessage, MessageRecycler>,
}

lazy_static::lazy_static! {
    // The background thread touches DRAIN as well, but only after this initializer has finished and released it.
    static ref DRAIN: Drain = Drain {
        thread: std::thread::Builder::new()
            .name("binaural-log".into())
            .spawn(drain_forever)
            .expect("Unable to start the binaural logging thread"),
        queue: ThingBuf::with_recycle(QUEUE_LENGTH, MessageRecycler),
    };
}

/// Hand a message to the background thread.  Called by the macros on audio threads.
pub(crate) fn enqueue(level: log::Level, args: FmtArgs<'_>, target: &'static str) {
    use std::cell::Cell;

    thread_local! {
        static DROPPED: Cell<u64> = const { Cell::new(0) };
    }

    if level > log::max_level() {
        return;
    }

    let mut message = format_message(level, args, target);
    message.dropped_before = DROPPED.get();

    match DRAIN.queue.push(message) {
        Ok(()) => {
            DROPPED.set(0);
            DRAIN.thread.thread().unpark();
        }
        Err(_) => DROPPED.set(DROPPED.get() + 1),
    }
}

fn deliver(message: QueuedMessage) {
    if message.dropped_before != 0 {
        log::warn!(
            "The audio thread logged faster than it could be drained; {} messages were dropped",
            message.dropped_before
        );
    }

    let body = match &message.body {
        MessageBody::Literal(s) => s,
        MessageBody::Formatted(s) => s.as_str(),
    };

    let mut suffix: smallvec::SmallVec<[u8; 64]> = smallvec::SmallVec::new();
    let latency = message.queued_at.elapsed();
    if latency > REPORT_LATENCY {
        use std::io::Write;

        // Writing to a SmallVec can't fail.
        let _ = write!(suffix, ", {:.3}s late", latency.as_secs_f64());
    }
    if message.truncated {
        suffix.extend_from_slice(b", truncated");
    }
    let suffix = std::str::from_utf8(&suffix[..]).unwrap_or("");

    log::log!(target: message.target, message.level, "{} (audio thread{})", body, suffix);
}

fn drain_forever() {
    loop {
        while let Some(message) = DRAIN.queue.pop() {
            deliver(message);
        }

        // An unpark between the last pop and this park leaves the token set, so the park returns immediately.
        park();
    }
}

/// Start the background thread now, from a thread that is allowed to spawn threads.
///
/// Renderers call this on construction, so that the first message from the audio thread doesn't do it.
pub(crate) fn ensure_log_thread() {
    std::hint::black_box(DRAIN.queue.capacity());
}

/// Like `log::log!`, but safe to call on the audio thread.  The target is always the calling module.
#[allow(clippy::crate_in_macro_def)] // Only used inside this crate.
macro_rules! rt_log {
    ($level: expr, $fmt: expr $(, $args: expr)* $(,)?) => {
        let level = $level;
        if crate::is_audio_thread::is_audio_thread() {
            crate::logging::enqueue(level, format_args!($fmt, $($args),*), module_path!());
        } else {
            log::log!(level, $fmt, $($args),*);
        }
    }
}

macro_rules! rt_error {
    ($($args: tt)+) => {
        rt_log!(log::Level::Error, $($args)+);
    }
}

macro_rules! rt_debug {
    ($($args: tt)+) => {
        rt_log!(log::Level::Debug, $($args)+);
    }
}

macro_rules! rt_trace {
    ($($args: tt)+) => {
        rt_log!(log::Level::Trace, $($args)+);
    }
}

//! `fern`-based dispatch to stderr, plus the per-thread buffered sink
//! behind the bitset log flags of `spec.md` §6. Logging is append-only:
//! diagnostic lines accumulate in a thread-local buffer and are flushed
//! to the global logger under a lock, so concurrent unitig-fleet
//! operations (`spec.md` §5) never interleave mid-line.

use std::cell::RefCell;
use std::sync::Mutex;

use lazy_static::lazy_static;
use log::LevelFilter;

use crate::config::LogFlags;

pub fn init(verbose: bool) -> Result<(), fern::InitError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("[{}] {}: {}", record.level(), record.target(), message))
        })
        .level(if verbose { LevelFilter::Debug } else { LevelFilter::Info })
        .chain(std::io::stderr())
        .apply()?;
    Ok(())
}

lazy_static! {
    static ref FLUSH_LOCK: Mutex<()> = Mutex::new(());
}

thread_local! {
    static BUFFER: RefCell<Vec<String>> = RefCell::new(Vec::new());
}

const FLUSH_THRESHOLD: usize = 256;

/// Buffers `message()` locally if `category` is set in `flags`; the
/// closure is not evaluated at all when the category is disabled, so
/// call sites can log at high volume (per-read placement, per-node
/// happiness classification) without formatting cost.
pub fn diagnostic(flags: &LogFlags, category: u32, message: impl FnOnce() -> String) {
    if !flags.is_set(category) {
        return;
    }
    BUFFER.with(|buf| {
        buf.borrow_mut().push(message());
        let len = buf.borrow().len();
        if len >= FLUSH_THRESHOLD {
            flush_buffer(&mut buf.borrow_mut());
        }
    });
}

/// Flushes this thread's buffer. Call once a pass finishes so its
/// diagnostics reach the log before the next pass starts.
pub fn flush_diagnostics() {
    BUFFER.with(|buf| flush_buffer(&mut buf.borrow_mut()));
}

fn flush_buffer(buf: &mut Vec<String>) {
    if buf.is_empty() {
        return;
    }
    let _guard = FLUSH_LOCK.lock().unwrap();
    for line in buf.drain(..) {
        log::debug!("{}", line);
    }
}

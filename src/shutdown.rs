//! Process-signal shutdown: Ctrl-C asks the UI loop to close the window,
//! which funnels every exit through the same camera-release path.

use std::sync::atomic::{AtomicBool, Ordering};

static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Whether Ctrl-C has been received.
pub fn requested() -> bool {
    SHUTDOWN_REQUESTED.load(Ordering::SeqCst)
}

/// Install the Ctrl-C handler. Called once at program startup.
pub fn install_ctrlc_handler() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(|| {
        SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_requested_by_default() {
        assert!(!requested());
    }
}

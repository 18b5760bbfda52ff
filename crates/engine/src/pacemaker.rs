use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::warn;

use banyan_core_types::Height;

/// The local timeout driver.
///
/// Tracks the current block-production height under a mutex and publishes
/// strictly increasing heights on a bounded signal channel. The replica
/// driver consumes the channel and resets its rank timer on every signal.
pub struct Pacemaker {
    cur_height: Mutex<Height>,
    new_heights: mpsc::Sender<Height>,
    timeout: Duration,
}

impl Pacemaker {
    /// Create a pacemaker with the given rank-escalation timeout.
    ///
    /// Returns the pacemaker and the consumer side of the new-height
    /// signal channel.
    pub fn new(timeout: Duration) -> (Self, mpsc::Receiver<Height>) {
        let (new_heights, rx) = mpsc::channel(100);

        let pacemaker = Self {
            cur_height: Mutex::new(Height::INITIAL),
            new_heights,
            timeout,
        };

        (pacemaker, rx)
    }

    /// Record that the given block-production height has opened.
    ///
    /// Heights at or below the current one are ignored; a fresh height is
    /// published on the signal channel.
    pub fn height_increased(&self, height: Height) {
        let mut cur = self
            .cur_height
            .lock()
            .expect("pacemaker mutex poisoned");

        if height <= *cur {
            return;
        }

        *cur = height;

        if self.new_heights.try_send(height).is_err() {
            // The channel is sized generously; a full channel means the
            // driver has stalled and only delays proposals.
            warn!(%height, "new-height signal channel full, dropping signal");
        }
    }

    /// The rank-escalation timeout.
    pub fn timeout_duration(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publishes_only_strictly_increasing_heights() {
        let (pacemaker, mut rx) = Pacemaker::new(Duration::from_millis(10));

        // The initial height is 1; equal or lower heights are no-ops.
        pacemaker.height_increased(Height::new(1));
        assert!(rx.try_recv().is_err());

        pacemaker.height_increased(Height::new(2));
        assert_eq!(rx.try_recv().ok(), Some(Height::new(2)));

        pacemaker.height_increased(Height::new(2));
        assert!(rx.try_recv().is_err());

        // Heights may skip forward.
        pacemaker.height_increased(Height::new(5));
        assert_eq!(rx.try_recv().ok(), Some(Height::new(5)));

        pacemaker.height_increased(Height::new(4));
        assert!(rx.try_recv().is_err());
    }
}

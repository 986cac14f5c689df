//! # Student change feed
//!
//! Every successful write on the `students` table is published here as a
//! [`ChangeEvent`] with a sequence number. Clients long-poll
//! `poll_student_changes(after)` with the last [`FeedCursor`] they saw:
//!
//! - `after = None` returns the current cursor and no events (subscribe).
//! - Buffered events newer than `after` are returned immediately.
//! - Otherwise the call waits up to [`POLL_TIMEOUT`] for the next publish.
//! - If `after` has fallen out of the retained window, is ahead of the log,
//!   or belongs to another epoch (a previous server process) the batch has
//!   `resync = true` and the client reloads the whole list.
//!
//! [`ChangeLog`] is the bounded log itself; [`ChangeFeed`] adds the
//! wake-up of waiting pollers and is server only.

use std::collections::VecDeque;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use store::ChangeEvent;

pub const FEED_CAPACITY: usize = 256;
pub const POLL_TIMEOUT: Duration = Duration::from_secs(25);

/// Position in the feed. Sequence numbers are only comparable within one
/// epoch; every server process starts a new one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedCursor {
    pub epoch: String,
    pub seq: u64,
}

/// Response of one poll of the change feed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeBatch {
    /// Last event the client has now seen.
    pub cursor: FeedCursor,
    pub events: Vec<ChangeEvent>,
    pub resync: bool,
}

#[derive(Debug)]
pub struct ChangeLog {
    epoch: String,
    entries: VecDeque<(u64, ChangeEvent)>,
    last_seq: u64,
    capacity: usize,
}

impl ChangeLog {
    pub fn new(epoch: impl Into<String>, capacity: usize) -> Self {
        Self {
            epoch: epoch.into(),
            entries: VecDeque::with_capacity(capacity),
            last_seq: 0,
            capacity: capacity.max(1),
        }
    }

    pub fn epoch(&self) -> &str {
        &self.epoch
    }

    pub fn cursor(&self) -> FeedCursor {
        FeedCursor {
            epoch: self.epoch.clone(),
            seq: self.last_seq,
        }
    }

    pub fn push(&mut self, event: ChangeEvent) -> u64 {
        self.last_seq += 1;
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back((self.last_seq, event));
        self.last_seq
    }

    /// Events after `after`, or a resync if they can no longer be replayed.
    pub fn since(&self, after: &FeedCursor) -> ChangeBatch {
        let oldest = self.entries.front().map_or(self.last_seq + 1, |(seq, _)| *seq);
        if after.epoch != self.epoch || after.seq > self.last_seq || after.seq + 1 < oldest {
            return ChangeBatch {
                cursor: self.cursor(),
                events: Vec::new(),
                resync: true,
            };
        }
        ChangeBatch {
            cursor: self.cursor(),
            events: self
                .entries
                .iter()
                .filter(|(seq, _)| *seq > after.seq)
                .map(|(_, event)| event.clone())
                .collect(),
            resync: false,
        }
    }
}

#[cfg(feature = "server")]
pub use server::{feed, ChangeFeed};

#[cfg(feature = "server")]
mod server {
    use std::sync::{Mutex, OnceLock};
    use std::time::Duration;

    use store::ChangeEvent;
    use tokio::sync::Notify;

    use super::{ChangeBatch, ChangeLog, FeedCursor};

    pub struct ChangeFeed {
        log: Mutex<ChangeLog>,
        notify: Notify,
    }

    impl ChangeFeed {
        /// A feed with a fresh random epoch.
        pub fn new(capacity: usize) -> Self {
            Self {
                log: Mutex::new(ChangeLog::new(uuid::Uuid::new_v4().to_string(), capacity)),
                notify: Notify::new(),
            }
        }

        fn with_log<R>(&self, f: impl FnOnce(&mut ChangeLog) -> R) -> R {
            let mut log = self.log.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            f(&mut log)
        }

        pub fn publish(&self, event: ChangeEvent) -> u64 {
            let seq = self.with_log(|log| log.push(event));
            tracing::debug!(seq, "published student change");
            self.notify.notify_waiters();
            seq
        }

        pub async fn poll(&self, after: Option<FeedCursor>, timeout: Duration) -> ChangeBatch {
            let Some(after) = after else {
                return ChangeBatch {
                    cursor: self.with_log(|log| log.cursor()),
                    ..ChangeBatch::default()
                };
            };

            let mut notified = std::pin::pin!(self.notify.notified());
            notified.as_mut().enable();

            let batch = self.with_log(|log| log.since(&after));
            if batch.resync || !batch.events.is_empty() {
                return batch;
            }

            if tokio::time::timeout(timeout, notified).await.is_err() {
                return batch;
            }
            self.with_log(|log| log.since(&after))
        }
    }

    static FEED: OnceLock<ChangeFeed> = OnceLock::new();

    /// The process-wide feed for the `students` table.
    pub fn feed() -> &'static ChangeFeed {
        FEED.get_or_init(|| ChangeFeed::new(crate::settings::settings().feed.capacity))
    }

    #[cfg(test)]
    mod tests {
        use std::sync::Arc;

        use store::Student;

        use super::*;

        fn event(id: &str) -> ChangeEvent {
            ChangeEvent::insert(Student {
                id: id.into(),
                name: id.into(),
                email: format!("{id}@x.com"),
            })
        }

        #[tokio::test]
        async fn test_poll_returns_buffered_events_immediately() {
            let feed = ChangeFeed::new(8);
            let start = feed.poll(None, Duration::ZERO).await;
            assert_eq!(start.cursor.seq, 0);
            assert!(!start.cursor.epoch.is_empty());

            feed.publish(event("a"));
            let batch = feed.poll(Some(start.cursor.clone()), Duration::from_secs(5)).await;
            assert_eq!(batch.cursor.seq, 1);
            assert_eq!(batch.cursor.epoch, start.cursor.epoch);
            assert_eq!(batch.events, vec![event("a")]);
        }

        #[tokio::test]
        async fn test_poll_times_out_with_no_events() {
            let feed = ChangeFeed::new(8);
            let start = feed.poll(None, Duration::ZERO).await;
            let batch = feed.poll(Some(start.cursor.clone()), Duration::from_millis(10)).await;
            assert_eq!(batch.cursor, start.cursor);
            assert!(batch.events.is_empty());
            assert!(!batch.resync);
        }

        #[tokio::test]
        async fn test_cursor_from_previous_process_requests_resync() {
            let old = ChangeFeed::new(8);
            for id in ["a", "b", "c"] {
                old.publish(event(id));
            }
            let stale = old.poll(None, Duration::ZERO).await.cursor;

            let restarted = ChangeFeed::new(8);
            for id in ["d", "e", "f", "g"] {
                restarted.publish(event(id));
            }
            let batch = restarted.poll(Some(stale), Duration::ZERO).await;
            assert!(batch.resync);
            assert!(batch.events.is_empty());
            assert_eq!(batch.cursor.seq, 4);
        }

        #[tokio::test]
        async fn test_waiting_poll_wakes_on_publish() {
            let feed = Arc::new(ChangeFeed::new(8));
            let start = feed.poll(None, Duration::ZERO).await.cursor;
            let poller = {
                let feed = feed.clone();
                tokio::spawn(async move { feed.poll(Some(start), Duration::from_secs(25)).await })
            };
            tokio::task::yield_now().await;
            feed.publish(event("b"));

            let batch = poller.await.unwrap();
            assert_eq!(batch.events, vec![event("b")]);
            assert!(!batch.resync);
        }
    }
}

#[cfg(test)]
mod tests {
    use store::Student;

    use super::*;

    fn event(n: u64) -> ChangeEvent {
        ChangeEvent::insert(Student {
            id: n.to_string(),
            name: format!("S{n}"),
            email: format!("s{n}@x.com"),
        })
    }

    fn at(epoch: &str, seq: u64) -> FeedCursor {
        FeedCursor {
            epoch: epoch.into(),
            seq,
        }
    }

    #[test]
    fn test_since_returns_newer_events_only() {
        let mut log = ChangeLog::new("e1", 8);
        for n in 1..=3 {
            assert_eq!(log.push(event(n)), n);
        }
        let batch = log.since(&at("e1", 1));
        assert_eq!(batch.cursor, at("e1", 3));
        assert_eq!(batch.events, vec![event(2), event(3)]);
        assert!(!batch.resync);

        let caught_up = log.since(&at("e1", 3));
        assert!(caught_up.events.is_empty());
        assert!(!caught_up.resync);
    }

    #[test]
    fn test_cursor_outside_window_requests_resync() {
        let mut log = ChangeLog::new("e1", 2);
        for n in 1..=5 {
            log.push(event(n));
        }
        // Events 4 and 5 are retained; a client at 3 is still contiguous.
        assert_eq!(log.since(&at("e1", 3)).events, vec![event(4), event(5)]);
        assert!(log.since(&at("e1", 2)).resync);
        // Ahead of the log.
        assert!(log.since(&at("e1", 9)).resync);
    }

    #[test]
    fn test_cursor_from_other_epoch_requests_resync() {
        // A restarted process that has already published past the old cursor.
        let mut log = ChangeLog::new("after-restart", 8);
        for n in 1..=6 {
            log.push(event(n));
        }
        let batch = log.since(&at("before-restart", 5));
        assert!(batch.resync);
        assert!(batch.events.is_empty());
        assert_eq!(batch.cursor, at("after-restart", 6));
    }

    #[test]
    fn test_empty_log() {
        let log = ChangeLog::new("e1", FEED_CAPACITY);
        assert_eq!(log.epoch(), "e1");
        assert_eq!(log.cursor(), at("e1", 0));
        let batch = log.since(&at("e1", 0));
        assert!(batch.events.is_empty());
        assert!(!batch.resync);
    }
}

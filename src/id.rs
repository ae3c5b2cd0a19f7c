use std::sync::atomic::{AtomicI64, Ordering};

use time::OffsetDateTime;

use crate::video::VideoId;

/// Hands out video IDs based on the creation time in milliseconds.
/// When two videos are created within the same millisecond (or the
/// clock goes backwards), the later one gets the previous ID plus one,
/// so IDs are unique and strictly increasing.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self, now: OffsetDateTime) -> VideoId {
        let millis = (now.unix_timestamp_nanos() / 1_000_000) as VideoId;

        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(millis.max(last + 1))
            })
            .unwrap_or_else(|last| last);

        millis.max(previous + 1)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    use time::macros::datetime;

    use super::IdGenerator;

    #[test]
    fn ids_follow_the_clock() {
        let ids = IdGenerator::new();
        let now = datetime!(2021-03-04 05:06:07.089 UTC);

        assert_eq!(ids.next(now), 1_614_834_367_089);
    }

    #[test]
    fn ids_within_one_millisecond_are_distinct() {
        let ids = IdGenerator::new();
        let now = datetime!(2021-03-04 05:06:07.089 UTC);

        let first = ids.next(now);
        let second = ids.next(now);
        let third = ids.next(now - time::Duration::SECOND);

        assert_eq!(second, first + 1);
        assert_eq!(third, second + 1);
    }

    #[test]
    fn ids_are_unique_across_threads() {
        let ids = Arc::new(IdGenerator::new());
        let now = datetime!(2021-03-04 05:06:07 UTC);

        let handles = (0..8)
            .map(|_| {
                let ids = ids.clone();
                thread::spawn(move || (0..100).map(|_| ids.next(now)).collect::<Vec<_>>())
            })
            .collect::<Vec<_>>();

        let all = handles
            .into_iter()
            .flat_map(|h| h.join().expect("join thread"))
            .collect::<HashSet<_>>();

        assert_eq!(all.len(), 800);
    }
}

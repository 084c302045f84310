use hygro_core::Sample;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

/// Most-recent-first list of received samples for human review.
#[derive(Debug)]
pub struct LiveFeed {
    lines:    Mutex<VecDeque<String>>,
    capacity: usize,
}

impl LiveFeed {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines:    Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Prepend a sample, dropping the least recent entry when full.
    pub fn push(&self, sample: &Sample) {
        if self.capacity == 0 {
            return;
        }
        let mut lines = self.lines.lock().unwrap_or_else(PoisonError::into_inner);
        lines.push_front(sample.feed_line());
        lines.truncate(self.capacity);
    }

    pub fn entries(&self) -> Vec<String> {
        let lines = self.lines.lock().unwrap_or_else(PoisonError::into_inner);
        lines.iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_latest_entries_newest_first() {
        let feed = LiveFeed::new(3);
        for i in 0..5 {
            feed.push(&Sample {
                relative_time: i as f64,
                temperature:   20.0,
                humidity:      i,
            });
        }
        let entries = feed.entries();
        assert_eq!(entries.len(), 3);
        assert!(entries[0].ends_with("U:  4%"));
        assert!(entries[2].ends_with("U:  2%"));
    }
}

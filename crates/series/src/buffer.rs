use hygro_core::{Channel, Sample};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Bounded, thread-safe store of index-aligned time/temperature/humidity
/// columns.
///
/// Every operation takes the single internal lock, so readers never see a
/// sample that is present in one column but not yet in the others.
#[derive(Debug)]
pub struct SeriesBuffer {
    columns:  Mutex<Columns>,
    capacity: usize,
}

#[derive(Debug, Default)]
struct Columns {
    time:        VecDeque<f64>,
    temperature: VecDeque<f64>,
    humidity:    VecDeque<i32>,
}

impl SeriesBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            columns: Mutex::new(Columns {
                time:        VecDeque::with_capacity(capacity + 1),
                temperature: VecDeque::with_capacity(capacity + 1),
                humidity:    VecDeque::with_capacity(capacity + 1),
            }),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Push a sample, evicting the oldest from all columns if over capacity.
    pub fn append(&self, sample: Sample) {
        let mut cols = self.lock();
        cols.time.push_back(sample.relative_time);
        cols.temperature.push_back(sample.temperature);
        cols.humidity.push_back(sample.humidity);

        if cols.time.len() > self.capacity {
            cols.time.pop_front();
            cols.temperature.pop_front();
            cols.humidity.pop_front();
        }
    }

    /// Owned copy of all columns; later appends are not visible through it.
    pub fn snapshot(&self) -> Snapshot {
        let cols = self.lock();
        Snapshot {
            time:        cols.time.iter().copied().collect(),
            temperature: cols.temperature.iter().copied().collect(),
            humidity:    cols.humidity.iter().copied().collect(),
        }
    }

    pub fn clear(&self) {
        let mut cols = self.lock();
        cols.time.clear();
        cols.temperature.clear();
        cols.humidity.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Relative time of the newest sample.
    pub fn last_time(&self) -> Option<f64> {
        self.lock().time.back().copied()
    }

    fn lock(&self) -> MutexGuard<'_, Columns> {
        // A panic while holding the lock can only happen between whole
        // push/pop groups, so the columns are still aligned.
        self.columns.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Immutable copy of the buffer at one instant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub time:        Vec<f64>,
    pub temperature: Vec<f64>,
    pub humidity:    Vec<i32>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// `true` when all three columns have the same length.
    pub fn is_aligned(&self) -> bool {
        self.time.len() == self.temperature.len() && self.time.len() == self.humidity.len()
    }

    /// Values of one channel as `f64`, aligned with [`Snapshot::time`].
    pub fn channel(&self, channel: Channel) -> Vec<f64> {
        match channel {
            Channel::Temperature => self.temperature.clone(),
            Channel::Humidity => self.humidity.iter().map(|&h| f64::from(h)).collect(),
        }
    }

    /// `(min, max)` of the time column.
    pub fn time_range(&self) -> Option<(f64, f64)> {
        let first = *self.time.first()?;
        Some(
            self.time
                .iter()
                .fold((first, first), |(lo, hi), &t| (lo.min(t), hi.max(t))),
        )
    }
}

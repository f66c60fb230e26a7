//! Bounded, insertion-ordered point storage with age-based visibility.
//!
//! Eviction rules:
//! - **Overflow**: when an append would exceed `max_points`, the single
//!   oldest point (lowest sequence number) is removed first.
//! - **Age**: `visible(now, lifetime)` yields only points with
//!   `now - created_at < lifetime`. Expired points stay stored until
//!   overflow or `purge_expired` removes them, so FIFO accounting is
//!   unaffected by the age filter.

use crate::error::{ScanError, ScanResult};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A colored, timestamped point. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Position in projection space
    pub position: Vector2<f64>,

    /// Distance used for coloring (cm)
    pub distance: f64,

    /// Render size hint
    pub size: Option<f64>,

    /// Creation time (monotonic seconds)
    pub created_at: f64,
}

impl Point {
    pub fn new(position: Vector2<f64>, distance: f64, size: Option<f64>, created_at: f64) -> Self {
        Self {
            position,
            distance,
            size,
            created_at,
        }
    }

    /// Seconds since creation.
    #[inline]
    pub fn age(&self, now: f64) -> f64 {
        now - self.created_at
    }

    /// True if the point may be stored.
    pub fn is_valid(&self) -> bool {
        self.distance.is_finite()
            && self.distance > 0.0
            && self.position.x.is_finite()
            && self.position.y.is_finite()
            && self.created_at.is_finite()
            && self.size.map_or(true, |s| s.is_finite() && s >= 0.0)
    }
}

/// A stored point tagged with its insertion sequence number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoredPoint {
    /// Monotonic insertion sequence number
    pub seq: u64,

    pub point: Point,
}

/// Ring buffer of points keyed by insertion sequence.
#[derive(Debug, Clone)]
pub struct PointBuffer {
    /// Points in insertion order, oldest at the front
    points: VecDeque<StoredPoint>,

    /// Capacity
    max_points: usize,

    /// Next sequence number to hand out
    next_seq: u64,

    /// Points removed by overflow since creation
    evicted: u64,

    /// Appends rejected as invalid since creation
    rejected: u64,
}

impl PointBuffer {
    /// Creates an empty buffer. `max_points` must be positive.
    pub fn new(max_points: usize) -> ScanResult<Self> {
        if max_points == 0 {
            return Err(ScanError::config("max_points must be positive"));
        }
        Ok(Self {
            points: VecDeque::with_capacity(max_points.min(1 << 16)),
            max_points,
            next_seq: 0,
            evicted: 0,
            rejected: 0,
        })
    }

    /// Appends a point, evicting the oldest on overflow.
    ///
    /// Returns `false` (and stores nothing) for non-finite or non-positive
    /// values.
    pub fn append(&mut self, point: Point) -> bool {
        if !point.is_valid() {
            self.rejected += 1;
            return false;
        }
        if self.points.len() == self.max_points {
            self.points.pop_front();
            self.evicted += 1;
        }
        self.points.push_back(StoredPoint {
            seq: self.next_seq,
            point,
        });
        self.next_seq += 1;
        true
    }

    /// Points younger than `lifetime` at `now`, in insertion order.
    ///
    /// Does not mutate the buffer.
    pub fn visible(&self, now: f64, lifetime: f64) -> impl Iterator<Item = &Point> + '_ {
        self.points
            .iter()
            .map(|stored| &stored.point)
            .filter(move |p| p.age(now) < lifetime)
    }

    /// Owned copy of the visible set.
    pub fn visible_snapshot(&self, now: f64, lifetime: f64) -> Vec<Point> {
        self.visible(now, lifetime).copied().collect()
    }

    /// Number of visible points.
    pub fn visible_count(&self, now: f64, lifetime: f64) -> usize {
        self.visible(now, lifetime).count()
    }

    /// Removes expired points from the front of the buffer.
    ///
    /// Only a leading run of expired points is removed, so the relative
    /// order of everything that remains is untouched and the visible set is
    /// unchanged. Returns the number removed.
    pub fn purge_expired(&mut self, now: f64, lifetime: f64) -> usize {
        let mut removed = 0;
        while let Some(front) = self.points.front() {
            if front.point.age(now) < lifetime {
                break;
            }
            self.points.pop_front();
            removed += 1;
        }
        removed
    }

    /// Empties the buffer. Sequence numbers keep increasing.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_points
    }

    /// Oldest stored point.
    pub fn oldest(&self) -> Option<&StoredPoint> {
        self.points.front()
    }

    /// All stored points (expired included), oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &StoredPoint> + '_ {
        self.points.iter()
    }

    /// Points removed by overflow since creation.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    /// Appends rejected as invalid since creation.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }
}

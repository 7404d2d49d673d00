use std::collections::VecDeque;

use glam::Vec2;

/// Bounded trail of recent cursor positions, drawn behind the cursor.
pub struct MotionTrail {
    points: VecDeque<Vec2>,
    capacity: usize,
    min_step: f32,
}

impl MotionTrail {
    pub fn new(capacity: usize, min_step: f32) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
            min_step,
        }
    }

    /// Append `point` (rounded to whole pixels) if it moved far enough on
    /// either axis. Returns whether it was added.
    pub fn push(&mut self, point: Vec2) -> bool {
        let point = point.round();
        if let Some(last) = self.points.back() {
            let delta = (point - *last).abs();
            if delta.x <= self.min_step && delta.y <= self.min_step {
                return false;
            }
        }
        self.points.push_back(point);
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
        true
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.points.iter().copied()
    }
}

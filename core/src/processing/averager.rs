use ndarray::{Array2, Axis};
use std::collections::VecDeque;

/// Bounded FIFO of recent power arrays, averaged elementwise once full.
pub struct FrameAverager {
    frames: VecDeque<Vec<f64>>,
    max_capacity: usize,
}

impl FrameAverager {
    pub fn with_capacity(max_capacity: usize) -> Self {
        let max_capacity = max_capacity.max(1);
        Self {
            frames: VecDeque::with_capacity(max_capacity),
            max_capacity,
        }
    }

    /// Appends a frame, evicting the oldest on overflow. A frame whose length
    /// differs from the buffered ones restarts the buffer.
    pub fn push(&mut self, power_db: &[f64]) {
        if self
            .frames
            .front()
            .is_some_and(|front| front.len() != power_db.len())
        {
            self.frames.clear();
        }
        if self.frames.len() == self.max_capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(power_db.to_vec());
    }

    pub fn is_full(&self) -> bool {
        self.frames.len() >= self.max_capacity
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Elementwise mean of the buffered frames, available once the buffer is full.
    pub fn average(&self) -> Option<Vec<f64>> {
        if !self.is_full() {
            return None;
        }
        let width = self.frames.front()?.len();
        let flat: Vec<f64> = self.frames.iter().flatten().copied().collect();
        let stacked = Array2::from_shape_vec((self.frames.len(), width), flat).ok()?;
        stacked.mean_axis(Axis(0)).map(|mean| mean.to_vec())
    }

    pub fn reset(&mut self) {
        self.frames.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_waits_for_full_buffer() {
        let mut averager = FrameAverager::with_capacity(2);
        averager.push(&[1.0, 2.0]);
        assert!(averager.average().is_none());
        averager.push(&[3.0, 6.0]);
        assert_eq!(averager.average(), Some(vec![2.0, 4.0]));
    }

    #[test]
    fn oldest_frame_is_evicted() {
        let mut averager = FrameAverager::with_capacity(2);
        for frame in [[0.0, 0.0], [2.0, 2.0], [4.0, 8.0]] {
            averager.push(&frame);
        }
        assert_eq!(averager.len(), 2);
        assert_eq!(averager.average(), Some(vec![3.0, 5.0]));
    }

    #[test]
    fn length_change_restarts_buffer() {
        let mut averager = FrameAverager::with_capacity(2);
        averager.push(&[1.0, 1.0]);
        averager.push(&[1.0, 1.0, 1.0]);
        assert_eq!(averager.len(), 1);
        averager.reset();
        assert!(averager.is_empty());
    }

    #[test]
    fn single_frame_capacity_passes_frames_through() {
        let mut averager = FrameAverager::with_capacity(1);
        averager.push(&[-80.0, -70.0]);
        assert_eq!(averager.average(), Some(vec![-80.0, -70.0]));
    }
}

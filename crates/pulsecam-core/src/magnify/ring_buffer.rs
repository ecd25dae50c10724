use ndarray::{Array3, Array4, ArrayView3, ArrayView4, Axis};

use crate::error::{PulseError, Result};

/// Fixed-capacity history of pyramid levels, one slot per recent frame.
///
/// Slots are overwritten in write order; once the cursor wraps, slot order
/// is a rotation of chronological order.
#[derive(Clone, Debug)]
pub struct TemporalRingBuffer {
    /// Shape = (capacity, height, width, channels)
    slots: Array4<f32>,
    cursor: usize,
}

impl TemporalRingBuffer {
    /// Create a zero-filled buffer for levels of shape `(height, width, channels)`.
    pub fn new(capacity: usize, level_dim: (usize, usize, usize)) -> Result<Self> {
        if capacity == 0 {
            return Err(PulseError::InvalidConfig(
                "Temporal buffer capacity must be > 0".into(),
            ));
        }
        let (h, w, c) = level_dim;
        Ok(Self {
            slots: Array4::zeros((capacity, h, w, c)),
            cursor: 0,
        })
    }

    /// Overwrite the slot at the cursor and advance it. Returns the index of
    /// the slot that was written.
    pub fn push(&mut self, level: &Array3<f32>) -> Result<usize> {
        let (_, h, w, c) = self.slots.dim();
        let (lh, lw, lc) = level.dim();
        if lc != c {
            return Err(PulseError::InvalidChannelCount(lc));
        }
        if lh != h || lw != w {
            return Err(PulseError::InvalidDimensions {
                expected_width: w,
                expected_height: h,
                width: lw,
                height: lh,
            });
        }

        let written = self.cursor;
        self.slots.index_axis_mut(Axis(0), written).assign(level);
        self.cursor = (written + 1) % self.capacity();
        Ok(written)
    }

    /// Index of the slot the next push will overwrite.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn capacity(&self) -> usize {
        self.slots.len_of(Axis(0))
    }

    /// Shape (height, width, channels) of a single slot.
    pub fn level_dim(&self) -> (usize, usize, usize) {
        let (_, h, w, c) = self.slots.dim();
        (h, w, c)
    }

    pub fn slot(&self, index: usize) -> ArrayView3<'_, f32> {
        self.slots.index_axis(Axis(0), index)
    }

    /// All slots in write order, time on axis 0.
    pub fn view(&self) -> ArrayView4<'_, f32> {
        self.slots.view()
    }
}

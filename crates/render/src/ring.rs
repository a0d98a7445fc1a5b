use crate::RenderError;
use bytemuck::Pod;
use serde::Serialize;

/// Location of one constant block inside the ring buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConstantSlot {
    /// Byte offset, used as the dynamic offset when binding.
    pub offset: u32,
    pub size: u32,
}

/// Per-frame linear allocator for shader constants.
///
/// Draws push their constants here while the frame is recorded; the staged
/// bytes are then uploaded to one uniform buffer in a single write and each
/// draw binds its slot with a dynamic offset.
///
/// # Invariants
/// - Every slot offset is a multiple of `alignment`.
/// - Slots handed out within a frame never overlap.
/// - A push that does not fit fails instead of wrapping onto live data.
#[derive(Debug, Clone)]
pub struct ConstantRing {
    bytes: Vec<u8>,
    alignment: u64,
    cursor: u64,
    high_water: u64,
}

impl ConstantRing {
    /// `alignment` must be a non-zero power of two and `capacity` must hold at least one slot.
    pub fn new(capacity: u64, alignment: u64) -> Result<Self, RenderError> {
        if !alignment.is_power_of_two() || capacity < alignment {
            return Err(RenderError::InvalidRing {
                capacity,
                alignment,
            });
        }
        Ok(Self {
            bytes: vec![0; capacity as usize],
            alignment,
            cursor: 0,
            high_water: 0,
        })
    }

    pub fn capacity(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn alignment(&self) -> u64 {
        self.alignment
    }

    /// Start a new frame. Previously issued slots become invalid.
    pub fn begin_frame(&mut self) {
        self.cursor = 0;
    }

    pub fn push<T: Pod>(&mut self, value: &T) -> Result<ConstantSlot, RenderError> {
        self.push_bytes(bytemuck::bytes_of(value))
    }

    pub fn push_bytes(&mut self, data: &[u8]) -> Result<ConstantSlot, RenderError> {
        let offset = self.cursor.next_multiple_of(self.alignment);
        let size = data.len() as u64;
        let end = offset + size;
        if end > self.capacity() {
            return Err(RenderError::RingExhausted {
                requested: size,
                remaining: self.remaining(),
            });
        }
        self.bytes[offset as usize..end as usize].copy_from_slice(data);
        self.cursor = end;
        self.high_water = self.high_water.max(end);
        Ok(ConstantSlot {
            offset: offset as u32,
            size: size as u32,
        })
    }

    /// Bytes written since [`begin_frame`](Self::begin_frame), padding included.
    pub fn staged(&self) -> &[u8] {
        &self.bytes[..self.cursor as usize]
    }

    pub fn used(&self) -> u64 {
        self.cursor
    }

    /// Bytes left after the next aligned offset.
    pub fn remaining(&self) -> u64 {
        self.capacity()
            .saturating_sub(self.cursor.next_multiple_of(self.alignment))
    }

    /// Largest `used()` seen over the ring's lifetime.
    pub fn high_water_mark(&self) -> u64 {
        self.high_water
    }
}

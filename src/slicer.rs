//! Volume slicer - re-segments voxel data into slices.
//!
//! A slice is every voxel sharing one index along the third axis, so each
//! slice is `dim[1] * dim[2] * (bitpix / 8)` bytes. Incoming chunks are cut
//! at slice boundaries; each piece is reported as a [`VolumeEvent::Chunk`],
//! and when a slice is complete its bytes are reported as a
//! [`VolumeEvent::Slice`].

use crate::error::{NiftiError, Result};
use crate::parsing::NiftiHeader;
use bytes::{Bytes, BytesMut};
use std::collections::VecDeque;
use tracing::{trace, warn};

/// Position within the volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SliceCursor {
    pub slice_index: usize,
    /// Resets to 0 when a slice completes.
    pub bytes_into_slice: usize,
}

/// How much of the next chunk belongs to the current slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceStep {
    pub take: usize,
    pub completes: bool,
}

impl SliceCursor {
    pub fn step(&self, slice_size: usize, available: usize) -> SliceStep {
        let wanted = slice_size - self.bytes_into_slice;
        let take = wanted.min(available);
        SliceStep {
            take,
            completes: take == wanted,
        }
    }

    pub fn advance(self, step: SliceStep) -> Self {
        if step.completes {
            Self {
                slice_index: self.slice_index + 1,
                bytes_into_slice: 0,
            }
        } else {
            Self {
                slice_index: self.slice_index,
                bytes_into_slice: self.bytes_into_slice + step.take,
            }
        }
    }
}

/// Which volume events a consumer wants.
///
/// Whole slices are only buffered when `slices` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Subscription {
    pub chunks: bool,
    pub slices: bool,
}

impl Subscription {
    pub const fn chunks() -> Self {
        Self {
            chunks: true,
            slices: false,
        }
    }

    pub const fn slices() -> Self {
        Self {
            chunks: false,
            slices: true,
        }
    }

    pub const fn all() -> Self {
        Self {
            chunks: true,
            slices: true,
        }
    }

    pub const fn union(self, other: Self) -> Self {
        Self {
            chunks: self.chunks || other.chunks,
            slices: self.slices || other.slices,
        }
    }

    /// No subscription at all means everything.
    pub const fn or_all(self) -> Self {
        if self.chunks || self.slices {
            self
        } else {
            Self::all()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeEvent {
    /// A piece of slice `slice`, in arrival order.
    Chunk { slice: usize, data: Bytes },
    /// All bytes of slice `slice`. The last slice may be short if the
    /// source ended early.
    Slice { slice: usize, data: Bytes },
}

impl VolumeEvent {
    pub fn slice(&self) -> usize {
        match self {
            Self::Chunk { slice, .. } | Self::Slice { slice, .. } => *slice,
        }
    }

    pub fn data(&self) -> &Bytes {
        match self {
            Self::Chunk { data, .. } | Self::Slice { data, .. } => data,
        }
    }
}

#[derive(Debug)]
pub struct VolumeSlicer {
    slice_size: usize,
    cursor: SliceCursor,
    subscription: Subscription,
    pending: BytesMut,
}

impl VolumeSlicer {
    /// `slice_size` must be positive.
    pub fn new(slice_size: usize, subscription: Subscription) -> Self {
        debug_assert!(slice_size > 0);
        Self {
            slice_size,
            cursor: SliceCursor::default(),
            subscription,
            pending: BytesMut::new(),
        }
    }

    pub fn for_header(header: &NiftiHeader, subscription: Subscription) -> Result<Self> {
        let slice_size = header
            .slice_byte_size()
            .ok_or(NiftiError::InvalidSliceSize {
                dim1: header.dim[1],
                dim2: header.dim[2],
                bitpix: header.bitpix,
            })?;
        Ok(Self::new(slice_size, subscription))
    }

    pub fn slice_size(&self) -> usize {
        self.slice_size
    }

    pub fn cursor(&self) -> SliceCursor {
        self.cursor
    }

    pub fn push(&mut self, mut chunk: Bytes, out: &mut VecDeque<VolumeEvent>) {
        while !chunk.is_empty() {
            let step = self.cursor.step(self.slice_size, chunk.len());
            let slice = self.cursor.slice_index;
            let piece = chunk.split_to(step.take);

            let whole = if !self.subscription.slices {
                None
            } else if step.completes && self.pending.is_empty() {
                Some(piece.clone())
            } else {
                self.pending.extend_from_slice(&piece);
                step.completes.then(|| self.pending.split().freeze())
            };

            if self.subscription.chunks {
                out.push_back(VolumeEvent::Chunk { slice, data: piece });
            }
            if let Some(data) = whole {
                trace!(slice, len = data.len(), "slice complete");
                out.push_back(VolumeEvent::Slice { slice, data });
            }

            self.cursor = self.cursor.advance(step);
        }
    }

    /// Flush a partially filled final slice.
    pub fn finish(&mut self, out: &mut VecDeque<VolumeEvent>) {
        if self.pending.is_empty() {
            return;
        }
        let slice = self.cursor.slice_index;
        warn!(
            slice,
            have = self.pending.len(),
            expected = self.slice_size,
            "source ended inside a slice"
        );
        out.push_back(VolumeEvent::Slice {
            slice,
            data: self.pending.split().freeze(),
        });
    }
}

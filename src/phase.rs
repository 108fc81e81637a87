//! Phase controller - splits the head of a NIFTI-1 stream into regions.
//!
//! A single-file dataset is read in three phases:
//!
//! ```text
//! offset 0        352                vox_offset
//!   ┌──────────────┬──────────────────┬──────────────────────────
//!   │ Header       │ Extension        │ Volume ...
//!   └──────────────┴──────────────────┴──────────────────────────
//! ```
//!
//! The controller is sans-IO: callers [`feed`](PhaseController::feed) it
//! chunks as they arrive and it answers with events. It never consumes past
//! the boundary of the phase it is in; once the volume starts, the rest of
//! the chunk is handed back untouched.

use crate::error::{NiftiError, Result};
use crate::options::StreamOptions;
use crate::parsing::{HeaderParser, NiftiHeader, HEADER_REGION_SIZE};
use bytes::{Buf, Bytes, BytesMut};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, warn};

/// Position of the stream within the file layout. Never moves backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Header,
    Extension,
    Volume,
}

/// Regions produced by the phase controller, in causal order.
#[derive(Debug, Clone, PartialEq)]
pub enum NiftiEvent {
    /// The header has been decoded.
    Header(Arc<NiftiHeader>),
    /// The raw extension region, only when `vox_offset > 352`.
    Extension(Bytes),
    /// The stream is positioned at the first voxel byte.
    VolumeReady,
}

#[derive(Debug)]
pub struct PhaseController {
    phase: Phase,
    options: StreamOptions,
    arena: BytesMut,
    extension_len: usize,
    header: Option<Arc<NiftiHeader>>,
    extension: Option<Bytes>,
    failed: bool,
}

impl PhaseController {
    pub fn new(options: StreamOptions) -> Self {
        Self {
            phase: Phase::Header,
            options,
            arena: BytesMut::with_capacity(HEADER_REGION_SIZE),
            extension_len: 0,
            header: None,
            extension: None,
            failed: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn header(&self) -> Option<&Arc<NiftiHeader>> {
        self.header.as_ref()
    }

    pub fn extension(&self) -> Option<&Bytes> {
        self.extension.as_ref()
    }

    /// Bytes held back while waiting for the current boundary.
    pub fn buffered(&self) -> usize {
        self.arena.len()
    }

    /// Bytes still missing before the current phase completes.
    pub fn bytes_needed(&self) -> usize {
        match self.phase {
            Phase::Header => HEADER_REGION_SIZE - self.arena.len(),
            Phase::Extension => self.extension_len - self.arena.len(),
            Phase::Volume => 0,
        }
    }

    /// Consume `chunk` up to the next phase boundary.
    ///
    /// Returns `Some(rest)` once the volume phase is reached, where `rest`
    /// holds the bytes of `chunk` past the boundary (possibly empty).
    pub fn feed(
        &mut self,
        chunk: Bytes,
        events: &mut VecDeque<NiftiEvent>,
    ) -> Result<Option<Bytes>> {
        if self.failed {
            return Err(NiftiError::InvalidState("stream already failed"));
        }
        if self.phase == Phase::Volume {
            return Err(NiftiError::InvalidState(
                "volume data is owned by the volume stream",
            ));
        }
        let result = self.advance(chunk, events);
        if result.is_err() {
            self.failed = true;
        }
        result
    }

    /// Signal end-of-data. Fails unless the volume phase was reached.
    pub fn finish(&self) -> Result<()> {
        match self.phase {
            Phase::Header => Err(NiftiError::TruncatedHeader {
                have: self.arena.len(),
                needed: HEADER_REGION_SIZE,
            }),
            Phase::Extension => Err(NiftiError::TruncatedExtension {
                have: self.arena.len(),
                needed: self.extension_len,
            }),
            Phase::Volume => Ok(()),
        }
    }

    fn advance(
        &mut self,
        mut chunk: Bytes,
        events: &mut VecDeque<NiftiEvent>,
    ) -> Result<Option<Bytes>> {
        loop {
            match self.phase {
                Phase::Header => {
                    let Some(region) = self.take_region(&mut chunk, HEADER_REGION_SIZE) else {
                        return Ok(None);
                    };
                    self.on_header(&region, events)?;
                }
                Phase::Extension => {
                    let Some(region) = self.take_region(&mut chunk, self.extension_len) else {
                        return Ok(None);
                    };
                    debug!(len = region.len(), "extension complete");
                    self.extension = Some(region.clone());
                    events.push_back(NiftiEvent::Extension(region));
                    self.enter_volume(events);
                }
                Phase::Volume => {
                    debug!(handoff = chunk.len(), "handing off to volume stream");
                    return Ok(Some(chunk));
                }
            }
        }
    }

    /// Take exactly `size` bytes across calls, splitting `chunk` at the
    /// boundary. Zero-copy when one chunk covers the whole region.
    fn take_region(&mut self, chunk: &mut Bytes, size: usize) -> Option<Bytes> {
        if self.arena.is_empty() && chunk.len() >= size {
            return Some(chunk.split_to(size));
        }

        let take = (size - self.arena.len()).min(chunk.len());
        self.arena.extend_from_slice(&chunk[..take]);
        chunk.advance(take);

        if self.arena.len() == size {
            Some(self.arena.split().freeze())
        } else {
            None
        }
    }

    fn on_header(&mut self, region: &[u8], events: &mut VecDeque<NiftiEvent>) -> Result<()> {
        let header = match self.options.byte_order {
            Some(order) => HeaderParser::parse_with(region, order)?,
            None => HeaderParser::parse(region)?,
        };

        if let Err(err) = header.validate() {
            if self.options.strict {
                return Err(err);
            }
            warn!(%err, "continuing with malformed header");
        }

        let extension_len = header.extension_len();
        if extension_len > self.options.max_extension_size {
            return Err(NiftiError::ExtensionTooLarge {
                len: extension_len,
                limit: self.options.max_extension_size,
            });
        }

        debug!(
            byte_order = %header.endianness,
            dim = ?header.dim,
            datatype = ?header.datatype,
            bitpix = header.bitpix,
            vox_offset = header.vox_offset,
            "decoded NIFTI-1 header"
        );

        let header = Arc::new(header);
        self.header = Some(Arc::clone(&header));
        events.push_back(NiftiEvent::Header(header));

        if extension_len > 0 {
            self.extension_len = extension_len;
            self.phase = Phase::Extension;
        } else {
            self.enter_volume(events);
        }
        Ok(())
    }

    fn enter_volume(&mut self, events: &mut VecDeque<NiftiEvent>) {
        self.phase = Phase::Volume;
        self.arena = BytesMut::new();
        events.push_back(NiftiEvent::VolumeReady);
    }
}

//! NiftiStream - pull-driven reader for the head of a NIFTI-1 stream.
//!
//! A stream is created idle. Nothing is read from the source until the
//! caller iterates [`NiftiStream::events`] (or calls one of the driving
//! helpers), and each step pulls at most one chunk.
//!
//! ```rust,ignore
//! use nifti_stream::{NiftiEvent, NiftiStream, Subscription, VolumeEvent};
//!
//! let mut nifti = NiftiStream::from_reader(std::fs::File::open("brain.nii")?);
//! for event in nifti.events() {
//!     match event? {
//!         NiftiEvent::Header(header) => println!("dim = {:?}", header.dim),
//!         NiftiEvent::Extension(data) => println!("{} extension bytes", data.len()),
//!         NiftiEvent::VolumeReady => {}
//!     }
//! }
//! let mut volume = nifti.into_volume_stream()?;
//! volume.subscribe(Subscription::slices())?;
//! for event in volume.events() {
//!     if let VolumeEvent::Slice { slice, data } = event? {
//!         println!("slice {}: {} bytes", slice, data.len());
//!     }
//! }
//! ```

use crate::chunk_source::{ChunksOf, ReadChunks};
use crate::error::{NiftiError, Result};
use crate::options::StreamOptions;
use crate::parsing::NiftiHeader;
use crate::phase::{NiftiEvent, Phase, PhaseController};
use crate::volume_stream::VolumeStream;
use bytes::Bytes;
use std::collections::VecDeque;
use std::io::{self, Read};
use std::sync::Arc;

pub struct NiftiStream<S> {
    source: S,
    controller: PhaseController,
    queue: VecDeque<NiftiEvent>,
    handoff: Option<Bytes>,
    started: bool,
    done: bool,
}

impl<R: Read> NiftiStream<ReadChunks<R>> {
    /// Read from `reader` in chunks of the default size.
    pub fn from_reader(reader: R) -> Self {
        Self::from_reader_with_options(reader, StreamOptions::default())
    }

    pub fn from_reader_with_options(reader: R, options: StreamOptions) -> Self {
        Self::with_options(ReadChunks::new(reader, options.chunk_size), options)
    }
}

impl NiftiStream<ChunksOf> {
    /// Stream a buffer already held in memory.
    pub fn from_bytes(data: impl Into<Bytes>, options: StreamOptions) -> Self {
        Self::with_options(ChunksOf::new(data, options.chunk_size), options)
    }
}

impl<S> NiftiStream<S>
where
    S: Iterator<Item = io::Result<Bytes>>,
{
    pub fn new(source: S) -> Self {
        Self::with_options(source, StreamOptions::default())
    }

    pub fn with_options(source: S, options: StreamOptions) -> Self {
        Self {
            source,
            controller: PhaseController::new(options),
            queue: VecDeque::new(),
            handoff: None,
            started: false,
            done: false,
        }
    }

    /// Start (or continue) consuming the source.
    ///
    /// Calling this again resumes where the previous iterator stopped; the
    /// source is never restarted. The iterator ends after
    /// [`NiftiEvent::VolumeReady`] or after the first error.
    pub fn events(&mut self) -> Events<'_, S> {
        self.started = true;
        Events { stream: self }
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn phase(&self) -> Phase {
        self.controller.phase()
    }

    pub fn header(&self) -> Option<&Arc<NiftiHeader>> {
        self.controller.header()
    }

    /// Drive the source until the header is decoded.
    ///
    /// Events produced on the way stay queued for [`events`](Self::events).
    pub fn read_header(&mut self) -> Result<Arc<NiftiHeader>> {
        self.started = true;
        loop {
            if let Some(header) = self.controller.header() {
                return Ok(Arc::clone(header));
            }
            if self.done {
                return Err(NiftiError::InvalidState("stream ended without a header"));
            }
            self.pump()?;
        }
    }

    /// The extension region, `None` when the file has none.
    ///
    /// Only known once the volume phase is reached.
    pub fn extension_data(&self) -> Result<Option<&Bytes>> {
        if self.phase() != Phase::Volume {
            return Err(NiftiError::InvalidState(
                "extension data is not available yet",
            ));
        }
        Ok(self.controller.extension())
    }

    /// Hand the rest of the source to a [`VolumeStream`].
    pub fn into_volume_stream(mut self) -> Result<VolumeStream<S>> {
        if self.phase() != Phase::Volume {
            return Err(NiftiError::InvalidState(
                "volume stream is not available yet",
            ));
        }
        let header = self
            .controller
            .header()
            .cloned()
            .ok_or(NiftiError::InvalidState("volume phase without a header"))?;
        let leading = self.handoff.take().unwrap_or_default();
        Ok(VolumeStream::new(header, leading, self.source))
    }

    /// Drive the source to the volume phase, then hand it off.
    pub fn open_volume(mut self) -> Result<VolumeStream<S>> {
        self.started = true;
        while !self.done && self.phase() != Phase::Volume {
            self.pump()?;
        }
        self.into_volume_stream()
    }

    /// Pull one chunk and feed it to the controller.
    fn pump(&mut self) -> Result<()> {
        let result = match self.source.next() {
            None => {
                self.done = true;
                self.controller.finish()
            }
            Some(Err(e)) => Err(e.into()),
            Some(Ok(chunk)) => self
                .controller
                .feed(chunk, &mut self.queue)
                .map(|rest| {
                    if rest.is_some() {
                        self.handoff = rest;
                    }
                }),
        };
        if result.is_err() {
            self.done = true;
        }
        result
    }
}

/// Iterator over [`NiftiEvent`]s. See [`NiftiStream::events`].
pub struct Events<'a, S> {
    stream: &'a mut NiftiStream<S>,
}

impl<S> Iterator for Events<'_, S>
where
    S: Iterator<Item = io::Result<Bytes>>,
{
    type Item = Result<NiftiEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(event) = self.stream.queue.pop_front() {
                return Some(Ok(event));
            }
            if self.stream.done || self.stream.phase() == Phase::Volume {
                return None;
            }
            if let Err(e) = self.stream.pump() {
                return Some(Err(e));
            }
        }
    }
}

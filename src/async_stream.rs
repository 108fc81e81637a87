//! Async drivers over a tokio `AsyncRead`.
//!
//! Same sans-IO core as the blocking streams. While the header and
//! extension are being read, each read asks for at most
//! [`PhaseController::bytes_needed`] bytes, so the reader is left positioned
//! exactly at the first voxel byte.
//!
//! ```rust,ignore
//! use nifti_stream::{AsyncNiftiStream, Subscription, VolumeEvent};
//!
//! let file = tokio::fs::File::open("brain.nii").await?;
//! let mut nifti = AsyncNiftiStream::new(file);
//! let header = nifti.read_header().await?;
//! let mut volume = nifti.open_volume().await?;
//! volume.subscribe(Subscription::slices())?;
//! while let Some(event) = volume.next_event().await {
//!     if let VolumeEvent::Slice { slice, data } = event? {
//!         println!("slice {slice}: {} bytes", data.len());
//!     }
//! }
//! ```

use crate::error::{NiftiError, Result};
use crate::options::StreamOptions;
use crate::parsing::NiftiHeader;
use crate::phase::{NiftiEvent, Phase, PhaseController};
use crate::slicer::{Subscription, VolumeEvent, VolumeSlicer};
use bytes::Bytes;
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Read up to `limit` bytes; `None` at end of data.
async fn read_chunk<R>(reader: &mut R, limit: usize) -> io::Result<Option<Bytes>>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = vec![0u8; limit.max(1)];
    let n = reader.read(&mut buffer).await?;
    if n == 0 {
        return Ok(None);
    }
    buffer.truncate(n);
    Ok(Some(Bytes::from(buffer)))
}

pub struct AsyncNiftiStream<R> {
    reader: R,
    chunk_size: usize,
    controller: PhaseController,
    queue: VecDeque<NiftiEvent>,
    handoff: Option<Bytes>,
    done: bool,
}

impl<R: AsyncRead + Unpin> AsyncNiftiStream<R> {
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, StreamOptions::default())
    }

    pub fn with_options(reader: R, options: StreamOptions) -> Self {
        Self {
            reader,
            chunk_size: options.chunk_size.max(1),
            controller: PhaseController::new(options),
            queue: VecDeque::new(),
            handoff: None,
            done: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.controller.phase()
    }

    pub fn header(&self) -> Option<&Arc<NiftiHeader>> {
        self.controller.header()
    }

    /// Next event, or `None` after [`NiftiEvent::VolumeReady`] or an error.
    pub async fn next_event(&mut self) -> Option<Result<NiftiEvent>> {
        loop {
            if let Some(event) = self.queue.pop_front() {
                return Some(Ok(event));
            }
            if self.done || self.phase() == Phase::Volume {
                return None;
            }
            if let Err(e) = self.pump().await {
                return Some(Err(e));
            }
        }
    }

    /// Read until the header is decoded. Events stay queued.
    pub async fn read_header(&mut self) -> Result<Arc<NiftiHeader>> {
        loop {
            if let Some(header) = self.controller.header() {
                return Ok(Arc::clone(header));
            }
            if self.done {
                return Err(NiftiError::InvalidState("stream ended without a header"));
            }
            self.pump().await?;
        }
    }

    pub fn extension_data(&self) -> Result<Option<&Bytes>> {
        if self.phase() != Phase::Volume {
            return Err(NiftiError::InvalidState(
                "extension data is not available yet",
            ));
        }
        Ok(self.controller.extension())
    }

    pub fn into_volume_stream(mut self) -> Result<AsyncVolumeStream<R>> {
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
        Ok(AsyncVolumeStream {
            header,
            leading: self.handoff.take().filter(|b| !b.is_empty()),
            reader: self.reader,
            chunk_size: self.chunk_size,
            subscription: Subscription::default(),
            slicer: None,
            queue: VecDeque::new(),
            started: false,
            done: false,
        })
    }

    pub async fn open_volume(mut self) -> Result<AsyncVolumeStream<R>> {
        while !self.done && self.phase() != Phase::Volume {
            self.pump().await?;
        }
        self.into_volume_stream()
    }

    async fn pump(&mut self) -> Result<()> {
        let limit = self.controller.bytes_needed().min(self.chunk_size);
        let result = match read_chunk(&mut self.reader, limit).await {
            Ok(None) => {
                self.done = true;
                self.controller.finish()
            }
            Err(e) => Err(e.into()),
            Ok(Some(chunk)) => self
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

pub struct AsyncVolumeStream<R> {
    header: Arc<NiftiHeader>,
    leading: Option<Bytes>,
    reader: R,
    chunk_size: usize,
    subscription: Subscription,
    slicer: Option<VolumeSlicer>,
    queue: VecDeque<VolumeEvent>,
    started: bool,
    done: bool,
}

impl<R: AsyncRead + Unpin> AsyncVolumeStream<R> {
    pub fn header(&self) -> &Arc<NiftiHeader> {
        &self.header
    }

    pub fn slice_byte_size(&self) -> Option<usize> {
        self.header.slice_byte_size()
    }

    pub fn subscribe(&mut self, subscription: Subscription) -> Result<()> {
        if self.started {
            return Err(NiftiError::InvalidState(
                "cannot subscribe after the volume stream has started",
            ));
        }
        self.subscription = self.subscription.union(subscription);
        Ok(())
    }

    pub async fn next_event(&mut self) -> Option<Result<VolumeEvent>> {
        self.started = true;
        loop {
            if let Some(event) = self.queue.pop_front() {
                return Some(Ok(event));
            }
            if self.done {
                return None;
            }
            if let Err(e) = self.pump().await {
                self.done = true;
                return Some(Err(e));
            }
        }
    }

    /// The reader, positioned after any bytes returned alongside it.
    pub fn into_raw(self) -> Result<(Bytes, R)> {
        if self.started {
            return Err(NiftiError::InvalidState(
                "volume stream already started slicing",
            ));
        }
        Ok((self.leading.unwrap_or_default(), self.reader))
    }

    async fn pump(&mut self) -> Result<()> {
        if self.slicer.is_none() {
            let subscription = self.subscription.or_all();
            self.slicer = Some(VolumeSlicer::for_header(&self.header, subscription)?);
        }
        let chunk = match self.leading.take() {
            Some(leading) => Some(leading),
            None => read_chunk(&mut self.reader, self.chunk_size).await?,
        };
        let Some(slicer) = self.slicer.as_mut() else {
            return Err(NiftiError::InvalidState("volume slicer missing"));
        };
        match chunk {
            Some(chunk) => slicer.push(chunk, &mut self.queue),
            None => {
                self.done = true;
                slicer.finish(&mut self.queue);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{volume_pattern, HeaderFixture};
    use crate::parsing::Endianness;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_events_in_order() {
        let extension = [3u8; 24];
        let fixture = HeaderFixture::small(2, 2, 2, 8).with_extension(extension.len());
        let data = fixture.file(Endianness::Little, &extension, &[1, 2, 3, 4, 5, 6, 7, 8]);
        let mut stream = AsyncNiftiStream::new(&data[..]);

        let mut events = Vec::new();
        while let Some(event) = stream.next_event().await {
            events.push(event.unwrap());
        }
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], NiftiEvent::Header(_)));
        assert_eq!(events[1], NiftiEvent::Extension(Bytes::copy_from_slice(&extension)));
        assert_eq!(events[2], NiftiEvent::VolumeReady);
        assert_eq!(stream.extension_data().unwrap().unwrap().len(), 24);
    }

    #[tokio::test]
    async fn test_reader_left_at_volume_start() {
        let data = HeaderFixture::small(2, 2, 2, 8).file(
            Endianness::Big,
            &[],
            &[1, 2, 3, 4, 5, 6, 7, 8],
        );
        let stream = AsyncNiftiStream::new(&data[..]);
        let volume = stream.open_volume().await.unwrap();

        let (leading, mut reader) = volume.into_raw().unwrap();
        assert!(leading.is_empty());
        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).await.unwrap();
        assert_eq!(rest, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[tokio::test]
    async fn test_slices() {
        let fixture = HeaderFixture::small(4, 3, 5, 8);
        let volume_bytes = volume_pattern(12, 5);
        let data = fixture.file(Endianness::Little, &[], &volume_bytes);
        let options = StreamOptions {
            chunk_size: 7,
            ..StreamOptions::default()
        };
        let stream = AsyncNiftiStream::with_options(&data[..], options);
        let mut volume = stream.open_volume().await.unwrap();
        volume.subscribe(Subscription::slices()).unwrap();

        let mut slices = Vec::new();
        while let Some(event) = volume.next_event().await {
            match event.unwrap() {
                VolumeEvent::Slice { slice, data } => slices.push((slice, data)),
                VolumeEvent::Chunk { .. } => panic!("chunks were not subscribed"),
            }
        }
        assert_eq!(slices.len(), 5);
        for (i, (slice, data)) in slices.iter().enumerate() {
            assert_eq!(*slice, i);
            assert_eq!(&data[..], &volume_bytes[i * 12..(i + 1) * 12]);
        }
        assert!(matches!(
            volume.subscribe(Subscription::chunks()),
            Err(NiftiError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn test_truncated_header() {
        let data = HeaderFixture::avg152().to_bytes(Endianness::Little);
        let mut stream = AsyncNiftiStream::new(&data[..100]);

        assert!(matches!(
            stream.next_event().await,
            Some(Err(NiftiError::TruncatedHeader {
                have: 100,
                needed: 352
            }))
        ));
        assert!(stream.next_event().await.is_none());
        assert!(stream.header().is_none());
    }
}

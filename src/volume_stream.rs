//! VolumeStream - the voxel region of a NIFTI-1 stream.
//!
//! Obtained from [`NiftiStream::into_volume_stream`](crate::NiftiStream::into_volume_stream)
//! once the stream is positioned at the first voxel byte. It owns the rest of
//! the source and can either slice it ([`events`](VolumeStream::events)) or
//! pass it through unchanged ([`into_raw`](VolumeStream::into_raw)), never both.

use crate::error::{NiftiError, Result};
use crate::parsing::NiftiHeader;
use crate::slicer::{Subscription, VolumeEvent, VolumeSlicer};
use bytes::Bytes;
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;

pub struct VolumeStream<S> {
    header: Arc<NiftiHeader>,
    leading: Option<Bytes>,
    source: S,
    subscription: Subscription,
    slicer: Option<VolumeSlicer>,
    queue: VecDeque<VolumeEvent>,
    started: bool,
    done: bool,
}

impl<S> VolumeStream<S>
where
    S: Iterator<Item = io::Result<Bytes>>,
{
    /// `leading` holds bytes already pulled from `source` past the volume
    /// boundary.
    pub fn new(header: Arc<NiftiHeader>, leading: Bytes, source: S) -> Self {
        Self {
            header,
            leading: (!leading.is_empty()).then_some(leading),
            source,
            subscription: Subscription::default(),
            slicer: None,
            queue: VecDeque::new(),
            started: false,
            done: false,
        }
    }

    pub fn header(&self) -> &Arc<NiftiHeader> {
        &self.header
    }

    pub fn slice_byte_size(&self) -> Option<usize> {
        self.header.slice_byte_size()
    }

    pub fn subscription(&self) -> Subscription {
        self.subscription
    }

    /// Register interest in chunk and/or slice events.
    ///
    /// Subscriptions accumulate and are fixed once consumption starts.
    pub fn subscribe(&mut self, subscription: Subscription) -> Result<()> {
        if self.started {
            return Err(NiftiError::InvalidState(
                "cannot subscribe after the volume stream has started",
            ));
        }
        self.subscription = self.subscription.union(subscription);
        Ok(())
    }

    /// Start (or continue) slicing the volume.
    pub fn events(&mut self) -> VolumeEvents<'_, S> {
        self.started = true;
        VolumeEvents { stream: self }
    }

    /// Give up slicing and take the remaining bytes verbatim.
    pub fn into_raw(self) -> Result<RawVolume<S>> {
        if self.started {
            return Err(NiftiError::InvalidState(
                "volume stream already started slicing",
            ));
        }
        Ok(RawVolume {
            leading: self.leading,
            source: self.source,
        })
    }

    fn slicer(&mut self) -> Result<&mut VolumeSlicer> {
        if self.slicer.is_none() {
            let subscription = self.subscription.or_all();
            self.slicer = Some(VolumeSlicer::for_header(&self.header, subscription)?);
        }
        self.slicer
            .as_mut()
            .ok_or(NiftiError::InvalidState("volume slicer missing"))
    }

    /// Pull one chunk and slice it.
    fn pump(&mut self) -> Result<()> {
        let chunk = match self.leading.take() {
            Some(leading) => Some(Ok(leading)),
            None => self.source.next(),
        };
        let result = match chunk {
            None => {
                self.done = true;
                let mut out = std::mem::take(&mut self.queue);
                let finished = self.slicer().map(|slicer| slicer.finish(&mut out));
                self.queue = out;
                finished
            }
            Some(Err(e)) => Err(e.into()),
            Some(Ok(chunk)) => {
                let mut out = std::mem::take(&mut self.queue);
                let pushed = self.slicer().map(|slicer| slicer.push(chunk, &mut out));
                self.queue = out;
                pushed
            }
        };
        if result.is_err() {
            self.done = true;
        }
        result
    }
}

/// Iterator over [`VolumeEvent`]s. See [`VolumeStream::events`].
pub struct VolumeEvents<'a, S> {
    stream: &'a mut VolumeStream<S>,
}

impl<S> Iterator for VolumeEvents<'_, S>
where
    S: Iterator<Item = io::Result<Bytes>>,
{
    type Item = Result<VolumeEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(event) = self.stream.queue.pop_front() {
                return Some(Ok(event));
            }
            if self.stream.done {
                return None;
            }
            if let Err(e) = self.stream.pump() {
                return Some(Err(e));
            }
        }
    }
}

/// The volume region as raw chunks, in source order.
pub struct RawVolume<S> {
    leading: Option<Bytes>,
    source: S,
}

impl<S> RawVolume<S> {
    /// Recover the source. Bytes already handed off and not yet yielded
    /// are returned alongside it.
    pub fn into_parts(self) -> (Bytes, S) {
        (self.leading.unwrap_or_default(), self.source)
    }
}

impl<S> Iterator for RawVolume<S>
where
    S: Iterator<Item = io::Result<Bytes>>,
{
    type Item = io::Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.leading.take() {
            Some(leading) => Some(Ok(leading)),
            None => self.source.next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{volume_pattern, HeaderFixture};
    use crate::parsing::{Endianness, HeaderParser};

    fn stream_for(
        fixture: &HeaderFixture,
        leading: &[u8],
        rest: &[u8],
        chunk_size: usize,
    ) -> VolumeStream<std::vec::IntoIter<io::Result<Bytes>>> {
        let header = HeaderParser::parse(&fixture.to_bytes(Endianness::Little)).unwrap();
        let source: Vec<io::Result<Bytes>> = rest
            .chunks(chunk_size)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        VolumeStream::new(
            Arc::new(header),
            Bytes::copy_from_slice(leading),
            source.into_iter(),
        )
    }

    #[test]
    fn test_leading_bytes_come_first() {
        let fixture = HeaderFixture::small(2, 2, 3, 8);
        let volume = volume_pattern(4, 3);
        let mut stream = stream_for(&fixture, &volume[..5], &volume[5..], 3);
        stream.subscribe(Subscription::slices()).unwrap();

        let slices: Vec<Bytes> = stream
            .events()
            .map(|e| e.unwrap().data().clone())
            .collect();
        assert_eq!(slices.len(), 3);
        assert_eq!(slices.concat(), volume);
    }

    #[test]
    fn test_default_subscription_is_all() {
        let fixture = HeaderFixture::small(2, 1, 2, 8);
        let mut stream = stream_for(&fixture, &[], &[1, 2, 3, 4], 4);
        assert_eq!(stream.subscription(), Subscription::default());

        let events: Vec<VolumeEvent> = stream.events().map(|e| e.unwrap()).collect();
        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], VolumeEvent::Chunk { slice: 0, .. }));
        assert!(matches!(events[3], VolumeEvent::Slice { slice: 1, .. }));
    }

    #[test]
    fn test_subscribe_after_start_is_invalid() {
        let fixture = HeaderFixture::small(2, 2, 1, 8);
        let mut stream = stream_for(&fixture, &[], &[1, 2, 3, 4], 4);
        stream.subscribe(Subscription::chunks()).unwrap();
        stream.subscribe(Subscription::slices()).unwrap();
        assert_eq!(stream.subscription(), Subscription::all());

        assert!(stream.events().next().is_some());
        assert!(matches!(
            stream.subscribe(Subscription::chunks()),
            Err(NiftiError::InvalidState(_))
        ));
        assert!(matches!(
            stream.into_raw(),
            Err(NiftiError::InvalidState(_))
        ));
    }

    #[test]
    fn test_raw_passthrough() {
        let fixture = HeaderFixture::small(2, 2, 2, 8);
        let stream = stream_for(&fixture, &[1, 2], &[3, 4, 5, 6, 7, 8], 4);

        let mut raw = stream.into_raw().unwrap();
        assert_eq!(raw.next().unwrap().unwrap(), Bytes::from_static(&[1, 2]));
        let (leading, rest) = raw.into_parts();
        assert!(leading.is_empty());
        assert_eq!(rest.count(), 2);
    }

    #[test]
    fn test_invalid_slice_size_reported_on_first_event() {
        let fixture = HeaderFixture::small(0, 4, 2, 8);
        let mut stream = stream_for(&fixture, &[], &[1, 2, 3], 4);
        assert_eq!(stream.slice_byte_size(), None);

        let events: Vec<Result<VolumeEvent>> = stream.events().collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            Err(NiftiError::InvalidSliceSize {
                dim1: 0,
                dim2: 4,
                bitpix: 8
            })
        ));

        let stream = stream_for(&fixture, &[], &[1, 2, 3], 4);
        assert_eq!(stream.into_raw().unwrap().count(), 1);
    }

    #[test]
    fn test_source_error_ends_volume() {
        let fixture = HeaderFixture::small(2, 2, 2, 8);
        let header = HeaderParser::parse(&fixture.to_bytes(Endianness::Little)).unwrap();
        let source = vec![
            Ok(Bytes::from_static(&[1, 2, 3, 4])),
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone")),
            Ok(Bytes::from_static(&[5, 6, 7, 8])),
        ];
        let mut stream = VolumeStream::new(Arc::new(header), Bytes::new(), source.into_iter());
        stream.subscribe(Subscription::slices()).unwrap();

        let events: Vec<Result<VolumeEvent>> = stream.events().collect();
        assert_eq!(events.len(), 2);
        assert!(events[0].is_ok());
        assert!(matches!(&events[1], Err(NiftiError::Io(e)) if e.kind() == io::ErrorKind::BrokenPipe));
        assert!(stream.events().next().is_none());
    }
}

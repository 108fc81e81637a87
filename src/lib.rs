//! Streaming NIFTI-1 decoder.
//!
//! Splits a single-file NIFTI-1 dataset (`.nii`) into its header, optional
//! extension block and voxel volume as the bytes arrive, then re-segments the
//! volume into slices along the third axis. Nothing beyond the current phase
//! boundary is buffered.
//!
//! The core is sans-IO ([`PhaseController`], [`VolumeSlicer`]); the drivers
//! pull from any `Iterator<Item = io::Result<Bytes>>` or, with the `async`
//! feature, a tokio `AsyncRead`. Opening files and decompressing `.nii.gz` is
//! left to the caller.
//!
//! ## Features
//! - `async` - Async drivers over tokio `AsyncRead`
//!
//! ## Example
//!
//! ```rust,ignore
//! use nifti_stream::{NiftiStream, Subscription, VolumeEvent};
//!
//! let nifti = NiftiStream::from_reader(std::fs::File::open("avg152T1_LR_nifti.nii")?);
//! let mut volume = nifti.open_volume()?;
//! volume.subscribe(Subscription::slices())?;
//! for event in volume.events() {
//!     if let VolumeEvent::Slice { slice, data } = event? {
//!         println!("slice {slice}: {} bytes", data.len());
//!     }
//! }
//! ```

pub mod chunk_source;
pub mod error;
mod nifti_stream;
pub mod options;
pub mod parsing;
mod phase;
mod slicer;
mod volume_stream;

#[cfg(feature = "async")]
mod async_stream;

#[cfg(test)]
mod fixture;

pub use chunk_source::{ChunksOf, ReadChunks};
pub use error::{NiftiError, Result};
pub use nifti_stream::{Events, NiftiStream};
pub use options::StreamOptions;
pub use parsing::{DataType, Endianness, HeaderParser, NiftiHeader, NiftiUnit};
pub use phase::{NiftiEvent, Phase, PhaseController};
pub use slicer::{SliceCursor, SliceStep, Subscription, VolumeEvent, VolumeSlicer};
pub use volume_stream::{RawVolume, VolumeEvents, VolumeStream};

#[cfg(feature = "async")]
pub use async_stream::{AsyncNiftiStream, AsyncVolumeStream};

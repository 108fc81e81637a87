#![no_main]
use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use nifti_stream::{NiftiStream, StreamOptions, Subscription};

fuzz_target!(|data: &[u8]| {
    // First byte picks the chunk size
    let Some((&size, rest)) = data.split_first() else {
        return;
    };
    let options = StreamOptions {
        chunk_size: usize::from(size) + 1,
        max_extension_size: 1 << 20,
        ..StreamOptions::default()
    };
    let stream = NiftiStream::from_bytes(Bytes::copy_from_slice(rest), options);
    if let Ok(mut volume) = stream.open_volume() {
        if volume.subscribe(Subscription::all()).is_ok() {
            for event in volume.events() {
                if event.is_err() {
                    break;
                }
            }
        }
    }
});

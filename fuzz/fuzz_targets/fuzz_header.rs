#![no_main]
use libfuzzer_sys::fuzz_target;
use nifti_stream::{Endianness, HeaderParser};

fuzz_target!(|data: &[u8]| {
    if let Ok(header) = HeaderParser::parse(data) {
        let _ = header.validate();
        let _ = header.slice_byte_size();
        let _ = header.extension_len();
    }
    let _ = HeaderParser::parse_with(data, Endianness::Little);
    let _ = HeaderParser::parse_with(data, Endianness::Big);
});

//! NIFTI-1 header decoder.
//!
//! The single-file layout reserves 352 bytes before any extension or voxel
//! data: the 348-byte header proper followed by the 4 `extender` bytes
//! (historically `glmax`/`glmin` padding in ANALYZE 7.5).
//!
//! Fields are read in ascending order from offset 0:
//!
//! | Offset | Field | Width |
//! |--------|-------|-------|
//! | 0 | `sizeof_hdr` | i32 |
//! | 4 | unused ANALYZE fields | 35 |
//! | 39 | `dim_info` | u8 |
//! | 40 | `dim[8]` | i16 × 8 |
//! | 56 | `intent_p1..p3` | f32 × 3 |
//! | 68 | `intent_code`, `datatype`, `bitpix`, `slice_start` | i16 × 4 |
//! | 76 | `pixdim[8]` | f32 × 8 |
//! | 108 | `vox_offset`, `scl_slope`, `scl_inter` | f32 × 3 |
//! | 120 | `slice_end` | i16 |
//! | 122 | `slice_code`, `xyzt_units` | u8 × 2 |
//! | 124 | `cal_max`, `cal_min`, `slice_duration`, `toffset` | f32 × 4 |
//! | 140 | unused `glmax`, `glmin` | 8 |
//! | 148 | `descrip` | 80 |
//! | 228 | `aux_file` | 24 |
//! | 252 | `qform_code`, `sform_code` | i16 × 2 |
//! | 256 | `quatern_b..d`, `qoffset_x..z` | f32 × 6 |
//! | 280 | `srow_x`, `srow_y`, `srow_z` | f32 × 12 |
//! | 328 | `intent_name` | 16 |
//! | 344 | `magic` | 4 |
//! | 348 | `extender` | 4 |

use super::byte_order::{Endianness, FieldReader};
use super::codes::{DataType, NiftiUnit};
use crate::error::{NiftiError, Result};

/// Required value of `sizeof_hdr`.
pub const HEADER_SIZE: usize = 348;

/// Bytes preceding the extension region in a single-file dataset.
pub const HEADER_REGION_SIZE: usize = 352;

/// Decoded NIFTI-1 header.
///
/// Text fields hold the full fixed-width run, NUL padding included; use
/// [`description`](Self::description) and friends for the trimmed text.
#[derive(Debug, Clone, PartialEq)]
pub struct NiftiHeader {
    pub endianness: Endianness,
    pub sizeof_hdr: i32,
    pub dim_info: u8,
    /// `dim[0]` is the number of axes, `dim[1..=7]` their extents.
    pub dim: [i16; 8],
    pub intent_p1: f32,
    pub intent_p2: f32,
    pub intent_p3: f32,
    pub intent_code: i16,
    pub datatype: DataType,
    pub bitpix: i16,
    pub slice_start: i16,
    /// Grid spacing per axis; `pixdim[0]` holds qfac.
    pub pixdim: [f32; 8],
    /// Byte offset of the voxel data from the start of the file.
    pub vox_offset: f32,
    pub scl_slope: f32,
    pub scl_inter: f32,
    pub slice_end: i16,
    pub slice_code: u8,
    pub xyzt_units: u8,
    pub cal_max: f32,
    pub cal_min: f32,
    pub slice_duration: f32,
    pub toffset: f32,
    pub descrip: String,
    pub aux_file: String,
    pub qform_code: i16,
    pub sform_code: i16,
    pub quatern_b: f32,
    pub quatern_c: f32,
    pub quatern_d: f32,
    pub qoffset_x: f32,
    pub qoffset_y: f32,
    pub qoffset_z: f32,
    pub srow_x: [f32; 4],
    pub srow_y: [f32; 4],
    pub srow_z: [f32; 4],
    pub intent_name: String,
    /// First three bytes of the magic field, `"n+1"` or `"ni1"`.
    pub magic: String,
    /// Bytes 348..352. A non-zero first byte flags extensions.
    pub extender: [u8; 4],
}

pub struct HeaderParser;

impl HeaderParser {
    pub const HEADER_SIZE: usize = HEADER_REGION_SIZE;

    /// Decode a header, detecting the byte order from `dim[0]`.
    pub fn parse(buffer: &[u8]) -> Result<NiftiHeader> {
        Self::check_len(buffer)?;
        let order = Endianness::detect(buffer)?;
        Ok(Self::decode(buffer, order))
    }

    /// Decode a header with a caller-supplied byte order.
    pub fn parse_with(buffer: &[u8], order: Endianness) -> Result<NiftiHeader> {
        Self::check_len(buffer)?;
        Ok(Self::decode(buffer, order))
    }

    fn check_len(buffer: &[u8]) -> Result<()> {
        if buffer.len() < Self::HEADER_SIZE {
            return Err(NiftiError::BufferTooSmall {
                needed: Self::HEADER_SIZE,
                have: buffer.len(),
            });
        }
        Ok(())
    }

    fn decode(buffer: &[u8], order: Endianness) -> NiftiHeader {
        let mut r = FieldReader::new(&buffer[..Self::HEADER_SIZE], order);

        let sizeof_hdr = r.read_i32();
        // data_type[10], db_name[18], extents, session_error, regular
        r.skip(35);
        let dim_info = r.read_u8();
        let dim = r.read_i16_array::<8>();
        let intent_p1 = r.read_f32();
        let intent_p2 = r.read_f32();
        let intent_p3 = r.read_f32();
        let intent_code = r.read_i16();
        let datatype = DataType::from_code(r.read_i16());
        let bitpix = r.read_i16();
        let slice_start = r.read_i16();
        let pixdim = r.read_f32_array::<8>();
        let vox_offset = r.read_f32();
        let scl_slope = r.read_f32();
        let scl_inter = r.read_f32();
        let slice_end = r.read_i16();
        let slice_code = r.read_u8();
        let xyzt_units = r.read_u8();
        let cal_max = r.read_f32();
        let cal_min = r.read_f32();
        let slice_duration = r.read_f32();
        let toffset = r.read_f32();
        // glmax, glmin
        r.skip(8);
        let descrip = r.read_text(80);
        let aux_file = r.read_text(24);
        let qform_code = r.read_i16();
        let sform_code = r.read_i16();
        let quatern_b = r.read_f32();
        let quatern_c = r.read_f32();
        let quatern_d = r.read_f32();
        let qoffset_x = r.read_f32();
        let qoffset_y = r.read_f32();
        let qoffset_z = r.read_f32();
        let srow_x = r.read_f32_array::<4>();
        let srow_y = r.read_f32_array::<4>();
        let srow_z = r.read_f32_array::<4>();
        let intent_name = r.read_text(16);
        let magic = String::from_utf8_lossy(&r.read_bytes(4)[..3]).into_owned();
        let mut extender = [0u8; 4];
        extender.copy_from_slice(r.read_bytes(4));
        debug_assert_eq!(r.position(), Self::HEADER_SIZE);

        NiftiHeader {
            endianness: order,
            sizeof_hdr,
            dim_info,
            dim,
            intent_p1,
            intent_p2,
            intent_p3,
            intent_code,
            datatype,
            bitpix,
            slice_start,
            pixdim,
            vox_offset,
            scl_slope,
            scl_inter,
            slice_end,
            slice_code,
            xyzt_units,
            cal_max,
            cal_min,
            slice_duration,
            toffset,
            descrip,
            aux_file,
            qform_code,
            sform_code,
            quatern_b,
            quatern_c,
            quatern_d,
            qoffset_x,
            qoffset_y,
            qoffset_z,
            srow_x,
            srow_y,
            srow_z,
            intent_name,
            magic,
            extender,
        }
    }
}

/// Text up to the first NUL byte.
fn trim_nul(text: &str) -> &str {
    text.split('\0').next().unwrap_or("")
}

impl NiftiHeader {
    /// Check the NIFTI-1 invariants.
    ///
    /// Decoding never fails on these; callers decide whether they are fatal.
    pub fn validate(&self) -> Result<()> {
        if self.sizeof_hdr != HEADER_SIZE as i32 {
            return Err(NiftiError::MalformedHeader(format!(
                "sizeof_hdr must be {}, got {}",
                HEADER_SIZE, self.sizeof_hdr
            )));
        }
        if self.magic != "n+1" && self.magic != "ni1" {
            return Err(NiftiError::MalformedHeader(format!(
                "unrecognized magic {:?}",
                self.magic
            )));
        }
        if !(1..=7).contains(&self.dim[0]) {
            return Err(NiftiError::MalformedHeader(format!(
                "dim[0] must be 1..=7, got {}",
                self.dim[0]
            )));
        }
        Ok(())
    }

    pub fn is_little_endian(&self) -> bool {
        self.endianness == Endianness::Little
    }

    /// Whether the header belongs to a `.nii` file (`"n+1"`) rather than an
    /// `.hdr`/`.img` pair (`"ni1"`).
    pub fn is_single_file(&self) -> bool {
        self.magic == "n+1"
    }

    pub fn spatial_units(&self) -> NiftiUnit {
        NiftiUnit::spatial(self.xyzt_units)
    }

    pub fn time_units(&self) -> NiftiUnit {
        NiftiUnit::temporal(self.xyzt_units)
    }

    pub fn description(&self) -> &str {
        trim_nul(&self.descrip)
    }

    pub fn aux_file_name(&self) -> &str {
        trim_nul(&self.aux_file)
    }

    pub fn intent_name_str(&self) -> &str {
        trim_nul(&self.intent_name)
    }

    /// Length of the extension region: `vox_offset - 352`, floored.
    ///
    /// Zero when `vox_offset` is at or before the header end, or not finite.
    pub fn extension_len(&self) -> usize {
        let len = f64::from(self.vox_offset) - HEADER_REGION_SIZE as f64;
        if len.is_finite() && len > 0.0 {
            len.floor() as usize
        } else {
            0
        }
    }

    /// Bytes in one slice along the outermost spatial axis:
    /// `dim[1] * dim[2] * (bitpix / 8)`.
    pub fn slice_byte_size(&self) -> Option<usize> {
        let size = i64::from(self.dim[1]) * i64::from(self.dim[2]) * i64::from(self.bitpix / 8);
        usize::try_from(size).ok().filter(|&s| s > 0)
    }

    /// Number of slices a complete volume holds: `dim[3]` for 3-D and up.
    pub fn slice_count(&self) -> usize {
        if self.dim[0] >= 3 {
            usize::try_from(self.dim[3]).unwrap_or(0)
        } else {
            1
        }
    }
}

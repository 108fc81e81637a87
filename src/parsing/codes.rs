//! NIFTI-1 code tables: voxel data types and `xyzt_units` units.

/// NIFTI-1 `datatype` codes.
///
/// Codes outside the table decode to [`DataType::Unknown`] rather than
/// failing; the stream only needs `bitpix` to slice the volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Unsigned 8-bit integer
    UInt8,
    /// Signed 16-bit integer
    Int16,
    /// Signed 32-bit integer
    Int32,
    /// 32-bit floating point
    Float32,
    /// Two 32-bit floats (real, imaginary)
    Complex64,
    /// 64-bit floating point
    Float64,
    /// Three 8-bit channels
    Rgb24,
    /// Signed 8-bit integer
    Int8,
    /// Unsigned 16-bit integer
    UInt16,
    /// Unsigned 32-bit integer
    UInt32,
    /// Signed 64-bit integer
    Int64,
    /// Unsigned 64-bit integer
    UInt64,
    /// 128-bit floating point
    Float128,
    /// Two 64-bit floats
    Complex128,
    /// Two 128-bit floats
    Complex256,
    /// Four 8-bit channels
    Rgba32,
    /// Any other code, including 0 (`DT_NONE`).
    Unknown(i16),
}

impl DataType {
    pub const fn from_code(code: i16) -> Self {
        match code {
            2 => Self::UInt8,
            4 => Self::Int16,
            8 => Self::Int32,
            16 => Self::Float32,
            32 => Self::Complex64,
            64 => Self::Float64,
            128 => Self::Rgb24,
            256 => Self::Int8,
            512 => Self::UInt16,
            768 => Self::UInt32,
            1024 => Self::Int64,
            1280 => Self::UInt64,
            1536 => Self::Float128,
            1792 => Self::Complex128,
            2048 => Self::Complex256,
            2304 => Self::Rgba32,
            other => Self::Unknown(other),
        }
    }

    pub const fn code(self) -> i16 {
        match self {
            Self::UInt8 => 2,
            Self::Int16 => 4,
            Self::Int32 => 8,
            Self::Float32 => 16,
            Self::Complex64 => 32,
            Self::Float64 => 64,
            Self::Rgb24 => 128,
            Self::Int8 => 256,
            Self::UInt16 => 512,
            Self::UInt32 => 768,
            Self::Int64 => 1024,
            Self::UInt64 => 1280,
            Self::Float128 => 1536,
            Self::Complex128 => 1792,
            Self::Complex256 => 2048,
            Self::Rgba32 => 2304,
            Self::Unknown(code) => code,
        }
    }

    /// Bits per voxel implied by the type, `None` for unknown codes.
    pub const fn bits_per_voxel(self) -> Option<i16> {
        let bits = match self {
            Self::UInt8 | Self::Int8 => 8,
            Self::Int16 | Self::UInt16 => 16,
            Self::Rgb24 => 24,
            Self::Int32 | Self::UInt32 | Self::Float32 | Self::Rgba32 => 32,
            Self::Int64 | Self::UInt64 | Self::Float64 | Self::Complex64 => 64,
            Self::Float128 | Self::Complex128 => 128,
            Self::Complex256 => 256,
            Self::Unknown(_) => return None,
        };
        Some(bits)
    }
}

/// Units of `pixdim`, packed into the `xyzt_units` byte.
///
/// Spatial units live in bits 0-2, temporal units in bits 3-5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NiftiUnit {
    Unknown,
    Meter,
    Millimeter,
    Micron,
    Second,
    Millisecond,
    Microsecond,
    Hertz,
    Ppm,
    Radians,
}

impl NiftiUnit {
    pub const SPATIAL_MASK: u8 = 0x07;
    pub const TEMPORAL_MASK: u8 = 0x38;

    /// Spatial unit encoded in `xyzt_units`.
    pub const fn spatial(xyzt_units: u8) -> Self {
        match xyzt_units & Self::SPATIAL_MASK {
            1 => Self::Meter,
            2 => Self::Millimeter,
            3 => Self::Micron,
            _ => Self::Unknown,
        }
    }

    /// Temporal unit encoded in `xyzt_units`.
    pub const fn temporal(xyzt_units: u8) -> Self {
        match xyzt_units & Self::TEMPORAL_MASK {
            8 => Self::Second,
            16 => Self::Millisecond,
            24 => Self::Microsecond,
            32 => Self::Hertz,
            40 => Self::Ppm,
            48 => Self::Radians,
            _ => Self::Unknown,
        }
    }

    pub const fn code(self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::Meter => 1,
            Self::Millimeter => 2,
            Self::Micron => 3,
            Self::Second => 8,
            Self::Millisecond => 16,
            Self::Microsecond => 24,
            Self::Hertz => 32,
            Self::Ppm => 40,
            Self::Radians => 48,
        }
    }
}

//! NIFTI-1 header parsing modules.

pub mod byte_order;
pub mod codes;
pub mod header;

pub use byte_order::{Endianness, FieldReader};
pub use codes::{DataType, NiftiUnit};
pub use header::{HeaderParser, NiftiHeader, HEADER_REGION_SIZE, HEADER_SIZE};

//! Test fixtures: NIFTI-1 files written field by field.
//!
//! `avg152()` mirrors the header of the MNI `avg152T1_LR_nifti.nii` template.

use crate::parsing::Endianness;
use byteorder::{BigEndian, ByteOrder, LittleEndian};

#[derive(Debug, Clone)]
pub(crate) struct HeaderFixture {
    pub sizeof_hdr: i32,
    pub dim: [i16; 8],
    pub datatype: i16,
    pub bitpix: i16,
    pub pixdim: [f32; 8],
    pub vox_offset: f32,
    pub xyzt_units: u8,
    pub cal_max: f32,
    pub descrip: &'static str,
    pub sform_code: i16,
    pub srow: [[f32; 4]; 3],
    pub magic: [u8; 4],
}

impl HeaderFixture {
    pub fn avg152() -> Self {
        Self {
            sizeof_hdr: 348,
            dim: [3, 91, 109, 91, 1, 1, 1, 1],
            datatype: 2,
            bitpix: 8,
            pixdim: [0.0, 2.0, 2.0, 2.0, 1.0, 1.0, 1.0, 1.0],
            vox_offset: 352.0,
            xyzt_units: 2 | 8,
            cal_max: 255.0,
            descrip: "FSL3.2beta",
            sform_code: 4,
            srow: [
                [-2.0, 0.0, 0.0, 90.0],
                [0.0, 2.0, 0.0, -126.0],
                [0.0, 0.0, 2.0, -72.0],
            ],
            magic: *b"n+1\0",
        }
    }

    /// A small 3-D volume of `nx * ny * nz` voxels.
    pub fn small(nx: i16, ny: i16, nz: i16, bitpix: i16) -> Self {
        Self {
            dim: [3, nx, ny, nz, 1, 1, 1, 1],
            datatype: if bitpix == 16 { 4 } else { 2 },
            bitpix,
            ..Self::avg152()
        }
    }

    pub fn with_extension(mut self, len: usize) -> Self {
        self.vox_offset = 352.0 + len as f32;
        self
    }

    /// The 352-byte header region.
    pub fn to_bytes(&self, order: Endianness) -> Vec<u8> {
        match order {
            Endianness::Little => self.write::<LittleEndian>(),
            Endianness::Big => self.write::<BigEndian>(),
        }
    }

    fn write<E: ByteOrder>(&self) -> Vec<u8> {
        let mut buf = vec![0u8; 352];
        E::write_i32(&mut buf[0..], self.sizeof_hdr);
        for (i, &d) in self.dim.iter().enumerate() {
            E::write_i16(&mut buf[40 + i * 2..], d);
        }
        E::write_i16(&mut buf[70..], self.datatype);
        E::write_i16(&mut buf[72..], self.bitpix);
        for (i, &p) in self.pixdim.iter().enumerate() {
            E::write_f32(&mut buf[76 + i * 4..], p);
        }
        E::write_f32(&mut buf[108..], self.vox_offset);
        buf[123] = self.xyzt_units;
        E::write_f32(&mut buf[124..], self.cal_max);
        buf[148..148 + self.descrip.len()].copy_from_slice(self.descrip.as_bytes());
        E::write_i16(&mut buf[254..], self.sform_code);
        for (row, values) in self.srow.iter().enumerate() {
            for (col, &v) in values.iter().enumerate() {
                E::write_f32(&mut buf[280 + row * 16 + col * 4..], v);
            }
        }
        buf[344..348].copy_from_slice(&self.magic);
        buf
    }

    /// A complete single-file dataset: header, extension, then `volume`.
    pub fn file(&self, order: Endianness, extension: &[u8], volume: &[u8]) -> Vec<u8> {
        let mut data = self.to_bytes(order);
        data.extend_from_slice(extension);
        data.extend_from_slice(volume);
        data
    }
}

/// Volume bytes where every byte encodes its slice index and position.
pub(crate) fn volume_pattern(slice_size: usize, slices: usize) -> Vec<u8> {
    (0..slice_size * slices)
        .map(|i| ((i / slice_size) as u8).wrapping_mul(31) ^ (i % 251) as u8)
        .collect()
}

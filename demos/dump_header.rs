//! Print the header of a NIFTI-1 file and per-slice statistics.
//!
//! Usage:
//!   cargo run --release --example dump_header -- brain.nii
//!   cargo run --release --example dump_header -- brain.nii.gz
//!
//! Set `RUST_LOG=nifti_stream=debug` to see phase transitions.

use flate2::read::GzDecoder;
use nifti_stream::{NiftiEvent, NiftiStream, Subscription, VolumeEvent};
use std::fs::File;
use std::io::{BufReader, Read};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: dump_header <file.nii[.gz]>");
        std::process::exit(1);
    }
    let path = &args[1];

    let file = BufReader::new(File::open(path)?);
    let reader: Box<dyn Read> = if path.ends_with(".gz") {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };

    let mut nifti = NiftiStream::from_reader(reader);
    for event in nifti.events() {
        match event? {
            NiftiEvent::Header(header) => {
                println!("byte order:   {}", header.endianness);
                println!("dim:          {:?}", header.dim);
                println!("pixdim:       {:?}", header.pixdim);
                println!("datatype:     {:?} ({} bits)", header.datatype, header.bitpix);
                println!("vox_offset:   {}", header.vox_offset);
                println!(
                    "units:        {:?} / {:?}",
                    header.spatial_units(),
                    header.time_units()
                );
                println!("description:  {}", header.description());
                println!("magic:        {}", header.magic);
                println!("sform_code:   {}", header.sform_code);
                println!("srow_x:       {:?}", header.srow_x);
                println!("srow_y:       {:?}", header.srow_y);
                println!("srow_z:       {:?}", header.srow_z);
            }
            NiftiEvent::Extension(data) => println!("extension:    {} bytes", data.len()),
            NiftiEvent::VolumeReady => {}
        }
    }

    let mut volume = nifti.into_volume_stream()?;
    let expected = volume.header().slice_count();
    volume.subscribe(Subscription::slices())?;

    let mut slices = 0usize;
    let mut total = 0usize;
    for event in volume.events() {
        if let VolumeEvent::Slice { slice, data } = event? {
            let nonzero = data.iter().filter(|&&b| b != 0).count();
            println!("slice {slice:>4}: {:>8} bytes, {nonzero:>8} non-zero", data.len());
            slices += 1;
            total += data.len();
        }
    }

    println!("{slices} slices ({expected} expected), {total} volume bytes");
    Ok(())
}

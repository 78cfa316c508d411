use std::fs::File;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use memmap2::Mmap;

use crate::error::{DosewashError, Result};
use crate::io::manifest::{xy, CtEntry, DoseEntry};
use crate::volume::Volume;

/// Decode a raw CT volume file: little-endian i16, row-major within slice,
/// slice-major overall.
///
/// `progress` is called with `(slices_done, total_slices)`.
pub fn read_ct_volume(
    path: &Path,
    entry: &CtEntry,
    mut progress: impl FnMut(usize, usize),
) -> Result<Volume> {
    let mmap = map_file(path)?;
    let samples = entry.rows * entry.cols * entry.count;
    check_length(&mmap, samples, 2)?;

    let slice_samples = entry.rows * entry.cols;
    let mut data = Vec::with_capacity(samples);
    for s in 0..entry.count {
        let start = s * slice_samples * 2;
        let bytes = &mmap[start..start + slice_samples * 2];
        data.extend(
            bytes
                .chunks_exact(2)
                .map(|b| LittleEndian::read_i16(b) as f32),
        );
        progress(s + 1, entry.count);
    }

    Volume::from_flat(
        data,
        entry.rows,
        entry.cols,
        xy(&entry.origin),
        xy(&entry.spacing),
        entry.z_positions.clone(),
    )
}

/// Decode a raw dose volume file: little-endian f32, same ordering
/// convention as CT. Sample values are absolute dose (Gy).
pub fn read_dose_volume(
    path: &Path,
    entry: &DoseEntry,
    mut progress: impl FnMut(usize, usize),
) -> Result<Volume> {
    let mmap = map_file(path)?;
    let slices = entry.z_positions.len();
    let samples = entry.rows * entry.cols * slices;
    check_length(&mmap, samples, 4)?;

    let slice_samples = entry.rows * entry.cols;
    let mut data = Vec::with_capacity(samples);
    for s in 0..slices {
        let start = s * slice_samples * 4;
        let bytes = &mmap[start..start + slice_samples * 4];
        data.extend(bytes.chunks_exact(4).map(LittleEndian::read_f32));
        progress(s + 1, slices);
    }

    Volume::from_flat(
        data,
        entry.rows,
        entry.cols,
        xy(&entry.origin),
        xy(&entry.spacing),
        entry.z_positions.clone(),
    )
}

fn map_file(path: &Path) -> Result<Mmap> {
    let file = File::open(path)?;
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(mmap)
}

fn check_length(mmap: &Mmap, samples: usize, bytes_per_sample: usize) -> Result<()> {
    let expected = samples
        .checked_mul(bytes_per_sample)
        .expect("volume size overflow");
    if mmap.len() < expected {
        return Err(DosewashError::InvalidVolume {
            expected: samples,
            actual: mmap.len() / bytes_per_sample,
        });
    }
    Ok(())
}

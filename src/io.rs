//! Multi-page TIFF stacks and output file naming.

use std::fs::File;
use std::io::{BufReader, BufWriter, Seek, Write};
use std::path::{Path, PathBuf};

use image::ImageBuffer;
use tiff::ColorType;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::encoder::{TiffEncoder, colortype};

use crate::error::{CropError, Result};
use crate::models::{Frame, Intensity, Stack, Volume};

/// Sample types that can be written as a grayscale TIFF page.
pub trait StackSample: Intensity {
    fn write_page<W: Write + Seek>(
        encoder: &mut TiffEncoder<W>,
        width: u32,
        height: u32,
        data: &[Self],
    ) -> tiff::TiffResult<()>;
}

impl StackSample for u8 {
    fn write_page<W: Write + Seek>(
        encoder: &mut TiffEncoder<W>,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> tiff::TiffResult<()> {
        encoder.write_image::<colortype::Gray8>(width, height, data)
    }
}

impl StackSample for u16 {
    fn write_page<W: Write + Seek>(
        encoder: &mut TiffEncoder<W>,
        width: u32,
        height: u32,
        data: &[u16],
    ) -> tiff::TiffResult<()> {
        encoder.write_image::<colortype::Gray16>(width, height, data)
    }
}

/// Read every page of a grayscale 8- or 16-bit TIFF.
pub fn read_stack(path: impl AsRef<Path>) -> Result<Stack> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let mut decoder = Decoder::new(reader)?.with_limits(Limits::unlimited());

    let mut gray8: Vec<Frame<u8>> = Vec::new();
    let mut gray16: Vec<Frame<u16>> = Vec::new();
    loop {
        let (width, height) = decoder.dimensions()?;
        match (decoder.colortype()?, decoder.read_image()?) {
            (ColorType::Gray(8), DecodingResult::U8(buf)) if gray16.is_empty() => {
                gray8.push(page(width, height, buf)?);
            }
            (ColorType::Gray(16), DecodingResult::U16(buf)) if gray8.is_empty() => {
                gray16.push(page(width, height, buf)?);
            }
            (color, _) => {
                return Err(CropError::UnsupportedFormat(format!(
                    "page {} of {} is {color:?}; expected one grayscale depth throughout",
                    gray8.len() + gray16.len(),
                    path.display()
                )));
            }
        }
        if !decoder.more_images() {
            break;
        }
        decoder.next_image()?;
    }

    let stack = if gray16.is_empty() {
        Stack::Gray8(Volume::new(gray8)?)
    } else {
        Stack::Gray16(Volume::new(gray16)?)
    };
    log::info!("read {:?} ({}-bit) from {}", stack.shape(), stack.bit_depth(), path.display());
    Ok(stack)
}

fn page<T: Intensity>(width: u32, height: u32, buf: Vec<T>) -> Result<Frame<T>> {
    ImageBuffer::from_raw(width, height, buf).ok_or_else(|| {
        CropError::UnsupportedFormat(format!("page data does not fill {width}x{height}"))
    })
}

/// Write one page per frame.
pub fn write_stack<T: StackSample>(path: impl AsRef<Path>, volume: &Volume<T>) -> Result<()> {
    let path = path.as_ref();
    let writer = BufWriter::new(File::create(path)?);
    let mut encoder = TiffEncoder::new(writer)?;
    for frame in volume.frames() {
        T::write_page(&mut encoder, frame.width(), frame.height(), frame.as_raw())?;
    }
    log::info!("wrote {:?} to {}", volume.shape(), path.display());
    Ok(())
}

pub fn write_any(path: impl AsRef<Path>, stack: &Stack) -> Result<()> {
    match stack {
        Stack::Gray8(v) => write_stack(path, v),
        Stack::Gray16(v) => write_stack(path, v),
    }
}

/// Destinations of the segmented and cropped stacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub segmented: PathBuf,
    pub cropped: PathBuf,
}

/// `<stem>_seg.tif` and `<stem>_crop.tif` inside `work_dir`.
///
/// The stem comes from `output` when given, otherwise from `input`. The
/// directory part of `output` is resolved against `work_dir`, so a relative
/// `sub/name.tif` lands in `work_dir/sub` and an absolute one keeps its own
/// directory. Only the file name of `input` is used.
pub fn output_paths(work_dir: &Path, input: &Path, output: Option<&Path>) -> OutputPaths {
    let named = output.unwrap_or(input);
    let stem = named
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "stack".to_string());
    let dir = match output.and_then(Path::parent) {
        Some(parent) => work_dir.join(parent),
        None => work_dir.to_path_buf(),
    };
    OutputPaths {
        segmented: dir.join(format!("{stem}_seg.tif")),
        cropped: dir.join(format!("{stem}_crop.tif")),
    }
}

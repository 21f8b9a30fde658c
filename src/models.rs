use image::{ImageBuffer, Luma, Primitive};

use crate::error::{CropError, Result};

/// Integer sample type a stack can be stored in.
pub trait Intensity: Primitive + Send + Sync + 'static {
    /// Value written for foreground samples of a segmented frame.
    const FOREGROUND: Self;

    /// Sample value widened for threshold arithmetic.
    fn level(self) -> u32;
}

impl Intensity for u8 {
    const FOREGROUND: u8 = 255;

    fn level(self) -> u32 {
        self as u32
    }
}

impl Intensity for u16 {
    const FOREGROUND: u16 = 255;

    fn level(self) -> u32 {
        self as u32
    }
}

/// A single 2D slice.
pub type Frame<T> = ImageBuffer<Luma<T>, Vec<T>>;

/// Ordered stack of equally sized frames.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume<T: Intensity> {
    frames: Vec<Frame<T>>,
}

impl<T: Intensity> Volume<T> {
    /// Build a volume, rejecting stacks whose frames differ in size.
    pub fn new(frames: Vec<Frame<T>>) -> Result<Self> {
        let first = frames.first().ok_or(CropError::EmptyVolume)?;
        let expected = first.dimensions();
        for (i, frame) in frames.iter().enumerate().skip(1) {
            if frame.dimensions() != expected {
                return Err(CropError::ShapeMismatch {
                    frame: i,
                    expected,
                    found: frame.dimensions(),
                });
            }
        }
        Ok(Self { frames })
    }

    /// Build a volume from a contiguous `depth * height * width` buffer.
    pub fn from_raw(depth: usize, width: u32, height: u32, data: Vec<T>) -> Result<Self> {
        let plane = width as usize * height as usize;
        if depth == 0 || plane == 0 {
            return Err(CropError::EmptyVolume);
        }
        if data.len() != depth * plane {
            return Err(CropError::UnsupportedFormat(format!(
                "buffer of {} samples does not match {depth}x{height}x{width}",
                data.len()
            )));
        }
        let frames = data
            .chunks_exact(plane)
            .map(|chunk| {
                ImageBuffer::from_raw(width, height, chunk.to_vec())
                    .ok_or(CropError::EmptyVolume)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { frames })
    }

    /// Frames produced from an existing volume, which already share one size.
    pub(crate) fn from_frames_unchecked(frames: Vec<Frame<T>>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[Frame<T>] {
        &self.frames
    }

    pub fn frame(&self, index: usize) -> Option<&Frame<T>> {
        self.frames.get(index)
    }

    pub fn into_frames(self) -> Vec<Frame<T>> {
        self.frames
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn width(&self) -> u32 {
        self.frames.first().map_or(0, |f| f.width())
    }

    pub fn height(&self) -> u32 {
        self.frames.first().map_or(0, |f| f.height())
    }

    /// `(depth, height, width)`.
    pub fn shape(&self) -> (usize, u32, u32) {
        (self.depth(), self.height(), self.width())
    }
}

/// A stack in whichever sample depth it was stored with.
#[derive(Debug, Clone, PartialEq)]
pub enum Stack {
    Gray8(Volume<u8>),
    Gray16(Volume<u16>),
}

impl Stack {
    pub fn shape(&self) -> (usize, u32, u32) {
        match self {
            Stack::Gray8(v) => v.shape(),
            Stack::Gray16(v) => v.shape(),
        }
    }

    pub fn bit_depth(&self) -> u8 {
        match self {
            Stack::Gray8(_) => 8,
            Stack::Gray16(_) => 16,
        }
    }
}

/// Axis-aligned box `(x1, y1)`..`(x2, y2)` in pixel coordinates, both corners inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BoundingBox {
    /// Marker for "no region in this frame".
    pub const NONE: BoundingBox = BoundingBox {
        x1: -1,
        y1: -1,
        x2: -1,
        y2: -1,
    };

    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn is_valid(&self) -> bool {
        *self != Self::NONE && self.x1 >= 0 && self.y1 >= 0 && self.x1 <= self.x2 && self.y1 <= self.y2
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
            x2: self.x2.max(other.x2),
            y2: self.y2.max(other.y2),
        }
    }

    pub fn contains(&self, other: &BoundingBox) -> bool {
        self.x1 <= other.x1 && self.y1 <= other.y1 && self.x2 >= other.x2 && self.y2 >= other.y2
    }

    pub fn as_tuple(&self) -> (i32, i32, i32, i32) {
        (self.x1, self.y1, self.x2, self.y2)
    }
}

/// Rectangle cut out of every frame; `x2`/`y2` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropWindow {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl CropWindow {
    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }

    pub fn as_tuple(&self) -> (u32, u32, u32, u32) {
        (self.x1, self.y1, self.x2, self.y2)
    }
}

use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

use crate::detection::contours::{FrameDetector, RegionContour, find_regions};
use crate::detection::{DetectionOutput, DetectionPipeline, DetectionReport};
use crate::error::{CropError, Result};
use crate::io::{self, OutputPaths, StackSample};
use crate::models::{BoundingBox, CropWindow, Frame, Intensity, Stack, Volume};
use crate::stabilizer::{Stabilizer, StabilizerParams, stabilize_checked};

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for overlay images
    pub output_dir: PathBuf,
}

/// Result of running the pipeline on a stack.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub shape: (usize, u32, u32),
    pub bbox: BoundingBox,
    pub window: CropWindow,
    pub cropped_shape: (usize, u32, u32),
    pub report: DetectionReport,
    /// Where the outputs were written, if saving was enabled.
    pub outputs: Option<OutputPaths>,
}

/// Segmented and cropped stacks kept in memory.
#[derive(Debug, Clone)]
pub struct StackOutput {
    pub segmented: Stack,
    pub cropped: Stack,
}

/// Stabilize (optionally), detect and crop a stack, with file output and debug overlays
pub struct Pipeline {
    detection: DetectionPipeline,
    stabilizer: Option<(Box<dyn Stabilizer>, StabilizerParams)>,
    debug: Option<DebugConfig>,
    save: bool,
}

impl Pipeline {
    pub fn new(detection: DetectionPipeline) -> Self {
        Self {
            detection,
            stabilizer: None,
            debug: None,
            save: true,
        }
    }

    pub fn with_stabilizer(mut self, stabilizer: Box<dyn Stabilizer>, params: StabilizerParams) -> Self {
        self.stabilizer = Some((stabilizer, params));
        self
    }

    pub fn with_save(mut self, save: bool) -> Self {
        self.save = save;
        self
    }

    /// Enable debug overlays written to `output_dir`, and per-frame thresholds
    /// in the report. The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            if std::fs::read_dir(&output_dir)?.next().is_some() {
                return Err(CropError::Config(format!(
                    "debug directory is not empty: {}",
                    output_dir.display()
                )));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.detection = std::mem::take(&mut self.detection).with_debug(true);
        self.debug = Some(DebugConfig { output_dir });
        Ok(self)
    }

    fn debug_dir(&self) -> Option<&Path> {
        self.debug.as_ref().map(|d| d.output_dir.as_path())
    }

    /// Run on a stack already in memory.
    pub fn run_stack(&self, stack: Stack) -> Result<(RunSummary, StackOutput)> {
        let stack = match &self.stabilizer {
            Some((stabilizer, params)) => stabilize_checked(stabilizer.as_ref(), stack, params)?,
            None => stack,
        };
        match stack {
            Stack::Gray8(volume) => {
                let (summary, out) = self.run_volume(&volume)?;
                Ok((summary, StackOutput {
                    segmented: Stack::Gray8(out.segmented),
                    cropped: Stack::Gray8(out.cropped),
                }))
            }
            Stack::Gray16(volume) => {
                let (summary, out) = self.run_volume(&volume)?;
                Ok((summary, StackOutput {
                    segmented: Stack::Gray16(out.segmented),
                    cropped: Stack::Gray16(out.cropped),
                }))
            }
        }
    }

    fn run_volume<T: StackSample>(&self, volume: &Volume<T>) -> Result<(RunSummary, DetectionOutput<T>)> {
        let out = self.detection.run(volume)?;
        if let Some(dir) = self.debug_dir() {
            save_overlays(dir, &self.detection.detector(), &out)?;
        }
        let summary = RunSummary {
            shape: volume.shape(),
            bbox: out.bbox,
            window: out.window,
            cropped_shape: out.cropped.shape(),
            report: out.report.clone(),
            outputs: None,
        };
        Ok((summary, out))
    }

    /// Read `input`, process it, and write `<stem>_seg.tif` / `<stem>_crop.tif`
    /// into `work_dir` unless saving is disabled.
    pub fn run_file(&self, input: &Path, work_dir: &Path, output: Option<&Path>) -> Result<RunSummary> {
        let stack = io::read_stack(input)?;
        let (mut summary, out) = self.run_stack(stack)?;

        if self.save {
            let paths = io::output_paths(work_dir, input, output);
            log::info!(
                "using output names {} and {}",
                paths.segmented.display(),
                paths.cropped.display()
            );
            if let Some(dir) = paths.segmented.parent() {
                std::fs::create_dir_all(dir)?;
            }
            io::write_any(&paths.segmented, &out.segmented)?;
            io::write_any(&paths.cropped, &out.cropped)?;
            summary.outputs = Some(paths);
        }
        Ok(summary)
    }
}

/// One PNG per frame: the mask, the chosen contour in blue, its box in green
/// and the volume box in red.
fn save_overlays<T: Intensity>(dir: &Path, detector: &FrameDetector, out: &DetectionOutput<T>) -> Result<()> {
    for (i, frame) in out.segmented.frames().iter().enumerate() {
        let mut canvas = mask_canvas(frame);
        let regions = find_regions(frame);
        if let Ok(chosen) = detector.select(&regions, frame.width(), frame.height()) {
            draw_contour(&mut canvas, chosen, Rgb([0, 0, 255]));
        }
        if let Some(Some(b)) = out.report.frame_boxes.get(i) {
            draw_box(&mut canvas, b, Rgb([0, 255, 0]));
        }
        draw_box(&mut canvas, &out.bbox, Rgb([255, 0, 0]));
        canvas.save(dir.join(format!("frame_{i:04}.png")))?;
    }
    log::debug!("saved {} overlays to {}", out.segmented.depth(), dir.display());
    Ok(())
}

fn mask_canvas<T: Intensity>(frame: &Frame<T>) -> RgbImage {
    RgbImage::from_fn(frame.width(), frame.height(), |x, y| {
        if frame.get_pixel(x, y)[0].level() > 0 {
            Rgb([255, 255, 255])
        } else {
            Rgb([0, 0, 0])
        }
    })
}

fn draw_contour(canvas: &mut RgbImage, contour: &RegionContour, color: Rgb<u8>) {
    let points = &contour.points;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        draw_line_segment_mut(canvas, (p.x as f32, p.y as f32), (q.x as f32, q.y as f32), color);
    }
}

fn draw_box(canvas: &mut RgbImage, b: &BoundingBox, color: Rgb<u8>) {
    if !b.is_valid() {
        return;
    }
    let rect = Rect::at(b.x1, b.y1).of_size((b.width() + 1) as u32, (b.height() + 1) as u32);
    draw_hollow_rect_mut(canvas, rect, color);
}

use image::{GrayImage, Luma};
use imageproc::contours::find_contours;
use imageproc::point::Point;

use crate::error::{CropError, Result};
use crate::models::{BoundingBox, Frame, Intensity};

/// Closed boundary of one foreground region, in tracing order.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionContour {
    pub points: Vec<Point<i32>>,
}

impl RegionContour {
    /// Area enclosed by the boundary polygon (shoelace formula).
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let twice: i64 = (0..n)
            .map(|i| {
                let p = self.points[i];
                let q = self.points[(i + 1) % n];
                p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64
            })
            .sum();
        twice.abs() as f64 / 2.0
    }

    /// Mean of the boundary points.
    pub fn centroid(&self) -> (f64, f64) {
        if self.points.is_empty() {
            return (f64::NAN, f64::NAN);
        }
        let n = self.points.len() as f64;
        let (sx, sy) = self
            .points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x as f64, sy + p.y as f64));
        (sx / n, sy / n)
    }

    pub fn first_point(&self) -> Option<Point<i32>> {
        self.points.first().copied()
    }

    /// Extent of the boundary points.
    pub fn bounds(&self) -> BoundingBox {
        self.points.iter().fold(
            BoundingBox::new(i32::MAX, i32::MAX, i32::MIN, i32::MIN),
            |b, p| BoundingBox::new(b.x1.min(p.x), b.y1.min(p.y), b.x2.max(p.x), b.y2.max(p.y)),
        )
    }
}

/// Trace every region border (outer and hole) of a binarized frame.
///
/// Each border keeps only the points where the step direction changes, so
/// straight horizontal, vertical and diagonal runs shrink to their ends.
pub fn find_regions<T: Intensity>(frame: &Frame<T>) -> Vec<RegionContour> {
    let mask = GrayImage::from_fn(frame.width(), frame.height(), |x, y| {
        if frame.get_pixel(x, y)[0].level() > 0 {
            Luma([255])
        } else {
            Luma([0])
        }
    });
    find_contours::<i32>(&mask)
        .into_iter()
        .map(|c| RegionContour {
            points: compress_runs(c.points),
        })
        .collect()
}

/// Drop interior points of straight runs. The starting point is always kept.
pub(crate) fn compress_runs(points: Vec<Point<i32>>) -> Vec<Point<i32>> {
    let n = points.len();
    if n < 3 {
        return points;
    }
    let step = |a: Point<i32>, b: Point<i32>| (b.x - a.x, b.y - a.y);
    (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            i == 0 || step(prev, points[i]) != step(points[i], next)
        })
        .map(|i| points[i])
        .collect()
}

/// Size and centrality limits for candidate regions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionFilter {
    pub min_area: f64,
    pub max_area_fraction: f64,
    pub center_fraction: f64,
}

impl Default for RegionFilter {
    fn default() -> Self {
        Self {
            min_area: 100.0,
            max_area_fraction: 0.8,
            center_fraction: 0.1,
        }
    }
}

/// Finds the region nearest the frame center and returns its extent.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameDetector {
    pub filter: RegionFilter,
}

impl FrameDetector {
    pub fn new(filter: RegionFilter) -> Self {
        Self { filter }
    }

    pub fn detect<T: Intensity>(&self, frame: &Frame<T>) -> Result<BoundingBox> {
        let regions = find_regions(frame);
        let (width, height) = frame.dimensions();
        let chosen = self.select(&regions, width, height)?;
        Ok(clamp_to_frame(chosen.bounds(), width as i32, height as i32))
    }

    /// Pick the region whose first boundary point is closest to the center,
    /// among regions of acceptable area whose centroid is near the center.
    pub fn select<'a>(
        &self,
        regions: &'a [RegionContour],
        width: u32,
        height: u32,
    ) -> Result<&'a RegionContour> {
        let (w, h) = (width as f64, height as f64);
        let max_area = h * w * self.filter.max_area_fraction;
        let sized: Vec<&RegionContour> = regions
            .iter()
            .filter(|r| {
                let area = r.area();
                self.filter.min_area < area && area < max_area
            })
            .collect();
        if sized.is_empty() {
            return Err(CropError::NoRegionFound { frame: None });
        }

        let cx = (width / 2) as f64;
        let cy = (height / 2) as f64;
        let reach = ((self.filter.center_fraction * w).powi(2)
            + (self.filter.center_fraction * h).powi(2))
        .sqrt();

        let mut best: Option<(&RegionContour, f64)> = None;
        for region in sized {
            let (mx, my) = region.centroid();
            if distance(mx, my, cx, cy) >= reach {
                continue;
            }
            let Some(first) = region.first_point() else {
                continue;
            };
            let d = distance(first.x as f64, first.y as f64, cx, cy);
            // strict: earlier regions win ties
            if best.is_none_or(|(_, best_d)| d < best_d) {
                best = Some((region, d));
            }
        }

        best.map(|(region, _)| region)
            .ok_or(CropError::NoRegionFound { frame: None })
    }
}

fn distance(x: f64, y: f64, cx: f64, cy: f64) -> f64 {
    ((x - cx).powi(2) + (y - cy).powi(2)).sqrt()
}

/// Clamp a region box to the frame. The far-corner checks are keyed off the
/// near corner, so a far corner past the edge is left alone while its near
/// corner is in range.
pub(crate) fn clamp_to_frame(mut bbox: BoundingBox, width: i32, height: i32) -> BoundingBox {
    if bbox.x1 < 0 {
        bbox.x1 = 0;
    }
    if bbox.y1 < 0 {
        bbox.y1 = 0;
    }
    if bbox.x1 >= width {
        bbox.x2 = width - 1;
    }
    if bbox.y1 >= height {
        bbox.y2 = height - 1;
    }
    bbox
}

use face_common::PixelRect;
use image::{imageops, GrayImage, ImageBuffer, Luma};

use crate::error::{MaskError, Result};

/// Single-channel coverage buffer
pub type MaskBuffer = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Single-channel region mask with values in `[0, 1]`.
///
/// Zero is off-region, one is fully inside, fractional values appear at soft
/// edges after [`RegionMask::soften`].
#[derive(Debug, Clone, PartialEq)]
pub struct RegionMask {
    data: MaskBuffer,
}

impl RegionMask {
    /// All-zero mask
    pub fn empty(width: u32, height: u32) -> Self {
        Self { data: MaskBuffer::new(width, height) }
    }

    /// All-one mask
    pub fn full(width: u32, height: u32) -> Self {
        Self { data: MaskBuffer::from_pixel(width, height, Luma([1.0])) }
    }

    /// Wrap a coverage buffer, clamping every value into `[0, 1]`
    pub fn from_buffer(mut data: MaskBuffer) -> Self {
        for pixel in data.pixels_mut() {
            pixel[0] = clamp_unit(pixel[0]);
        }
        Self { data }
    }

    /// Mask of every pixel of `image` accepted by `predicate`
    pub fn from_predicate<F>(width: u32, height: u32, predicate: F) -> Self
    where
        F: Fn(u32, u32) -> bool,
    {
        let data = MaskBuffer::from_fn(width, height, |x, y| {
            Luma([if predicate(x, y) { 1.0 } else { 0.0 }])
        });
        Self { data }
    }

    pub fn width(&self) -> u32 {
        self.data.width()
    }

    pub fn height(&self) -> u32 {
        self.data.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.data.dimensions()
    }

    pub fn buffer(&self) -> &MaskBuffer {
        &self.data
    }

    pub(crate) fn buffer_mut(&mut self) -> &mut MaskBuffer {
        &mut self.data
    }

    /// Coverage at a pixel
    pub fn value(&self, x: u32, y: u32) -> f32 {
        self.data.get_pixel(x, y)[0]
    }

    /// Coverage at a pixel, zero outside the mask
    pub fn value_at(&self, x: i32, y: i32) -> f32 {
        if x < 0 || y < 0 || x >= self.width() as i32 || y >= self.height() as i32 {
            return 0.0;
        }
        self.value(x as u32, y as u32)
    }

    /// True when no pixel carries any coverage
    pub fn is_empty(&self) -> bool {
        self.data.pixels().all(|p| p[0] <= 0.0)
    }

    /// Total coverage (sum of all values)
    pub fn coverage(&self) -> f32 {
        self.data.pixels().map(|p| p[0]).sum()
    }

    /// Number of pixels with any coverage
    pub fn support(&self) -> usize {
        self.data.pixels().filter(|p| p[0] > 0.0).count()
    }

    pub fn max_value(&self) -> f32 {
        self.data.pixels().map(|p| p[0]).fold(0.0, f32::max)
    }

    /// Binary 8-bit mask of every pixel with any coverage
    pub fn to_binary(&self) -> GrayImage {
        GrayImage::from_fn(self.width(), self.height(), |x, y| {
            Luma([if self.value(x, y) > 0.0 { 255 } else { 0 }])
        })
    }

    /// Binary mask back from an 8-bit image (non-zero is inside)
    pub(crate) fn from_binary(gray: &GrayImage) -> Self {
        Self::from_predicate(gray.width(), gray.height(), |x, y| gray.get_pixel(x, y)[0] > 0)
    }

    fn check_same_size(&self, other: &RegionMask) -> Result<()> {
        if self.dimensions() != other.dimensions() {
            return Err(MaskError::DimensionMismatch {
                expected: self.dimensions(),
                actual: other.dimensions(),
            });
        }
        Ok(())
    }

    /// Region exclusive to `self`: `max(0, a - b)`
    pub fn subtract(&self, other: &RegionMask) -> Result<Self> {
        self.check_same_size(other)?;
        let data = MaskBuffer::from_fn(self.width(), self.height(), |x, y| {
            Luma([(self.value(x, y) - other.value(x, y)).max(0.0)])
        });
        Ok(Self { data })
    }

    /// Union: per-pixel maximum
    pub fn union(&self, other: &RegionMask) -> Result<Self> {
        self.check_same_size(other)?;
        let data = MaskBuffer::from_fn(self.width(), self.height(), |x, y| {
            Luma([self.value(x, y).max(other.value(x, y))])
        });
        Ok(Self { data })
    }

    /// Multiply every value by `factor`, staying inside `[0, 1]`
    pub fn scale(&self, factor: f32) -> Self {
        let mut data = self.data.clone();
        for pixel in data.pixels_mut() {
            pixel[0] = clamp_unit(pixel[0] * factor);
        }
        Self { data }
    }

    /// Bounding box of the covered pixels grown by `padding` and clipped to
    /// the mask. `None` for an empty mask.
    pub fn bounding_box(&self, padding: i32) -> Option<PixelRect> {
        let mut extent: Option<(u32, u32, u32, u32)> = None;
        for (x, y, pixel) in self.data.enumerate_pixels() {
            if pixel[0] <= 0.0 {
                continue;
            }
            extent = Some(match extent {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            });
        }
        let (x0, y0, x1, y1) = extent?;
        PixelRect::new(x0 as i32, y0 as i32, (x1 - x0 + 1) as i32, (y1 - y0 + 1) as i32)
            .padded_within(padding, self.width(), self.height())
    }

    /// Copy out a rectangle; parts outside the mask read as zero
    pub fn crop(&self, rect: PixelRect) -> Self {
        let width = rect.width.max(0) as u32;
        let height = rect.height.max(0) as u32;
        let data = MaskBuffer::from_fn(width, height, |x, y| {
            Luma([self.value_at(rect.x + x as i32, rect.y + y as i32)])
        });
        Self { data }
    }

    /// Resample to a new size with bilinear filtering
    pub fn resize(&self, width: u32, height: u32) -> Self {
        let data = imageops::resize(&self.data, width, height, imageops::FilterType::Triangle);
        Self::from_buffer(data)
    }

    /// Zero every pixel inside `rect`
    pub fn clear_rect(&mut self, rect: PixelRect) {
        let x0 = rect.x.max(0) as u32;
        let y0 = rect.y.max(0) as u32;
        let x1 = rect.right().clamp(0, self.width() as i32) as u32;
        let y1 = rect.bottom().clamp(0, self.height() as i32) as u32;
        for y in y0..y1 {
            for x in x0..x1 {
                self.data.put_pixel(x, y, Luma([0.0]));
            }
        }
    }

    /// Zero every row from `y` downwards
    pub fn clear_below(&mut self, y: i32) {
        let rect = PixelRect::new(0, y, self.width() as i32, self.height() as i32 - y);
        self.clear_rect(rect);
    }
}

pub(crate) fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

//! Pixel transform kernel.
//!
//! Applies a [`FrameCalibration`] to a run of rows:
//!
//! 1. read R, G, B (and A) at the layout's offsets
//! 2. `adj = (orig - in_floor) * coeff + out_floor` per channel
//! 3. optionally rescale the RGB triplet by a color preservation ratio
//! 4. truncate toward zero, clip to `[0, 2^bits - 1]` and store
//!
//! Alpha always gets the plain adjustment. Each pixel depends only on its
//! own samples and the shared calibration, so any row range can be
//! processed independently of the others.
//!
//! The kernel is generic over the sample type, so the 8-bit and 16-bit
//! paths share one implementation and differ only in storage width and
//! clip bound. Whether color preservation is active is lifted out of the
//! pixel loop into a const generic.

use crate::calibrate::{Calibration, FrameCalibration};
use crate::preserve::{correction_ratio, ColorMetric, PreserveMode};
use levels_core::{PixelFormatDescriptor, Sample};

/// Read-only per-frame state shared by every slice.
#[derive(Debug, Clone, Copy)]
pub struct Kernel<'a> {
    calibration: &'a FrameCalibration,
    rgb: [usize; 3],
    alpha: Option<usize>,
    step: usize,
    /// Samples covered by pixels in one row (`width * step`)
    row_len: usize,
    /// Row stride of the frame, in samples
    stride: usize,
    metric: Option<ColorMetric>,
    /// Rows contain samples the kernel does not write (padding)
    has_gaps: bool,
}

impl<'a> Kernel<'a> {
    /// Prepares a kernel for frames of `width` pixels and `stride` samples per row.
    pub fn new(
        calibration: &'a FrameCalibration,
        desc: &PixelFormatDescriptor,
        width: u32,
        stride: usize,
        mode: PreserveMode,
    ) -> Self {
        let row_len = width as usize * desc.step();
        Self {
            calibration,
            rgb: desc.rgb_offsets(),
            alpha: desc.alpha_offset().filter(|_| calibration.alpha.is_some()),
            step: desc.step(),
            row_len,
            stride,
            metric: mode.metric(),
            has_gaps: desc.components() < desc.step() || stride > row_len,
        }
    }

    /// Transforms whole rows from `src` into `dst`.
    ///
    /// Both slices start at the same row and hold the same number of rows
    /// (`len / stride`, the last row may be short of its padding).
    /// Samples the kernel does not compute (padding) are copied from `src`.
    pub fn transform_rows<T: Sample>(&self, src: &[T], dst: &mut [T]) {
        debug_assert_eq!(src.len(), dst.len());
        if self.metric.is_some() {
            self.rows_copy::<T, true>(src, dst);
        } else {
            self.rows_copy::<T, false>(src, dst);
        }
    }

    /// Transforms whole rows in place.
    pub fn transform_rows_in_place<T: Sample>(&self, rows: &mut [T]) {
        if self.metric.is_some() {
            self.rows_in_place::<T, true>(rows);
        } else {
            self.rows_in_place::<T, false>(rows);
        }
    }

    fn rows_copy<T: Sample, const PRESERVE: bool>(&self, src: &[T], dst: &mut [T]) {
        for (src_row, dst_row) in src.chunks(self.stride).zip(dst.chunks_mut(self.stride)) {
            if self.has_gaps {
                dst_row.copy_from_slice(src_row);
            }
            let pixels = src_row[..self.row_len].chunks_exact(self.step);
            let out = dst_row[..self.row_len].chunks_exact_mut(self.step);
            for (px_in, px_out) in pixels.zip(out) {
                self.pixel::<T, PRESERVE>(px_in, px_out);
            }
        }
    }

    fn rows_in_place<T: Sample, const PRESERVE: bool>(&self, rows: &mut [T]) {
        for row in rows.chunks_mut(self.stride) {
            for px in row[..self.row_len].chunks_exact_mut(self.step) {
                let input = read_pixel(px, self.rgb, self.alpha);
                self.store::<T, PRESERVE>(input, px);
            }
        }
    }

    #[inline(always)]
    fn pixel<T: Sample, const PRESERVE: bool>(&self, px_in: &[T], px_out: &mut [T]) {
        let input = read_pixel(px_in, self.rgb, self.alpha);
        self.store::<T, PRESERVE>(input, px_out);
    }

    #[inline(always)]
    fn store<T: Sample, const PRESERVE: bool>(
        &self,
        (orig, alpha): ([f32; 3], Option<f32>),
        px: &mut [T],
    ) {
        let cal = &self.calibration.rgb;
        let mut adj = [cal[0].apply(orig[0]), cal[1].apply(orig[1]), cal[2].apply(orig[2])];

        if let Some(metric) = self.metric.filter(|_| PRESERVE) {
            let ratio = correction_ratio(metric, orig, adj, T::MAX_F32);
            for c in &mut adj {
                *c *= ratio;
            }
        }

        for (i, &off) in self.rgb.iter().enumerate() {
            px[off] = T::from_f32_clipped(adj[i]);
        }
        if let (Some(off), Some(a), Some(cal)) = (self.alpha, alpha, self.calibration.alpha) {
            px[off] = T::from_f32_clipped(cal.apply(a));
        }
    }

    /// Transforms a single pixel's samples, mainly for inspection and tests.
    ///
    /// `rgb` is the original triplet; returns the stored RGB and alpha.
    pub fn map_pixel<T: Sample>(&self, rgb: [T; 3], alpha: Option<T>) -> ([T; 3], Option<T>) {
        let mut px = [T::default(); 4];
        let rgb_at = [0, 1, 2];
        px[..3].copy_from_slice(&rgb);
        let alpha_at = alpha.map(|a| {
            px[3] = a;
            3
        });

        let local = Kernel {
            rgb: rgb_at,
            alpha: alpha_at.filter(|_| self.calibration.alpha.is_some()),
            step: 4,
            row_len: 4,
            stride: 4,
            has_gaps: false,
            ..*self
        };
        local.transform_rows_in_place(&mut px);
        let out_alpha = local.alpha.map(|_| px[3]).or(alpha);
        ([px[0], px[1], px[2]], out_alpha)
    }
}

#[inline(always)]
fn read_pixel<T: Sample>(px: &[T], rgb: [usize; 3], alpha: Option<usize>) -> ([f32; 3], Option<f32>) {
    (
        [px[rgb[0]].to_f32(), px[rgb[1]].to_f32(), px[rgb[2]].to_f32()],
        alpha.map(|off| px[off].to_f32()),
    )
}

/// Plain adjustment of a single sample, as the kernel stores it.
#[inline]
pub fn adjust_sample<T: Sample>(cal: &Calibration, v: T) -> T {
    T::from_f32_clipped(cal.apply(v.to_f32()))
}

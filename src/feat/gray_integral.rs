// This file is part of onlineboost, an online boosting classifier for
// adaptive visual tracking.
//
// The classifier follows the online AdaBoost scheme of Oza and Russell,
// as applied to tracking by Grabner and Bischof:
//
//      Real-Time Tracking via On-line Boosting,
//      Helmut Grabner, Michael Grabner, Horst Bischof.
//      In Proc. British Machine Vision Conference (BMVC), 2006.
//
// You can redistribute onlineboost and/or modify it under the terms of
// the BSD 2-Clause License.

use crate::common::Rectangle;
use crate::feat::IntegralImage;
use crate::math;

/// Integral image over an 8-bit grayscale frame.
///
/// Keeps a plain summed-area table and a table of squared pixel values so
/// that both rectangular sums and standard deviations are four lookups.
/// Buffers are reused across frames: call [`compute`](Self::compute) once
/// per frame before evaluating classifiers on it.
pub struct GrayIntegralImage {
    width: u32,
    height: u32,
    lum: Vec<i64>,
    square: Vec<u64>,
    int_img: Vec<i64>,
    square_int_img: Vec<u64>,
}

impl GrayIntegralImage {
    pub fn new() -> Self {
        GrayIntegralImage {
            width: 0,
            height: 0,
            lum: Vec::new(),
            square: Vec::new(),
            int_img: Vec::new(),
            square_int_img: Vec::new(),
        }
    }

    /// Recompute both tables from a row-major grayscale frame.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `height` is zero, or if `input` is not exactly
    /// `width * height` bytes.
    pub fn compute(&mut self, input: &[u8], width: u32, height: u32) {
        if width == 0 || height == 0 {
            panic!("Illegal arguments: width ({}), height ({})", width, height);
        }
        let length = width as usize * height as usize;
        assert_eq!(input.len(), length);

        self.reshape(width, height);
        math::copy_u8_to_i64(input, &mut self.lum);
        math::square_u8_to_u64(input, &mut self.square);
        math::integral_into(&self.lum, width as usize, height as usize, &mut self.int_img);
        math::integral_into(
            &self.square,
            width as usize,
            height as usize,
            &mut self.square_int_img,
        );
    }

    fn reshape(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        let length = width as usize * height as usize;
        let padded = (width as usize + 1) * (height as usize + 1);

        self.lum.resize(length, 0);
        self.square.resize(length, 0);
        self.int_img.resize(padded, 0);
        self.square_int_img.resize(padded, 0);
    }

    /// Corner offsets of `rect` in the padded tables.
    fn corners(&self, rect: Rectangle) -> (usize, usize, usize, usize) {
        let legal = rect.x() >= 0
            && rect.y() >= 0
            && rect.x() as i64 + i64::from(rect.width()) <= i64::from(self.width)
            && rect.y() as i64 + i64::from(rect.height()) <= i64::from(self.height);
        if !legal {
            panic!(
                "Illegal roi: {:?} (image {}x{})",
                rect, self.width, self.height
            );
        }
        let x0 = rect.x() as usize;
        let y0 = rect.y() as usize;
        (
            x0,
            y0,
            x0 + rect.width() as usize,
            y0 + rect.height() as usize,
        )
    }
}

impl Default for GrayIntegralImage {
    fn default() -> Self {
        GrayIntegralImage::new()
    }
}

impl IntegralImage for GrayIntegralImage {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn rect_sum(&self, rect: Rectangle) -> f64 {
        let (x0, y0, x1, y1) = self.corners(rect);
        let stride = self.width as usize + 1;
        (self.int_img[y1 * stride + x1] - self.int_img[y0 * stride + x1]
            - self.int_img[y1 * stride + x0]
            + self.int_img[y0 * stride + x0]) as f64
    }

    fn std_dev(&self, rect: Rectangle) -> f64 {
        let (x0, y0, x1, y1) = self.corners(rect);
        let area = (rect.width() as f64) * (rect.height() as f64);
        if area == 0.0 {
            return 0.0;
        }

        let stride = self.width as usize + 1;
        let sum = (self.int_img[y1 * stride + x1] - self.int_img[y0 * stride + x1]
            - self.int_img[y1 * stride + x0]
            + self.int_img[y0 * stride + x0]) as f64;
        // wrapping, consistent with the table construction
        let square_sum = self.square_int_img[y1 * stride + x1]
            .wrapping_sub(self.square_int_img[y0 * stride + x1])
            .wrapping_sub(self.square_int_img[y1 * stride + x0])
            .wrapping_add(self.square_int_img[y0 * stride + x0]) as f64;

        let mean = sum / area;
        let m2 = square_sum / area;
        (m2 - mean * mean).max(0.0).sqrt()
    }
}

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

use crate::classifier::WeakClassifier;
use crate::common::{Rectangle, Size};
use crate::feat::IntegralImage;

/// splitmix64 step. All feature layouts in the crate are drawn from this
/// generator so that a classifier built twice from the same seed is the
/// same classifier.
pub(crate) fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[derive(Clone, Copy)]
enum HaarKind {
    TwoRectHorizontal,
    TwoRectVertical,
    ThreeRectHorizontal,
    ThreeRectVertical,
    FourRect,
}

impl HaarKind {
    fn draw(state: &mut u64) -> Self {
        match splitmix64(state) % 5 {
            0 => HaarKind::TwoRectHorizontal,
            1 => HaarKind::TwoRectVertical,
            2 => HaarKind::ThreeRectHorizontal,
            3 => HaarKind::ThreeRectVertical,
            _ => HaarKind::FourRect,
        }
    }

    fn grid(self) -> (u32, u32) {
        match self {
            HaarKind::TwoRectHorizontal => (2, 1),
            HaarKind::TwoRectVertical => (1, 2),
            HaarKind::ThreeRectHorizontal => (3, 1),
            HaarKind::ThreeRectVertical => (1, 3),
            HaarKind::FourRect => (2, 2),
        }
    }

    /// Cell weights in row-major order. They sum to zero, so the feature
    /// responds to contrast, not to absolute brightness.
    fn weights(self) -> &'static [f32] {
        match self {
            HaarKind::TwoRectHorizontal | HaarKind::TwoRectVertical => &[1.0, -1.0],
            HaarKind::ThreeRectHorizontal | HaarKind::ThreeRectVertical => &[1.0, -2.0, 1.0],
            HaarKind::FourRect => &[1.0, -1.0, -1.0, 1.0],
        }
    }
}

/// A Haar-like rectangle-difference feature, laid out inside a reference
/// patch and scaled to whatever region it is evaluated on.
struct HaarFeature {
    patch: Size,
    rects: Vec<(Rectangle, f32)>,
}

impl HaarFeature {
    fn generate(patch: Size, state: &mut u64) -> Self {
        if patch.width() < 3 || patch.height() < 3 {
            panic!(
                "Illegal patch size: {}x{} (minimum 3x3)",
                patch.width(),
                patch.height()
            );
        }

        let kind = HaarKind::draw(state);
        let (cols, rows) = kind.grid();
        let cell_width = 1 + (splitmix64(state) % u64::from(patch.width() / cols)) as u32;
        let cell_height = 1 + (splitmix64(state) % u64::from(patch.height() / rows)) as u32;
        let x = (splitmix64(state) % u64::from(patch.width() - cols * cell_width + 1)) as i32;
        let y = (splitmix64(state) % u64::from(patch.height() - rows * cell_height + 1)) as i32;

        let weights = kind.weights();
        let mut rects = Vec::with_capacity((cols * rows) as usize);
        for row in 0..rows {
            for col in 0..cols {
                let cell = Rectangle::new(
                    x + (col * cell_width) as i32,
                    y + (row * cell_height) as i32,
                    cell_width,
                    cell_height,
                );
                rects.push((cell, weights[(row * cols + col) as usize]));
            }
        }
        HaarFeature { patch, rects }
    }

    /// Feature response over `roi`, scaled from the reference patch and
    /// normalized by the region's standard deviation.
    fn value(&self, image: &dyn IntegralImage, roi: Rectangle) -> f32 {
        let scale_x = f64::from(roi.width()) / f64::from(self.patch.width());
        let scale_y = f64::from(roi.height()) / f64::from(self.patch.height());
        let norm = image.std_dev(roi) + 1.0;

        let mut value = 0.0f64;
        for (cell, weight) in &self.rects {
            let x = roi.x() + (f64::from(cell.x()) * scale_x).floor() as i32;
            let y = roi.y() + (f64::from(cell.y()) * scale_y).floor() as i32;
            let width = ((f64::from(cell.width()) * scale_x).round() as u32).max(1);
            let height = ((f64::from(cell.height()) * scale_y).round() as u32).max(1);
            // rounding may push the far edge past the region
            let width = width.min((roi.x() + roi.width() as i32 - x) as u32);
            let height = height.min((roi.y() + roi.height() as i32 - y) as u32);

            let scaled = Rectangle::new(x, y, width, height);
            let area = f64::from(width) * f64::from(height);
            value += f64::from(*weight) * image.rect_sum(scaled) / area;
        }
        (value / norm) as f32
    }
}

/// Importance-weighted running estimate of a Gaussian response
/// distribution (weighted Welford recurrence).
#[derive(Clone, Copy, Default)]
struct GaussianEstimator {
    weight: f32,
    mean: f32,
    m2: f32,
}

impl GaussianEstimator {
    fn update(&mut self, value: f32, importance: f32) {
        self.weight += importance;
        let delta = value - self.mean;
        self.mean += (importance / self.weight) * delta;
        self.m2 += importance * delta * (value - self.mean);
    }

    fn mean(&self) -> f32 {
        self.mean
    }

    fn sigma(&self) -> f32 {
        if self.weight > 0.0 {
            (self.m2 / self.weight).max(0.0).sqrt()
        } else {
            0.0
        }
    }
}

/// Weak classifier over a single Haar-like feature.
///
/// Learns one Gaussian response model per class; the decision threshold is
/// the midpoint of the class means and the polarity follows whichever
/// class responds higher. The feature layout is drawn deterministically
/// from `seed`, so two classifiers built with the same patch size and seed
/// behave identically.
pub struct HaarClassifier {
    feature: HaarFeature,
    pos: GaussianEstimator,
    neg: GaussianEstimator,
    state: u64,
}

impl HaarClassifier {
    pub fn new(patch_size: Size, seed: u64) -> Self {
        let mut state = seed;
        let feature = HaarFeature::generate(patch_size, &mut state);
        HaarClassifier {
            feature,
            pos: GaussianEstimator::default(),
            neg: GaussianEstimator::default(),
            state,
        }
    }

    fn threshold(&self) -> f32 {
        0.5 * (self.pos.mean() + self.neg.mean())
    }

    fn polarity(&self) -> f32 {
        if self.pos.mean() >= self.neg.mean() {
            1.0
        } else {
            -1.0
        }
    }
}

impl WeakClassifier for HaarClassifier {
    fn classify(&self, image: &dyn IntegralImage, roi: Rectangle) -> i32 {
        if self.evaluate(image, roi) >= 0.0 {
            1
        } else {
            -1
        }
    }

    fn evaluate(&self, image: &dyn IntegralImage, roi: Rectangle) -> f32 {
        let value = self.feature.value(image, roi);
        let spread = 0.5 * (self.pos.sigma() + self.neg.sigma()) + 1.0;
        self.polarity() * (value - self.threshold()) / spread
    }

    fn update(&mut self, image: &dyn IntegralImage, roi: Rectangle, target: i32, importance: f32) {
        debug_assert!(
            target == 1 || target == -1,
            "target must be +1 or -1, got {}",
            target
        );
        let value = self.feature.value(image, roi);
        if target > 0 {
            self.pos.update(value, importance);
        } else {
            self.neg.update(value, importance);
        }
    }

    fn reset(&mut self, patch_size: Size) {
        self.feature = HaarFeature::generate(patch_size, &mut self.state);
        self.pos = GaussianEstimator::default();
        self.neg = GaussianEstimator::default();
    }
}

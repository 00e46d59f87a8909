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

mod haar;
mod selector;
mod strong;

pub use self::haar::HaarClassifier;
pub use self::selector::ClassifierSelector;
pub use self::strong::StrongClassifier;

use std::sync::{Arc, Mutex};

use crate::common::{Rectangle, Size};
use crate::feat::IntegralImage;

/// A single incrementally-updatable binary feature classifier.
///
/// Individually weak, useful in combination: a [`ClassifierSelector`]
/// keeps a pool of these and promotes whichever currently performs best.
/// The selector is agnostic to the concrete feature family; the bundled
/// family is [`HaarClassifier`].
///
/// `Send + Sync` keeps the concurrency model of the crate structural:
/// classifiers with exclusively owned pools can be trained and evaluated
/// on distinct targets in parallel, while shared pools serialize through
/// their mutex.
pub trait WeakClassifier: Send + Sync {
    /// Hard decision for the region: `+1` (target) or `-1` (background).
    fn classify(&self, image: &dyn IntegralImage, roi: Rectangle) -> i32;

    /// Confidence margin for the region. Sign is the decision, magnitude
    /// the confidence.
    fn evaluate(&self, image: &dyn IntegralImage, roi: Rectangle) -> f32;

    /// Learn from one labeled sample. `target` is `+1` or `-1`;
    /// `importance` is the boosting weight of the sample.
    fn update(&mut self, image: &dyn IntegralImage, roi: Rectangle, target: i32, importance: f32);

    /// Forget everything learned and draw a fresh feature for
    /// `patch_size`. Called when the classifier is evicted from a pool.
    fn reset(&mut self, patch_size: Size);
}

/// Slot-indexed pool of weak classifiers, active slots first, backup
/// slots after them.
pub type WeakClassifierPool = Vec<Box<dyn WeakClassifier>>;

/// A pool shared between several selectors (typically to amortize feature
/// extraction across tracked targets). The mutex serializes training and
/// bookkeeping, which shared pools require.
pub type SharedClassifierPool = Arc<Mutex<WeakClassifierPool>>;

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;

    /// Image stub for classifier stubs that never touch pixels.
    pub struct NullImage;

    impl IntegralImage for NullImage {
        fn width(&self) -> u32 {
            0
        }

        fn height(&self) -> u32 {
            0
        }

        fn rect_sum(&self, _: Rectangle) -> f64 {
            0.0
        }

        fn std_dev(&self, _: Rectangle) -> f64 {
            0.0
        }
    }

    /// Predicts `+1` exactly when `roi.x` is even; `agree: false` inverts
    /// every answer. Scripting the x coordinate of the samples scripts the
    /// correctness of this classifier.
    pub struct XParityClassifier {
        pub agree: bool,
    }

    impl WeakClassifier for XParityClassifier {
        fn classify(&self, _: &dyn IntegralImage, roi: Rectangle) -> i32 {
            let parity = if roi.x() % 2 == 0 { 1 } else { -1 };
            if self.agree {
                parity
            } else {
                -parity
            }
        }

        fn evaluate(&self, image: &dyn IntegralImage, roi: Rectangle) -> f32 {
            self.classify(image, roi) as f32
        }

        fn update(&mut self, _: &dyn IntegralImage, _: Rectangle, _: i32, _: f32) {}

        fn reset(&mut self, _: Size) {}
    }

    /// Same contract as [`XParityClassifier`], over `roi.y`.
    pub struct YParityClassifier {
        pub agree: bool,
    }

    impl WeakClassifier for YParityClassifier {
        fn classify(&self, _: &dyn IntegralImage, roi: Rectangle) -> i32 {
            let parity = if roi.y() % 2 == 0 { 1 } else { -1 };
            if self.agree {
                parity
            } else {
                -parity
            }
        }

        fn evaluate(&self, image: &dyn IntegralImage, roi: Rectangle) -> f32 {
            self.classify(image, roi) as f32
        }

        fn update(&mut self, _: &dyn IntegralImage, _: Rectangle, _: i32, _: f32) {}

        fn reset(&mut self, _: Size) {}
    }

    /// Always votes the same way, regardless of the sample.
    pub struct ConstantClassifier {
        pub prediction: i32,
    }

    impl WeakClassifier for ConstantClassifier {
        fn classify(&self, _: &dyn IntegralImage, _: Rectangle) -> i32 {
            self.prediction
        }

        fn evaluate(&self, _: &dyn IntegralImage, _: Rectangle) -> f32 {
            self.prediction as f32
        }

        fn update(&mut self, _: &dyn IntegralImage, _: Rectangle, _: i32, _: f32) {}

        fn reset(&mut self, _: Size) {}
    }
}

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

//! Online boosting classifier for adaptive visual tracking.
//!
//! A [`StrongClassifier`] scores whether an image region matches a
//! tracked target, and keeps improving that scoring as labeled samples
//! (matched detections and background regions) arrive frame by frame,
//! without ever retraining from scratch. It is an ensemble of
//! [`ClassifierSelector`] stages, each of which picks the currently
//! best-performing classifier out of a pool of incrementally trained
//! [`WeakClassifier`]s and can evict underperformers in favor of backup
//! candidates.
//!
//! The surrounding tracker owns frame acquisition and sampling; this
//! crate consumes frames through the [`IntegralImage`] boundary.
//!
//! # Examples
//!
//! ```rust
//! use onlineboost::{GrayIntegralImage, Rectangle, Size, StrongClassifier};
//!
//! let mut classifier = StrongClassifier::new(10, 12, Size::new(24, 24));
//!
//! // once per frame
//! let frame = vec![0u8; 320 * 240];
//! let mut integral = GrayIntegralImage::new();
//! integral.compute(&frame, 320, 240);
//!
//! // train on a matched region, score a candidate
//! let roi = Rectangle::new(40, 40, 24, 24);
//! classifier.update(&integral, roi, 1, 1.0);
//! let score = classifier.evaluate(&integral, roi);
//! # let _ = score;
//! ```

mod classifier;
mod common;
mod feat;
mod math;

pub use classifier::{
    ClassifierSelector, HaarClassifier, SharedClassifierPool, StrongClassifier, WeakClassifier,
    WeakClassifierPool,
};
pub use common::{Rectangle, Size};
pub use feat::{GrayIntegralImage, IntegralImage};

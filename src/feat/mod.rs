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

mod gray_integral;

pub use self::gray_integral::GrayIntegralImage;

use crate::common::Rectangle;

/// Summed-area view of a frame, supporting O(1) rectangular queries.
///
/// The tracker materializes one integral image per frame and hands it to
/// every classifier evaluated on that frame. Implementations are read-only
/// during classification, hence the `Sync` bound: candidate regions may be
/// scored from several threads at once.
///
/// Queries with a region that does not lie fully inside the frame are a
/// contract violation and panic.
pub trait IntegralImage: Sync {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Sum of the pixel values covered by `rect`.
    fn rect_sum(&self, rect: Rectangle) -> f64;

    /// Standard deviation of the pixel values covered by `rect`.
    ///
    /// Used by the Haar-like family to normalize feature responses against
    /// illumination changes.
    fn std_dev(&self, rect: Rectangle) -> f64;
}

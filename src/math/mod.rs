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

use num::traits::{WrappingAdd, Zero};

pub fn copy_u8_to_i64(src: &[u8], dest: &mut [i64]) {
    assert_eq!(src.len(), dest.len());
    for (d, s) in dest.iter_mut().zip(src) {
        *d = i64::from(*s);
    }
}

pub fn square_u8_to_u64(src: &[u8], dest: &mut [u64]) {
    assert_eq!(src.len(), dest.len());
    for (d, s) in dest.iter_mut().zip(src) {
        let value = u64::from(*s);
        *d = value * value;
    }
}

/// Summed-area transform of a `width` x `height` plane into a padded
/// `(width + 1) x (height + 1)` table.
///
/// The leading zero row and column absorb the boundary cases, so a
/// rectangular sum is always four lookups. Addition wraps: the table of
/// squares can overflow on very large frames, which is tolerated the same
/// way the summed-area tables in cascade detectors tolerate it.
pub fn integral_into<T>(src: &[T], width: usize, height: usize, dest: &mut [T])
where
    T: Zero + WrappingAdd + Copy,
{
    assert_eq!(src.len(), width * height);
    let stride = width + 1;
    assert_eq!(dest.len(), stride * (height + 1));

    for cell in dest[..stride].iter_mut() {
        *cell = T::zero();
    }
    for y in 0..height {
        dest[(y + 1) * stride] = T::zero();
        let mut row = T::zero();
        for x in 0..width {
            row = row.wrapping_add(&src[y * width + x]);
            dest[(y + 1) * stride + x + 1] = dest[y * stride + x + 1].wrapping_add(&row);
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_copy_u8_to_i64() {
        let src = vec![0u8, 1, 255];
        let mut dest = vec![0i64; 3];
        copy_u8_to_i64(&src, &mut dest);
        assert_eq!(vec![0, 1, 255], dest);
    }

    #[test]
    fn test_square_u8_to_u64() {
        let src = vec![0u8, 3, 255];
        let mut dest = vec![0u64; 3];
        square_u8_to_u64(&src, &mut dest);
        assert_eq!(vec![0, 9, 65025], dest);
    }

    #[test]
    fn test_integral_of_ones() {
        let src = vec![1i64; 9];
        let mut dest = vec![0i64; 16];
        integral_into(&src, 3, 3, &mut dest);
        #[rustfmt::skip]
        let expected = vec![
            0, 0, 0, 0,
            0, 1, 2, 3,
            0, 2, 4, 6,
            0, 3, 6, 9,
        ];
        assert_eq!(expected, dest);
    }

    #[test]
    fn test_integral_reuses_dirty_buffer() {
        let src = vec![2i64, 4, 6, 8];
        let mut dest = vec![-1i64; 9];
        integral_into(&src, 2, 2, &mut dest);
        #[rustfmt::skip]
        let expected = vec![
            0, 0, 0,
            0, 2, 6,
            0, 8, 20,
        ];
        assert_eq!(expected, dest);
    }
}

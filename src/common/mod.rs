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

/// Region of interest inside a frame, in pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rectangle {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
}

impl Rectangle {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Rectangle {
            x,
            y,
            width,
            height,
        }
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn set_x(&mut self, x: i32) {
        self.x = x;
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn set_y(&mut self, y: i32) {
        self.y = y;
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn set_width(&mut self, width: u32) {
        self.width = width;
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set_height(&mut self, height: u32) {
        self.height = height;
    }
}

/// Extent of the patch a weak classifier operates on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Size {
    width: u32,
    height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Size { width, height }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

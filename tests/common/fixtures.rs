#![allow(dead_code)]

use image::Luma;
use stackcrop::{Frame, Volume};

pub const SIZE: u32 = 64;
pub const BACKGROUND: u8 = 10;
pub const FOREGROUND: u8 = 200;

/// Frame of `background` with an inclusive `[x1, x2] x [y1, y2]` rectangle of `value`.
pub fn frame_with_rect(
    width: u32,
    height: u32,
    background: u8,
    value: u8,
    (x1, y1, x2, y2): (u32, u32, u32, u32),
) -> Frame<u8> {
    Frame::from_fn(width, height, |x, y| {
        if (x1..=x2).contains(&x) && (y1..=y2).contains(&y) {
            Luma([value])
        } else {
            Luma([background])
        }
    })
}

pub fn blank_frame(width: u32, height: u32, value: u8) -> Frame<u8> {
    Frame::from_pixel(width, height, Luma([value]))
}

/// 64x64 frame with the 20x20 square centered (pixels 22..=41).
pub fn centered_square_frame() -> Frame<u8> {
    frame_with_rect(SIZE, SIZE, BACKGROUND, FOREGROUND, (22, 22, 41, 41))
}

/// Five 64x64 frames; only frames 1..=3 carry the centered square.
pub fn square_volume() -> Volume<u8> {
    let frames = (0..5)
        .map(|i| {
            if (1..=3).contains(&i) {
                centered_square_frame()
            } else {
                blank_frame(SIZE, SIZE, BACKGROUND)
            }
        })
        .collect();
    Volume::new(frames).expect("uniform frames")
}

/// Five 64x64 frames whose square drifts a little from frame to frame.
pub fn drifting_volume() -> Volume<u8> {
    let offsets: [(i32, i32); 5] = [(-2, 0), (0, -3), (1, 1), (3, 2), (0, 3)];
    let frames = offsets
        .iter()
        .map(|&(dx, dy)| {
            let x1 = (22 + dx) as u32;
            let y1 = (22 + dy) as u32;
            frame_with_rect(SIZE, SIZE, BACKGROUND, FOREGROUND, (x1, y1, x1 + 19, y1 + 19))
        })
        .collect();
    Volume::new(frames).expect("uniform frames")
}

/// Binary (0/255) frame with a filled rectangle, as the segmenter would produce.
pub fn mask_with_rect(width: u32, height: u32, rect: (u32, u32, u32, u32)) -> Frame<u8> {
    frame_with_rect(width, height, 0, 255, rect)
}

/// Right triangle with its right angle at (7, 17): legs of 41 px along the
/// top and 21 px down the left, hypotenuse a 2:1 staircase.
pub fn triangle_frame(background: u8, value: u8) -> Frame<u8> {
    Frame::from_fn(SIZE, SIZE, |x, y| {
        let inside = (17..=37).contains(&y) && (7..=7 + 2 * (37 - y)).contains(&x);
        if inside { Luma([value]) } else { Luma([background]) }
    })
}

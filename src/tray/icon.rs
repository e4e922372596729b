//! Tray icons drawn in code
//!
//! Two 32x32 variants: a grey disc when nothing is up, and a green disc with
//! a check mark when an interface is active.

use image::{Rgba, RgbaImage};
use tray_icon::{BadIcon, Icon};

const SIZE: u32 = 32;

const INACTIVE: Rgba<u8> = Rgba([0x88, 0x88, 0x88, 0xff]);
const ACTIVE: Rgba<u8> = Rgba([0x2e, 0x9e, 0x4f, 0xff]);
const MARK: Rgba<u8> = Rgba([0xff, 0xff, 0xff, 0xff]);
const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Check mark as two segments, in pixel coordinates
const CHECK: [((f32, f32), (f32, f32)); 2] = [
    ((9.0, 16.5), (14.0, 21.5)),
    ((14.0, 21.5), (23.0, 11.0)),
];
const CHECK_WIDTH: f32 = 1.8;

pub fn render(active: bool) -> RgbaImage {
    let center = (SIZE as f32 - 1.0) / 2.0;
    let radius = SIZE as f32 / 2.0 - 1.0;
    let fill = if active { ACTIVE } else { INACTIVE };

    RgbaImage::from_fn(SIZE, SIZE, |x, y| {
        let (px, py) = (x as f32, y as f32);
        let dist = ((px - center).powi(2) + (py - center).powi(2)).sqrt();
        if dist > radius {
            return CLEAR;
        }
        let on_check = CHECK
            .iter()
            .any(|&(a, b)| segment_distance((px, py), a, b) <= CHECK_WIDTH);
        if active && on_check {
            return MARK;
        }
        fill
    })
}

pub fn icon(active: bool) -> Result<Icon, BadIcon> {
    let image = render(active);
    let (width, height) = image.dimensions();
    Icon::from_rgba(image.into_raw(), width, height)
}

fn segment_distance(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    let t = (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0);
    let (cx, cy) = (a.0 + t * dx, a.1 + t * dy);
    ((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_dimensions() {
        let image = render(false);
        assert_eq!(image.dimensions(), (SIZE, SIZE));
        assert_eq!(image.into_raw().len(), (SIZE * SIZE * 4) as usize);
    }

    #[test]
    fn test_corners_are_transparent() {
        let image = render(true);
        assert_eq!(*image.get_pixel(0, 0), CLEAR);
        assert_eq!(*image.get_pixel(SIZE - 1, SIZE - 1), CLEAR);
    }

    #[test]
    fn test_active_icon_has_check_mark() {
        let active = render(true);
        let inactive = render(false);
        assert_eq!(*active.get_pixel(14, 21), MARK);
        assert_eq!(*inactive.get_pixel(14, 21), INACTIVE);
        assert_eq!(*active.get_pixel(16, 6), ACTIVE);
    }
}

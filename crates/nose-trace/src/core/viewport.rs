use glam::Vec2;

use crate::api::config::LayoutConfig;
use crate::letters::completion::LetterPlacement;

/// Canvas the game is drawn on, and how the camera frame is fitted into it.
///
/// The video is scaled to cover the whole canvas (cropping the overflow)
/// and drawn mirrored, so a detection in source-frame pixels goes through
/// `to_canvas` and then `to_screen` before it can be compared with letters.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    layout: LayoutConfig,
}

impl Viewport {
    pub fn new(width: f32, height: f32, layout: LayoutConfig) -> Self {
        Self {
            width,
            height,
            layout,
        }
    }

    /// Resize the canvas (e.g. on window resize).
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn center(&self) -> Vec2 {
        self.size() / 2.0
    }

    /// Scale and offset of a `source`-sized frame drawn to cover the canvas.
    pub fn cover_transform(&self, source: Vec2) -> (f32, Vec2) {
        let horiz_ratio = self.width / source.x;
        let vert_ratio = self.height / source.y;
        let scale = horiz_ratio.max(vert_ratio);
        let offset = (self.size() - source * scale) / 2.0;
        (scale, offset)
    }

    /// Map a source-frame point to canvas pixels. Identity when the source
    /// size is unknown.
    pub fn to_canvas(&self, point: Vec2, source: Option<Vec2>) -> Vec2 {
        match source {
            Some(source) if source.x > 0.0 && source.y > 0.0 => {
                let (scale, offset) = self.cover_transform(source);
                point * scale + offset
            }
            _ => point,
        }
    }

    /// Map a canvas point to what the player sees, undoing the mirror.
    pub fn to_screen(&self, point: Vec2) -> Vec2 {
        if self.layout.mirror_x {
            Vec2::new(self.width - point.x, point.y)
        } else {
            point
        }
    }

    /// Where the active letter is drawn and how big its checkpoint box is.
    pub fn letter_placement(&self) -> LetterPlacement {
        let l = &self.layout;
        let font_size = self.width.min(self.height) * l.font_scale;
        LetterPlacement {
            center: Vec2::new(self.width * l.letter_x, self.height * l.letter_y),
            font_size,
            box_size: Vec2::new(font_size * l.box_width_ratio, font_size * l.box_height_ratio),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn portrait() -> Viewport {
        Viewport::new(1080.0, 1920.0, LayoutConfig::default())
    }

    #[test]
    fn cover_crops_wide_video() {
        let v = portrait();
        // 640x480 into 1080x1920: height-bound, scale 4.
        let (scale, offset) = v.cover_transform(Vec2::new(640.0, 480.0));
        assert_eq!(scale, 4.0);
        assert_eq!(offset, Vec2::new((1080.0 - 2560.0) / 2.0, 0.0));
        let center = v.to_canvas(Vec2::new(320.0, 240.0), Some(Vec2::new(640.0, 480.0)));
        assert_eq!(center, v.center());
    }

    #[test]
    fn unknown_source_is_identity() {
        let v = portrait();
        assert_eq!(v.to_canvas(Vec2::new(12.0, 34.0), None), Vec2::new(12.0, 34.0));
    }

    #[test]
    fn mirror_flips_x() {
        let v = portrait();
        assert_eq!(v.to_screen(Vec2::new(100.0, 50.0)), Vec2::new(980.0, 50.0));

        let plain = Viewport::new(
            1080.0,
            1920.0,
            LayoutConfig {
                mirror_x: false,
                ..LayoutConfig::default()
            },
        );
        assert_eq!(plain.to_screen(Vec2::new(100.0, 50.0)), Vec2::new(100.0, 50.0));
    }

    #[test]
    fn letter_sits_below_center() {
        let placement = portrait().letter_placement();
        assert!(placement.center.abs_diff_eq(Vec2::new(540.0, 1152.0), 1e-3));
        assert!((placement.font_size - 324.0).abs() < 1e-3);
        assert!((placement.box_size.x - 259.2).abs() < 1e-3);
    }
}

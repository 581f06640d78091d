use hud_model::*;

use crate::layout::{IMG_SIZE, RADIUS};

/// Accumulates draw commands in paint order.
#[derive(Debug, Default)]
pub struct Canvas {
    cmds: Vec<DrawCmd>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fill_rect(&mut self, rect: Rect, paint: Paint) {
        self.cmds.push(DrawCmd::FillRect { rect, paint });
    }

    pub fn rounded_rect(&mut self, rect: Rect, radius: f32, fill: Option<Paint>, stroke: Option<Stroke>) {
        self.cmds.push(DrawCmd::RoundedRect { rect, radius, fill, stroke });
    }

    pub fn ellipse(&mut self, rect: Rect, color: Color) {
        self.cmds.push(DrawCmd::Ellipse { rect, fill: Paint::Solid(color) });
    }

    pub fn polygon(&mut self, points: &[Point], paint: Paint) {
        if points.is_empty() {
            return;
        }
        self.cmds.push(DrawCmd::Polygon { points: points.to_vec(), fill: paint });
    }

    pub fn text(&mut self, text: impl Into<String>, font: Font, color: Color, anchor: TextAnchor) {
        self.cmds.push(DrawCmd::Text { text: text.into(), font, color, anchor });
    }

    /// Text centred on `x` with its bottom edge on `y`.
    pub fn text_centered(&mut self, x: f32, y: f32, text: impl Into<String>, font: Font, color: Color) {
        self.text(text, font, color, TextAnchor::BottomCenter(Point::new(x, y)));
    }

    pub fn text_in(&mut self, rect: Rect, align: Align, text: impl Into<String>, font: Font, color: Color) {
        self.text(text, font, color, TextAnchor::Boxed { rect, align, wrap: false });
    }

    pub fn text_wrapped(&mut self, rect: Rect, align: Align, text: impl Into<String>, font: Font, color: Color) {
        self.text(text, font, color, TextAnchor::Boxed { rect, align, wrap: true });
    }

    pub fn image(&mut self, asset: AssetId, rect: Rect, opacity: f32) {
        self.image_rotated(asset, rect, opacity, 0.0);
    }

    pub fn image_rotated(&mut self, asset: AssetId, rect: Rect, opacity: f32, rotation_deg: f32) {
        self.cmds.push(DrawCmd::Image { asset, rect, opacity, rotation_deg });
    }

    /// Round icon badge: a filled circle with the image centred on it.
    pub fn icon(&mut self, cx: f32, cy: f32, asset: AssetId, bg: Color, opacity: f32, rotation_deg: f32) {
        self.ellipse(Rect::centered(cx, cy, RADIUS), bg);
        self.image_rotated(asset, Rect::centered(cx, cy, IMG_SIZE), opacity, rotation_deg);
    }

    pub fn clipped(&mut self, clip: Rect, paint: impl FnOnce(&mut Canvas)) {
        let mut inner = Canvas::new();
        paint(&mut inner);
        self.cmds.extend(
            inner.cmds.into_iter().map(|cmd| DrawCmd::Clipped { clip, cmd: Box::new(cmd) }),
        );
    }

    pub fn len(&self) -> usize {
        self.cmds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    pub fn finish(self) -> Vec<DrawCmd> {
        self.cmds
    }
}

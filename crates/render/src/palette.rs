use hud_model::Color;

pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
pub const BLACK: Color = Color::rgb(0, 0, 0);
pub const LIME: Color = Color::rgb(120, 255, 120);

pub const GOOD: Color = Color::rgb(255, 255, 255);
pub const WARNING: Color = Color::rgb(218, 202, 37);
pub const DANGER: Color = Color::rgb(201, 34, 49);
pub const PURE_RED: Color = Color::rgb(255, 0, 0);

pub const RADAR_GLOW: Color = Color::rgb(86, 121, 216);
pub const VISION_GLOW: Color = Color::rgb(218, 202, 37);

pub const SIDEBAR_BG: Color = Color::rgb(57, 57, 57);
pub const DOT_OFF: Color = Color::rgb(0x54, 0x54, 0x54);
pub const BATTERY_FILL: Color = Color::rgb(0x14, 0x99, 0x48);

pub const fn red(alpha: u8) -> Color {
    DANGER.with_alpha(alpha)
}

pub const fn white(alpha: u8) -> Color {
    WHITE.with_alpha(alpha)
}

pub const fn black(alpha: u8) -> Color {
    BLACK.with_alpha(alpha)
}

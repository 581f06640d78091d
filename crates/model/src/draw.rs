use serde::{Deserialize, Serialize};

use crate::{Color, Point, Rect};

pub const FONT_FAMILY: &str = "Open Sans";

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub enum Paint {
    Solid(Color),
    /// Linear gradient from `start` to `end`; stop offsets are in 0..=1.
    LinearGradient { start: Point, end: Point, stops: Vec<(f32, Color)> },
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub enum FontWeight {
    Regular,
    SemiBold,
    Bold,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Font {
    pub family: String,
    pub size: f32,
    pub weight: FontWeight,
}

impl Font {
    pub fn new(size: f32, weight: FontWeight) -> Self {
        Self { family: FONT_FAMILY.into(), size, weight }
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Align {
    Center,
    HCenter,
    HCenterTop,
    Left,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub enum TextAnchor {
    /// Baseline starts at the point.
    Baseline(Point),
    /// Horizontally centred on `x`, bottom edge of the text box on `y`.
    BottomCenter(Point),
    Boxed { rect: Rect, align: Align, wrap: bool },
}

/// Image assets the HUD references. Loading them is the backend's job.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub enum AssetId {
    EngageWheel,
    DriverFace,
    Wifi,
    Direction,
    BrakeDisc,
    AutoholdActive,
    Nda,
    Hda,
    Satellite,
    ButtonHome,
    ButtonSettings,
    Battery,
    BatteryCharging,
}

impl AssetId {
    pub fn path(self) -> &'static str {
        match self {
            AssetId::EngageWheel => "../assets/img_chffr_wheel.png",
            AssetId::DriverFace => "../assets/img_driver_face.png",
            AssetId::Wifi => "../assets/img_wifi.png",
            AssetId::Direction => "../assets/img_direction.png",
            AssetId::BrakeDisc => "../assets/images/img_brake_disc.png",
            AssetId::AutoholdActive => "../assets/images/img_autohold_active.png",
            AssetId::Nda => "../assets/images/img_nda.png",
            AssetId::Hda => "../assets/images/img_hda.png",
            AssetId::Satellite => "../assets/images/satellite.png",
            AssetId::ButtonHome => "../assets/images/button_home.png",
            AssetId::ButtonSettings => "../assets/images/button_settings.png",
            AssetId::Battery => "../assets/images/battery.png",
            AssetId::BatteryCharging => "../assets/images/battery_charging.png",
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub enum DrawCmd {
    FillRect { rect: Rect, paint: Paint },
    RoundedRect { rect: Rect, radius: f32, fill: Option<Paint>, stroke: Option<Stroke> },
    Ellipse { rect: Rect, fill: Paint },
    Polygon { points: Vec<Point>, fill: Paint },
    Text { text: String, font: Font, color: Color, anchor: TextAnchor },
    Image { asset: AssetId, rect: Rect, opacity: f32, rotation_deg: f32 },
    Clipped { clip: Rect, cmd: Box<DrawCmd> },
}

/// Z-order of the composited layers, bottom first.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Border,
    Road,
    Hud,
    Alerts,
    Sidebar,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct LayerList {
    pub layer: Layer,
    /// Offset of the layer's local coordinates on screen.
    pub origin: Point,
    pub cmds: Vec<DrawCmd>,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct Frame {
    pub frame: u64,
    pub layers: Vec<LayerList>,
}

impl Frame {
    pub fn layer(&self, layer: Layer) -> Option<&LayerList> {
        self.layers.iter().find(|l| l.layer == layer)
    }

    /// All text emitted on the given layer, in draw order.
    pub fn texts(&self, layer: Layer) -> Vec<&str> {
        self.layer(layer)
            .map(|l| l.cmds.iter().filter_map(DrawCmd::text).collect())
            .unwrap_or_default()
    }
}

impl DrawCmd {
    pub fn text(&self) -> Option<&str> {
        match self {
            DrawCmd::Text { text, .. } => Some(text.as_str()),
            DrawCmd::Clipped { cmd, .. } => cmd.text(),
            _ => None,
        }
    }
}

use hud_model::*;

use crate::canvas::Canvas;
use crate::palette;
use crate::Signal;

pub const SIDEBAR_WIDTH: f32 = 300.0;
pub const SETTINGS_BTN: Rect = Rect::new(50.0, 35.0, 200.0, 117.0);

const HEARTBEAT_TIMEOUT_NS: u64 = 80_000_000_000;
const NET_DOTS: u8 = 5;
const BATTERY_FILL_W: f32 = 76.0;

pub fn connectivity_status(last_ping_ns: u64, prime_redirected: bool, now_ns: u64) -> ItemStatus {
    if last_ping_ns == 0 {
        if prime_redirected {
            ItemStatus::new("NO\nPRIME", palette::DANGER)
        } else {
            ItemStatus::new("CONNECT\nOFFLINE", palette::WARNING)
        }
    } else if now_ns.saturating_sub(last_ping_ns) < HEARTBEAT_TIMEOUT_NS {
        ItemStatus::new("CONNECT\nONLINE", palette::GOOD)
    } else {
        ItemStatus::new("CONNECT\nERROR", palette::DANGER)
    }
}

pub fn thermal_status(ts: ThermalStatus) -> ItemStatus {
    match ts {
        ThermalStatus::Green => ItemStatus::new("TEMP\nOK", palette::GOOD),
        ThermalStatus::Yellow => ItemStatus::new("TEMP\nOK", palette::WARNING),
        ThermalStatus::Red | ThermalStatus::Danger => ItemStatus::new("TEMP\nHIGH", palette::DANGER),
    }
}

pub fn panda_status(pt: PandaType) -> ItemStatus {
    match pt {
        PandaType::Unknown => ItemStatus::new("NO\nPANDA", palette::DANGER),
        _ => ItemStatus::new("VEHICLE\nONLINE", palette::GOOD),
    }
}

/// Number of lit network dots; a reported strength of 0 lights none.
pub fn net_dots(strength: u8) -> u8 {
    if strength > 0 { strength.saturating_add(1) } else { 0 }
}

pub fn battery_fill_width(percent: i32) -> f32 {
    BATTERY_FILL_W * percent.clamp(0, 100) as f32 * 0.01
}

#[derive(Debug, Clone, PartialEq)]
pub struct SidebarModel {
    pub net_type: &'static str,
    pub net_strength: u8,
    pub connect: ItemStatus,
    pub temp: ItemStatus,
    pub panda: ItemStatus,
    pub battery_percent: i32,
    pub charging: bool,
}

impl Default for SidebarModel {
    fn default() -> Self {
        Self::derive(&StateSnapshot::default(), false, 0)
    }
}

impl SidebarModel {
    pub fn derive(s: &StateSnapshot, prime_redirected: bool, now_ns: u64) -> Self {
        let ds = &s.device;
        Self {
            net_type: ds.network_type.label(),
            net_strength: net_dots(ds.network_strength),
            connect: connectivity_status(ds.last_athena_ping_ns, prime_redirected, now_ns),
            temp: thermal_status(ds.thermal_status),
            panda: panda_status(s.panda.panda_type),
            battery_percent: ds.battery_percent,
            charging: ds.battery_status == BatteryStatus::Charging,
        }
    }
}

/// Device status column to the left of the road view.
#[derive(Debug, Clone)]
pub struct SidebarPanel {
    height: f32,
    visible: bool,
    model: SidebarModel,
}

impl SidebarPanel {
    pub fn new(height: f32, visible: bool) -> Self {
        Self { height, visible, model: SidebarModel::default() }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn model(&self) -> &SidebarModel {
        &self.model
    }

    /// No-op while hidden. Returns true when the tiles changed.
    pub fn update(&mut self, s: &StateSnapshot, prime_redirected: bool, now_ns: u64) -> bool {
        if !self.visible {
            return false;
        }
        let next = SidebarModel::derive(s, prime_redirected, now_ns);
        if next == self.model {
            return false;
        }
        self.model = next;
        true
    }

    /// Only the settings button reacts to clicks.
    pub fn hit_test(&self, p: Point) -> Option<Signal> {
        SETTINGS_BTN.contains(p).then_some(Signal::OpenSettings)
    }

    pub fn render(&self) -> Vec<DrawCmd> {
        let m = &self.model;
        let mut c = Canvas::new();
        c.fill_rect(Rect::new(0.0, 0.0, SIDEBAR_WIDTH, self.height), Paint::Solid(palette::SIDEBAR_BG));

        c.image(AssetId::ButtonSettings, SETTINGS_BTN, 0.65);
        c.image(AssetId::ButtonHome, Rect::new(60.0, self.height - 180.0 - 40.0, 180.0, 180.0), 1.0);

        for i in 0..NET_DOTS {
            let color = if i < m.net_strength { palette::WHITE } else { palette::DOT_OFF };
            c.ellipse(Rect::new(58.0 + 37.0 * f32::from(i), 196.0, 27.0, 27.0), color);
        }
        c.text_in(
            Rect::new(20.0, 237.0, 250.0, 50.0),
            Align::Center,
            m.net_type,
            Font::new(31.0, FontWeight::Regular),
            palette::WHITE,
        );

        c.fill_rect(
            Rect::new(50.0, 298.0, battery_fill_width(m.battery_percent), 25.0),
            Paint::Solid(palette::BATTERY_FILL),
        );
        let battery = if m.charging { AssetId::BatteryCharging } else { AssetId::Battery };
        c.image(battery, Rect::new(45.0, 293.0, 96.0, 36.0), 1.0);
        c.text_in(
            Rect::new(170.0, 288.0, SIDEBAR_WIDTH - 170.0, 50.0),
            Align::Left,
            format!("{}%", m.battery_percent),
            Font::new(30.0, FontWeight::Regular),
            palette::WHITE,
        );

        draw_metric(&mut c, &m.temp, 355.0);
        draw_metric(&mut c, &m.panda, 518.0);
        draw_metric(&mut c, &m.connect, 676.0);
        c.finish()
    }
}

fn draw_metric(c: &mut Canvas, status: &ItemStatus, y: f32) {
    let rect = Rect::new(30.0, y, 240.0, 130.0);
    let strip = Rect::new(rect.x + 6.0, rect.y, 18.0, rect.h);
    c.clipped(strip, |c| {
        let pill = Rect::new(rect.x + 6.0, rect.y + 6.0, 100.0, rect.h - 12.0);
        c.rounded_rect(pill, 10.0, Some(Paint::Solid(status.color)), None);
    });
    c.rounded_rect(
        rect,
        20.0,
        None,
        Some(Stroke { color: palette::white(0x55), width: 2.0 }),
    );
    let label = Rect::new(rect.x + 35.0, rect.y, rect.w - 50.0, rect.h);
    c.text_in(label, Align::Center, status.label.clone(), Font::new(35.0, FontWeight::Regular), palette::WHITE);
}

#[cfg(test)]
mod tests {
    use super::*;

    const S: u64 = 1_000_000_000;

    #[test]
    fn test_connectivity() {
        assert_eq!(connectivity_status(0, true, 100 * S).label, "NO\nPRIME");
        assert_eq!(connectivity_status(0, false, 100 * S), ItemStatus::new("CONNECT\nOFFLINE", palette::WARNING));
        assert_eq!(connectivity_status(30 * S, false, 100 * S).color, palette::GOOD);
        assert_eq!(connectivity_status(20 * S, false, 100 * S).label, "CONNECT\nERROR");
    }

    #[test]
    fn test_thermal_and_panda() {
        assert_eq!(thermal_status(ThermalStatus::Green).color, palette::GOOD);
        assert_eq!(thermal_status(ThermalStatus::Yellow), ItemStatus::new("TEMP\nOK", palette::WARNING));
        assert_eq!(thermal_status(ThermalStatus::Danger).label, "TEMP\nHIGH");
        assert_eq!(panda_status(PandaType::Unknown).label, "NO\nPANDA");
        assert_eq!(panda_status(PandaType::Uno).label, "VEHICLE\nONLINE");
    }

    #[test]
    fn test_dots_and_battery() {
        assert_eq!(net_dots(0), 0);
        assert_eq!(net_dots(2), 3);
        assert_eq!(battery_fill_width(50), 38.0);
        assert_eq!(battery_fill_width(150), 76.0);
        assert_eq!(battery_fill_width(-5), 0.0);
    }

    #[test]
    fn test_hidden_panel_skips_updates() {
        let mut s = StateSnapshot::default();
        s.device.battery_percent = 80;
        let mut panel = SidebarPanel::new(1080.0, false);
        assert!(!panel.update(&s, false, 0));
        assert_eq!(panel.model().battery_percent, 0);

        panel.set_visible(true);
        assert!(panel.update(&s, false, 0));
        assert!(!panel.update(&s, false, 0));
        let cmds = panel.render();
        assert!(cmds.iter().any(|c| c.text() == Some("80%")));
        assert!(cmds.iter().any(|c| c.text() == Some("NO\nPANDA")));
    }

    #[test]
    fn test_lit_dots_capped_at_five() {
        let mut s = StateSnapshot::default();
        s.device.network_strength = 4;
        let mut panel = SidebarPanel::new(1080.0, true);
        panel.update(&s, false, 0);
        let lit = panel
            .render()
            .iter()
            .filter(|c| matches!(c, DrawCmd::Ellipse { fill: Paint::Solid(col), .. } if *col == palette::WHITE))
            .count();
        assert_eq!(lit, 5);
    }

    #[test]
    fn test_hit_test() {
        let panel = SidebarPanel::new(1080.0, true);
        assert_eq!(panel.hit_test(Point::new(100.0, 100.0)), Some(Signal::OpenSettings));
        assert_eq!(panel.hit_test(Point::new(100.0, 500.0)), None);
    }
}

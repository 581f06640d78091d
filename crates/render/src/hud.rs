use hud_model::*;

use crate::canvas::Canvas;
use crate::layout::{BDR_S, FOOTER_H, RADIUS};
use crate::palette;
use crate::units::{MS_TO_KPH, MS_TO_MPH};

const ROW_H: f32 = 110.0;

/// Values the icon layer shows, copied out of the snapshot every refresh.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HudState {
    pub status: UiStatus,
    pub engageable: bool,
    pub dm_active: bool,
    pub hide_dm: bool,
    pub wifi_ok: bool,
    pub gps_ok: bool,
    pub gps_bearing: f32,
    pub is_metric: bool,
    pub angle_steers: f32,
    pub steer_angle_desired: f32,
    pub engine_rpm: f32,
    pub cpu_temp: f32,
    pub lead: Option<(f32, f32)>,
}

/// Status icons and the two developer panels drawn over the road view.
#[derive(Debug, Clone)]
pub struct OnroadHud {
    width: f32,
    height: f32,
    state: HudState,
}

impl OnroadHud {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height, state: HudState::default() }
    }

    pub fn state(&self) -> &HudState {
        &self.state
    }

    /// Engage-ability and driver-monitoring only refresh at 2 Hz; the rest
    /// follows the snapshot every frame. Returns true when anything changed.
    pub fn update(&mut self, s: &StateSnapshot, frame: u64, ui_freq: u32, status: UiStatus, is_metric: bool) -> bool {
        let cs = &s.controls;
        let lead = &s.radar.lead_one;
        let mut next = HudState {
            status,
            hide_dm: cs.alert_size != AlertSize::None,
            wifi_ok: s.device.network_strength > 0,
            gps_ok: s.live_location.gps_ok,
            gps_bearing: s.gps.bearing_deg,
            is_metric,
            angle_steers: cs.angle_steers,
            steer_angle_desired: s.car_control.steering_angle_desired_deg,
            engine_rpm: s.car_state.engine_rpm,
            cpu_temp: s.device.cpu_temp_avg(),
            lead: lead.status.then_some((lead.d_rel, lead.v_rel)),
            ..self.state.clone()
        };
        if frame % u64::from((ui_freq / 2).max(1)) == 0 {
            next.engageable = cs.engageable || cs.enabled;
            next.dm_active = s.driver_monitoring.is_active_mode;
        }
        let changed = next != self.state;
        self.state = next;
        changed
    }

    pub fn render(&self) -> Vec<DrawCmd> {
        let st = &self.state;
        let mut c = Canvas::new();
        let icon_bg = palette::black(70);

        let top = RADIUS / 2.0 + BDR_S;
        if st.engageable {
            let x = self.width - RADIUS / 2.0 - BDR_S * 2.0 - RADIUS;
            c.icon(x, top, AssetId::EngageWheel, st.status.bg_color(), 1.0, -st.angle_steers);
        }

        let x = self.width - RADIUS / 2.0 - BDR_S * 2.0 - RADIUS * 2.0;
        c.icon(x, top, AssetId::Wifi, icon_bg, if st.wifi_ok { 1.0 } else { 0.2 }, 0.0);

        let x = RADIUS / 2.0 + BDR_S * 2.0 + (RADIUS + 50.0);
        let y = self.height - FOOTER_H / 2.0 - 10.0;
        c.icon(x, y, AssetId::Direction, icon_bg, if st.gps_ok { 1.0 } else { 0.2 }, -st.gps_bearing);

        self.draw_right_panel(&mut c, self.width - RADIUS - BDR_S, RADIUS + BDR_S * 4.0);
        if st.engageable {
            self.draw_left_panel(&mut c, BDR_S * 1.5, RADIUS * 2.5 + BDR_S * 1.5);
        }

        if !st.hide_dm {
            let x = RADIUS / 2.0 + BDR_S * 2.0;
            let y = self.height - FOOTER_H / 2.0;
            c.icon(x, y, AssetId::DriverFace, icon_bg, if st.dm_active { 1.0 } else { 0.2 }, 0.0);
        }
        c.finish()
    }

    fn draw_right_panel(&self, c: &mut Canvas, x: f32, y: f32) {
        let st = &self.state;
        let mut rows = vec![
            (format!("{:.1}°C", st.cpu_temp), "CPU TEMP", palette::WHITE),
            (format!("{:.0}°", st.angle_steers), "STEER", palette::LIME),
        ];
        if st.engageable {
            rows.push((format!("{:.0}°", st.steer_angle_desired), "DESIRED", palette::LIME));
        }
        let rpm = if st.engine_rpm == 0.0 { "OFF".to_string() } else { format!("{:.0}", st.engine_rpm) };
        rows.push((rpm, "RPM", palette::WHITE));

        let value_font = Font::new(45.0, FontWeight::SemiBold);
        draw_panel(c, x, y, 180.0, &rows, &value_font);
    }

    fn draw_left_panel(&self, c: &mut Canvas, x: f32, y: f32) {
        let st = &self.state;
        let (dist, speed) = match st.lead {
            Some((d_rel, v_rel)) => {
                let speed = if st.is_metric {
                    format!("{}km/h", (v_rel * MS_TO_KPH) as i32)
                } else {
                    format!("{}mph", (v_rel * MS_TO_MPH) as i32)
                };
                (format!("{}m", d_rel as i32), speed)
            }
            None => ("N/A".to_string(), "N/A".to_string()),
        };
        let rows = [(dist, "LEAD DIST", palette::WHITE), (speed, "REL SPEED", palette::WHITE)];
        draw_panel(c, x, y, 184.0, &rows, &Font::new(44.0, FontWeight::Regular));
    }
}

fn draw_panel(c: &mut Canvas, x: f32, y: f32, width: f32, rows: &[(String, &str, Color)], value_font: &Font) {
    let label_font = Font::new(32.0, FontWeight::Regular);
    let mut rh = 4.0;
    for (value, label, color) in rows {
        let ry = y + rh - 4.0;
        c.text_centered(x + 90.0, ry + 40.0, value.clone(), value_font.clone(), *color);
        c.text_centered(x + 90.0, ry + 76.0, *label, label_font.clone(), palette::WHITE);
        rh += ROW_H;
    }
    rh += 10.0;
    c.rounded_rect(
        Rect::new(x, y, width, rh),
        20.0,
        None,
        Some(Stroke { color: palette::white(100), width: 3.0 }),
    );
}

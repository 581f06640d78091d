use hud_model::*;

use crate::canvas::Canvas;
use crate::layout::{BDR_S, FOOTER_H, HEADER_H, RADIUS};
use crate::palette;
use crate::units::{KM_TO_MILE, MS_TO_KPH, MS_TO_MPH};

/// Cruise speed reported when no set speed is available.
pub const SET_SPEED_NA: f32 = 255.0;

const LEAD_MIN_PROB: f32 = 0.5;
const LEAD_DEDUP_DIST: f32 = 3.0;
const GPS_MIN_ACCURACY: f32 = 0.01;
const GPS_MAX_ACCURACY: f32 = 20.0;
const LIMIT_BADGE_MIN: i32 = 10;

pub fn max_speed_label(v_cruise: f32, is_metric: bool) -> String {
    let is_cruise_set = v_cruise != 0.0 && v_cruise != SET_SPEED_NA;
    if !is_cruise_set {
        return "N/A".into();
    }
    let v = if is_metric { v_cruise } else { v_cruise * KM_TO_MILE };
    format!("{}", v.round() as i32)
}

pub fn speed_value(v_ego: f32, is_metric: bool) -> i32 {
    let factor = if is_metric { MS_TO_KPH } else { MS_TO_MPH };
    (v_ego * factor).max(0.0).round() as i32
}

pub fn speed_unit(is_metric: bool) -> &'static str {
    if is_metric { "km/h" } else { "mph" }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapStyle {
    Unavailable,
    Auto,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GapReadout {
    pub text: String,
    pub style: GapStyle,
}

pub fn gap_readout(gap: i32, longitudinal_control: bool, auto_gap: i32) -> GapReadout {
    if gap <= 0 {
        GapReadout { text: "N/A".into(), style: GapStyle::Unavailable }
    } else if longitudinal_control && gap == auto_gap {
        GapReadout { text: "AUTO".into(), style: GapStyle::Auto }
    } else {
        GapReadout { text: gap.to_string(), style: GapStyle::Manual }
    }
}

/// Active limit as `(speed, remaining distance)`: enforcement camera first,
/// then section average.
pub fn select_speed_limit(r: &RoadLimit) -> Option<(i32, i32)> {
    if r.cam_limit_speed > 0 && r.cam_limit_speed_left_dist > 0 {
        Some((r.cam_limit_speed, r.cam_limit_speed_left_dist))
    } else if r.section_limit_speed > 0 && r.section_left_dist > 0 {
        Some((r.section_limit_speed, r.section_left_dist))
    } else {
        None
    }
}

pub fn distance_label(meters: i32) -> String {
    if meters >= 1000 {
        format!("{:.1}km", meters as f32 / 1000.0)
    } else {
        format!("{}m", meters)
    }
}

/// `None` when the fix is outside the plausible band; treated as no signal.
pub fn gps_label(accuracy: f32) -> Option<String> {
    if !(GPS_MIN_ACCURACY..=GPS_MAX_ACCURACY).contains(&accuracy) {
        return None;
    }
    Some(format!("{:.1}m", accuracy))
}

/// Leads worth drawing: confident ones, with a second detection dropped when
/// it sits within a few metres of the first.
pub fn visible_leads(leads: &[LeadTrack]) -> Vec<&LeadTrack> {
    let mut out = Vec::with_capacity(2);
    let (first, second) = (leads.first(), leads.get(1));
    if let Some(l0) = first {
        if l0.prob > LEAD_MIN_PROB {
            out.push(l0);
        }
    }
    if let (Some(l0), Some(l1)) = (first, second) {
        if l1.prob > LEAD_MIN_PROB && (l1.d_rel - l0.d_rel).abs() > LEAD_DEDUP_DIST {
            out.push(l1);
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeadMarker {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub fill_alpha: u8,
    pub radar: bool,
}

pub fn lead_marker(lead: &LeadTrack, width: f32, height: f32) -> LeadMarker {
    const SPEED_BUFF: f32 = 10.0;
    const LEAD_BUFF: f32 = 40.0;
    let (d_rel, v_rel) = (lead.d_rel, lead.v_rel);

    let mut fill_alpha = 0.0_f32;
    if d_rel < LEAD_BUFF {
        fill_alpha = 255.0 * (1.0 - d_rel / LEAD_BUFF);
        if v_rel < 0.0 {
            fill_alpha += 255.0 * (-v_rel / SPEED_BUFF);
        }
        fill_alpha = fill_alpha.min(255.0);
    }

    let size = ((25.0 * 30.0) / (d_rel / 3.0 + 30.0)).clamp(15.0, 30.0) * 2.35;
    let x = lead.screen.x.max(0.0).min(width - size / 2.0);
    let y = lead.screen.y.min(height - size * 0.6);

    LeadMarker { x, y, size, fill_alpha: fill_alpha as u8, radar: lead.radar }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilledPolygon {
    pub points: Vec<Point>,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoadGeometry {
    pub lane_lines: Vec<FilledPolygon>,
    pub road_edges: Vec<FilledPolygon>,
    pub path: Vec<Point>,
    pub end_to_end: bool,
}

impl RoadGeometry {
    pub fn derive(model: &Perception) -> Self {
        if model.end_to_end {
            return Self { path: model.path.clone(), end_to_end: true, ..Default::default() };
        }
        let lane_lines = model
            .lane_lines
            .iter()
            .map(|l| FilledPolygon { points: l.points.clone(), color: palette::WHITE.with_alpha_f(l.prob) })
            .collect();
        let road_edges = model
            .road_edges
            .iter()
            .map(|e| FilledPolygon {
                points: e.points.clone(),
                color: palette::PURE_RED.with_alpha_f((1.0 - e.std).clamp(0.0, 1.0)),
            })
            .collect();
        Self { lane_lines, road_edges, path: model.path.clone(), end_to_end: false }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpeedLimitBadge {
    pub limit: String,
    pub distance: String,
}

/// Everything the road overlay shows, copied out of one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayModel {
    pub road: RoadGeometry,
    pub leads: Vec<LeadMarker>,
    pub max_speed: String,
    pub speed: String,
    pub speed_unit: &'static str,
    pub speed_limit: Option<SpeedLimitBadge>,
    pub cam_warning: bool,
    pub nav_badge: Option<AssetId>,
    pub gps: Option<String>,
    pub gap: GapReadout,
    pub brake_lights: bool,
    pub auto_hold: bool,
    pub debug_lines: [String; 5],
    pub info: String,
}

impl OverlayModel {
    pub fn derive(s: &StateSnapshot, is_metric: bool, width: f32, height: f32) -> Self {
        let cs = &s.controls;

        let leads = if cs.longitudinal_control {
            visible_leads(&s.model.leads).into_iter().map(|l| lead_marker(l, width, height)).collect()
        } else {
            Vec::new()
        };

        let speed_limit = select_speed_limit(&s.road_limit)
            .filter(|(limit, _)| *limit > LIMIT_BADGE_MIN)
            .map(|(limit, dist)| SpeedLimitBadge { limit: limit.to_string(), distance: distance_label(dist) });
        let cam_warning =
            speed_limit.is_none() && cs.scc_stock_cam_act == 2 && cs.scc_stock_cam_status == 2;

        let nav_badge = match s.road_limit.active {
            1 => Some(AssetId::Nda),
            n if n > 1 => Some(AssetId::Hda),
            _ => None,
        };

        let debug_lines = [
            format!("State: {}", cs.long_control_state.name()),
            format!("P: {:.3}", cs.up_accel_cmd),
            format!("I: {:.3}", cs.ui_accel_cmd),
            format!("F: {:.3}", cs.uf_accel_cmd),
            format!("Accel: {:.3}", s.car_control.accel),
        ];

        let lp = &s.live_parameters;
        let info = format!(
            "SR({:.2}) SRC({:.2}) SAD({:.2}) AO({:.2}/{:.2}) LAD({:.2}/{:.2}) Curv({:.2})",
            cs.steer_ratio,
            cs.steer_rate_cost,
            cs.steer_actuator_delay,
            lp.angle_offset_deg,
            lp.angle_offset_average_deg,
            cs.long_delay_lower,
            cs.long_delay_upper,
            cs.scc_curvature_factor,
        );

        Self {
            road: RoadGeometry::derive(&s.model),
            leads,
            max_speed: max_speed_label(cs.v_cruise, is_metric),
            speed: speed_value(s.car_state.v_ego, is_metric).to_string(),
            speed_unit: speed_unit(is_metric),
            speed_limit,
            cam_warning,
            nav_badge,
            gps: gps_label(s.gps.accuracy_m),
            gap: gap_readout(s.car_state.cruise_gap, cs.longitudinal_control, s.car_control.auto_tr_gap),
            brake_lights: s.car_state.brake_lights,
            auto_hold: s.car_state.auto_hold_activated,
            debug_lines,
            info,
        }
    }
}

/// Paints the driving HUD over the camera view.
#[derive(Debug, Clone)]
pub struct OverlayRenderer {
    width: f32,
    height: f32,
    is_metric: bool,
}

impl OverlayRenderer {
    pub fn new(width: f32, height: f32, is_metric: bool) -> Self {
        Self { width, height, is_metric }
    }

    pub fn set_metric(&mut self, is_metric: bool) {
        self.is_metric = is_metric;
    }

    pub fn derive(&self, s: &StateSnapshot) -> OverlayModel {
        OverlayModel::derive(s, self.is_metric, self.width, self.height)
    }

    pub fn render(&self, s: &StateSnapshot) -> Vec<DrawCmd> {
        self.paint(&self.derive(s))
    }

    pub fn paint(&self, m: &OverlayModel) -> Vec<DrawCmd> {
        self.paint_gated(m, true)
    }

    /// Nothing is painted until the world is calibrated.
    pub fn paint_gated(&self, m: &OverlayModel, world_objects_visible: bool) -> Vec<DrawCmd> {
        if !world_objects_visible {
            return Vec::new();
        }
        let mut c = Canvas::new();
        self.draw_header(&mut c);
        self.draw_road(&mut c, &m.road);
        for lead in &m.leads {
            draw_lead(&mut c, lead);
        }
        draw_max_speed(&mut c, &m.max_speed);
        self.draw_speed(&mut c, &m.speed, m.speed_unit);
        self.draw_speed_limit(&mut c, m);
        if let Some(label) = &m.gps {
            self.draw_gps(&mut c, label);
        }
        draw_debug_text(&mut c, &m.debug_lines);
        c.text(
            m.info.clone(),
            Font::new(34.0, FontWeight::Regular),
            palette::white(200),
            TextAnchor::Baseline(Point::new(20.0, self.height - 15.0)),
        );
        self.draw_bottom_icons(&mut c, m);
        c.finish()
    }

    fn draw_header(&self, c: &mut Canvas) {
        c.fill_rect(
            Rect::new(0.0, 0.0, self.width, HEADER_H),
            Paint::LinearGradient {
                start: Point::new(0.0, HEADER_H - HEADER_H / 2.5),
                end: Point::new(0.0, HEADER_H),
                stops: vec![(0.0, Color::from_rgba_f(0.0, 0.0, 0.0, 0.45)), (1.0, Color::from_rgba_f(0.0, 0.0, 0.0, 0.0))],
            },
        );
    }

    fn draw_road(&self, c: &mut Canvas, road: &RoadGeometry) {
        if !road.end_to_end {
            for line in &road.lane_lines {
                c.polygon(&line.points, Paint::Solid(line.color));
            }
            for edge in &road.road_edges {
                c.polygon(&edge.points, Paint::Solid(edge.color));
            }
        }
        let base = if road.end_to_end { palette::DANGER } else { palette::WHITE };
        c.polygon(
            &road.path,
            Paint::LinearGradient {
                start: Point::new(0.0, self.height),
                end: Point::new(0.0, self.height / 4.0),
                stops: vec![(0.0, base), (1.0, base.with_alpha(0))],
            },
        );
    }

    fn draw_speed(&self, c: &mut Canvas, speed: &str, unit: &str) {
        let cx = self.width / 2.0;
        c.text_centered(cx, 220.0, speed, Font::new(164.0, FontWeight::Bold), palette::WHITE);
        c.text_centered(cx, 300.0, unit, Font::new(60.0, FontWeight::Regular), palette::white(200));
    }

    fn draw_speed_limit(&self, c: &mut Canvas, m: &OverlayModel) {
        if let Some(asset) = m.nav_badge {
            let (w, h) = (120.0, 54.0);
            let x = (self.width + BDR_S * 2.0) / 2.0 - w / 2.0 - BDR_S;
            c.image(asset, Rect::new(x, 40.0 - BDR_S, w, h), 1.0);
        }

        const BADGE: Rect = Rect::new(240.0, 25.0, 192.0, 192.0);
        let inner = BADGE.adjusted(14.0, 14.0, -14.0, -14.0);
        if let Some(badge) = &m.speed_limit {
            c.ellipse(BADGE, palette::PURE_RED);
            c.ellipse(inner, palette::WHITE);
            c.text_in(inner, Align::Center, badge.limit.clone(), Font::new(80.0, FontWeight::Bold), palette::black(230));
            let below = inner.translated(0.0, BADGE.w / 2.0 + 45.0).adjusted(-30.0, 0.0, 30.0, 0.0);
            c.text_in(below, Align::Center, badge.distance.clone(), Font::new(60.0, FontWeight::Bold), palette::white(230));
        } else if m.cam_warning {
            c.ellipse(BADGE, palette::PURE_RED);
            c.ellipse(inner, palette::WHITE);
            c.text_in(inner, Align::Center, "CAM", Font::new(70.0, FontWeight::Bold), palette::black(230));
        }
    }

    fn draw_gps(&self, c: &mut Canvas, label: &str) {
        let (w, h) = (120.0, 100.0);
        let (x, y) = (self.width - w - 60.0, 50.0);
        c.image(AssetId::Satellite, Rect::new(x, y, w, h), 0.8);
        let r = Rect::new(x, y + h + 10.0, w, 40.0).adjusted(-30.0, 0.0, 30.0, 0.0);
        c.text_in(r, Align::HCenter, label, Font::new(40.0, FontWeight::Bold), palette::white(200));
    }

    fn draw_bottom_icons(&self, c: &mut Canvas, m: &OverlayModel) {
        let slot = |n: f32| RADIUS / 2.0 + BDR_S * 2.0 + (RADIUS + 50.0) * n;
        let y = self.height - FOOTER_H / 2.0 - 10.0;

        // cruise gap
        let x = slot(4.0);
        c.ellipse(Rect::centered(x, y, RADIUS), palette::black(25));
        let (size, color) = match m.gap.style {
            GapStyle::Unavailable => (50.0, palette::white(200)),
            GapStyle::Auto => (50.0, palette::LIME.with_alpha(200)),
            GapStyle::Manual => (70.0, palette::LIME.with_alpha(200)),
        };
        c.text_centered(x, y - 20.0, "GAP", Font::new(35.0, FontWeight::Bold), palette::white(200));
        c.text_centered(x, y + 50.0, m.gap.text.clone(), Font::new(size, FontWeight::Bold), color);

        draw_toggle_icon(c, slot(2.0), y, AssetId::BrakeDisc, m.brake_lights);
        draw_toggle_icon(c, slot(3.0), y, AssetId::AutoholdActive, m.auto_hold);
    }
}

/// Active icons are solid on a darker badge; inactive ones stay in place as ghosts.
fn draw_toggle_icon(c: &mut Canvas, x: f32, y: f32, asset: AssetId, active: bool) {
    let (img_alpha, bg_alpha) = if active { (1.0, 0.3) } else { (0.15, 0.1) };
    c.icon(x, y, asset, palette::black((255.0_f32 * bg_alpha) as u8), img_alpha, 0.0);
}

fn draw_lead(c: &mut Canvas, lead: &LeadMarker) {
    let (x, y, sz) = (lead.x, lead.y, lead.size);
    let g_xo = sz / 5.0;
    let g_yo = sz / 10.0;

    let glow = [
        Point::new(x + sz * 1.35 + g_xo, y + sz + g_yo),
        Point::new(x, y - g_yo),
        Point::new(x - sz * 1.35 - g_xo, y + sz + g_yo),
    ];
    let glow_color = if lead.radar { palette::RADAR_GLOW } else { palette::VISION_GLOW };
    c.polygon(&glow, Paint::Solid(glow_color));

    let chevron = [
        Point::new(x + sz * 1.25, y + sz),
        Point::new(x, y),
        Point::new(x - sz * 1.25, y + sz),
    ];
    c.polygon(&chevron, Paint::Solid(palette::red(lead.fill_alpha)));
}

fn draw_max_speed(c: &mut Canvas, label: &str) {
    let rc = Rect::new(30.0, 30.0, 184.0, 202.0);
    c.rounded_rect(
        rc,
        20.0,
        Some(Paint::Solid(palette::black(100))),
        Some(Stroke { color: palette::white(100), width: 10.0 }),
    );
    let cx = rc.center().x;
    c.text_centered(cx, 100.0, "MAX", Font::new(48.0, FontWeight::Bold), palette::WHITE);
    c.text_centered(cx, 195.0, label, Font::new(76.0, FontWeight::SemiBold), palette::WHITE);
}

fn draw_debug_text(c: &mut Canvas, lines: &[String; 5]) {
    const TEXT_X: f32 = 40.0;
    const LINE_H: f32 = 50.0;
    let font = Font::new(38.0, FontWeight::Regular);
    let last = lines.len() - 1;
    for (i, line) in lines.iter().enumerate() {
        let color = if i == last { palette::LIME } else { palette::white(200) };
        let y = 280.0 + LINE_H * i as f32;
        c.text(line.clone(), font.clone(), color, TextAnchor::Baseline(Point::new(TEXT_X, y)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(prob: f32, d_rel: f32) -> LeadTrack {
        LeadTrack { prob, d_rel, v_rel: 0.0, screen: Point::new(500.0, 500.0), radar: false }
    }

    #[test]
    fn test_max_speed_label() {
        assert_eq!(max_speed_label(0.0, true), "N/A");
        assert_eq!(max_speed_label(255.0, false), "N/A");
        assert_eq!(max_speed_label(100.0, true), "100");
        assert_eq!(max_speed_label(100.0, false), "62");
        assert_eq!(max_speed_label(80.5, true), "81");
    }

    #[test]
    fn test_speed_value_clamps_and_rounds() {
        assert_eq!(speed_value(-1.0, true), 0);
        assert_eq!(speed_value(10.0, true), 36);
        assert_eq!(speed_value(10.0, false), 22);
    }

    #[test]
    fn test_gap_readout() {
        assert_eq!(gap_readout(0, true, 0).text, "N/A");
        assert_eq!(gap_readout(-2, false, 3).style, GapStyle::Unavailable);
        assert_eq!(gap_readout(3, true, 3), GapReadout { text: "AUTO".into(), style: GapStyle::Auto });
        assert_eq!(gap_readout(3, false, 3), GapReadout { text: "3".into(), style: GapStyle::Manual });
        assert_eq!(gap_readout(2, true, 3).text, "2");
    }

    #[test]
    fn test_speed_limit_priority() {
        let r = RoadLimit {
            cam_limit_speed: 80,
            cam_limit_speed_left_dist: 500,
            section_limit_speed: 60,
            section_left_dist: 2000,
            ..Default::default()
        };
        assert_eq!(select_speed_limit(&r), Some((80, 500)));
        assert_eq!(distance_label(500), "500m");

        let r = RoadLimit { cam_limit_speed_left_dist: 0, ..r };
        assert_eq!(select_speed_limit(&r), Some((60, 2000)));
        assert_eq!(distance_label(2000), "2.0km");
        assert_eq!(distance_label(999), "999m");

        assert_eq!(select_speed_limit(&RoadLimit::default()), None);
    }

    #[test]
    fn test_gps_label_band() {
        assert_eq!(gps_label(0.005), None);
        assert_eq!(gps_label(5.0).as_deref(), Some("5.0m"));
        assert_eq!(gps_label(25.0), None);
        assert_eq!(gps_label(20.0).as_deref(), Some("20.0m"));
    }

    #[test]
    fn test_visible_leads_dedup() {
        let leads = [lead(0.9, 20.0), lead(0.9, 22.0)];
        assert_eq!(visible_leads(&leads).len(), 1);
        let leads = [lead(0.9, 20.0), lead(0.9, 23.5)];
        assert_eq!(visible_leads(&leads).len(), 2);
        let leads = [lead(0.4, 20.0), lead(0.9, 40.0)];
        let v = visible_leads(&leads);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].d_rel, 40.0);
        assert!(visible_leads(&[]).is_empty());
    }

    #[test]
    fn test_lead_marker_alpha_and_size() {
        let far = lead_marker(&lead(0.9, 100.0), 1920.0, 1080.0);
        assert_eq!(far.fill_alpha, 0);
        assert!((far.size - 15.0 * 2.35).abs() < 1e-3);

        let near = lead_marker(&lead(0.9, 0.0), 1920.0, 1080.0);
        assert_eq!(near.fill_alpha, 255);
        assert!((near.size - 25.0 * 2.35).abs() < 1e-3);

        let mut closing = lead(0.9, 20.0);
        closing.v_rel = -2.0;
        // 127.5 from distance plus 51 from closing speed
        assert_eq!(lead_marker(&closing, 1920.0, 1080.0).fill_alpha, 178);
    }

    #[test]
    fn test_lead_marker_size_behind_and_at_pole() {
        // negative quotient clamps to the small end
        let behind = lead_marker(&lead(0.9, -100.0), 1920.0, 1080.0);
        assert!((behind.size - 15.0 * 2.35).abs() < 1e-3);
        // zero divisor clamps to the large end
        let pole = lead_marker(&lead(0.9, -90.0), 1920.0, 1080.0);
        assert!((pole.size - 30.0 * 2.35).abs() < 1e-3);
    }

    #[test]
    fn test_lead_marker_stays_on_screen() {
        let mut l = lead(0.9, 10.0);
        l.screen = Point::new(5000.0, 5000.0);
        let m = lead_marker(&l, 1920.0, 1080.0);
        assert!(m.x <= 1920.0 - m.size / 2.0);
        assert!(m.y <= 1080.0 - m.size * 0.6);
        l.screen = Point::new(-50.0, 100.0);
        assert_eq!(lead_marker(&l, 1920.0, 1080.0).x, 0.0);
    }

    #[test]
    fn test_road_geometry_alpha_mapping() {
        let model = Perception {
            lane_lines: vec![LanePolygon { points: vec![Point::default()], prob: 0.5 }],
            road_edges: vec![EdgePolygon { points: vec![Point::default()], std: 1.5 }],
            path: vec![Point::default()],
            ..Default::default()
        };
        let g = RoadGeometry::derive(&model);
        assert_eq!(g.lane_lines[0].color.a, 128);
        assert_eq!(g.road_edges[0].color.a, 0);
        assert_eq!(g.road_edges[0].color.with_alpha(255), palette::PURE_RED);

        let g = RoadGeometry::derive(&Perception { end_to_end: true, ..model });
        assert!(g.lane_lines.is_empty() && g.road_edges.is_empty());
        assert_eq!(g.path.len(), 1);
    }

    #[test]
    fn test_render_shows_limit_badge_and_skips_cam() {
        let mut s = StateSnapshot::default();
        s.road_limit = RoadLimit { cam_limit_speed: 80, cam_limit_speed_left_dist: 500, ..Default::default() };
        s.controls.scc_stock_cam_act = 2;
        s.controls.scc_stock_cam_status = 2;
        let texts: Vec<String> = OverlayRenderer::new(1920.0, 1080.0, true)
            .render(&s)
            .iter()
            .filter_map(|c| c.text().map(str::to_string))
            .collect();
        assert!(texts.iter().any(|t| t == "80"));
        assert!(texts.iter().any(|t| t == "500m"));
        assert!(!texts.iter().any(|t| t == "CAM"));
        assert!(texts.iter().any(|t| t == "MAX"));
        assert!(texts.iter().any(|t| t == "State: off"));

        let ring = OverlayRenderer::new(1920.0, 1080.0, true).render(&s).into_iter().find_map(|c| match c {
            DrawCmd::Ellipse { rect, fill: Paint::Solid(color) } if rect == Rect::new(240.0, 25.0, 192.0, 192.0) => Some(color),
            _ => None,
        });
        assert_eq!(ring, Some(palette::PURE_RED));
    }

    #[test]
    fn test_cam_badge_when_no_limit() {
        let mut s = StateSnapshot::default();
        s.controls.scc_stock_cam_act = 2;
        s.controls.scc_stock_cam_status = 2;
        let m = OverlayModel::derive(&s, true, 1920.0, 1080.0);
        assert!(m.cam_warning);

        // a limit of 10 or less is not shown, so CAM takes its place
        s.road_limit = RoadLimit { cam_limit_speed: 10, cam_limit_speed_left_dist: 100, ..Default::default() };
        let m = OverlayModel::derive(&s, true, 1920.0, 1080.0);
        assert!(m.speed_limit.is_none());
        assert!(m.cam_warning);
    }

    #[test]
    fn test_leads_require_longitudinal_control() {
        let mut s = StateSnapshot::default();
        s.model.leads = vec![lead(0.9, 20.0)];
        assert!(OverlayModel::derive(&s, true, 1920.0, 1080.0).leads.is_empty());
        s.controls.longitudinal_control = true;
        assert_eq!(OverlayModel::derive(&s, true, 1920.0, 1080.0).leads.len(), 1);
    }

    #[test]
    fn test_gated_paint_skips_road() {
        let mut s = StateSnapshot::default();
        s.model.path = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(5.0, 10.0)];
        let r = OverlayRenderer::new(1920.0, 1080.0, true);
        let m = r.derive(&s);
        let polygons = |cmds: &[DrawCmd]| cmds.iter().filter(|c| matches!(c, DrawCmd::Polygon { .. })).count();
        assert_eq!(polygons(&r.paint(&m)), 1);
        assert!(r.paint_gated(&m, false).is_empty());
    }

    #[test]
    fn test_inactive_icons_are_ghosted_not_hidden() {
        let s = StateSnapshot::default();
        let cmds = OverlayRenderer::new(1920.0, 1080.0, true).render(&s);
        let brake = cmds.iter().find_map(|c| match c {
            DrawCmd::Image { asset: AssetId::BrakeDisc, opacity, .. } => Some(*opacity),
            _ => None,
        });
        assert_eq!(brake, Some(0.15));
    }
}

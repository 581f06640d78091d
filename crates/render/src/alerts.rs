use std::time::{Duration, Instant};

use hud_feed_core::{Service, StateFeed};
use hud_model::*;

use crate::canvas::Canvas;
use crate::palette;

const CONTROLS_TIMEOUT: Duration = Duration::from_secs(5);
const CONTROLS_GRACE_SECS: u64 = 5;
const LONG_TITLE_CHARS: usize = 15;

pub const CONTROLS_WAITING: &str = "controlsWaiting";
pub const CONTROLS_UNRESPONSIVE: &str = "controlsUnresponsive";
pub const CONTROLS_UNRESPONSIVE_PERMANENT: &str = "controlsUnresponsivePermanent";

/// Banner height for a size tier; `None` means nothing is drawn.
pub fn banner_height(size: AlertSize, view_height: f32) -> Option<f32> {
    match size {
        AlertSize::None => None,
        AlertSize::Small => Some(71.0),
        AlertSize::Mid => Some(220.0),
        AlertSize::Full => Some(view_height),
    }
}

/// Alert for the current refresh. Falls back to synthetic alerts when the
/// controls producer is silent for too long after going onroad.
pub fn derive_alert(feed: &dyn StateFeed, started_frame: u64, ui_freq: u32, now: Instant) -> Alert {
    if feed.updated(Service::ControlsState) {
        return Alert::from_controls(&feed.snapshot().controls);
    }
    if feed.frame().saturating_sub(started_frame) <= CONTROLS_GRACE_SECS * u64::from(ui_freq) {
        return Alert::default();
    }

    let rcv_time = feed.rcv_time(Service::ControlsState);
    if rcv_time.is_none() || feed.rcv_frame(Service::ControlsState) < started_frame {
        Alert::new("Driver Assist Unavailable", "Waiting for controls to start", CONTROLS_WAITING, AlertSize::Mid)
    } else if rcv_time.is_some_and(|t| now.saturating_duration_since(t) > CONTROLS_TIMEOUT) {
        Alert::new("TAKE CONTROL IMMEDIATELY", "Controls Unresponsive", CONTROLS_UNRESPONSIVE, AlertSize::Full)
    } else {
        Alert::default()
    }
}

/// Bottom banner. Draw commands are cached until the alert or background changes.
#[derive(Debug)]
pub struct AlertBanner {
    alert: Alert,
    bg: Color,
    width: f32,
    height: f32,
    cached: Option<Vec<DrawCmd>>,
}

impl AlertBanner {
    pub fn new(width: f32, height: f32) -> Self {
        Self { alert: Alert::default(), bg: palette::BLACK, width, height, cached: None }
    }

    pub fn alert(&self) -> &Alert {
        &self.alert
    }

    pub fn bg(&self) -> Color {
        self.bg
    }

    /// Returns true when the banner needs a repaint.
    pub fn update(&mut self, alert: &Alert, bg: Color) -> bool {
        if self.alert == *alert && self.bg == bg {
            return false;
        }
        tracing::debug!(alert_type = %alert.alert_type, size = ?alert.size, "alert changed");
        self.alert = alert.clone();
        self.bg = bg;
        self.cached = None;
        true
    }

    pub fn render(&mut self) -> &[DrawCmd] {
        let Self { alert, bg, width, height, cached } = self;
        cached.get_or_insert_with(|| paint(alert, *bg, *width, *height))
    }
}

fn paint(alert: &Alert, bg: Color, width: f32, height: f32) -> Vec<DrawCmd> {
    let Some(h) = banner_height(alert.size, height) else { return Vec::new() };
    let r = Rect::new(0.0, height - h, width, h);
    let mut c = Canvas::new();

    c.fill_rect(r, Paint::Solid(bg));
    c.fill_rect(
        r,
        Paint::LinearGradient {
            start: Point::new(0.0, r.y),
            end: Point::new(0.0, r.bottom()),
            stops: vec![(0.0, Color::from_rgba_f(0.0, 0.0, 0.0, 0.05)), (1.0, Color::from_rgba_f(0.0, 0.0, 0.0, 0.35))],
        },
    );

    let center = r.center();
    match alert.size {
        AlertSize::None => {}
        AlertSize::Small => {
            c.text_in(r, Align::Center, alert.text1.clone(), Font::new(74.0, FontWeight::SemiBold), palette::WHITE);
        }
        AlertSize::Mid => {
            let title = Rect::new(0.0, center.y - 125.0, width, 150.0);
            c.text_in(title, Align::HCenterTop, alert.text1.clone(), Font::new(88.0, FontWeight::Bold), palette::WHITE);
            let sub = Rect::new(0.0, center.y + 21.0, width, 90.0);
            c.text_in(sub, Align::HCenter, alert.text2.clone(), Font::new(66.0, FontWeight::Regular), palette::WHITE);
        }
        AlertSize::Full => {
            let long = alert.text1.chars().count() > LONG_TITLE_CHARS;
            let (title_size, title_y, sub_off) = if long { (132.0, 240.0, 361.0) } else { (177.0, 270.0, 420.0) };
            let title = Rect::new(0.0, r.y + title_y, width, 600.0);
            c.text_wrapped(title, Align::HCenter, alert.text1.clone(), Font::new(title_size, FontWeight::Bold), palette::WHITE);
            let sub = Rect::new(0.0, r.h - sub_off, width, 300.0);
            c.text_wrapped(sub, Align::HCenter, alert.text2.clone(), Font::new(88.0, FontWeight::Regular), palette::WHITE);
        }
    }
    c.finish()
}

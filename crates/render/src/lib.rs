//! On-road HUD: turns the per-frame state snapshot into layered draw lists.
//!
//! Every component follows the same cycle: `update` copies what it needs out
//! of the snapshot and reports whether its output could have changed, and
//! `render` produces draw commands in the component's local coordinates.

mod alerts;
mod canvas;
mod gesture;
mod hud;
mod onroad;
mod overlay;
pub mod palette;
mod scheduler;
mod sidebar;

pub use alerts::{banner_height, derive_alert, AlertBanner};
pub use canvas::Canvas;
pub use gesture::{classify, Gesture, PointerTracker};
pub use hud::{HudState, OnroadHud};
pub use onroad::{Capabilities, FrameLoop, FrameLoopConfig, GestureOutcome, StreamType, Task};
pub use overlay::*;
pub use scheduler::Scheduler;
pub use sidebar::*;

use hud_model::Layer;

pub const UI_FREQ: u32 = 20;

pub mod layout {
    pub const BDR_S: f32 = 30.0;
    pub const HEADER_H: f32 = 420.0;
    pub const FOOTER_H: f32 = 280.0;
    pub const RADIUS: f32 = 192.0;
    pub const IMG_SIZE: f32 = (RADIUS / 2.0) * 1.5;
}

pub mod units {
    pub const MS_TO_KPH: f32 = 3.6;
    pub const MS_TO_MPH: f32 = 2.236936;
    pub const KM_TO_MILE: f32 = 0.621371;
}

/// Outbound notifications of the on-road UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    OpenSettings,
    OffroadTransition(bool),
    Repaint(Layer),
}

//! Per-frame state records consumed by the on-road HUD, and the draw
//! primitives it produces.

use serde::{Deserialize, Serialize};

mod draw;
mod geometry;

pub use draw::*;
pub use geometry::*;

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
#[serde(default)]
pub struct VehicleState {
    pub v_ego: f32, // m/s
    pub steering_angle_deg: f32,
    pub engine_rpm: f32,
    pub cruise_gap: i32,
    pub brake_lights: bool,
    pub auto_hold_activated: bool,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
#[serde(default)]
pub struct CarControl {
    pub accel: f32,
    pub steering_angle_desired_deg: f32,
    pub auto_tr_gap: i32,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum AlertSize {
    #[default]
    None,
    Small,
    Mid,
    Full,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum AlertStatus {
    #[default]
    Normal,
    UserPrompt,
    Critical,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LongControlState {
    #[default]
    Off,
    Pid,
    Stopping,
    Starting,
}

impl LongControlState {
    pub fn name(self) -> &'static str {
        match self {
            LongControlState::Off => "off",
            LongControlState::Pid => "pid",
            LongControlState::Stopping => "stopping",
            LongControlState::Starting => "starting",
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
#[serde(default)]
pub struct ControlsState {
    pub enabled: bool,
    pub engageable: bool,
    pub longitudinal_control: bool,
    pub v_cruise: f32, // km/h, 255 when unset
    pub angle_steers: f32,

    pub alert_text1: String,
    pub alert_text2: String,
    pub alert_type: String,
    pub alert_size: AlertSize,
    pub alert_status: AlertStatus,

    // longitudinal controller internals
    pub long_control_state: LongControlState,
    pub up_accel_cmd: f32,
    pub ui_accel_cmd: f32,
    pub uf_accel_cmd: f32,

    // tuning readout
    pub steer_ratio: f32,
    pub steer_rate_cost: f32,
    pub steer_actuator_delay: f32,
    pub long_delay_lower: f32,
    pub long_delay_upper: f32,
    pub scc_curvature_factor: f32,

    // stock camera warning (2/2 = active)
    pub scc_stock_cam_act: i32,
    pub scc_stock_cam_status: i32,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    #[default]
    None,
    Wifi,
    Cell2G,
    Cell3G,
    Cell4G,
    Cell5G,
    Ethernet,
}

impl NetworkType {
    pub fn label(self) -> &'static str {
        match self {
            NetworkType::None => "--",
            NetworkType::Wifi => "WiFi",
            NetworkType::Cell2G => "2G",
            NetworkType::Cell3G => "3G",
            NetworkType::Cell4G => "LTE",
            NetworkType::Cell5G => "5G",
            NetworkType::Ethernet => "ETH",
        }
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThermalStatus {
    #[default]
    Green,
    Yellow,
    Red,
    Danger,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub enum BatteryStatus {
    Charging,
    #[default]
    Discharging,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
#[serde(default)]
pub struct DeviceState {
    pub cpu_temp_c: Vec<f32>,
    pub network_type: NetworkType,
    pub network_strength: u8,
    pub battery_percent: i32,
    pub battery_status: BatteryStatus,
    pub thermal_status: ThermalStatus,
    /// Wall-clock nanoseconds since the Unix epoch of the last server ping; 0 = never.
    pub last_athena_ping_ns: u64,
}

impl DeviceState {
    pub fn cpu_temp_avg(&self) -> f32 {
        if self.cpu_temp_c.is_empty() {
            return 0.0;
        }
        self.cpu_temp_c.iter().sum::<f32>() / self.cpu_temp_c.len() as f32
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum PandaType {
    #[default]
    Unknown,
    WhitePanda,
    GreyPanda,
    BlackPanda,
    Pedal,
    Uno,
    Dos,
    RedPanda,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
#[serde(default)]
pub struct PandaState {
    pub panda_type: PandaType,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
#[serde(default)]
pub struct LanePolygon {
    pub points: Vec<Point>,
    pub prob: f32,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
#[serde(default)]
pub struct EdgePolygon {
    pub points: Vec<Point>,
    pub std: f32,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
#[serde(default)]
pub struct LeadTrack {
    pub prob: f32,
    pub d_rel: f32, // longitudinal offset of the first prediction
    pub v_rel: f32,
    pub screen: Point,
    pub radar: bool,
}

/// Model outputs already projected into road-view pixel space.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
#[serde(default)]
pub struct Perception {
    pub lane_lines: Vec<LanePolygon>,
    pub road_edges: Vec<EdgePolygon>,
    pub path: Vec<Point>,
    pub leads: Vec<LeadTrack>,
    pub end_to_end: bool,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
#[serde(default)]
pub struct RadarLead {
    pub d_rel: f32,
    pub v_rel: f32,
    pub status: bool,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
#[serde(default)]
pub struct RadarState {
    pub lead_one: RadarLead,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
#[serde(default)]
pub struct GpsFix {
    pub accuracy_m: f32,
    pub bearing_deg: f32,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
#[serde(default)]
pub struct LiveLocation {
    pub gps_ok: bool,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
#[serde(default)]
pub struct LiveCalibration {
    pub calib_perc: u8,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
#[serde(default)]
pub struct LiveParameters {
    pub angle_offset_deg: f32,
    pub angle_offset_average_deg: f32,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
#[serde(default)]
pub struct DriverMonitoring {
    pub is_active_mode: bool,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
#[serde(default)]
pub struct RoadLimit {
    pub active: i32, // 1 = NDA, 2 = HDA
    pub cam_limit_speed: i32,
    pub cam_limit_speed_left_dist: i32,
    pub section_limit_speed: i32,
    pub section_left_dist: i32,
}

/// The current state of every producer the HUD listens to.
///
/// Components copy out what they need during an update; nothing keeps a
/// reference past the refresh that produced it.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
#[serde(default)]
pub struct StateSnapshot {
    pub car_state: VehicleState,
    pub car_control: CarControl,
    pub controls: ControlsState,
    pub device: DeviceState,
    pub panda: PandaState,
    pub model: Perception,
    pub radar: RadarState,
    pub gps: GpsFix,
    pub live_location: LiveLocation,
    pub live_calibration: LiveCalibration,
    pub live_parameters: LiveParameters,
    pub driver_monitoring: DriverMonitoring,
    pub road_limit: RoadLimit,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct Alert {
    pub text1: String,
    pub text2: String,
    pub alert_type: String,
    pub size: AlertSize,
}

impl Alert {
    pub fn new(text1: &str, text2: &str, alert_type: &str, size: AlertSize) -> Self {
        Self { text1: text1.into(), text2: text2.into(), alert_type: alert_type.into(), size }
    }

    pub fn from_controls(cs: &ControlsState) -> Self {
        Self {
            text1: cs.alert_text1.clone(),
            text2: cs.alert_text2.clone(),
            alert_type: cs.alert_type.clone(),
            size: cs.alert_size,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Alert::default()
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ItemStatus {
    pub label: String,
    pub color: Color,
}

impl ItemStatus {
    pub fn new(label: &str, color: Color) -> Self {
        Self { label: label.into(), color }
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Default)]
pub enum UiStatus {
    #[default]
    Disengaged,
    Engaged,
    Warning,
    Alert,
}

impl UiStatus {
    pub fn from_controls(cs: &ControlsState) -> Self {
        if !cs.enabled {
            return UiStatus::Disengaged;
        }
        match cs.alert_status {
            AlertStatus::Normal => UiStatus::Engaged,
            AlertStatus::UserPrompt => UiStatus::Warning,
            AlertStatus::Critical => UiStatus::Alert,
        }
    }

    pub fn bg_color(self) -> Color {
        match self {
            UiStatus::Disengaged => Color::rgba(0x17, 0x33, 0x49, 0xc8),
            UiStatus::Engaged => Color::rgba(0x17, 0x86, 0x44, 0xf1),
            UiStatus::Warning => Color::rgba(0xDA, 0x6F, 0x25, 0xf1),
            UiStatus::Alert => Color::rgba(0xC9, 0x22, 0x31, 0xf1),
        }
    }
}

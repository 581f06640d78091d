//! External interfaces of the on-road HUD: the pull-based state feed,
//! persisted params and the optional collaborators (sound, recorder, map).

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use crossbeam_channel::TryRecvError;
use serde::{Deserialize, Serialize};

use hud_model::*;

mod params;

pub use params::{keys, MemoryParams, ParamStore};

/// Producer keys of the state feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Service {
    CarState,
    CarControl,
    ControlsState,
    DeviceState,
    PandaStates,
    ModelV2,
    RadarState,
    GpsLocationExternal,
    LiveLocationKalman,
    LiveCalibration,
    LiveParameters,
    DriverMonitoringState,
    RoadLimitSpeed,
}

/// One message from a producer, carrying that producer's full record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "service", content = "data", rename_all = "camelCase")]
pub enum ServiceUpdate {
    CarState(VehicleState),
    CarControl(CarControl),
    ControlsState(ControlsState),
    DeviceState(DeviceState),
    PandaStates(PandaState),
    ModelV2(Perception),
    RadarState(RadarState),
    GpsLocationExternal(GpsFix),
    LiveLocationKalman(LiveLocation),
    LiveCalibration(LiveCalibration),
    LiveParameters(LiveParameters),
    DriverMonitoringState(DriverMonitoring),
    RoadLimitSpeed(RoadLimit),
}

impl ServiceUpdate {
    pub fn service(&self) -> Service {
        match self {
            ServiceUpdate::CarState(_) => Service::CarState,
            ServiceUpdate::CarControl(_) => Service::CarControl,
            ServiceUpdate::ControlsState(_) => Service::ControlsState,
            ServiceUpdate::DeviceState(_) => Service::DeviceState,
            ServiceUpdate::PandaStates(_) => Service::PandaStates,
            ServiceUpdate::ModelV2(_) => Service::ModelV2,
            ServiceUpdate::RadarState(_) => Service::RadarState,
            ServiceUpdate::GpsLocationExternal(_) => Service::GpsLocationExternal,
            ServiceUpdate::LiveLocationKalman(_) => Service::LiveLocationKalman,
            ServiceUpdate::LiveCalibration(_) => Service::LiveCalibration,
            ServiceUpdate::LiveParameters(_) => Service::LiveParameters,
            ServiceUpdate::DriverMonitoringState(_) => Service::DriverMonitoringState,
            ServiceUpdate::RoadLimitSpeed(_) => Service::RoadLimitSpeed,
        }
    }

    fn apply_to(self, s: &mut StateSnapshot) {
        match self {
            ServiceUpdate::CarState(v) => s.car_state = v,
            ServiceUpdate::CarControl(v) => s.car_control = v,
            ServiceUpdate::ControlsState(v) => s.controls = v,
            ServiceUpdate::DeviceState(v) => s.device = v,
            ServiceUpdate::PandaStates(v) => s.panda = v,
            ServiceUpdate::ModelV2(v) => s.model = v,
            ServiceUpdate::RadarState(v) => s.radar = v,
            ServiceUpdate::GpsLocationExternal(v) => s.gps = v,
            ServiceUpdate::LiveLocationKalman(v) => s.live_location = v,
            ServiceUpdate::LiveCalibration(v) => s.live_calibration = v,
            ServiceUpdate::LiveParameters(v) => s.live_parameters = v,
            ServiceUpdate::DriverMonitoringState(v) => s.driver_monitoring = v,
            ServiceUpdate::RoadLimitSpeed(v) => s.road_limit = v,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("{0}")]
    Msg(String),
    #[error("decode: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("state feed closed")]
    Closed,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type UpdateTx = crossbeam_channel::Sender<ServiceUpdate>;
pub type UpdateRx = crossbeam_channel::Receiver<ServiceUpdate>;

pub fn channel() -> (UpdateTx, UpdateRx) {
    crossbeam_channel::unbounded()
}

/// Trait for anything that produces service updates (network, replay, ...).
#[async_trait::async_trait]
pub trait StateSource: Send + Sync {
    async fn run(&self, tx: UpdateTx) -> Result<(), FeedError>;
}

/// Read side of the state feed, as seen by the UI on each refresh.
pub trait StateFeed {
    /// Monotonic refresh counter.
    fn frame(&self) -> u64;
    /// True if `service` delivered a message during the latest refresh.
    fn updated(&self, service: Service) -> bool;
    /// Frame at which `service` was last received, 0 if never.
    fn rcv_frame(&self, service: Service) -> u64;
    fn rcv_time(&self, service: Service) -> Option<Instant>;
    fn snapshot(&self) -> &StateSnapshot;
}

/// `StateFeed` backed by a channel of `ServiceUpdate`s.
pub struct SubscriberFeed {
    rx: Option<UpdateRx>,
    snapshot: StateSnapshot,
    frame: u64,
    rcv_frame: HashMap<Service, u64>,
    rcv_time: HashMap<Service, Instant>,
    updated: HashSet<Service>,
}

impl SubscriberFeed {
    pub fn new(rx: UpdateRx) -> Self {
        Self { rx: Some(rx), ..Self::detached() }
    }

    /// A feed with no channel; updates only arrive through [`SubscriberFeed::publish`].
    pub fn detached() -> Self {
        Self {
            rx: None,
            snapshot: StateSnapshot::default(),
            frame: 0,
            rcv_frame: HashMap::new(),
            rcv_time: HashMap::new(),
            updated: HashSet::new(),
        }
    }

    /// Starts a new refresh: advances the frame counter and drains every
    /// pending update into the snapshot. Returns the number applied.
    pub fn update(&mut self, now: Instant) -> Result<usize, FeedError> {
        self.frame += 1;
        self.updated.clear();

        let Some(rx) = self.rx.as_ref() else { return Ok(0) };
        let mut pending = Vec::new();
        let mut closed = false;
        loop {
            match rx.try_recv() {
                Ok(u) => pending.push(u),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    closed = true;
                    break;
                }
            }
        }
        if closed && pending.is_empty() {
            tracing::debug!(frame = self.frame, "state feed disconnected");
            return Err(FeedError::Closed);
        }
        let n = pending.len();
        for u in pending {
            self.record(u, now);
        }
        Ok(n)
    }

    /// Applies an update to the current refresh without going through the channel.
    pub fn publish(&mut self, update: ServiceUpdate, now: Instant) {
        self.record(update, now);
    }

    fn record(&mut self, update: ServiceUpdate, now: Instant) {
        let service = update.service();
        update.apply_to(&mut self.snapshot);
        self.updated.insert(service);
        self.rcv_frame.insert(service, self.frame);
        self.rcv_time.insert(service, now);
    }
}

impl StateFeed for SubscriberFeed {
    fn frame(&self) -> u64 {
        self.frame
    }

    fn updated(&self, service: Service) -> bool {
        self.updated.contains(&service)
    }

    fn rcv_frame(&self, service: Service) -> u64 {
        self.rcv_frame.get(&service).copied().unwrap_or(0)
    }

    fn rcv_time(&self, service: Service) -> Option<Instant> {
        self.rcv_time.get(&service).copied()
    }

    fn snapshot(&self) -> &StateSnapshot {
        &self.snapshot
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sound {
    ResetCalibration,
}

impl Sound {
    pub fn path(self) -> &'static str {
        match self {
            Sound::ResetCalibration => "../assets/sounds/reset_calibration.wav",
        }
    }
}

pub trait SoundPlayer: Send {
    fn play(&mut self, sound: Sound);
}

pub trait ScreenRecorder: Send {
    fn toggle(&mut self);
    fn update_screen(&mut self);
    fn stop(&mut self, save: bool);
}

/// Optional map view sharing the road view. Absent when no map provider is configured.
pub trait MapOverlay: Send {
    fn is_visible(&self) -> bool;
    fn set_visible(&mut self, visible: bool);
    fn offroad_transition(&mut self, offroad: bool);
}

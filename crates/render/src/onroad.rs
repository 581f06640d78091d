use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use hud_feed_core::{keys, MapOverlay, ParamStore, ScreenRecorder, Service, Sound, SoundPlayer, StateFeed};
use hud_model::*;

use crate::alerts::{derive_alert, AlertBanner, CONTROLS_UNRESPONSIVE, CONTROLS_UNRESPONSIVE_PERMANENT};
use crate::gesture::{Gesture, PointerTracker};
use crate::hud::OnroadHud;
use crate::layout::BDR_S;
use crate::overlay::{OverlayModel, OverlayRenderer};
use crate::scheduler::Scheduler;
use crate::sidebar::{SidebarPanel, SIDEBAR_WIDTH};
use crate::{Signal, UI_FREQ};

const CALIBRATION_RESET_DELAY: Duration = Duration::from_millis(1500);
const SOFT_RESTART_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct FrameLoopConfig {
    /// Full screen size, sidebar included.
    pub width: f32,
    pub height: f32,
    pub ui_freq: u32,
    /// Paint intervals longer than this are logged.
    pub slow_frame: Duration,
    pub wide_camera_capable: bool,
    pub sidebar_visible: bool,
}

impl Default for FrameLoopConfig {
    fn default() -> Self {
        Self {
            width: 2160.0,
            height: 1080.0,
            ui_freq: UI_FREQ,
            slow_frame: Duration::from_millis(66),
            wide_camera_capable: false,
            sidebar_visible: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamType {
    Road,
    Wide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    SoftRestart,
}

/// Optional collaborators. Absent ones are skipped silently.
#[derive(Default)]
pub struct Capabilities {
    pub sound: Option<Box<dyn SoundPlayer>>,
    pub recorder: Option<Box<dyn ScreenRecorder>>,
    pub map: Option<Box<dyn MapOverlay>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureOutcome {
    pub gesture: Gesture,
    /// Taps continue to the parent container; swipes are consumed.
    pub propagate: bool,
}

/// Drives one refresh of every on-road component and composes the layers.
pub struct FrameLoop {
    cfg: FrameLoopConfig,
    params: Arc<dyn ParamStore>,
    caps: Capabilities,

    frame: u64,
    started_frame: u64,
    offroad: bool,
    is_metric: bool,
    stream: StreamType,
    status: UiStatus,
    bg: Color,
    world_objects_visible: bool,

    overlay: OverlayRenderer,
    overlay_model: Option<OverlayModel>,
    hud: OnroadHud,
    alerts: AlertBanner,
    sidebar: SidebarPanel,

    pointer: PointerTracker,
    tasks: Scheduler<Task>,
    last_paint: Option<Instant>,
    last_frame_time: Option<Duration>,
}

impl FrameLoop {
    pub fn new(cfg: FrameLoopConfig, params: Arc<dyn ParamStore>, caps: Capabilities) -> Self {
        let is_metric = params.get_bool(keys::IS_METRIC);
        let (w, h) = road_view_size(&cfg, cfg.sidebar_visible);
        let status = UiStatus::default();
        Self {
            overlay: OverlayRenderer::new(w, h, is_metric),
            overlay_model: None,
            hud: OnroadHud::new(w, h),
            alerts: AlertBanner::new(w, h),
            sidebar: SidebarPanel::new(cfg.height, cfg.sidebar_visible),
            cfg,
            params,
            caps,
            frame: 0,
            started_frame: 0,
            offroad: true,
            is_metric,
            stream: StreamType::Road,
            status,
            bg: status.bg_color(),
            world_objects_visible: false,
            pointer: PointerTracker::default(),
            tasks: Scheduler::new(),
            last_paint: None,
            last_frame_time: None,
        }
    }

    pub fn status(&self) -> UiStatus {
        self.status
    }

    pub fn bg(&self) -> Color {
        self.bg
    }

    pub fn alert(&self) -> &Alert {
        self.alerts.alert()
    }

    pub fn stream(&self) -> StreamType {
        self.stream
    }

    pub fn is_metric(&self) -> bool {
        self.is_metric
    }

    pub fn started_frame(&self) -> u64 {
        self.started_frame
    }

    pub fn world_objects_visible(&self) -> bool {
        self.world_objects_visible
    }

    pub fn sidebar_visible(&self) -> bool {
        self.sidebar.is_visible()
    }

    pub fn pending(&self, task: Task) -> bool {
        self.tasks.is_pending(task)
    }

    /// Interval between the two most recent paints.
    pub fn last_frame_time(&self) -> Option<Duration> {
        self.last_frame_time
    }

    /// Resizes the road view around the sidebar.
    pub fn set_sidebar_visible(&mut self, visible: bool) {
        if self.sidebar.is_visible() == visible {
            return;
        }
        self.sidebar.set_visible(visible);
        let (w, h) = road_view_size(&self.cfg, visible);
        self.overlay = OverlayRenderer::new(w, h, self.is_metric);
        self.overlay_model = None;
        self.hud = OnroadHud::new(w, h);
        let (alert, bg) = (self.alerts.alert().clone(), self.alerts.bg());
        self.alerts = AlertBanner::new(w, h);
        self.alerts.update(&alert, bg);
    }

    /// One refresh: runs due tasks, then updates every component from the
    /// feed. Returns the repaint requests for layers whose output changed.
    pub fn tick(&mut self, feed: &dyn StateFeed, now: Instant, now_ns: u64) -> Vec<Signal> {
        self.frame = feed.frame();
        for task in self.tasks.due(now) {
            self.run_task(task);
        }

        let s = feed.snapshot();
        let mut signals = Vec::new();

        self.status = UiStatus::from_controls(&s.controls);
        let alert = derive_alert(feed, self.started_frame, self.cfg.ui_freq, now);
        let bg = match alert.alert_type.as_str() {
            CONTROLS_UNRESPONSIVE => UiStatus::Alert.bg_color(),
            CONTROLS_UNRESPONSIVE_PERMANENT => UiStatus::Disengaged.bg_color(),
            _ => self.status.bg_color(),
        };
        if (feed.updated(Service::ControlsState) || !alert.is_empty()) && self.alerts.update(&alert, bg) {
            signals.push(Signal::Repaint(Layer::Alerts));
        }

        if self.hud.update(s, self.frame, self.cfg.ui_freq, self.status, self.is_metric) {
            signals.push(Signal::Repaint(Layer::Hud));
        }

        self.world_objects_visible = feed.rcv_frame(Service::LiveCalibration) > self.started_frame;
        self.overlay_model = Some(self.overlay.derive(s));
        signals.push(Signal::Repaint(Layer::Road));

        let prime_redirected = self.params.get_bool(keys::PRIME_REDIRECTED);
        if self.sidebar.update(s, prime_redirected, now_ns) {
            signals.push(Signal::Repaint(Layer::Sidebar));
        }

        if self.bg != bg {
            self.bg = bg;
            signals.push(Signal::Repaint(Layer::Border));
        }
        signals
    }

    /// Composes every visible layer, bottom first.
    pub fn paint(&mut self, now: Instant) -> Frame {
        if let Some(prev) = self.last_paint {
            let dt = now.saturating_duration_since(prev);
            if dt > self.cfg.slow_frame {
                warn!(frame = self.frame, dt_ms = dt.as_secs_f64() * 1000.0, "slow frame time");
            }
            self.last_frame_time = Some(dt);
        }
        self.last_paint = Some(now);

        let sidebar_visible = self.sidebar.is_visible();
        let left = if sidebar_visible { SIDEBAR_WIDTH } else { 0.0 };
        let content_w = self.cfg.width - left;
        let view_origin = Point::new(left + BDR_S, BDR_S);

        let mut layers = vec![LayerList {
            layer: Layer::Border,
            origin: Point::new(left, 0.0),
            cmds: vec![DrawCmd::FillRect {
                rect: Rect::new(0.0, 0.0, content_w, self.cfg.height),
                paint: Paint::Solid(self.bg.with_alpha(255)),
            }],
        }];
        if let Some(model) = &self.overlay_model {
            layers.push(LayerList {
                layer: Layer::Road,
                origin: view_origin,
                cmds: self.overlay.paint_gated(model, self.world_objects_visible),
            });
        }
        layers.push(LayerList { layer: Layer::Hud, origin: view_origin, cmds: self.hud.render() });
        layers.push(LayerList { layer: Layer::Alerts, origin: view_origin, cmds: self.alerts.render().to_vec() });
        if sidebar_visible {
            layers.push(LayerList { layer: Layer::Sidebar, origin: Point::new(0.0, 0.0), cmds: self.sidebar.render() });
        }
        Frame { frame: self.frame, layers }
    }

    pub fn pointer_down(&mut self, p: Point) {
        self.pointer.press(p);
    }

    /// Finishes a press/release pair. `None` when there was no press.
    pub fn pointer_up(&mut self, p: Point, now: Instant) -> Option<GestureOutcome> {
        let gesture = self.pointer.release(p)?;
        debug!(?gesture, x = p.x, y = p.y, "gesture");
        match gesture {
            Gesture::SwipeUp => {
                self.params.remove(keys::CALIBRATION_PARAMS);
                self.params.remove(keys::LIVE_PARAMETERS);
                self.tasks.schedule(Task::SoftRestart, CALIBRATION_RESET_DELAY, now);
                if let Some(sound) = self.caps.sound.as_mut() {
                    sound.play(Sound::ResetCalibration);
                }
            }
            Gesture::SwipeDown => {
                self.tasks.schedule(Task::SoftRestart, SOFT_RESTART_DELAY, now);
            }
            Gesture::SwipeHorizontal => {
                if let Some(recorder) = self.caps.recorder.as_mut() {
                    info!("toggling screen recorder");
                    recorder.toggle();
                }
            }
            Gesture::SwipeDiagonal => {}
            Gesture::Tap => {
                let sidebar_visible = self.sidebar.is_visible();
                if let Some(map) = self.caps.map.as_mut() {
                    let show = !sidebar_visible && !map.is_visible();
                    map.set_visible(show);
                }
            }
        }
        Some(GestureOutcome { gesture, propagate: !gesture.is_swipe() })
    }

    /// Click inside the sidebar, in sidebar coordinates.
    pub fn sidebar_click(&self, p: Point) -> Option<Signal> {
        if !self.sidebar.is_visible() {
            return None;
        }
        self.sidebar.hit_test(p)
    }

    pub fn offroad_transition(&mut self, offroad: bool) -> Vec<Signal> {
        self.offroad = offroad;
        if !offroad {
            self.started_frame = self.frame;
            if let Some(map) = self.caps.map.as_mut() {
                map.offroad_transition(offroad);
            }
        }

        self.alerts.update(&Alert::default(), self.bg);

        self.is_metric = self.params.get_bool(keys::IS_METRIC);
        self.overlay.set_metric(self.is_metric);
        self.stream = if self.cfg.wide_camera_capable && self.params.get_bool(keys::ENABLE_WIDE_CAMERA) {
            StreamType::Wide
        } else {
            StreamType::Road
        };

        if offroad {
            if let Some(recorder) = self.caps.recorder.as_mut() {
                recorder.stop(false);
            }
        }
        info!(offroad, started_frame = self.started_frame, stream = ?self.stream, "offroad transition");
        vec![Signal::OffroadTransition(offroad), Signal::Repaint(Layer::Alerts)]
    }

    pub fn is_offroad(&self) -> bool {
        self.offroad
    }

    /// Recorder tick, driven by its own timer at UI rate.
    pub fn record_tick(&mut self) {
        if let Some(recorder) = self.caps.recorder.as_mut() {
            recorder.update_screen();
        }
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::SoftRestart => {
                info!("soft restart triggered");
                self.params.put_bool(keys::SOFT_RESTART_TRIGGERED, true);
            }
        }
    }
}

fn road_view_size(cfg: &FrameLoopConfig, sidebar_visible: bool) -> (f32, f32) {
    let left = if sidebar_visible { SIDEBAR_WIDTH } else { 0.0 };
    (cfg.width - left - BDR_S * 2.0, cfg.height - BDR_S * 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hud_feed_core::{MemoryParams, ServiceUpdate, SubscriberFeed};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Calls {
        sounds: Vec<Sound>,
        toggles: usize,
        stops: Vec<bool>,
        screens: usize,
    }

    struct FakeSound(Arc<Mutex<Calls>>);
    impl SoundPlayer for FakeSound {
        fn play(&mut self, sound: Sound) {
            self.0.lock().sounds.push(sound);
        }
    }

    struct FakeRecorder(Arc<Mutex<Calls>>);
    impl ScreenRecorder for FakeRecorder {
        fn toggle(&mut self) {
            self.0.lock().toggles += 1;
        }
        fn update_screen(&mut self) {
            self.0.lock().screens += 1;
        }
        fn stop(&mut self, save: bool) {
            self.0.lock().stops.push(save);
        }
    }

    struct FakeMap {
        visible: Arc<Mutex<bool>>,
        transitions: Arc<Mutex<Vec<bool>>>,
    }
    impl MapOverlay for FakeMap {
        fn is_visible(&self) -> bool {
            *self.visible.lock()
        }
        fn set_visible(&mut self, visible: bool) {
            *self.visible.lock() = visible;
        }
        fn offroad_transition(&mut self, offroad: bool) {
            self.transitions.lock().push(offroad);
        }
    }

    fn setup(params: &[(&str, &str)]) -> (FrameLoop, Arc<MemoryParams>, Arc<Mutex<Calls>>) {
        let calls = Arc::new(Mutex::new(Calls::default()));
        let params = Arc::new(MemoryParams::with(params));
        let caps = Capabilities {
            sound: Some(Box::new(FakeSound(calls.clone()))),
            recorder: Some(Box::new(FakeRecorder(calls.clone()))),
            map: None,
        };
        let fl = FrameLoop::new(FrameLoopConfig::default(), params.clone(), caps);
        (fl, params, calls)
    }

    fn swipe(fl: &mut FrameLoop, dx: f32, dy: f32, now: Instant) -> GestureOutcome {
        fl.pointer_down(Point::new(1000.0, 500.0));
        fl.pointer_up(Point::new(1000.0 + dx, 500.0 + dy), now).unwrap()
    }

    #[test]
    fn test_swipe_up_resets_calibration_then_restarts() {
        let (mut fl, params, calls) =
            setup(&[(keys::CALIBRATION_PARAMS, "x"), (keys::LIVE_PARAMETERS, "y")]);
        let feed = SubscriberFeed::detached();
        let t0 = Instant::now();

        let out = swipe(&mut fl, -10.0, -300.0, t0);
        assert_eq!(out.gesture, Gesture::SwipeUp);
        assert!(!out.propagate);
        assert_eq!(params.get(keys::CALIBRATION_PARAMS), None);
        assert_eq!(params.get(keys::LIVE_PARAMETERS), None);
        assert_eq!(calls.lock().sounds, vec![Sound::ResetCalibration]);

        fl.tick(&feed, t0 + Duration::from_millis(1000), 0);
        assert!(!params.get_bool(keys::SOFT_RESTART_TRIGGERED));
        fl.tick(&feed, t0 + Duration::from_millis(1500), 0);
        assert!(params.get_bool(keys::SOFT_RESTART_TRIGGERED));
    }

    #[test]
    fn test_repeated_swipes_fire_once() {
        let (mut fl, params, _) = setup(&[]);
        let feed = SubscriberFeed::detached();
        let t0 = Instant::now();
        swipe(&mut fl, 0.0, 300.0, t0);
        swipe(&mut fl, 0.0, 300.0, t0 + Duration::from_millis(100));
        assert!(fl.pending(Task::SoftRestart));

        fl.tick(&feed, t0 + Duration::from_millis(550), 0);
        assert!(!params.get_bool(keys::SOFT_RESTART_TRIGGERED));
        fl.tick(&feed, t0 + Duration::from_millis(600), 0);
        assert!(params.get_bool(keys::SOFT_RESTART_TRIGGERED));
        assert!(!fl.pending(Task::SoftRestart));
    }

    #[test]
    fn test_horizontal_swipe_toggles_recorder() {
        let (mut fl, _, calls) = setup(&[]);
        let out = swipe(&mut fl, -300.0, -10.0, Instant::now());
        assert_eq!(out.gesture, Gesture::SwipeHorizontal);
        assert_eq!(calls.lock().toggles, 1);
        fl.record_tick();
        assert_eq!(calls.lock().screens, 1);
    }

    #[test]
    fn test_tap_propagates() {
        let (mut fl, _, calls) = setup(&[]);
        let out = swipe(&mut fl, 20.0, 20.0, Instant::now());
        assert_eq!(out, GestureOutcome { gesture: Gesture::Tap, propagate: true });
        assert_eq!(calls.lock().toggles, 0);
        assert!(!fl.pending(Task::SoftRestart));
    }

    #[test]
    fn test_tap_toggles_map_only_without_sidebar() {
        let visible = Arc::new(Mutex::new(false));
        let transitions = Arc::new(Mutex::new(Vec::new()));
        let caps = Capabilities {
            map: Some(Box::new(FakeMap { visible: visible.clone(), transitions: transitions.clone() })),
            ..Default::default()
        };
        let mut fl = FrameLoop::new(FrameLoopConfig::default(), Arc::new(MemoryParams::new()), caps);
        let t0 = Instant::now();

        swipe(&mut fl, 0.0, 0.0, t0);
        assert!(!*visible.lock());

        fl.set_sidebar_visible(false);
        swipe(&mut fl, 0.0, 0.0, t0);
        assert!(*visible.lock());
        swipe(&mut fl, 0.0, 0.0, t0);
        assert!(!*visible.lock());

        fl.offroad_transition(false);
        fl.offroad_transition(true);
        assert_eq!(*transitions.lock(), vec![false]);
    }

    #[test]
    fn test_offroad_transition() {
        let (mut fl, params, calls) = setup(&[(keys::IS_METRIC, "1"), (keys::ENABLE_WIDE_CAMERA, "1")]);
        params.put_bool(keys::IS_METRIC, false);

        let signals = fl.offroad_transition(false);
        assert_eq!(signals[0], Signal::OffroadTransition(false));
        assert!(!fl.is_metric());
        // wide camera needs hardware support as well as the preference
        assert_eq!(fl.stream(), StreamType::Road);
        assert!(fl.alert().is_empty());

        fl.offroad_transition(true);
        assert_eq!(calls.lock().stops, vec![false]);
    }

    #[test]
    fn test_border_follows_status() {
        let (mut fl, _, _) = setup(&[]);
        let mut feed = SubscriberFeed::detached();
        let t0 = Instant::now();
        feed.update(t0).unwrap();
        let cs = ControlsState { enabled: true, ..Default::default() };
        feed.publish(ServiceUpdate::ControlsState(cs), t0);

        let signals = fl.tick(&feed, t0, 0);
        assert!(signals.contains(&Signal::Repaint(Layer::Border)));
        assert_eq!(fl.bg(), UiStatus::Engaged.bg_color());

        feed.update(t0).unwrap();
        let signals = fl.tick(&feed, t0, 0);
        assert!(!signals.contains(&Signal::Repaint(Layer::Border)));

        let frame = fl.paint(t0);
        let border = frame.layer(Layer::Border).unwrap();
        let DrawCmd::FillRect { paint: Paint::Solid(c), .. } = &border.cmds[0] else { panic!("expected fill") };
        assert_eq!(c.a, 255);
    }

    #[test]
    fn test_road_layer_waits_for_calibration() {
        let (mut fl, _, _) = setup(&[]);
        let mut feed = SubscriberFeed::detached();
        let t0 = Instant::now();
        feed.update(t0).unwrap();
        fl.offroad_transition(false);
        let mut s = StateSnapshot::default();
        s.model.path = vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0), Point::new(0.0, 1.0)];
        feed.publish(ServiceUpdate::ModelV2(s.model), t0);
        fl.tick(&feed, t0, 0);
        assert!(!fl.world_objects_visible());
        assert!(fl.paint(t0).layer(Layer::Road).unwrap().cmds.is_empty());

        feed.update(t0).unwrap();
        feed.publish(ServiceUpdate::LiveCalibration(LiveCalibration { calib_perc: 100 }), t0);
        fl.tick(&feed, t0, 0);
        assert!(fl.world_objects_visible());
        let frame = fl.paint(t0);
        let road = frame.layer(Layer::Road).unwrap();
        assert!(road.cmds.iter().any(|c| matches!(c, DrawCmd::Polygon { .. })));
        assert_eq!(road.origin, Point::new(SIDEBAR_WIDTH + BDR_S, BDR_S));
    }

    #[test]
    fn test_slow_frame_is_measured() {
        let (mut fl, _, _) = setup(&[]);
        let t0 = Instant::now();
        fl.paint(t0);
        assert_eq!(fl.last_frame_time(), None);
        fl.paint(t0 + Duration::from_millis(100));
        assert_eq!(fl.last_frame_time(), Some(Duration::from_millis(100)));
    }

    #[test]
    fn test_sidebar_click_and_hide() {
        let (mut fl, _, _) = setup(&[]);
        assert_eq!(fl.sidebar_click(Point::new(100.0, 60.0)), Some(Signal::OpenSettings));
        fl.set_sidebar_visible(false);
        assert_eq!(fl.sidebar_click(Point::new(100.0, 60.0)), None);
        assert!(fl.paint(Instant::now()).layer(Layer::Sidebar).is_none());
    }
}

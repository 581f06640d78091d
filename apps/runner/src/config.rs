use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use hud_render::FrameLoopConfig;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HudConfig {
    pub ui_freq_hz: u32,
    pub viewport: Viewport,
    pub slow_frame_ms: f64,
    pub bind_addr: String,
    pub wide_camera_capable: bool,
    pub sidebar_visible: bool,
    pub log_level: String,
    /// Initial contents of the param store, e.g. `{"IsMetric": "1"}`.
    pub params: BTreeMap<String, String>,
}

impl Default for HudConfig {
    fn default() -> Self {
        Self {
            ui_freq_hz: 20,
            viewport: Viewport { width: 2160.0, height: 1080.0 },
            slow_frame_ms: 66.0,
            bind_addr: "0.0.0.0:8711".into(),
            wide_camera_capable: false,
            sidebar_visible: true,
            log_level: "info".into(),
            params: BTreeMap::new(),
        }
    }
}

impl HudConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs_next::config_dir().map(|d| d.join("onroad-hud").join("config.json"))
    }

    /// Explicit path first, then the per-user config dir. A missing file means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(p) => p,
            None => return Ok(Self::default()),
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        let cfg: HudConfig = serde_json::from_str(&text).with_context(|| format!("parse {}", path.display()))?;
        Ok(cfg)
    }

    pub fn frame_loop(&self) -> FrameLoopConfig {
        FrameLoopConfig {
            width: self.viewport.width,
            height: self.viewport.height,
            ui_freq: self.ui_freq_hz.max(1),
            slow_frame: Duration::from_secs_f64(self.slow_frame_ms.max(0.0) / 1000.0),
            wide_camera_capable: self.wide_camera_capable,
            sidebar_visible: self.sidebar_visible,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("onroad-hud-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_missing_file_is_default() {
        let cfg = HudConfig::load(Some(&tmp("does-not-exist.json"))).unwrap();
        assert_eq!(cfg, HudConfig::default());
        assert_eq!(cfg.frame_loop().slow_frame, Duration::from_millis(66));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let p = tmp("partial.json");
        std::fs::write(&p, r#"{"ui_freq_hz": 10, "params": {"IsMetric": "1"}}"#).unwrap();
        let cfg = HudConfig::load(Some(&p)).unwrap();
        assert_eq!(cfg.ui_freq_hz, 10);
        assert_eq!(cfg.bind_addr, "0.0.0.0:8711");
        assert_eq!(cfg.params.get("IsMetric").map(String::as_str), Some("1"));
        std::fs::remove_file(&p).ok();
    }

    #[test]
    fn test_malformed_file_is_error() {
        let p = tmp("bad.json");
        std::fs::write(&p, "{ui_freq_hz").unwrap();
        assert!(HudConfig::load(Some(&p)).is_err());
        std::fs::remove_file(&p).ok();
    }
}

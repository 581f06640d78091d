use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::time::Duration;
use std::{fs::File, path::Path};
use serde::{Serialize, Deserialize};
use hud_feed_core::*;
use hud_model::Frame;

/// Reads a recorded update stream, one JSON `ServiceUpdate` per line.
/// Blank lines are skipped; a malformed line is an error naming its number.
pub fn import_updates_ndjson(path: &Path) -> Result<Vec<ServiceUpdate>> {
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let rdr = std::io::BufReader::new(f);
    let mut updates = vec![];
    for (i, line) in rdr.lines().enumerate() {
        let s = line?;
        if s.trim().is_empty() { continue; }
        let u: ServiceUpdate = serde_json::from_str(&s)
            .with_context(|| format!("{}:{}", path.display(), i + 1))?;
        updates.push(u);
    }
    Ok(updates)
}

pub fn export_updates_ndjson(updates: &[ServiceUpdate], path: &Path) -> Result<()> {
    write_ndjson(updates, path)
}

pub fn export_frames_ndjson(frames: &[Frame], path: &Path) -> Result<()> {
    write_ndjson(frames, path)
}

fn write_ndjson<T: Serialize>(items: &[T], path: &Path) -> Result<()> {
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = std::io::BufWriter::new(f);
    for item in items {
        let s = serde_json::to_string(item)?;
        writeln!(w, "{}", s)?;
    }
    w.flush()?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameTiming {
    pub frame: u64,
    pub dt_ms: f64,
    pub slow: bool,
}

pub fn export_timings_csv(timings: &[FrameTiming], path: &Path) -> Result<()> {
    let mut w = csv::Writer::from_path(path)
        .with_context(|| format!("create {}", path.display()))?;
    for t in timings {
        w.serialize(t)?;
    }
    w.flush()?;
    Ok(())
}

pub fn import_timings_csv(path: &Path) -> Result<Vec<FrameTiming>> {
    let mut rdr = csv::Reader::from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.deserialize() {
        out.push(rec?);
    }
    Ok(out)
}

/// Plays recorded updates back into the feed, `per_tick` of them every refresh period.
pub struct ReplaySource {
    updates: Vec<ServiceUpdate>,
    period: Duration,
    per_tick: usize,
}

impl ReplaySource {
    pub fn new(updates: Vec<ServiceUpdate>, rate_hz: u32) -> Self {
        let period = Duration::from_secs_f64(1.0 / f64::from(rate_hz.max(1)));
        Self { updates, period, per_tick: 1 }
    }

    pub fn from_path(path: &Path, rate_hz: u32) -> Result<Self> {
        Ok(Self::new(import_updates_ndjson(path)?, rate_hz))
    }

    pub fn with_batch(mut self, per_tick: usize) -> Self {
        self.per_tick = per_tick.max(1);
        self
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}

#[async_trait::async_trait]
impl StateSource for ReplaySource {
    async fn run(&self, tx: UpdateTx) -> Result<(), FeedError> {
        let mut interval = tokio::time::interval(self.period);
        for chunk in self.updates.chunks(self.per_tick) {
            interval.tick().await;
            for u in chunk {
                tx.send(u.clone()).map_err(|_| FeedError::Closed)?;
            }
        }
        tracing::info!(updates = self.updates.len(), "replay finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hud_model::{Layer, LayerList, Point, VehicleState};
    use std::path::PathBuf;

    fn tmp(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("hud-io-{}-{}", std::process::id(), name))
    }

    fn car(v: f32) -> ServiceUpdate {
        ServiceUpdate::CarState(VehicleState { v_ego: v, ..Default::default() })
    }

    #[test]
    fn test_updates_ndjson_with_blank_lines() {
        let p = tmp("updates.ndjson");
        export_updates_ndjson(&[car(1.0), car(2.0)], &p).unwrap();
        let mut text = std::fs::read_to_string(&p).unwrap();
        text.push('\n');
        std::fs::write(&p, text).unwrap();
        let back = import_updates_ndjson(&p).unwrap();
        assert_eq!(back, vec![car(1.0), car(2.0)]);
        std::fs::remove_file(&p).ok();
    }

    #[test]
    fn test_bad_line_reports_position() {
        let p = tmp("bad.ndjson");
        std::fs::write(&p, "{\"service\":\"carState\",\"data\":{}}\n{oops}\n").unwrap();
        let err = import_updates_ndjson(&p).unwrap_err();
        assert!(format!("{err:#}").contains(":2"));
        std::fs::remove_file(&p).ok();
    }

    #[test]
    fn test_frames_and_timings_export() {
        let frames = vec![Frame {
            frame: 7,
            layers: vec![LayerList { layer: Layer::Hud, origin: Point::new(330.0, 30.0), cmds: vec![] }],
        }];
        let p = tmp("frames.ndjson");
        export_frames_ndjson(&frames, &p).unwrap();
        let line = std::fs::read_to_string(&p).unwrap();
        let back: Frame = serde_json::from_str(line.trim()).unwrap();
        assert_eq!(back, frames[0]);
        std::fs::remove_file(&p).ok();

        let timings = vec![FrameTiming { frame: 1, dt_ms: 50.0, slow: false }, FrameTiming { frame: 2, dt_ms: 80.5, slow: true }];
        let p = tmp("timings.csv");
        export_timings_csv(&timings, &p).unwrap();
        assert!(std::fs::read_to_string(&p).unwrap().starts_with("frame,dt_ms,slow"));
        assert_eq!(import_timings_csv(&p).unwrap(), timings);
        std::fs::remove_file(&p).ok();
    }

    #[tokio::test]
    async fn test_replay_sends_everything_in_order() {
        let (tx, rx) = channel();
        let src = ReplaySource::new(vec![car(1.0), car(2.0), car(3.0)], 1000).with_batch(2);
        src.run(tx).await.unwrap();
        let got: Vec<_> = rx.try_iter().collect();
        assert_eq!(got, vec![car(1.0), car(2.0), car(3.0)]);
    }

    #[tokio::test]
    async fn test_replay_stops_when_feed_closes() {
        let (tx, rx) = channel();
        drop(rx);
        let src = ReplaySource::new(vec![car(1.0)], 1000);
        assert!(matches!(src.run(tx).await, Err(FeedError::Closed)));
    }
}

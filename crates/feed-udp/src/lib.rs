use anyhow::Context;
use tokio::net::UdpSocket;
use tracing::{debug, info};
use hud_feed_core::*;

#[derive(Clone, Debug)]
pub struct UdpConfig {
    pub bind_addr: String,       // e.g. "0.0.0.0:8711"
    pub max_datagram: usize,
}

impl Default for UdpConfig {
    fn default() -> Self {
        Self { bind_addr: "0.0.0.0:8711".into(), max_datagram: 64 * 1024 }
    }
}

/// Receives JSON-encoded `ServiceUpdate`s, one or more newline-separated per datagram.
pub struct UdpSource {
    cfg: UdpConfig
}

impl UdpSource {
    pub fn new(cfg: UdpConfig) -> Self { Self { cfg } }
}

#[async_trait::async_trait]
impl StateSource for UdpSource {
    async fn run(&self, tx: UpdateTx) -> Result<(), FeedError> {
        let socket = UdpSocket::bind(&self.cfg.bind_addr).await
            .with_context(|| format!("bind {}", self.cfg.bind_addr))?;
        info!(addr = %self.cfg.bind_addr, "listening for state updates");
        let mut buf = vec![0u8; self.cfg.max_datagram];
        loop {
            let (len, peer) = socket.recv_from(&mut buf).await?;
            for decoded in decode_datagram(&buf[..len]) {
                match decoded {
                    Ok(update) => {
                        if tx.send(update).is_err() {
                            return Err(FeedError::Closed);
                        }
                    }
                    Err(e) => debug!(%peer, len, error = %e, "dropping datagram"),
                }
            }
        }
    }
}

/// Decodes every non-blank line of a datagram independently.
pub fn decode_datagram(buf: &[u8]) -> Vec<Result<ServiceUpdate, FeedError>> {
    let text = match std::str::from_utf8(buf) {
        Ok(t) => t,
        Err(e) => return vec![Err(FeedError::Msg(format!("datagram is not utf-8: {e}")))],
    };
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| serde_json::from_str::<ServiceUpdate>(l).map_err(FeedError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hud_model::VehicleState;

    #[test]
    fn test_decode_batch_with_garbage() {
        let buf = b"{\"service\":\"carState\",\"data\":{\"v_ego\":3.0}}\n\nnot json\n";
        let out = decode_datagram(buf);
        assert_eq!(out.len(), 2);
        match &out[0] {
            Ok(ServiceUpdate::CarState(VehicleState { v_ego, .. })) => assert_eq!(*v_ego, 3.0),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(out[1], Err(FeedError::Decode(_))));
    }

    #[test]
    fn test_decode_rejects_binary() {
        let out = decode_datagram(&[0xff, 0xfe, 0x00]);
        assert!(matches!(out.as_slice(), [Err(FeedError::Msg(_))]));
    }

    #[tokio::test]
    async fn test_source_forwards_datagrams() {
        let probe = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
        let addr = probe.local_addr().unwrap();
        drop(probe);

        let (tx, rx) = channel();
        let src = UdpSource::new(UdpConfig { bind_addr: addr.to_string(), ..Default::default() });
        let handle = tokio::spawn(async move { src.run(tx).await });

        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let msg = br#"{"service":"liveCalibration","data":{"calib_perc":100}}"#;
        let mut got = None;
        for _ in 0..50 {
            sender.send_to(msg, addr).await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            if let Ok(u) = rx.try_recv() {
                got = Some(u);
                break;
            }
        }
        handle.abort();
        assert_eq!(got.map(|u| u.service()), Some(Service::LiveCalibration));
    }
}

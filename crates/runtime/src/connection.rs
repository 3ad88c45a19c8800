//! The connection session driver.
//!
//! Owns the socket lifecycle end to end: validates the configured
//! address, dials with a deadline, feeds transport events through the
//! pure state machine in [`crate::session`], and applies the resulting
//! effects. Each decoded frame replaces the derived state wholesale and
//! is published as an immutable [`SessionState`] snapshot on a watch
//! channel; the render layer subscribes and never reaches back in.
//!
//! Failure policy: decode errors drop the single frame, asset failures
//! clear map data, and only configuration and transport errors are
//! returned to the caller. Terminal phases are final - a dropped
//! session is restarted externally, never retried here.

use crate::assets::AssetLoader;
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::latency::{LatencyTracker, RollingLatency};
use crate::session::{Effect, SessionEvent, SessionPhase, transition};
use crate::transport::{TransportEvent, WebSocketTransport};
use parking_lot::Mutex;
use radar_core::{MapCatalog, ResolvedMap, SessionState, Settings};
use radar_protocol::Frame;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// One telemetry session: a single connection attempt through its
/// terminal close or error state.
pub struct ConnectionSession {
    config: SessionConfig,
    catalog: MapCatalog,
    loader: Arc<dyn AssetLoader>,
    latency: Box<dyn LatencyTracker>,
    state: Arc<Mutex<SessionState>>,
    state_tx: watch::Sender<SessionState>,
    phase: SessionPhase,
}

impl ConnectionSession {
    pub fn new(
        config: SessionConfig,
        catalog: MapCatalog,
        loader: Arc<dyn AssetLoader>,
        settings: Settings,
    ) -> Self {
        let state = SessionState::new(settings);
        let (state_tx, _) = watch::channel(state.clone());

        Self {
            config,
            catalog,
            loader,
            latency: Box::new(RollingLatency::default()),
            state: Arc::new(Mutex::new(state)),
            state_tx,
            phase: SessionPhase::Idle,
        }
    }

    /// Replaces the default latency tracker.
    pub fn with_latency_tracker(mut self, tracker: Box<dyn LatencyTracker>) -> Self {
        self.latency = tracker;
        self
    }

    /// Hands out a receiver for published snapshots.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Applies a settings edit and publishes the updated snapshot.
    pub fn update_settings(&self, settings: Settings) {
        let mut state = self.state.lock();
        state.settings = settings;
        self.state_tx.send_replace(state.clone());
    }

    /// Runs the session to its terminal state.
    ///
    /// Returns `Ok(())` when the peer closed the connection, the
    /// connection-failure error when the attempt failed, and the
    /// transport error when the stream broke mid-session.
    pub async fn run(&mut self) -> Result<()> {
        if let Err(err) = self.config.validate() {
            self.phase = SessionPhase::Errored;
            tracing::error!(error = %err, "refusing to dial a private address");
            return Err(err);
        }

        let url = self.config.url();
        self.step(SessionEvent::Dial);

        // OpenSocket and ArmTimer are realized together: the connect
        // future raced against the deadline. Whichever finishes first is
        // authoritative; the loser is dropped.
        let transport = match tokio::time::timeout(
            self.config.connect_timeout,
            WebSocketTransport::connect(&url),
        )
        .await
        {
            Ok(Ok(transport)) => transport,
            Ok(Err(err)) => {
                self.step(SessionEvent::TransportError(err.to_string()));
                tracing::error!("{err}");
                return Err(err);
            }
            Err(_elapsed) => {
                // Dropping the pending connect closes the socket; the FSM
                // records the close-once transition.
                self.step(SessionEvent::ConnectTimeout);
                let err = Error::ConnectTimeout {
                    url,
                    timeout_ms: self.config.connect_timeout.as_millis() as u64,
                };
                tracing::error!("{err}");
                return Err(err);
            }
        };

        self.step(SessionEvent::TransportOpen);
        tracing::info!(url = %url, "connected to the telemetry socket");

        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let reader = tokio::spawn(transport.run(events_tx));

        let mut outcome = Ok(());
        while let Some(event) = events_rx.recv().await {
            let event = match event {
                TransportEvent::Message(payload) => SessionEvent::Frame(payload),
                TransportEvent::Closed => SessionEvent::TransportClosed,
                TransportEvent::Error(reason) => SessionEvent::TransportError(format!(
                    "WebSocket connection to '{url}' failed: {reason}"
                )),
            };

            for effect in self.step(event) {
                match effect {
                    Effect::ProcessFrame(payload) => self.process_frame(&payload),
                    Effect::ReportError(message) => {
                        tracing::error!("{message}");
                        outcome = Err(Error::Transport {
                            url: url.clone(),
                            reason: message,
                        });
                    }
                    // Socket teardown is owned by the reader task, timers
                    // by the connect race above.
                    Effect::OpenSocket
                    | Effect::ArmTimer
                    | Effect::CancelTimer
                    | Effect::CloseSocket => {}
                }
            }

            if self.phase.is_terminal() {
                break;
            }
        }

        let _ = reader.await;

        if self.phase == SessionPhase::Closed {
            tracing::info!("disconnected from the telemetry socket");
        }
        outcome
    }

    fn step(&mut self, event: SessionEvent) -> Vec<Effect> {
        let (phase, effects) = transition(self.phase, event);
        self.phase = phase;
        effects
    }

    /// Decodes one frame and updates the derived state.
    ///
    /// A malformed payload is a per-message failure: logged, dropped,
    /// session stays connected.
    fn process_frame(&mut self, payload: &str) {
        let frame: Frame = match serde_json::from_str(payload) {
            Ok(frame) => frame,
            Err(err) => {
                tracing::warn!(error = %err, "dropping malformed frame");
                return;
            }
        };

        let latency_ms = self.latency.sample();
        let resolved = self.catalog.resolve(Some(&frame.map));
        let raw_map = frame.raw_map().to_string();

        let fetch_target = {
            let mut state = self.state.lock();
            state.latency_ms = latency_ms;
            state.players = frame.players;
            state.local_team = Some(frame.local_team);
            state.bomb = frame.bomb;

            let map_changed = state.map.as_ref() != Some(&resolved);
            state.map = Some(resolved.clone());
            state.map_raw = Some(raw_map);

            let target = match &resolved {
                ResolvedMap::Known(name) if map_changed => Some(name.clone()),
                ResolvedMap::Known(_) => None,
                ResolvedMap::Invalid => {
                    state.map_data = None;
                    None
                }
            };

            self.state_tx.send_replace(state.clone());
            target
        };

        if let Some(map) = fetch_target {
            let loader = Arc::clone(&self.loader);
            let state = Arc::clone(&self.state);
            let state_tx = self.state_tx.clone();
            tokio::spawn(fetch_map_data_into(loader, state, state_tx, map));
        }
    }
}

/// Fetches metadata for `map` and merges it into the state, unless a
/// newer frame has moved to a different map in the meantime - a stale
/// result must not overwrite the current map's data.
async fn fetch_map_data_into(
    loader: Arc<dyn AssetLoader>,
    state: Arc<Mutex<SessionState>>,
    state_tx: watch::Sender<SessionState>,
    map: String,
) {
    let result = loader.fetch_map_data(&map).await;

    let mut state = state.lock();
    let still_current = state
        .map
        .as_ref()
        .is_some_and(|current| current.as_str() == map);
    if !still_current {
        tracing::debug!(map = %map, "discarding stale map data fetch");
        return;
    }

    match result {
        Ok(data) => state.map_data = Some(data),
        Err(err) => {
            tracing::warn!(error = %err, map = %map, "failed to load map data");
            state.map_data = None;
        }
    }
    state_tx.send_replace(state.clone());
}

#[cfg(test)]
mod tests {
    use super::*;
    use radar_core::MapData;
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    struct StubLoader {
        fail: bool,
    }

    impl AssetLoader for StubLoader {
        fn fetch_map_data(
            &self,
            map: &str,
        ) -> Pin<Box<dyn Future<Output = Result<MapData>> + Send + '_>> {
            let map = map.to_string();
            let fail = self.fail;
            Box::pin(async move {
                if fail {
                    Err(Error::AssetFetch {
                        map,
                        reason: "stub failure".to_string(),
                    })
                } else {
                    Ok(MapData {
                        name: map,
                        pos_x: -3230.0,
                        pos_y: 1713.0,
                        scale: 5.0,
                        extra: serde_json::Map::new(),
                    })
                }
            })
        }
    }

    fn test_session(loader: StubLoader) -> ConnectionSession {
        ConnectionSession::new(
            SessionConfig::default(),
            MapCatalog::default(),
            Arc::new(loader),
            Settings::default(),
        )
    }

    fn sample_payload(map: &str) -> String {
        format!(
            r#"{{
                "m_players": [{{"m_idx": 0, "m_team": 2}}, {{"m_idx": 1, "m_team": 3}}],
                "m_local_team": 3,
                "m_map": "{map}"
            }}"#
        )
    }

    #[tokio::test]
    async fn frame_replaces_state_and_publishes_snapshot() {
        let mut session = test_session(StubLoader { fail: false });
        let rx = session.subscribe();
        session.phase = SessionPhase::Connected;

        session.process_frame(&sample_payload("workshop/9999/DE_MIRAGE_FINAL.bsp"));

        let snapshot = rx.borrow().clone();
        assert_eq!(snapshot.players.len(), 2);
        assert_eq!(snapshot.local_team, Some(3));
        assert_eq!(
            snapshot.map,
            Some(ResolvedMap::Known("de_mirage".to_string()))
        );
        assert_eq!(
            snapshot.map_raw.as_deref(),
            Some("workshop/9999/DE_MIRAGE_FINAL.bsp")
        );
    }

    #[tokio::test]
    async fn malformed_payload_is_dropped() {
        let mut session = test_session(StubLoader { fail: false });
        let rx = session.subscribe();
        session.phase = SessionPhase::Connected;

        session.process_frame("{definitely not json");

        assert_eq!(session.phase, SessionPhase::Connected);
        assert!(rx.borrow().players.is_empty());
        assert!(rx.borrow().map.is_none());
    }

    #[tokio::test]
    async fn unresolvable_map_clears_map_data() {
        let mut session = test_session(StubLoader { fail: false });
        session.phase = SessionPhase::Connected;

        // Seed map data as if a previous fetch completed.
        session.process_frame(&sample_payload("de_mirage"));
        fetch_map_data_into(
            Arc::clone(&session.loader),
            Arc::clone(&session.state),
            session.state_tx.clone(),
            "de_mirage".to_string(),
        )
        .await;
        assert!(session.state.lock().map_data.is_some());

        session.process_frame(&sample_payload("cs_custommap"));

        let state = session.state.lock();
        assert_eq!(state.map, Some(ResolvedMap::Invalid));
        assert!(state.map_data.is_none());
        assert_eq!(state.status_line(), "unknown map: cs_custommap");
    }

    #[tokio::test]
    async fn failed_fetch_clears_map_data_without_ending_session() {
        let mut session = test_session(StubLoader { fail: true });
        session.phase = SessionPhase::Connected;

        session.process_frame(&sample_payload("de_nuke"));
        fetch_map_data_into(
            Arc::clone(&session.loader),
            Arc::clone(&session.state),
            session.state_tx.clone(),
            "de_nuke".to_string(),
        )
        .await;

        assert_eq!(session.phase, SessionPhase::Connected);
        assert!(session.state.lock().map_data.is_none());
    }

    #[tokio::test]
    async fn stale_fetch_result_is_discarded() {
        let session = test_session(StubLoader { fail: false });
        session.state.lock().map = Some(ResolvedMap::Known("de_nuke".to_string()));

        // A fetch issued for de_mirage completes after the session moved
        // to de_nuke; its result must not land.
        fetch_map_data_into(
            Arc::clone(&session.loader),
            Arc::clone(&session.state),
            session.state_tx.clone(),
            "de_mirage".to_string(),
        )
        .await;

        assert!(session.state.lock().map_data.is_none());
    }

    #[tokio::test]
    async fn settings_update_publishes_snapshot() {
        let session = test_session(StubLoader { fail: false });
        let rx = session.subscribe();

        let mut settings = Settings::default();
        settings.dot_size = 2.0;
        session.update_settings(settings);

        assert_eq!(rx.borrow().settings.dot_size, 2.0);
    }

    #[tokio::test]
    async fn private_address_is_refused_before_dialing() {
        let config = SessionConfig {
            host: "192.168.1.20".to_string(),
            ..Default::default()
        };
        let mut session = ConnectionSession::new(
            config,
            MapCatalog::default(),
            Arc::new(StubLoader { fail: false }),
            Settings::default(),
        );

        let err = session.run().await.unwrap_err();
        assert!(matches!(err, Error::PrivateAddress { .. }));
        assert_eq!(session.phase(), SessionPhase::Errored);
    }

    #[tokio::test]
    async fn connect_timeout_ends_in_closed() {
        // A listener that never completes the WebSocket handshake.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let _hold = tokio::spawn(async move {
            let mut held = Vec::new();
            loop {
                if let Ok((stream, _)) = listener.accept().await {
                    held.push(stream);
                }
            }
        });

        let config = SessionConfig {
            host: "127.0.0.1".to_string(),
            port,
            connect_timeout: Duration::from_millis(100),
            ..Default::default()
        };
        let mut session = ConnectionSession::new(
            config,
            MapCatalog::default(),
            Arc::new(StubLoader { fail: false }),
            Settings::default(),
        );

        let err = session.run().await.unwrap_err();
        assert!(err.is_timeout(), "expected timeout, got {err:?}");
        assert_eq!(session.phase(), SessionPhase::Closed);
    }

    #[tokio::test]
    async fn end_to_end_frame_then_close() {
        use futures_util::SinkExt;
        use tokio_tungstenite::tungstenite::Message;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            ws.send(Message::Text(sample_payload("de_dust2.bsp")))
                .await
                .unwrap();
            ws.close(None).await.unwrap();
        });

        let config = SessionConfig {
            host: "127.0.0.1".to_string(),
            port,
            ..Default::default()
        };
        let mut session = ConnectionSession::new(
            config,
            MapCatalog::default(),
            Arc::new(StubLoader { fail: false }),
            Settings::default(),
        );
        let rx = session.subscribe();

        session.run().await.unwrap();
        server.await.unwrap();

        assert_eq!(session.phase(), SessionPhase::Closed);
        let snapshot = rx.borrow().clone();
        assert_eq!(
            snapshot.map,
            Some(ResolvedMap::Known("de_dust2".to_string()))
        );
        assert_eq!(snapshot.players.len(), 2);
    }
}

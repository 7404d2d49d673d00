use nose_trace::{
    CheckpointTable, DetectionFrame, GameSession, Result, SessionConfig, SessionMessage,
    SnapshotLayout, SourceStatus, WordBank,
};

/// Wires a `GameSession` to the flat snapshot buffer JS reads every frame.
///
/// The crate keeps one of these in a `thread_local!` and exports free
/// functions via `#[wasm_bindgen]`, because wasm-bindgen cannot export
/// the session directly.
pub struct SessionRunner {
    session: GameSession,
    layout: SnapshotLayout,
    /// Flat snapshot for zero-copy reads from JS.
    buffer: Vec<f32>,
}

impl SessionRunner {
    /// Build from JSON documents; an empty string selects the built-in value.
    pub fn new(
        config_json: &str,
        checkpoints_json: &str,
        words_json: &str,
        canvas: (f32, f32),
        seed: Option<u64>,
    ) -> Result<Self> {
        let mut config = if config_json.trim().is_empty() {
            SessionConfig::default()
        } else {
            SessionConfig::from_json(config_json)?
        };
        if let Some(seed) = seed {
            config.round.seed = seed;
        }
        let checkpoints = if checkpoints_json.trim().is_empty() {
            CheckpointTable::builtin()
        } else {
            CheckpointTable::from_json(checkpoints_json)?
        };
        let words = if words_json.trim().is_empty() {
            WordBank::builtin()
        } else {
            WordBank::from_json(words_json)?
        };

        let layout = SnapshotLayout::for_session(&config, &words);
        let session = GameSession::new(config, checkpoints, words, canvas)?;
        let mut runner = Self {
            session,
            buffer: vec![0.0; layout.buffer_total_floats],
            layout,
        };
        runner.publish(0.0);
        Ok(runner)
    }

    /// Start the round; `camera_error` is `Some` when the camera or model failed to load.
    pub fn start(&mut self, now_ms: f64, camera_error: Option<String>) -> Result<()> {
        let status = match camera_error {
            None => SourceStatus::Ready,
            Some(reason) => SourceStatus::Unavailable(reason),
        };
        self.session.start_round(now_ms, status)?;
        self.publish(now_ms);
        Ok(())
    }

    /// Queue one detection cycle posted by the oracle as JSON.
    pub fn push_detections(&mut self, json: &str) -> Result<()> {
        let frame = DetectionFrame::from_json(json)?;
        self.session.post(SessionMessage::Detections(frame));
        Ok(())
    }

    pub fn detection_failed(&mut self, now_ms: f64) {
        self.session
            .post(SessionMessage::DetectionFailed { timestamp_ms: now_ms });
    }

    pub fn select_new_word(&mut self) {
        self.session.post(SessionMessage::SelectNewWord);
    }

    pub fn reset_round(&mut self) {
        self.session.post(SessionMessage::ResetRound);
    }

    /// Stop immediately so the host can release the camera in the same frame.
    pub fn stop(&mut self, now_ms: f64) {
        self.session.stop(now_ms);
        self.publish(now_ms);
    }

    /// Run one logic tick and refresh the snapshot. Returns whether the tick ran.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        let ran = self.session.tick(now_ms);
        if ran {
            self.publish(now_ms);
        }
        ran
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.session.resize(width, height);
    }

    fn publish(&mut self, now_ms: f64) {
        let events = self.session.drain_events();
        let snapshot = self.session.snapshot(now_ms);
        self.layout.write(&mut self.buffer, &snapshot, &events);
    }

    // ---- Accessors for JS reads ----

    pub fn snapshot(&self) -> &[f32] {
        &self.buffer
    }

    pub fn snapshot_ptr(&self) -> *const f32 {
        self.buffer.as_ptr()
    }

    pub fn snapshot_len(&self) -> u32 {
        self.buffer.len() as u32
    }

    pub fn current_word(&self) -> String {
        self.session.word().display().to_string()
    }

    pub fn current_brand(&self) -> String {
        self.session.word().brand().to_string()
    }

    /// Active letter checkpoints as `[x, y, hit]` triples.
    pub fn active_checkpoints(&self) -> Vec<f32> {
        self.session
            .active_checkpoint_positions()
            .into_iter()
            .flat_map(|(p, hit)| [p.x, p.y, if hit { 1.0 } else { 0.0 }])
            .collect()
    }

    pub fn is_detection_active(&self) -> bool {
        self.session.is_detection_active()
    }

    pub fn layout(&self) -> &SnapshotLayout {
        &self.layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nose_trace::bridge::protocol::{
        HEADER_EVENT_COUNT, HEADER_PHASE, HEADER_PROTOCOL_VERSION, PROTOCOL_VERSION,
    };
    use nose_trace::api::types::{EVENT_RELEASE_CAMERA, EVENT_ROUND_ENDED};

    fn runner() -> SessionRunner {
        SessionRunner::new("", "", "", (1080.0, 1920.0), Some(3)).unwrap()
    }

    #[test]
    fn builds_with_builtins() {
        let r = runner();
        assert_eq!(r.snapshot()[HEADER_PROTOCOL_VERSION], PROTOCOL_VERSION);
        assert_eq!(r.snapshot().len(), r.layout().buffer_total_floats);
        assert!(!r.current_word().is_empty());
        assert!(!r.is_detection_active());
        assert!(!r.active_checkpoints().is_empty());
    }

    #[test]
    fn bad_json_is_an_error() {
        assert!(SessionRunner::new("{", "", "", (100.0, 100.0), None).is_err());
        assert!(SessionRunner::new("", "", r#"{ "x": [] }"#, (100.0, 100.0), None).is_err());
    }

    #[test]
    fn camera_failure_blocks_start() {
        let mut r = runner();
        assert!(r.start(0.0, Some("NotAllowedError".into())).is_err());
        assert!(!r.is_detection_active());
    }

    #[test]
    fn stop_publishes_release() {
        let mut r = runner();
        r.start(0.0, None).unwrap();
        assert!(r.tick(0.0));
        r.push_detections(r#"{ "detections": [] }"#).unwrap();
        r.stop(10.0);

        let layout = r.layout().clone();
        let buf = r.snapshot();
        assert_eq!(buf[HEADER_PHASE], 4.0);
        assert_eq!(buf[HEADER_EVENT_COUNT], 2.0);
        let events = &buf[layout.event_data_offset..];
        assert_eq!(events[0], EVENT_ROUND_ENDED);
        assert_eq!(events[4], EVENT_RELEASE_CAMERA);
        assert!(!r.is_detection_active());
    }
}

pub mod runner;

pub use runner::SessionRunner;

use std::cell::RefCell;

use wasm_bindgen::prelude::*;

thread_local! {
    static RUNNER: RefCell<Option<SessionRunner>> = const { RefCell::new(None) };
}

fn with_runner<R>(f: impl FnOnce(&mut SessionRunner) -> R) -> Result<R, JsValue> {
    RUNNER.with(|cell| {
        let mut borrow = cell.borrow_mut();
        match borrow.as_mut() {
            Some(runner) => Ok(f(runner)),
            None => Err(JsValue::from_str(
                "session not initialized, call session_init() first",
            )),
        }
    })
}

fn to_js(err: nose_trace::Error) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Create the session. Empty JSON strings select built-in defaults.
#[wasm_bindgen]
pub fn session_init(
    config_json: &str,
    checkpoints_json: &str,
    words_json: &str,
    width: f32,
    height: f32,
) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let seed = (js_sys::Math::random() * u32::MAX as f64) as u64;
    let runner = SessionRunner::new(
        config_json,
        checkpoints_json,
        words_json,
        (width, height),
        Some(seed),
    )
    .map_err(to_js)?;

    RUNNER.with(|cell| {
        *cell.borrow_mut() = Some(runner);
    });
    log::info!("nose-trace: initialized");
    Ok(())
}

/// Start the round. Pass a non-empty `camera_error` when acquiring the
/// camera or loading the model failed.
#[wasm_bindgen]
pub fn session_start(now_ms: f64, camera_error: &str) -> Result<(), JsValue> {
    let error = (!camera_error.is_empty()).then(|| camera_error.to_string());
    with_runner(|r| r.start(now_ms, error))?.map_err(to_js)
}

#[wasm_bindgen]
pub fn session_push_detections(json: &str) -> Result<(), JsValue> {
    with_runner(|r| r.push_detections(json))?.map_err(to_js)
}

#[wasm_bindgen]
pub fn session_detection_failed(now_ms: f64) -> Result<(), JsValue> {
    with_runner(|r| r.detection_failed(now_ms))
}

#[wasm_bindgen]
pub fn session_tick(now_ms: f64) -> Result<bool, JsValue> {
    with_runner(|r| r.tick(now_ms))
}

#[wasm_bindgen]
pub fn session_select_new_word() -> Result<(), JsValue> {
    with_runner(|r| r.select_new_word())
}

#[wasm_bindgen]
pub fn session_reset_round() -> Result<(), JsValue> {
    with_runner(|r| r.reset_round())
}

#[wasm_bindgen]
pub fn session_stop(now_ms: f64) -> Result<(), JsValue> {
    with_runner(|r| r.stop(now_ms))
}

#[wasm_bindgen]
pub fn session_resize(width: f32, height: f32) -> Result<(), JsValue> {
    with_runner(|r| r.resize(width, height))
}

// ---- Data accessors ----

#[wasm_bindgen]
pub fn get_snapshot_ptr() -> Result<*const f32, JsValue> {
    with_runner(|r| r.snapshot_ptr())
}

#[wasm_bindgen]
pub fn get_snapshot_len() -> Result<u32, JsValue> {
    with_runner(|r| r.snapshot_len())
}

#[wasm_bindgen]
pub fn get_current_word() -> Result<String, JsValue> {
    with_runner(|r| r.current_word())
}

#[wasm_bindgen]
pub fn get_current_brand() -> Result<String, JsValue> {
    with_runner(|r| r.current_brand())
}

#[wasm_bindgen]
pub fn get_active_checkpoints() -> Result<Vec<f32>, JsValue> {
    with_runner(|r| r.active_checkpoints())
}

#[wasm_bindgen]
pub fn is_detection_active() -> Result<bool, JsValue> {
    with_runner(|r| r.is_detection_active())
}

// ---- Layout accessors ----

#[wasm_bindgen]
pub fn get_slot_data_offset() -> Result<u32, JsValue> {
    with_runner(|r| r.layout().slot_data_offset as u32)
}

#[wasm_bindgen]
pub fn get_trail_data_offset() -> Result<u32, JsValue> {
    with_runner(|r| r.layout().trail_data_offset as u32)
}

#[wasm_bindgen]
pub fn get_event_data_offset() -> Result<u32, JsValue> {
    with_runner(|r| r.layout().event_data_offset as u32)
}

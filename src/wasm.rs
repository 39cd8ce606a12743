//! Browser bindings
//!
//! The render and HUD layers own the canvas, the camera and the DOM. They
//! forward pointer intents here once per frame and read back a JSON snapshot
//! plus the events raised since they last asked.

use glam::Vec3;
use wasm_bindgen::prelude::*;

use crate::bench::Bench;
use crate::sim::Grip;
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        return;
    }
    log::info!("Dovetail workshop loaded");
}

/// Workshop instance handed to JavaScript
#[wasm_bindgen]
pub struct Workshop {
    bench: Bench,
}

#[wasm_bindgen]
impl Workshop {
    /// Build a workshop, optionally overriding tuning with a JSON document
    #[wasm_bindgen(constructor)]
    pub fn new(tuning_json: Option<String>) -> Result<Workshop, JsError> {
        let tuning = match tuning_json {
            Some(json) => Tuning::from_json(&json)?,
            None => Tuning::default(),
        };
        let seed = js_sys::Date::now() as u64;
        let bench = Bench::new(seed, tuning)?;
        log::info!("Workshop created with seed: {}", seed);
        Ok(Self { bench })
    }

    /// Pointer down on the active tool
    pub fn grab_tool(&mut self) {
        self.bench.grab(Grip::Tool);
    }

    /// Pointer down on the part being assembled
    pub fn grab_part(&mut self) {
        self.bench.grab(Grip::Part);
    }

    /// Pointer ray hit in world space
    pub fn pointer_move(&mut self, x: f32, y: f32, z: f32) {
        self.bench.pointer(Vec3::new(x, y, z));
    }

    /// Pointer up or cancel
    pub fn pointer_up(&mut self) {
        self.bench.release();
    }

    pub fn tap(&mut self) {
        self.bench.tap();
    }

    pub fn click_target(&mut self, index: usize) {
        self.bench.click(index);
    }

    /// HUD "next"
    pub fn advance(&mut self) {
        self.bench.advance();
    }

    /// HUD "collect"
    pub fn collect(&mut self) {
        self.bench.collect();
    }

    pub fn set_idle_mode(&mut self, enabled: bool) {
        self.bench.set_idle_mode(enabled);
    }

    /// Apply gathered intents and advance by `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        self.bench.tick(dt);
    }

    pub fn snapshot_json(&self) -> String {
        serde_json::to_string(&self.bench.snapshot()).unwrap_or_default()
    }

    /// Every event since the previous call
    pub fn events_json(&mut self) -> String {
        serde_json::to_string(&self.bench.take_events()).unwrap_or_default()
    }

    pub fn session_json(&self) -> String {
        serde_json::to_string(&self.bench.session).unwrap_or_default()
    }

    /// Joint outlines for building board meshes
    pub fn layout_json(&self) -> String {
        let state = &self.bench.state;
        let layout = serde_json::json!({
            "joint": &state.joint,
            "tail_board": state.joint.tail_board_profile(),
            "pin_board": state.joint.pin_board_profile(),
            "seat": &state.seat,
        });
        layout.to_string()
    }

    pub fn logs(&self) -> u32 {
        self.bench.session.inventory.logs
    }

    pub fn crafted(&self) -> usize {
        self.bench.session.crafted.len()
    }
}

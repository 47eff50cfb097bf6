//! Browser binding
//!
//! JS owns the canvas, the animation frame loop and the sensors. It forwards
//! events here and paints the JSON draw list each `frame` returns.

use glam::Vec2;
use wasm_bindgen::prelude::*;

use crate::renderer::DrawList;
use crate::scenes::SceneKind;
use crate::session::Session;
use crate::settings::Settings;
use crate::sim::TickInput;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Soothe starting...");
}

/// Session handle exported to JS
#[wasm_bindgen]
pub struct WebSession {
    session: Session,
    settings: Settings,
    input: TickInput,
}

#[wasm_bindgen]
impl WebSession {
    /// `scene` is a scene name; unknown names fall back to the default scene
    #[wasm_bindgen(constructor)]
    pub fn new(scene: &str) -> WebSession {
        let kind = SceneKind::parse(scene).unwrap_or_else(|e| {
            log::warn!("{}", e);
            SceneKind::default()
        });
        let seed = js_sys::Date::now() as u64;
        log::info!("Session seed: {}", seed);
        WebSession {
            session: Session::new(kind, seed),
            settings: Settings::load(),
            input: TickInput::default(),
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.session.resize(width, height);
    }

    pub fn touch_start(&mut self, x: f32, y: f32) {
        self.session.touch_began(Vec2::new(x, y));
    }

    pub fn touch_move(&mut self, x: f32, y: f32) {
        self.session.touch_moved(Vec2::new(x, y));
    }

    pub fn touch_end(&mut self) {
        self.session.touch_ended();
    }

    /// Device tilt, already normalized to roughly [-1, 1] per axis
    pub fn set_tilt(&mut self, x: f32, y: f32) {
        self.input.tilt = Vec2::new(x, y);
    }

    /// Latest shake magnitude from the accelerometer
    pub fn set_shake(&mut self, magnitude: f32) {
        self.input.shake = magnitude;
    }

    pub fn set_battery_low(&mut self, low: bool) {
        self.input.battery_low = low;
    }

    pub fn set_scene(&mut self, scene: &str, now_ms: f64) -> Result<(), JsError> {
        let kind = SceneKind::parse(scene)?;
        self.session.switch_to(kind, now_ms / 1000.0, &self.settings);
        Ok(())
    }

    pub fn scene(&self) -> String {
        self.session.kind().as_str().to_string()
    }

    /// Advance to `now_ms` (requestAnimationFrame time) and return the draw list as JSON
    pub fn frame(&mut self, now_ms: f64) -> String {
        let list = self.session.frame(now_ms / 1000.0, &self.settings, &self.input);
        list.to_json().unwrap_or_else(|e| {
            log::warn!("Draw list serialization failed: {}", e);
            DrawList::new().to_json().unwrap_or_default()
        })
    }

    pub fn settings_json(&self) -> Result<String, JsError> {
        Ok(self.settings.to_json()?)
    }

    /// Replace settings from JSON, validate and persist
    pub fn apply_settings(&mut self, json: &str) -> Result<(), JsError> {
        let settings = Settings::from_json(json)?;
        settings.save()?;
        self.settings = settings;
        Ok(())
    }

    pub fn unlock_parent_menu(&mut self, now_ms: f64) {
        self.session.unlock_parent_menu(now_ms / 1000.0, &self.settings);
    }

    pub fn lock_parent_menu(&mut self) {
        self.session.lock_parent_menu();
    }

    pub fn parent_menu_unlocked(&self) -> bool {
        self.session.is_parent_menu_unlocked()
    }

    pub fn session_ended(&self) -> bool {
        self.session.phase() == crate::session::SessionPhase::Ended
    }

    /// Start again after the session limit
    pub fn restart(&mut self, now_ms: f64) {
        self.session.start(now_ms / 1000.0, &self.settings);
    }

    /// Page hidden: drop the frame clock so the next frame starts at dt = 0
    pub fn pause(&mut self) {
        self.session.reset_clock();
    }

    /// Cancel all timers and unmount the scene
    pub fn teardown(&mut self) {
        self.session.teardown();
    }
}

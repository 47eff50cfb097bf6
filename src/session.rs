//! Session: the active scene plus the timers around it
//!
//! Only one scene is mounted at a time. Switching scenes drops the old
//! `SceneSimulation` (its pool, clock and rng go with it) and builds a fresh one.
//! All timers are owned here and cancelled on teardown.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::renderer::{DrawList, render};
use crate::scenes::SceneKind;
use crate::settings::Settings;
use crate::sim::state::SceneSimulation;
use crate::sim::tick::TickInput;
use crate::timers::{TimerKind, Timers};

/// Slowest speed reached at the very end of wind-down
pub const MIN_WIND_DOWN_SPEED: f32 = 0.15;
/// Opacity at the very end of wind-down
pub const MIN_WIND_DOWN_DIM: f32 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Timers not started yet (no frame seen)
    Idle,
    Running,
    /// Final seconds: slow motion and dimming
    WindingDown,
    /// Session limit reached; nothing is simulated or drawn
    Ended,
}

/// Timer-relevant slice of the settings, to detect edits between frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TimerConfig {
    auto_cycle_secs: Option<u32>,
    session_minutes: Option<u32>,
    wind_down_secs: u32,
}

impl TimerConfig {
    fn from_settings(settings: &Settings) -> Self {
        Self {
            auto_cycle_secs: settings.auto_cycle_secs,
            session_minutes: settings.session_minutes,
            wind_down_secs: settings.wind_down_secs,
        }
    }
}

#[derive(Debug)]
pub struct Session {
    kind: SceneKind,
    scene: Option<SceneSimulation>,
    timers: Timers,
    phase: SessionPhase,
    viewport: Vec2,
    /// Source of per-scene seeds
    seeds: Pcg32,
    timer_config: Option<TimerConfig>,
    /// When the current session started; the limit is measured from here
    started_at: f64,
    parent_menu_unlocked: bool,
}

impl Session {
    pub fn new(kind: SceneKind, seed: u64) -> Self {
        Self {
            kind,
            scene: None,
            timers: Timers::new(),
            phase: SessionPhase::Idle,
            viewport: Vec2::ZERO,
            seeds: Pcg32::seed_from_u64(seed),
            timer_config: None,
            started_at: 0.0,
            parent_menu_unlocked: false,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn kind(&self) -> SceneKind {
        self.kind
    }

    pub fn scene(&self) -> Option<&SceneSimulation> {
        self.scene.as_ref()
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn is_parent_menu_unlocked(&self) -> bool {
        self.parent_menu_unlocked
    }

    /// Start (or restart) the session at `now`
    pub fn start(&mut self, now: f64, settings: &Settings) {
        self.timers.cancel_all();
        self.timer_config = None;
        self.started_at = now;
        self.phase = SessionPhase::Running;
        self.mount(self.kind);
        self.arm_timers(now, settings);
        log::info!("Session started with {}", self.kind.as_str());
    }

    /// Arm the timers whose settings changed since they were last armed.
    ///
    /// Auto-cycle restarts from `now`; the session limit and wind-down are
    /// always measured from `started_at`.
    fn arm_timers(&mut self, now: f64, settings: &Settings) {
        let config = TimerConfig::from_settings(settings);
        let previous = self.timer_config.replace(config);

        let cycle_changed = previous.is_none_or(|p| p.auto_cycle_secs != config.auto_cycle_secs);
        if cycle_changed {
            self.timers.cancel_kind(TimerKind::AutoCycle);
            if let Some(secs) = config.auto_cycle_secs.filter(|s| *s > 0) {
                self.timers
                    .start_repeating(TimerKind::AutoCycle, now, secs as f64);
            }
        }

        let limit_changed = previous.is_none_or(|p| {
            p.session_minutes != config.session_minutes || p.wind_down_secs != config.wind_down_secs
        });
        if limit_changed {
            self.timers.cancel_kind(TimerKind::WindDown);
            self.timers.cancel_kind(TimerKind::SessionLimit);
            // A wind-down that is already due fires again on the next poll
            if self.phase == SessionPhase::WindingDown {
                self.phase = SessionPhase::Running;
            }
            if let Some(limit) = settings.session_secs() {
                let wind_down = (config.wind_down_secs as f64).min(limit);
                self.timers
                    .start_once(TimerKind::WindDown, self.started_at, limit - wind_down);
                self.timers
                    .start_once(TimerKind::SessionLimit, self.started_at, limit);
            }
        }
    }

    /// Build a fresh simulation for `kind`, dropping the previous one
    fn mount(&mut self, kind: SceneKind) {
        self.kind = kind;
        let mut scene = SceneSimulation::new(kind, self.seeds.random());
        scene.resize(self.viewport.x, self.viewport.y);
        self.scene = Some(scene);
    }

    /// Switch scenes now; the auto-cycle countdown restarts
    pub fn switch_to(&mut self, kind: SceneKind, now: f64, settings: &Settings) {
        if self.phase == SessionPhase::Ended {
            return;
        }
        log::info!("Switching scene {} -> {}", self.kind.as_str(), kind.as_str());
        self.mount(kind);
        if self.timers.cancel_kind(TimerKind::AutoCycle) > 0 {
            if let Some(secs) = settings.auto_cycle_secs.filter(|s| *s > 0) {
                self.timers
                    .start_repeating(TimerKind::AutoCycle, now, secs as f64);
            }
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width, height);
        if let Some(scene) = self.scene.as_mut() {
            scene.resize(width, height);
        }
    }

    pub fn touch_began(&mut self, point: Vec2) {
        if let Some(scene) = self.scene.as_mut() {
            scene.touch_began(point);
        }
    }

    pub fn touch_moved(&mut self, point: Vec2) {
        if let Some(scene) = self.scene.as_mut() {
            scene.touch_moved(point);
        }
    }

    pub fn touch_ended(&mut self) {
        if let Some(scene) = self.scene.as_mut() {
            scene.touch_ended();
        }
    }

    /// Forget the previous frame time (view hidden, app backgrounded)
    pub fn reset_clock(&mut self) {
        if let Some(scene) = self.scene.as_mut() {
            scene.reset_clock();
        }
    }

    /// Unlock the parental menu; it relocks after `parental_lock_secs`
    pub fn unlock_parent_menu(&mut self, now: f64, settings: &Settings) {
        self.timers.cancel_kind(TimerKind::ParentalAutoLock);
        self.timers.start_once(
            TimerKind::ParentalAutoLock,
            now,
            settings.parental_lock_secs as f64,
        );
        self.parent_menu_unlocked = true;
    }

    pub fn lock_parent_menu(&mut self) {
        self.timers.cancel_kind(TimerKind::ParentalAutoLock);
        self.parent_menu_unlocked = false;
    }

    /// Speed multiplier from wind-down (1.0 outside wind-down)
    pub fn wind_down_speed(&self, now: f64, settings: &Settings) -> f32 {
        match self.phase {
            SessionPhase::WindingDown => {
                let window = settings.wind_down_secs.max(1) as f64;
                let remaining = self
                    .timers
                    .remaining(TimerKind::SessionLimit, now)
                    .unwrap_or(0.0);
                ((remaining / window) as f32).clamp(MIN_WIND_DOWN_SPEED, 1.0)
            }
            SessionPhase::Ended => 0.0,
            _ => 1.0,
        }
    }

    /// Run one display frame and return what to draw
    pub fn frame(&mut self, now: f64, settings: &Settings, input: &TickInput) -> DrawList {
        if self.phase == SessionPhase::Idle {
            self.start(now, settings);
        }
        if self.timer_config != Some(TimerConfig::from_settings(settings))
            && self.phase != SessionPhase::Ended
        {
            log::info!("Timer settings changed, re-arming");
            self.arm_timers(now, settings);
        }

        for fired in self.timers.poll(now) {
            self.on_timer(fired);
        }
        if self.phase == SessionPhase::Ended {
            return DrawList::new();
        }

        let speed = self.wind_down_speed(now, settings);
        let input = TickInput {
            animation_speed: input.animation_speed * speed,
            ..input.clone()
        };

        let Some(scene) = self.scene.as_mut() else {
            return DrawList::new();
        };
        scene.frame(now, settings, &input);

        let mut list = render(scene);
        list.dim(MIN_WIND_DOWN_DIM + (1.0 - MIN_WIND_DOWN_DIM) * speed);
        list
    }

    fn on_timer(&mut self, kind: TimerKind) {
        match kind {
            TimerKind::AutoCycle => {
                if self.phase != SessionPhase::Ended {
                    let next = self.kind.next();
                    log::info!("Auto-cycle to {}", next.as_str());
                    self.mount(next);
                }
            }
            TimerKind::WindDown => {
                if self.phase == SessionPhase::Running {
                    log::info!("Session winding down");
                    self.phase = SessionPhase::WindingDown;
                }
            }
            TimerKind::SessionLimit => {
                log::info!("Session limit reached");
                self.phase = SessionPhase::Ended;
                self.timers.cancel_kind(TimerKind::AutoCycle);
                self.timers.cancel_kind(TimerKind::WindDown);
                self.scene = None;
            }
            TimerKind::ParentalAutoLock => {
                log::info!("Parental menu auto-locked");
                self.parent_menu_unlocked = false;
            }
        }
    }

    /// Cancel every timer and unmount the scene
    pub fn teardown(&mut self) {
        let cancelled = self.timers.cancel_all();
        if self.scene.take().is_some() || cancelled > 0 {
            log::info!("Session torn down ({} timers cancelled)", cancelled);
        }
        self.parent_menu_unlocked = false;
        self.timer_config = None;
        self.phase = SessionPhase::Idle;
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f64 = 1.0 / 60.0;

    fn session() -> Session {
        let mut s = Session::new(SceneKind::Snowglobe, 77);
        s.resize(320.0, 480.0);
        s
    }

    #[test]
    fn test_first_frame_mounts_scene() {
        let mut s = session();
        assert!(s.scene().is_none());
        let list = s.frame(0.0, &Settings::default(), &TickInput::default());
        assert_eq!(s.phase(), SessionPhase::Running);
        assert!(s.scene().is_some());
        // Snowglobe prefills on its first tick
        assert!(!list.is_empty());
    }

    #[test]
    fn test_auto_cycle_rotates_with_fresh_scene() {
        let settings = Settings {
            auto_cycle_secs: Some(10),
            ..Settings::default()
        };
        let mut s = session();
        s.frame(0.0, &settings, &TickInput::default());
        s.frame(5.0, &settings, &TickInput::default());
        assert_eq!(s.kind(), SceneKind::Snowglobe);

        s.frame(10.0, &settings, &TickInput::default());
        assert_eq!(s.kind(), SceneKind::Bubbles);
        let scene = s.scene().unwrap();
        assert_eq!(scene.kind, SceneKind::Bubbles);
        assert_eq!(scene.time_ticks, 1);
    }

    #[test]
    fn test_manual_switch_restarts_countdown() {
        let settings = Settings {
            auto_cycle_secs: Some(10),
            ..Settings::default()
        };
        let mut s = session();
        s.frame(0.0, &settings, &TickInput::default());
        s.switch_to(SceneKind::Ripples, 8.0, &settings);
        s.frame(10.0, &settings, &TickInput::default());
        assert_eq!(s.kind(), SceneKind::Ripples);
        s.frame(18.0, &settings, &TickInput::default());
        assert_eq!(s.kind(), SceneKind::Snowglobe);
    }

    #[test]
    fn test_wind_down_then_end() {
        let settings = Settings {
            session_minutes: Some(1),
            wind_down_secs: 30,
            ..Settings::default()
        };
        let mut s = session();
        s.frame(0.0, &settings, &TickInput::default());
        assert_eq!(s.wind_down_speed(10.0, &settings), 1.0);

        s.frame(45.0, &settings, &TickInput::default());
        assert_eq!(s.phase(), SessionPhase::WindingDown);
        assert!((s.wind_down_speed(45.0, &settings) - 0.5).abs() < 1e-4);
        assert_eq!(s.wind_down_speed(59.9, &settings), MIN_WIND_DOWN_SPEED);

        let list = s.frame(60.0, &settings, &TickInput::default());
        assert_eq!(s.phase(), SessionPhase::Ended);
        assert!(list.is_empty());
        assert!(s.scene().is_none());
        assert!(s.timers().is_empty());
    }

    #[test]
    fn test_wind_down_dims_output() {
        let settings = Settings {
            session_minutes: Some(1),
            wind_down_secs: 30,
            ..Settings::default()
        };
        let mut s = session();
        let full = s.frame(0.0, &settings, &TickInput::default());
        let full_alpha = full.primitives().iter().map(|p| p.color[3]).fold(0.0f32, f32::max);

        let dim = s.frame(55.0, &settings, &TickInput::default());
        let dim_alpha = dim.primitives().iter().map(|p| p.color[3]).fold(0.0f32, f32::max);
        assert!(dim_alpha < full_alpha);
    }

    #[test]
    fn test_parental_auto_lock() {
        let settings = Settings {
            parental_lock_secs: 60,
            ..Settings::default()
        };
        let mut s = session();
        s.frame(0.0, &settings, &TickInput::default());
        s.unlock_parent_menu(0.0, &settings);
        s.frame(59.0, &settings, &TickInput::default());
        assert!(s.is_parent_menu_unlocked());
        s.frame(60.0, &settings, &TickInput::default());
        assert!(!s.is_parent_menu_unlocked());

        s.unlock_parent_menu(70.0, &settings);
        s.lock_parent_menu();
        assert!(!s.timers().is_active(TimerKind::ParentalAutoLock));
    }

    #[test]
    fn test_teardown_cancels_everything() {
        let settings = Settings {
            auto_cycle_secs: Some(10),
            session_minutes: Some(5),
            ..Settings::default()
        };
        let mut s = session();
        s.frame(0.0, &settings, &TickInput::default());
        s.unlock_parent_menu(0.0, &settings);
        assert_eq!(s.timers().len(), 4);

        s.teardown();
        assert!(s.timers().is_empty());
        assert!(s.scene().is_none());
        assert!(!s.is_parent_menu_unlocked());
    }

    #[test]
    fn test_settings_edit_rearms_timers() {
        let mut settings = Settings::default();
        let mut s = session();
        s.frame(0.0, &settings, &TickInput::default());
        assert!(!s.timers().is_active(TimerKind::AutoCycle));

        settings.auto_cycle_secs = Some(3);
        s.frame(1.0, &settings, &TickInput::default());
        assert!(s.timers().is_active(TimerKind::AutoCycle));
        s.frame(4.0, &settings, &TickInput::default());
        assert_eq!(s.kind(), SceneKind::Bubbles);
    }

    #[test]
    fn test_auto_cycle_edit_keeps_session_end() {
        let mut settings = Settings {
            session_minutes: Some(1),
            wind_down_secs: 30,
            ..Settings::default()
        };
        let mut s = session();
        s.frame(0.0, &settings, &TickInput::default());

        settings.auto_cycle_secs = Some(5);
        s.frame(50.0, &settings, &TickInput::default());
        assert_eq!(s.phase(), SessionPhase::WindingDown);
        assert_eq!(s.timers().remaining(TimerKind::SessionLimit, 50.0), Some(10.0));
        assert!(s.wind_down_speed(50.0, &settings) < 0.5);

        s.frame(61.0, &settings, &TickInput::default());
        assert_eq!(s.phase(), SessionPhase::Ended);
    }

    #[test]
    fn test_extending_session_leaves_wind_down() {
        let mut settings = Settings {
            session_minutes: Some(1),
            wind_down_secs: 30,
            ..Settings::default()
        };
        let mut s = session();
        s.frame(0.0, &settings, &TickInput::default());
        s.frame(45.0, &settings, &TickInput::default());
        assert_eq!(s.phase(), SessionPhase::WindingDown);

        settings.session_minutes = Some(2);
        s.frame(46.0, &settings, &TickInput::default());
        assert_eq!(s.phase(), SessionPhase::Running);
        assert_eq!(s.timers().remaining(TimerKind::SessionLimit, 46.0), Some(74.0));

        s.frame(100.0, &settings, &TickInput::default());
        assert_eq!(s.phase(), SessionPhase::WindingDown);
        s.frame(120.0, &settings, &TickInput::default());
        assert_eq!(s.phase(), SessionPhase::Ended);
    }

    #[test]
    fn test_shortening_session_ends_on_next_frame() {
        let mut settings = Settings {
            session_minutes: Some(5),
            wind_down_secs: 30,
            ..Settings::default()
        };
        let mut s = session();
        s.frame(0.0, &settings, &TickInput::default());
        settings.session_minutes = Some(1);
        s.frame(70.0, &settings, &TickInput::default());
        assert_eq!(s.phase(), SessionPhase::Ended);
    }

    #[test]
    fn test_touch_reaches_scene() {
        let mut s = session();
        s.switch_to(SceneKind::Ripples, 0.0, &Settings::default());
        s.frame(0.0, &Settings::default(), &TickInput::default());
        s.touch_began(Vec2::new(160.0, 240.0));
        s.frame(FRAME, &Settings::default(), &TickInput::default());
        assert!(s.scene().unwrap().pool.len() >= 3);
    }
}

//! Per-frame animation state: page scroll, scrubbed morph progress, and the
//! orbiting camera. Free of GPU and window types.

use corelib::camera::Camera;
use corelib::orbit::OrbitController;
use corelib::scroll::{MorphTween, ScrollState, ScrollTrigger, Scrub};

use crate::input::ScrollCommand;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationSettings {
    /// Page height in viewport heights (at least one).
    pub page_screens: f32,
    /// Seconds the morph takes to catch up with the scroll position.
    pub scrub_lag: f32,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            page_screens: 3.0,
            scrub_lag: 2.0,
        }
    }
}

pub struct SceneAnimation {
    pub camera: Camera,
    scroll: ScrollState,
    scrub: Scrub,
    tween: MorphTween,
    orbit: OrbitController,
    progress: f32,
}

impl SceneAnimation {
    /// `viewport_height` is in logical pixels.
    pub fn new(settings: AnimationSettings, viewport_height: f32, aspect: f32) -> Self {
        let camera = Camera::landing_default(aspect);
        Self {
            orbit: OrbitController::new(&camera),
            camera,
            scroll: ScrollState::with_screens(settings.page_screens, viewport_height),
            scrub: Scrub::new(settings.scrub_lag),
            tween: MorphTween::default(),
            progress: 0.0,
        }
    }

    pub fn scroll(&self) -> &ScrollState {
        &self.scroll
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Scroll position as a fraction of the scrollable range.
    pub fn scroll_fraction(&self) -> f32 {
        ScrollTrigger::whole_page(&self.scroll).progress(self.scroll.offset())
    }

    pub fn orbit_mut(&mut self) -> &mut OrbitController {
        &mut self.orbit
    }

    pub fn apply(&mut self, cmd: ScrollCommand) {
        match cmd {
            ScrollCommand::By(dy) => self.scroll.scroll_by(dy),
            ScrollCommand::Pages(n) => self.scroll.scroll_by(n * self.scroll.viewport_height()),
            ScrollCommand::Top => self.scroll.scroll_to(0.0),
            ScrollCommand::Bottom => self.scroll.scroll_to(self.scroll.max_offset()),
        }
    }

    /// Ignored while the viewport has no height (minimized window).
    pub fn resize(&mut self, viewport_height: f32, aspect: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        self.scroll.set_viewport(viewport_height);
        self.camera.set_aspect(aspect);
    }

    /// Advance by `dt` seconds and return the morph progress for this frame.
    pub fn step(&mut self, dt: f32) -> f32 {
        if self.scroll.viewport_height() > 0.0 {
            let trigger = ScrollTrigger::whole_page(&self.scroll);
            self.scrub.seek(trigger.progress(self.scroll.offset()));
        }
        let playhead = self.scrub.update(dt);
        self.progress = self.tween.sample(playhead);
        if self.orbit.update(&mut self.camera) {
            log::trace!("Camera eye {:?}", self.camera.eye);
        }
        self.progress
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anim() -> SceneAnimation {
        SceneAnimation::new(AnimationSettings::default(), 800.0, 1.5)
    }

    #[test]
    fn starts_at_zero_progress() {
        let mut a = anim();
        assert_eq!(a.step(0.016), 0.0);
    }

    #[test]
    fn scrolling_to_bottom_morphs_fully_after_lag() {
        let mut a = anim();
        a.apply(ScrollCommand::Bottom);
        let first = a.step(0.1);
        assert!(first > 0.0 && first < 1.0, "scrub should lag, got {first}");
        for _ in 0..30 {
            a.step(0.1);
        }
        assert!((a.progress() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn halfway_scroll_targets_half_progress() {
        let mut a = anim();
        a.apply(ScrollCommand::Pages(1.0));
        assert!((a.scroll_fraction() - 0.5).abs() < 1e-6);
        for _ in 0..40 {
            a.step(0.1);
        }
        assert!((a.progress() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn zero_lag_follows_scroll_immediately() {
        let settings = AnimationSettings {
            scrub_lag: 0.0,
            ..Default::default()
        };
        let mut a = SceneAnimation::new(settings, 800.0, 1.0);
        a.apply(ScrollCommand::By(400.0));
        assert!((a.step(0.0) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn resize_updates_camera_aspect() {
        let mut a = anim();
        a.resize(400.0, 2.0);
        assert_eq!(a.camera.aspect(), 2.0);
        assert_eq!(a.scroll().viewport_height(), 400.0);
    }

    #[test]
    fn minimize_and_restore_keeps_scrolling_alive() {
        let mut a = anim();
        a.apply(ScrollCommand::Pages(1.0));
        a.resize(0.0, 0.0);
        assert_eq!(a.camera.aspect(), 1.5);
        a.resize(800.0, 1.5);
        assert!((a.scroll_fraction() - 0.5).abs() < 1e-6);
        a.apply(ScrollCommand::Bottom);
        assert_eq!(a.scroll().offset(), 1600.0);
    }

    #[test]
    fn zero_height_start_does_not_jump_to_full_morph() {
        let mut a = SceneAnimation::new(AnimationSettings::default(), 0.0, 1.0);
        assert_eq!(a.step(0.5), 0.0);
        a.resize(800.0, 1.0);
        a.apply(ScrollCommand::Bottom);
        assert_eq!(a.scroll().offset(), 1600.0);
    }
}

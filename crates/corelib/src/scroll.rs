//! Scroll-driven animation: a virtual page, a trigger mapping scroll offset to
//! progress, and a lagging scrub that follows that progress over time.
//! All distances are logical pixels.

use crate::easing::Ease;

/// Virtual page scrolled by the viewport. The page is always a fixed number
/// of viewports tall.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollState {
    offset: f32,
    screens: f32,
    viewport_height: f32,
}

impl ScrollState {
    pub fn new(page_height: f32, viewport_height: f32) -> Self {
        let screens = if viewport_height > 0.0 {
            page_height.max(0.0) / viewport_height
        } else {
            1.0
        };
        Self::with_screens(screens, viewport_height)
    }

    /// Page `screens` viewports tall; `screens` is clamped to at least one.
    pub fn with_screens(screens: f32, viewport_height: f32) -> Self {
        let screens = if screens.is_finite() { screens.max(1.0) } else { 1.0 };
        Self {
            offset: 0.0,
            screens,
            viewport_height: viewport_height.max(0.0),
        }
    }

    #[inline]
    pub fn offset(&self) -> f32 {
        self.offset
    }

    #[inline]
    pub fn screens(&self) -> f32 {
        self.screens
    }

    #[inline]
    pub fn page_height(&self) -> f32 {
        self.screens * self.viewport_height
    }

    #[inline]
    pub fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    #[inline]
    pub fn max_offset(&self) -> f32 {
        (self.page_height() - self.viewport_height).max(0.0)
    }

    pub fn scroll_by(&mut self, dy: f32) {
        self.scroll_to(self.offset + dy);
    }

    pub fn scroll_to(&mut self, y: f32) {
        let y = if y.is_finite() { y } else { 0.0 };
        self.offset = y.clamp(0.0, self.max_offset());
    }

    /// Resize the viewport, keeping the relative scroll position.
    /// A zero-height viewport (minimized window) leaves the state untouched.
    pub fn set_viewport(&mut self, viewport_height: f32) {
        if !(viewport_height.is_finite() && viewport_height > 0.0) {
            return;
        }
        let fraction = if self.max_offset() > 0.0 {
            self.offset / self.max_offset()
        } else {
            0.0
        };
        self.viewport_height = viewport_height;
        self.scroll_to(fraction * self.max_offset());
    }
}

/// Scroll range over which a trigger element animates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollTrigger {
    pub start: f32,
    pub end: f32,
}

impl ScrollTrigger {
    /// Starts when the element top reaches the viewport top and ends when the
    /// element bottom reaches the viewport bottom.
    pub fn top_top_bottom_bottom(element_top: f32, element_height: f32, viewport_height: f32) -> Self {
        Self {
            start: element_top,
            end: element_top + element_height - viewport_height,
        }
    }

    /// Trigger spanning the whole page.
    pub fn whole_page(scroll: &ScrollState) -> Self {
        Self::top_top_bottom_bottom(0.0, scroll.page_height(), scroll.viewport_height())
    }

    pub fn progress(&self, offset: f32) -> f32 {
        let span = self.end - self.start;
        if span <= f32::EPSILON {
            return if offset >= self.start { 1.0 } else { 0.0 };
        }
        ((offset - self.start) / span).clamp(0.0, 1.0)
    }
}

/// Playhead that chases a target progress, taking `lag` seconds to catch up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scrub {
    pub lag: f32,
    pub ease: Ease,
    value: f32,
    from: f32,
    target: f32,
    elapsed: f32,
}

impl Scrub {
    pub fn new(lag: f32) -> Self {
        Self {
            lag: lag.max(0.0),
            ease: Ease::Power3Out,
            value: 0.0,
            from: 0.0,
            target: 0.0,
            elapsed: 0.0,
        }
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Retarget the playhead; restarts the catch-up tween from the current value.
    pub fn seek(&mut self, target: f32) {
        if (target - self.target).abs() <= f32::EPSILON {
            return;
        }
        self.from = self.value;
        self.target = target;
        self.elapsed = 0.0;
        if self.lag <= 0.0 {
            self.value = target;
        }
    }

    pub fn update(&mut self, dt: f32) -> f32 {
        if self.lag <= 0.0 {
            self.value = self.target;
            return self.value;
        }
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.lag);
        let k = self.ease.apply(self.elapsed / self.lag);
        self.value = self.from + (self.target - self.from) * k;
        self.value
    }

    pub fn is_settled(&self) -> bool {
        (self.value - self.target).abs() <= f32::EPSILON
    }
}

/// Maps the scrub playhead onto an animated value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MorphTween {
    pub from: f32,
    pub to: f32,
    pub ease: Ease,
}

impl Default for MorphTween {
    fn default() -> Self {
        Self {
            from: 0.0,
            to: 1.0,
            ease: Ease::Linear,
        }
    }
}

impl MorphTween {
    pub fn sample(&self, playhead: f32) -> f32 {
        self.from + (self.to - self.from) * self.ease.apply(playhead)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_is_clamped_to_page() {
        let mut s = ScrollState::with_screens(3.0, 800.0);
        assert_eq!(s.max_offset(), 1600.0);
        s.scroll_by(-50.0);
        assert_eq!(s.offset(), 0.0);
        s.scroll_by(5000.0);
        assert_eq!(s.offset(), 1600.0);
    }

    #[test]
    fn single_screen_page_cannot_scroll() {
        let mut s = ScrollState::with_screens(0.5, 600.0);
        s.scroll_by(100.0);
        assert_eq!(s.offset(), 0.0);
        assert_eq!(s.max_offset(), 0.0);
    }

    #[test]
    fn viewport_resize_keeps_relative_position() {
        let mut s = ScrollState::with_screens(3.0, 800.0);
        s.scroll_to(800.0);
        s.set_viewport(400.0);
        assert_eq!(s.page_height(), 1200.0);
        assert!((s.offset() - 400.0).abs() < 1e-3);
    }

    #[test]
    fn minimized_viewport_keeps_page_and_position() {
        let mut s = ScrollState::with_screens(3.0, 800.0);
        s.scroll_to(800.0);
        s.set_viewport(0.0);
        assert_eq!(s.offset(), 800.0);
        s.set_viewport(800.0);
        assert_eq!(s.page_height(), 2400.0);
        assert_eq!(s.max_offset(), 1600.0);
        assert_eq!(s.offset(), 800.0);
    }

    #[test]
    fn page_created_at_zero_height_scrolls_once_sized() {
        let mut s = ScrollState::with_screens(3.0, 0.0);
        assert_eq!(s.max_offset(), 0.0);
        s.set_viewport(600.0);
        assert_eq!(s.page_height(), 1800.0);
        s.scroll_by(300.0);
        assert_eq!(s.offset(), 300.0);
    }

    #[test]
    fn whole_page_trigger_maps_linearly() {
        let s = ScrollState::with_screens(3.0, 1000.0);
        let trigger = ScrollTrigger::whole_page(&s);
        assert_eq!(trigger.progress(0.0), 0.0);
        assert!((trigger.progress(1000.0) - 0.5).abs() < 1e-6);
        assert_eq!(trigger.progress(2000.0), 1.0);
        assert_eq!(trigger.progress(9999.0), 1.0);
    }

    #[test]
    fn degenerate_trigger_is_a_step() {
        let trigger = ScrollTrigger::top_top_bottom_bottom(100.0, 500.0, 500.0);
        assert_eq!(trigger.progress(99.0), 0.0);
        assert_eq!(trigger.progress(100.0), 1.0);
    }

    #[test]
    fn scrub_lags_then_settles() {
        let mut scrub = Scrub::new(2.0);
        scrub.seek(1.0);
        let early = scrub.update(0.1);
        assert!(early > 0.0 && early < 1.0);
        scrub.update(1.0);
        let late = scrub.update(1.0);
        assert!((late - 1.0).abs() < 1e-6);
        assert!(scrub.is_settled());
    }

    #[test]
    fn scrub_retarget_starts_from_current_value() {
        let mut scrub = Scrub::new(1.0);
        scrub.seek(1.0);
        let mid = scrub.update(0.2);
        scrub.seek(0.0);
        let next = scrub.update(0.0);
        assert!((next - mid).abs() < 1e-6);
        scrub.update(1.0);
        assert!(scrub.value().abs() < 1e-6);
    }

    #[test]
    fn zero_lag_scrub_jumps() {
        let mut scrub = Scrub::new(0.0);
        scrub.seek(0.7);
        assert_eq!(scrub.value(), 0.7);
        assert_eq!(scrub.update(0.016), 0.7);
    }

    #[test]
    fn morph_tween_defaults_to_identity() {
        let tween = MorphTween::default();
        assert_eq!(tween.sample(0.0), 0.0);
        assert_eq!(tween.sample(0.3), 0.3);
        assert_eq!(tween.sample(1.0), 1.0);
    }
}

//! Mapping from raw winit input to page scrolling and camera commands.

use winit::event::MouseScrollDelta;
use winit::keyboard::{Key, NamedKey};

/// Logical pixels scrolled per wheel notch.
pub const LINE_HEIGHT_PX: f32 = 100.0;
/// Logical pixels scrolled per arrow key press.
pub const ARROW_STEP_PX: f32 = 40.0;
/// Dolly factor per wheel notch when zooming.
pub const ZOOM_STEP: f32 = 0.95;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScrollCommand {
    /// Relative scroll in logical pixels; positive moves down the page.
    By(f32),
    /// Scroll by a number of viewport heights.
    Pages(f32),
    Top,
    Bottom,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum KeyAction {
    Scroll(ScrollCommand),
    Exit,
}

/// Wheel delta as notches, positive when the wheel turns towards the user.
pub fn wheel_notches(delta: MouseScrollDelta, scale_factor: f64) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -y,
        MouseScrollDelta::PixelDelta(pos) => {
            let logical = pos.y / scale_factor.max(f64::EPSILON);
            -(logical as f32) / LINE_HEIGHT_PX
        }
    }
}

/// Page scroll for a wheel event, in logical pixels.
pub fn wheel_scroll(delta: MouseScrollDelta, scale_factor: f64) -> ScrollCommand {
    ScrollCommand::By(wheel_notches(delta, scale_factor) * LINE_HEIGHT_PX)
}

/// Dolly factor for a zoom gesture; scrolling down the page zooms out.
pub fn wheel_zoom(delta: MouseScrollDelta, scale_factor: f64) -> f32 {
    ZOOM_STEP.powf(-wheel_notches(delta, scale_factor))
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WheelAction {
    Scroll(ScrollCommand),
    /// Dolly factor for the orbit camera.
    Zoom(f32),
}

/// Route a wheel event. Events the overlay consumed are dropped; Ctrl turns
/// the wheel into a camera zoom.
pub fn wheel_action(
    delta: MouseScrollDelta,
    scale_factor: f64,
    ctrl: bool,
    consumed_by_ui: bool,
) -> Option<WheelAction> {
    if consumed_by_ui {
        return None;
    }
    Some(if ctrl {
        WheelAction::Zoom(wheel_zoom(delta, scale_factor))
    } else {
        WheelAction::Scroll(wheel_scroll(delta, scale_factor))
    })
}

pub fn key_action(key: &Key) -> Option<KeyAction> {
    let Key::Named(named) = key else {
        return None;
    };
    let scroll = |cmd| Some(KeyAction::Scroll(cmd));
    match named {
        NamedKey::ArrowDown => scroll(ScrollCommand::By(ARROW_STEP_PX)),
        NamedKey::ArrowUp => scroll(ScrollCommand::By(-ARROW_STEP_PX)),
        NamedKey::PageDown | NamedKey::Space => scroll(ScrollCommand::Pages(1.0)),
        NamedKey::PageUp => scroll(ScrollCommand::Pages(-1.0)),
        NamedKey::Home => scroll(ScrollCommand::Top),
        NamedKey::End => scroll(ScrollCommand::Bottom),
        NamedKey::Escape => Some(KeyAction::Exit),
        _ => None,
    }
}

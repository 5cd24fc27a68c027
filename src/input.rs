//! Orbit controls.
//!
//! Left-drag spins the camera around the origin. Zoom and pan are disabled,
//! so the wheel and the other buttons are ignored.

use glam::Vec2;
use std::f32::consts::TAU;
use winit::event::{ElementState, MouseButton, WindowEvent};

use crate::gpu::OrbitCamera;

/// Drag state for the orbit camera.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    /// 1.0 turns a drag across the full window height into one full turn.
    pub rotate_speed: f32,
    dragging: bool,
    last_cursor: Option<Vec2>,
}

impl OrbitControls {
    pub fn new(rotate_speed: f32) -> Self {
        Self {
            rotate_speed,
            dragging: false,
            last_cursor: None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Feed a window event. Returns `true` if the camera moved.
    pub fn handle_event(&mut self, event: &WindowEvent, camera: &mut OrbitCamera, viewport_height: f32) -> bool {
        match event {
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = *state == ElementState::Pressed;
                if !self.dragging {
                    self.last_cursor = None;
                }
                false
            }
            WindowEvent::CursorMoved { position, .. } => {
                let cursor = Vec2::new(position.x as f32, position.y as f32);
                self.drag_to(cursor, camera, viewport_height)
            }
            WindowEvent::CursorLeft { .. } => {
                self.last_cursor = None;
                false
            }
            _ => false,
        }
    }

    /// Move the cursor to `cursor` (physical pixels), rotating if dragging.
    pub fn drag_to(&mut self, cursor: Vec2, camera: &mut OrbitCamera, viewport_height: f32) -> bool {
        if !self.dragging {
            return false;
        }
        let moved = match self.last_cursor {
            Some(last) => {
                let delta = cursor - last;
                let per_pixel = TAU * self.rotate_speed / viewport_height.max(1.0);
                camera.orbit(-delta.x * per_pixel, delta.y * per_pixel);
                delta != Vec2::ZERO
            }
            None => false,
        };
        self.last_cursor = Some(cursor);
        moved
    }

    /// Start or stop a drag without a window event.
    pub fn set_dragging(&mut self, dragging: bool) {
        self.dragging = dragging;
        if !dragging {
            self.last_cursor = None;
        }
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new(1.0)
    }
}

//! Pointer fan-out and window input.
//!
//! Layers that react to the pointer hold a [`PointerSubscription`] from the
//! scheduler's [`PointerHub`]. The hub keeps only weak references, so
//! dropping a subscription (which happens when its layer unmounts) is the
//! unsubscribe; there is no listener that can outlive its layer.
//!
//! [`Input`] collects per-frame key and button presses from winit for the
//! native host.
//!
//! ```ignore
//! let mut hub = PointerHub::new();
//! let sub = hub.subscribe();
//! hub.publish(Some(Vec2::new(10.0, 20.0)));
//! assert_eq!(sub.position(), Some(Vec2::new(10.0, 20.0)));
//! drop(sub);
//! assert_eq!(hub.listener_count(), 0);
//! ```

use std::cell::Cell;
use std::collections::HashSet;
use std::rc::{Rc, Weak};

use glam::Vec2;
use winit::event::{ElementState, MouseButton as WinitMouseButton, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

type Slot = Cell<Option<Vec2>>;

/// Broadcasts the latest pointer position to every live subscription.
#[derive(Debug, Default)]
pub struct PointerHub {
    listeners: Vec<Weak<Slot>>,
    last: Option<Vec2>,
}

impl PointerHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new listener, primed with the last published position.
    pub fn subscribe(&mut self) -> PointerSubscription {
        self.listeners.retain(|weak| weak.strong_count() > 0);
        let slot = Rc::new(Cell::new(self.last));
        self.listeners.push(Rc::downgrade(&slot));
        PointerSubscription { slot }
    }

    /// Publish a position, or `None` when the pointer left the surface.
    pub fn publish(&mut self, position: Option<Vec2>) {
        self.last = position;
        self.listeners.retain(|weak| match weak.upgrade() {
            Some(slot) => {
                slot.set(position);
                true
            }
            None => false,
        });
    }

    pub fn last(&self) -> Option<Vec2> {
        self.last
    }

    /// Subscriptions still alive.
    pub fn listener_count(&self) -> usize {
        self.listeners.iter().filter(|w| w.strong_count() > 0).count()
    }
}

/// A layer's view of the pointer. Dropping it unsubscribes.
#[derive(Debug)]
pub struct PointerSubscription {
    slot: Rc<Slot>,
}

impl PointerSubscription {
    pub fn position(&self) -> Option<Vec2> {
        self.slot.get()
    }
}

/// Mouse buttons the host reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    fn from_winit(button: WinitMouseButton) -> Option<Self> {
        match button {
            WinitMouseButton::Left => Some(MouseButton::Left),
            WinitMouseButton::Right => Some(MouseButton::Right),
            WinitMouseButton::Middle => Some(MouseButton::Middle),
            _ => None,
        }
    }
}

/// Keys the host reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Space,
    Escape,
    M,
    P,
    /// Number row `1`-`9`.
    Digit(u8),
}

impl KeyCode {
    fn from_winit(key: WinitKeyCode) -> Option<Self> {
        Some(match key {
            WinitKeyCode::Space => KeyCode::Space,
            WinitKeyCode::Escape => KeyCode::Escape,
            WinitKeyCode::KeyM => KeyCode::M,
            WinitKeyCode::KeyP => KeyCode::P,
            WinitKeyCode::Digit1 => KeyCode::Digit(1),
            WinitKeyCode::Digit2 => KeyCode::Digit(2),
            WinitKeyCode::Digit3 => KeyCode::Digit(3),
            WinitKeyCode::Digit4 => KeyCode::Digit(4),
            WinitKeyCode::Digit5 => KeyCode::Digit(5),
            WinitKeyCode::Digit6 => KeyCode::Digit(6),
            WinitKeyCode::Digit7 => KeyCode::Digit(7),
            WinitKeyCode::Digit8 => KeyCode::Digit(8),
            WinitKeyCode::Digit9 => KeyCode::Digit(9),
            _ => return None,
        })
    }
}

/// Presses since the last [`Input::end_frame`], plus the cursor position.
#[derive(Debug, Default)]
pub struct Input {
    keys_pressed: HashSet<KeyCode>,
    buttons_pressed: HashSet<MouseButton>,
    cursor: Option<Vec2>,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn mouse_pressed(&self, button: MouseButton) -> bool {
        self.buttons_pressed.contains(&button)
    }

    /// Digits pressed this frame, ascending.
    pub fn digits_pressed(&self) -> Vec<u8> {
        let mut digits: Vec<u8> = self
            .keys_pressed
            .iter()
            .filter_map(|k| match k {
                KeyCode::Digit(d) => Some(*d),
                _ => None,
            })
            .collect();
        digits.sort_unstable();
        digits
    }

    /// Cursor position in physical pixels, `None` outside the window.
    pub fn cursor(&self) -> Option<Vec2> {
        self.cursor
    }

    /// Fold one window event in. Returns `true` when the cursor moved or
    /// left, so the caller can republish it.
    pub fn handle_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed && !event.repeat {
                    if let PhysicalKey::Code(code) = event.physical_key {
                        if let Some(key) = KeyCode::from_winit(code) {
                            self.keys_pressed.insert(key);
                        }
                    }
                }
                false
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if *state == ElementState::Pressed {
                    if let Some(button) = MouseButton::from_winit(*button) {
                        self.buttons_pressed.insert(button);
                    }
                }
                false
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Some(Vec2::new(position.x as f32, position.y as f32));
                true
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                true
            }
            _ => false,
        }
    }

    /// Forget this frame's presses.
    pub fn end_frame(&mut self) {
        self.keys_pressed.clear();
        self.buttons_pressed.clear();
    }
}

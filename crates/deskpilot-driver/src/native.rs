//! Structured input tier backed by `enigo`.
//!
//! Posts pointer and keyboard events directly instead of going through a
//! script interpreter.  The [`Enigo`] handle is created lazily on first
//! use, so a machine without input permissions simply reports the tier as
//! unavailable.

use std::sync::Mutex;

use async_trait::async_trait;
use enigo::{Button, Coordinate, Direction, Enigo, Key, Keyboard, Mouse, Settings};
use tracing::debug;

use crate::capability::{Capability, MouseButton};
use crate::error::{DriverError, Result};
use crate::keys::{KeyChord, Modifier};
use crate::traits::Driver;

pub struct NativeInputDriver {
    enigo: Mutex<Option<Enigo>>,
}

impl Default for NativeInputDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeInputDriver {
    pub fn new() -> Self {
        Self {
            enigo: Mutex::new(None),
        }
    }

    /// Run `f` against the (lazily created) input handle.
    fn with_enigo<T>(&self, f: impl FnOnce(&mut Enigo) -> Result<T>) -> Result<T> {
        let mut guard = self
            .enigo
            .lock()
            .map_err(|_| DriverError::Native("input handle lock poisoned".into()))?;
        if guard.is_none() {
            let enigo = Enigo::new(&Settings::default())
                .map_err(|e| DriverError::Unavailable {
                    driver: "native".into(),
                    reason: format!("{e:?}"),
                })?;
            *guard = Some(enigo);
        }
        match guard.as_mut() {
            Some(enigo) => f(enigo),
            None => Err(DriverError::Native("input handle missing".into())),
        }
    }
}

#[async_trait]
impl Driver for NativeInputDriver {
    fn id(&self) -> &str {
        "native"
    }

    fn supports(&self, capability: Capability) -> bool {
        matches!(
            capability,
            Capability::MoveMouse | Capability::Click | Capability::PressKeys | Capability::TypeText
        )
    }

    async fn is_available(&self) -> bool {
        self.with_enigo(|_| Ok(())).is_ok()
    }

    async fn move_mouse(&self, x: i32, y: i32) -> Result<()> {
        self.with_enigo(|enigo| {
            enigo
                .move_mouse(x, y, Coordinate::Abs)
                .map_err(|e| DriverError::Native(format!("{e:?}")))
        })
    }

    async fn click(&self, button: MouseButton) -> Result<()> {
        let button = match button {
            MouseButton::Left => Button::Left,
            MouseButton::Right => Button::Right,
            MouseButton::Middle => Button::Middle,
        };
        self.with_enigo(|enigo| {
            enigo
                .button(button, Direction::Click)
                .map_err(|e| DriverError::Native(format!("{e:?}")))
        })
    }

    async fn press_keys(&self, chord: &KeyChord, target_app: Option<&str>) -> Result<()> {
        // Focus changes are not expressible as input events.
        if target_app.is_some() {
            return Err(self.unsupported(Capability::PressKeys));
        }

        let modifiers: Vec<Key> = chord.modifiers().into_iter().map(modifier_key).collect();
        let mut keys = Vec::new();
        for name in chord.regular_keys() {
            keys.push(
                map_key(name)
                    .ok_or_else(|| DriverError::InvalidInput(format!("unmapped key `{name}`")))?,
            );
        }
        if keys.is_empty() && !modifiers.is_empty() {
            keys.push(Key::Tab);
        }
        debug!(chord = %chord, "posting key events");

        self.with_enigo(|enigo| {
            let native = |e: enigo::InputError| DriverError::Native(format!("{e:?}"));
            for m in &modifiers {
                enigo.key(*m, Direction::Press).map_err(native)?;
            }
            let mut result = Ok(());
            for k in &keys {
                if let Err(e) = enigo.key(*k, Direction::Click) {
                    result = Err(native(e));
                    break;
                }
            }
            // Always release what was pressed.
            for m in modifiers.iter().rev() {
                enigo.key(*m, Direction::Release).map_err(native)?;
            }
            result
        })
    }

    async fn type_text(&self, text: &str) -> Result<()> {
        self.with_enigo(|enigo| {
            enigo
                .text(text)
                .map_err(|e| DriverError::Native(format!("{e:?}")))
        })
    }

    async fn pointer_position(&self) -> Result<Option<(i32, i32)>> {
        self.with_enigo(|enigo| {
            enigo
                .location()
                .map(Some)
                .map_err(|e| DriverError::Native(format!("{e:?}")))
        })
    }
}

fn modifier_key(modifier: Modifier) -> Key {
    match modifier {
        Modifier::Command => Key::Meta,
        Modifier::Option => Key::Alt,
        Modifier::Control => Key::Control,
        Modifier::Shift => Key::Shift,
    }
}

fn map_key(name: &str) -> Option<Key> {
    let key = match name {
        "return" => Key::Return,
        "tab" => Key::Tab,
        "space" => Key::Space,
        "escape" => Key::Escape,
        "delete" => Key::Backspace,
        "forwarddelete" => Key::Delete,
        "up" => Key::UpArrow,
        "down" => Key::DownArrow,
        "left" => Key::LeftArrow,
        "right" => Key::RightArrow,
        "home" => Key::Home,
        "end" => Key::End,
        "pageup" => Key::PageUp,
        "pagedown" => Key::PageDown,
        "f1" => Key::F1,
        "f2" => Key::F2,
        "f3" => Key::F3,
        "f4" => Key::F4,
        "f5" => Key::F5,
        "f6" => Key::F6,
        "f7" => Key::F7,
        "f8" => Key::F8,
        "f9" => Key::F9,
        "f10" => Key::F10,
        "f11" => Key::F11,
        "f12" => Key::F12,
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Key::Unicode(c),
                _ => return None,
            }
        }
    };
    Some(key)
}

//! Layout validation and action normalization.
//!
//! Raw layouts come from hand-edited JSON and older tools, so actions may
//! omit `type`, use legacy field names, or carry coordinates as strings.
//! [`normalize_layout`] turns them into the canonical [`Layout`] form.
//! Running it again on its own serialized output changes nothing.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use deskpilot_driver::KeyChord;

use crate::action::{Action, ActionKind, Layout};
use crate::apps::{ensure_scheme, is_browser};
use crate::error::{IntentError, Result};

/// Validate `raw` and canonicalize each of its actions.
///
/// Fails with [`IntentError::InvalidLayout`] when the layout is not an
/// object, lacks a `name`, or has no actions.  Individual actions never
/// fail: anything that cannot be understood becomes
/// [`ActionKind::Unsupported`].
pub fn normalize_layout(id: &str, raw: &Value) -> Result<Layout> {
    let obj = raw
        .as_object()
        .ok_or_else(|| IntentError::invalid("layout is empty or not an object"))?;

    let name = text(obj, "name").ok_or_else(|| IntentError::invalid("layout must have a name"))?;
    let description = text(obj, "description").unwrap_or_else(|| name.clone());

    let actions = match obj.get("actions").and_then(Value::as_array) {
        Some(actions) if !actions.is_empty() => actions,
        _ => return Err(IntentError::invalid("layout must have at least one action")),
    };

    let actions: Vec<Action> = actions
        .iter()
        .enumerate()
        .map(|(index, raw)| normalize_action(index, raw))
        .collect();

    debug!(layout = %id, actions = actions.len(), "layout normalized");
    Ok(Layout {
        id: id.to_string(),
        name,
        description,
        actions,
    })
}

/// Canonicalize the action at `index` (0-based).
pub fn normalize_action(index: usize, raw: &Value) -> Action {
    let fallback_description = format!("Action {}", index + 1);
    let Some(obj) = raw.as_object() else {
        return Action {
            description: fallback_description,
            kind: unsupported("action is not an object"),
        };
    };

    let description = text(obj, "description").unwrap_or(fallback_description);

    let explicit = obj
        .get("type")
        .and_then(Value::as_str)
        .filter(|t| ActionKind::TYPES.contains(t));
    let kind = match explicit {
        Some(ty) => build(ty, obj),
        None => match infer_type(obj) {
            Some(ty) => build(ty, obj),
            None => unsupported("cannot infer action type from its fields"),
        },
    };

    if let ActionKind::Unsupported { reason } = &kind {
        warn!(index = index, reason = %reason, "action normalized as unsupported");
    }
    Action { description, kind }
}

/// Pick a `type` from field shape, first matching rule wins.
fn infer_type(obj: &Map<String, Value>) -> Option<&'static str> {
    let has = |key: &str| obj.get(key).is_some_and(|v| !v.is_null());
    let has_coords = coord(obj, "x").is_some() && coord(obj, "y").is_some();

    if has("openApp") {
        Some("openApp")
    } else if has("url") {
        Some("openUrl")
    } else if has("urls") {
        Some("openMultipleUrls")
    } else if has_coords && flag(obj, "click") {
        Some("mouseClick")
    } else if has_coords {
        Some("mouseMove")
    } else if (has("contact") || has("contactName")) && has("message") {
        Some("sendMessage")
    } else if has("keySequence") || has("keys") {
        Some("keyboardShortcut")
    } else if has("text") {
        Some("typeText")
    } else {
        None
    }
}

fn build(ty: &str, obj: &Map<String, Value>) -> ActionKind {
    match ty {
        "openApp" => match text(obj, "app").or_else(|| text(obj, "openApp")) {
            Some(app) => ActionKind::OpenApp {
                chrome_profile: profile_for(obj, Some(app.as_str())),
                app,
            },
            None => unsupported("openApp action without an app name"),
        },
        "openUrl" => {
            let Some(raw) = text(obj, "url") else {
                return unsupported("openUrl action without a url");
            };
            match checked_url(&raw) {
                Ok(url) => {
                    let browser = text(obj, "browser");
                    ActionKind::OpenUrl {
                        chrome_profile: profile_for(obj, browser.as_deref()),
                        url,
                        browser,
                    }
                }
                Err(reason) => ActionKind::Unsupported { reason },
            }
        }
        "openMultipleUrls" => {
            let urls: Vec<String> = strings(obj, "urls")
                .into_iter()
                .filter_map(|raw| match checked_url(&raw) {
                    Ok(url) => Some(url),
                    Err(reason) => {
                        warn!(reason = %reason, "dropping url");
                        None
                    }
                })
                .collect();
            if urls.is_empty() {
                return unsupported("openMultipleUrls action without a valid url");
            }
            let browser = text(obj, "browser");
            ActionKind::OpenMultipleUrls {
                chrome_profile: profile_for(obj, browser.as_deref()),
                urls,
                browser,
            }
        }
        "keyboardShortcut" => {
            let raw = if obj.contains_key("keySequence") {
                key_sequence(obj, "keySequence")
            } else {
                key_sequence(obj, "keys")
            };
            let chord = KeyChord::parse(raw);
            if chord.is_empty() {
                return unsupported("keyboardShortcut action with an empty key sequence");
            }
            ActionKind::KeyboardShortcut {
                key_sequence: chord.keys().to_vec(),
                app: text(obj, "app"),
            }
        }
        "mouseMove" | "mouseClick" => {
            let (Some(x), Some(y)) = (coord(obj, "x"), coord(obj, "y")) else {
                return unsupported(format!("{ty} action without numeric x/y"));
            };
            let app = text(obj, "app");
            if ty == "mouseClick" {
                ActionKind::MouseClick { x, y, app }
            } else {
                ActionKind::MouseMove {
                    x,
                    y,
                    click: flag(obj, "click"),
                    app,
                }
            }
        }
        "typeText" => match obj.get("text").and_then(Value::as_str) {
            Some(body) => ActionKind::TypeText {
                text: body.to_string(),
                app: text(obj, "app"),
            },
            None => unsupported("typeText action without text"),
        },
        "sendMessage" => {
            let contact = text(obj, "contact").or_else(|| text(obj, "contactName"));
            let message = obj.get("message").and_then(Value::as_str);
            match (contact, message) {
                (Some(contact), Some(message)) => ActionKind::SendMessage {
                    contact,
                    message: message.to_string(),
                    app: text(obj, "app"),
                },
                _ => unsupported("sendMessage action needs a contact and a message"),
            }
        }
        _ => ActionKind::Unsupported {
            reason: text(obj, "reason").unwrap_or_else(|| "unsupported action".to_string()),
        },
    }
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn unsupported(reason: impl Into<String>) -> ActionKind {
    ActionKind::Unsupported {
        reason: reason.into(),
    }
}

/// Non-blank string field, trimmed.
fn text(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Integer coordinate given as a number or a numeric string.
///
/// Values outside the `i32` range are rejected, never clamped.
fn coord(obj: &Map<String, Value>, key: &str) -> Option<i32> {
    match obj.get(key)? {
        Value::Number(n) => match n.as_i64() {
            Some(v) => i32::try_from(v).ok(),
            None => n.as_f64().and_then(rounded),
        },
        Value::String(s) => s.trim().parse::<f64>().ok().and_then(rounded),
        _ => None,
    }
}

fn rounded(f: f64) -> Option<i32> {
    let r = f.round();
    if r.is_finite() && r >= f64::from(i32::MIN) && r <= f64::from(i32::MAX) {
        Some(r as i32)
    } else {
        None
    }
}

fn flag(obj: &Map<String, Value>, key: &str) -> bool {
    match obj.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn strings(obj: &Map<String, Value>, key: &str) -> Vec<String> {
    obj.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Keys given either as an array or as a `cmd+shift+t` string.
fn key_sequence(obj: &Map<String, Value>, key: &str) -> Vec<String> {
    match obj.get(key) {
        Some(Value::String(s)) => s.split('+').map(str::to_string).collect(),
        Some(Value::Array(_)) => strings(obj, key),
        _ => Vec::new(),
    }
}

/// Browser profile, kept only when the target is absent or a browser.
///
/// An absent target keeps the profile: the executor decides later, once
/// the target is known, and drops it for anything that is not a browser.
fn profile_for(obj: &Map<String, Value>, target: Option<&str>) -> Option<String> {
    let profile = text(obj, "chromeProfile")?;
    match target {
        Some(app) if !is_browser(app) => {
            debug!(app = %app, "ignoring browser profile on non-browser target");
            None
        }
        _ => Some(profile),
    }
}

fn checked_url(raw: &str) -> std::result::Result<String, String> {
    let url = ensure_scheme(raw);
    match url::Url::parse(&url) {
        Ok(parsed) if parsed.host_str().is_some() => Ok(url),
        Ok(_) => Err(format!("url `{raw}` has no host")),
        Err(e) => Err(format!("invalid url `{raw}`: {e}")),
    }
}

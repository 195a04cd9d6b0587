//! Canonical action and layout model.
//!
//! Every action leaving the normalizer carries exactly one [`ActionKind`];
//! downstream code switches on the tag only.

use serde::{Deserialize, Serialize};

/// One step of a layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub description: String,
    #[serde(flatten)]
    pub kind: ActionKind,
}

/// The typed payload of an [`Action`], tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ActionKind {
    OpenApp {
        app: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        chrome_profile: Option<String>,
    },
    OpenUrl {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        browser: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        chrome_profile: Option<String>,
    },
    OpenMultipleUrls {
        urls: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        browser: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        chrome_profile: Option<String>,
    },
    KeyboardShortcut {
        /// Normalized key names (`command`, `shift`, `t`).
        key_sequence: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        app: Option<String>,
    },
    /// Pointer move, followed by a left click when `click` is set.
    MouseMove {
        x: i32,
        y: i32,
        #[serde(default)]
        click: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        app: Option<String>,
    },
    MouseClick {
        x: i32,
        y: i32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        app: Option<String>,
    },
    TypeText {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        app: Option<String>,
    },
    SendMessage {
        contact: String,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        app: Option<String>,
    },
    /// Kept so the run can log and skip it.
    Unsupported { reason: String },
}

impl ActionKind {
    /// Every `type` tag, in declaration order.
    pub const TYPES: [&'static str; 9] = [
        "openApp",
        "openUrl",
        "openMultipleUrls",
        "keyboardShortcut",
        "mouseMove",
        "mouseClick",
        "typeText",
        "sendMessage",
        "unsupported",
    ];

    /// The `type` tag of this kind.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::OpenApp { .. } => "openApp",
            Self::OpenUrl { .. } => "openUrl",
            Self::OpenMultipleUrls { .. } => "openMultipleUrls",
            Self::KeyboardShortcut { .. } => "keyboardShortcut",
            Self::MouseMove { .. } => "mouseMove",
            Self::MouseClick { .. } => "mouseClick",
            Self::TypeText { .. } => "typeText",
            Self::SendMessage { .. } => "sendMessage",
            Self::Unsupported { .. } => "unsupported",
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported { .. })
    }
}

/// A validated, canonical layout ready to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Execution order.
    pub actions: Vec<Action>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn serializes_flat_with_type_tag() {
        let action = Action {
            description: "Open Meet".into(),
            kind: ActionKind::OpenUrl {
                url: "https://meet.google.com".into(),
                browser: None,
                chrome_profile: Some("Profile 1".into()),
            },
        };
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({
                "description": "Open Meet",
                "type": "openUrl",
                "url": "https://meet.google.com",
                "chromeProfile": "Profile 1"
            })
        );
    }

    #[test]
    fn type_names_match_serde_tags() {
        let kinds = [
            ActionKind::TypeText {
                text: "hi".into(),
                app: None,
            },
            ActionKind::MouseClick { x: 1, y: 2, app: None },
            ActionKind::Unsupported { reason: "x".into() },
        ];
        for kind in kinds {
            let value = serde_json::to_value(&kind).unwrap();
            assert_eq!(value["type"], kind.type_name());
            assert!(ActionKind::TYPES.contains(&kind.type_name()));
        }
    }
}

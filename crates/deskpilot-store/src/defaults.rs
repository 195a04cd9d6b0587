//! Built-in layouts seeded into an empty user store.

use serde_json::{Map, Value, json};

/// The default `dev`, `research` and `meeting` layouts, in that order.
pub fn default_layouts() -> Map<String, Value> {
    let mut layouts = Map::new();

    layouts.insert(
        "dev".into(),
        json!({
            "name": "Development Mode",
            "description": "Setup for development with code editor and terminal",
            "actions": [
                { "description": "Open WhatsApp", "openApp": "WhatsApp" },
                {
                    "description": "Position mouse in WhatsApp chat area",
                    "x": 400, "y": 300, "click": true
                },
                { "description": "Open Terminal", "openApp": "Terminal" },
                {
                    "description": "Position mouse in Terminal",
                    "x": 400, "y": 600, "click": true
                }
            ]
        }),
    );

    layouts.insert(
        "research".into(),
        json!({
            "name": "Research Mode",
            "description": "Browser setup for research",
            "actions": [
                { "description": "Open Google Chrome", "openApp": "Google Chrome" },
                { "description": "Open GitHub", "url": "https://github.com" }
            ]
        }),
    );

    layouts.insert(
        "meeting".into(),
        json!({
            "name": "Meeting Mode",
            "description": "Setup for video meetings",
            "actions": [
                { "description": "Open Google Chrome", "openApp": "Google Chrome" },
                { "description": "Open Google Meet", "url": "https://meet.google.com" },
                { "description": "Open Notes app for meeting notes", "openApp": "Notes" }
            ]
        }),
    );

    layouts
}

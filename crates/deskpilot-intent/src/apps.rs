//! Application name aliases and browser detection.

/// Browser used for URL actions when nothing else names one.
pub const DEFAULT_BROWSER: &str = "Google Chrome";

/// Messaging app used by `sendMessage` actions without an explicit app.
pub const DEFAULT_MESSENGER: &str = "WhatsApp";

const ALIASES: &[(&str, &str)] = &[
    ("chrome", "Google Chrome"),
    ("google chrome", "Google Chrome"),
    ("safari", "Safari"),
    ("firefox", "Firefox"),
    ("vscode", "Visual Studio Code"),
    ("vs code", "Visual Studio Code"),
    ("terminal", "Terminal"),
    ("finder", "Finder"),
    ("slack", "Slack"),
    ("whatsapp", "WhatsApp"),
    ("spotify", "Spotify"),
    ("notes", "Notes"),
];

const BROWSERS: &[&str] = &["Google Chrome", "Safari", "Firefox"];

/// Canonical application name; unknown names pass through trimmed.
pub fn canonical_app_name(name: &str) -> String {
    let trimmed = name.trim();
    let lower = trimmed.to_lowercase();
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map(|(_, canonical)| (*canonical).to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

/// Whether `name` (alias or canonical) is a recognized browser.
pub fn is_browser(name: &str) -> bool {
    let canonical = canonical_app_name(name);
    BROWSERS.contains(&canonical.as_str())
}

/// Prepend `https://` unless the URL already names http or https.
pub fn ensure_scheme(url: &str) -> String {
    let trimmed = url.trim();
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_case_insensitively() {
        assert_eq!(canonical_app_name("Chrome"), "Google Chrome");
        assert_eq!(canonical_app_name("VSCODE"), "Visual Studio Code");
        assert_eq!(canonical_app_name(" whatsapp "), "WhatsApp");
        assert_eq!(canonical_app_name("Figma"), "Figma");
    }

    #[test]
    fn browser_detection() {
        assert!(is_browser("chrome"));
        assert!(is_browser("Safari"));
        assert!(!is_browser("Notes"));
    }

    #[test]
    fn scheme_is_added_once() {
        assert_eq!(ensure_scheme("github.com"), "https://github.com");
        assert_eq!(ensure_scheme("http://localhost:3000"), "http://localhost:3000");
        assert_eq!(ensure_scheme(&ensure_scheme("x.io")), "https://x.io");
    }
}

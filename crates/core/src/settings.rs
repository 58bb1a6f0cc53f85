use serde::{Deserialize, Serialize};

/// User-tunable settings, persisted as a single blob.
///
/// `popup_close_secs` and `keyboard_shortcut` exist for UI surfaces that
/// share the same store; the daemon and CLI only consult the two toggles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tag_suggestions_enabled: bool,
    pub tab_cache_enabled: bool,
    pub popup_close_secs: u32,
    pub dev_mode_enabled: bool,
    pub keyboard_shortcut: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tag_suggestions_enabled: true,
            tab_cache_enabled: true,
            popup_close_secs: 3,
            dev_mode_enabled: false,
            keyboard_shortcut: "Ctrl+Shift+P".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert!(s.tag_suggestions_enabled);
        assert!(s.tab_cache_enabled);
        assert_eq!(s.popup_close_secs, 3);
        assert!(!s.dev_mode_enabled);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let s: Settings = serde_json::from_str(r#"{"tab_cache_enabled":false}"#).unwrap();
        assert!(!s.tab_cache_enabled);
        assert!(s.tag_suggestions_enabled);
        assert_eq!(s.keyboard_shortcut, "Ctrl+Shift+P");
    }
}

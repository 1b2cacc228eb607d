use serde::Deserialize;
use web_sys::Document;

use crate::error::Result;
use crate::motion::MotionParams;
use crate::reveal::RevealDelays;

/// Id of the optional `<script type="application/json">` block that overrides
/// any subset of the defaults below.
pub const CONFIG_ELEMENT_ID: &str = "page-config";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageConfig {
    pub motion: MotionParams,
    pub recipient: String,
    pub projects_url: String,
    pub form_reset_delay_ms: i32,
    pub reveal_delay_ms: i32,
    pub button_show_delay_ms: i32,
    pub button_hide_delay_ms: i32,
    pub home_threshold: f64,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            motion: MotionParams::default(),
            recipient: "hello@example.com".to_string(),
            projects_url: "projects.json".to_string(),
            form_reset_delay_ms: 500,
            reveal_delay_ms: 300,
            button_show_delay_ms: 50,
            button_hide_delay_ms: 500,
            home_threshold: 0.1,
        }
    }
}

impl PageConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads the inline config block, falling back to defaults when it is
    /// absent or malformed.
    pub fn load(document: &Document) -> Self {
        let Some(el) = document.get_element_by_id(CONFIG_ELEMENT_ID) else {
            return Self::default();
        };

        let text = el.text_content().unwrap_or_default();
        match Self::from_json(&text) {
            Ok(config) => {
                log::debug!("loaded #{}: {:?}", CONFIG_ELEMENT_ID, config);
                config
            }
            Err(err) => {
                log::warn!("ignoring #{}: {}", CONFIG_ELEMENT_ID, err);
                Self::default()
            }
        }
    }

    /// Negative delays are treated as zero.
    pub fn reveal_delays(&self) -> RevealDelays {
        RevealDelays {
            reveal_ms: self.reveal_delay_ms.max(0),
            show_ms: self.button_show_delay_ms.max(0),
            hide_ms: self.button_hide_delay_ms.max(0),
        }
    }
}

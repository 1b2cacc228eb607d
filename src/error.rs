use wasm_bindgen::JsValue;

use crate::dom::js_value_to_string;

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("missing element `{0}`")]
    MissingElement(String),
    #[error("{0}")]
    Js(String),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("GET {url} returned HTTP {status}")]
    Http { url: String, status: u16 },
}

impl PageError {
    pub fn missing(selector: &str) -> Self {
        PageError::MissingElement(selector.to_string())
    }
}

impl From<JsValue> for PageError {
    fn from(value: JsValue) -> Self {
        PageError::Js(js_value_to_string(&value))
    }
}

impl From<PageError> for JsValue {
    fn from(err: PageError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

pub type Result<T, E = PageError> = std::result::Result<T, E>;

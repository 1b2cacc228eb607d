use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlFormElement, HtmlInputElement, HtmlTextAreaElement, KeyboardEvent, Window};

use crate::config::PageConfig;
use crate::dom::{self, listen, query, query_all, require, set_timeout};
use crate::error::Result;
use crate::modal::{BodyScroll, Overlay};

pub const OVERLAY_SELECTOR: &str = ".contact-modal-overlay";
const OPEN_SELECTORS: [&str; 2] = [".circular-button", ".get-in-touch-btn"];
const CLOSE_SELECTOR: &str = ".close-modal";
const FORM_SELECTOR: &str = ".contact-form";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactMessage {
    pub fn subject(&self) -> String {
        format!("New message from {}", self.name)
    }

    pub fn body(&self) -> String {
        let message = self.message.replace("\r\n", "\n").replace('\n', "\r\n");
        format!(
            "Name: {}\r\nEmail: {}\r\n\r\nMessage:\r\n{}",
            self.name, self.email, message
        )
    }
}

/// `mailto:` link that opens the visitor's mail client with the form
/// contents prefilled.
pub fn compose_mailto(recipient: &str, message: &ContactMessage) -> String {
    format!(
        "mailto:{}?subject={}&body={}",
        recipient,
        urlencoding::encode(&message.subject()),
        urlencoding::encode(&message.body())
    )
}

fn field_value(document: &Document, id: &str) -> String {
    let Some(el) = document.get_element_by_id(id) else {
        return String::new();
    };
    if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
        return input.value();
    }
    if let Some(area) = el.dyn_ref::<HtmlTextAreaElement>() {
        return area.value();
    }
    String::new()
}

pub fn read_message(document: &Document) -> ContactMessage {
    ContactMessage {
        name: field_value(document, "name"),
        email: field_value(document, "email"),
        message: field_value(document, "message"),
    }
}

pub fn install(window: &Window, document: &Document, config: &PageConfig) -> Result<Overlay> {
    let overlay = Overlay::new(document, require(document, OVERLAY_SELECTOR)?, BodyScroll::Restored);

    for selector in OPEN_SELECTORS {
        for trigger in query_all(document, selector) {
            overlay.open_on_click(&trigger)?;
        }
    }
    if let Some(close) = query(document, CLOSE_SELECTOR) {
        overlay.close_on_click(&close)?;
    }
    overlay.close_on_backdrop()?;

    let on_escape = overlay.clone();
    listen(document, "keydown", move |event| {
        let Some(key) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        if key.key() == "Escape" && on_escape.is_open() {
            on_escape.close();
        }
    })?;

    match query(document, FORM_SELECTOR).and_then(|el| el.dyn_into::<HtmlFormElement>().ok()) {
        Some(form) => install_submit(window, document, form, &overlay, config)?,
        None => log::warn!("contact: {} missing, submit disabled", FORM_SELECTOR),
    }

    Ok(overlay)
}

fn install_submit(
    window: &Window,
    document: &Document,
    form: HtmlFormElement,
    overlay: &Overlay,
    config: &PageConfig,
) -> Result<()> {
    let recipient = form
        .get_attribute("data-recipient")
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| config.recipient.clone());
    let reset_delay = config.form_reset_delay_ms;

    let window = window.clone();
    let document = document.clone();
    let overlay = overlay.clone();
    let target = form.clone();
    listen(&target, "submit", move |event| {
        event.prevent_default();

        let link = compose_mailto(&recipient, &read_message(&document));
        if let Err(err) = window.location().set_href(&link) {
            log::warn!("contact: cannot open mail client: {}", dom::js_value_to_string(&err));
        }

        let form = form.clone();
        let overlay = overlay.clone();
        let reset = move || {
            form.reset();
            overlay.close();
        };
        if let Err(err) = set_timeout(&window, reset_delay, reset) {
            log::warn!("contact: reset not scheduled: {}", err);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ContactMessage {
        ContactMessage {
            name: "Ana Lima".to_string(),
            email: "ana@mail.com".to_string(),
            message: "Hi & bye\nthanks".to_string(),
        }
    }

    #[test]
    fn body_uses_crlf_line_breaks() {
        assert_eq!(
            sample().body(),
            "Name: Ana Lima\r\nEmail: ana@mail.com\r\n\r\nMessage:\r\nHi & bye\r\nthanks"
        );
    }

    #[test]
    fn mailto_encodes_subject_and_body() {
        let link = compose_mailto("me@site.dev", &sample());
        assert_eq!(
            link,
            "mailto:me@site.dev?subject=New%20message%20from%20Ana%20Lima\
             &body=Name%3A%20Ana%20Lima%0D%0AEmail%3A%20ana%40mail.com%0D%0A%0D%0A\
             Message%3A%0D%0AHi%20%26%20bye%0D%0Athanks"
        );
    }

    #[test]
    fn query_breaking_characters_stay_inside_their_field() {
        let message = ContactMessage {
            name: "x&subject=spoof".to_string(),
            ..ContactMessage::default()
        };
        let link = compose_mailto("me@site.dev", &message);
        assert_eq!(link.matches("&subject=").count(), 0);
        assert_eq!(link.matches("&body=").count(), 1);
    }

    #[test]
    fn windows_line_endings_are_not_doubled() {
        let message = ContactMessage {
            message: "a\r\nb".to_string(),
            ..ContactMessage::default()
        };
        assert!(message.body().ends_with("Message:\r\na\r\nb"));
    }
}

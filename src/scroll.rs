use wasm_bindgen::JsValue;
use web_sys::{Document, Element, HtmlElement, ScrollBehavior, ScrollToOptions, Window};

use crate::dom::{self, listen, query};
use crate::error::Result;

const ANCHOR_SELECTOR: &str = "a[href^=\"#\"]";
const HEADER_SELECTOR: &str = "header";

/// In-page fragment worth scrolling to, exactly as written in `href`. A bare
/// `#` is left to the browser.
pub fn anchor_fragment(href: &str) -> Option<&str> {
    if href.len() > 1 && href.starts_with('#') {
        Some(href)
    } else {
        None
    }
}

/// Document-space scroll offset that puts the target just below a fixed
/// header.
pub fn scroll_destination(target_top: f64, scroll_y: f64, header_height: f64) -> f64 {
    target_top + scroll_y - header_height
}

fn smooth_scroll_to(window: &Window, document: &Document, target: &Element) {
    let header_height = query(document, HEADER_SELECTOR)
        .map(|header| header.offset_height() as f64)
        .unwrap_or(0.0);
    let top = scroll_destination(
        target.get_bounding_client_rect().top(),
        window.scroll_y().unwrap_or(0.0),
        header_height,
    );

    let options = ScrollToOptions::new();
    options.set_top(top);
    options.set_behavior(ScrollBehavior::Smooth);
    window.scroll_to_with_scroll_to_options(&options);
}

fn follow_anchor(window: &Window, document: &Document, link: &HtmlElement, event: &web_sys::Event) {
    let Some(href) = link.get_attribute("href") else {
        return;
    };
    let Some(fragment) = anchor_fragment(&href) else {
        return;
    };
    // Ids that are not valid selectors (`#1-intro`) fall through to the
    // browser's own jump.
    let Ok(Some(target)) = document.query_selector(fragment) else {
        return;
    };

    event.prevent_default();
    smooth_scroll_to(window, document, &target);

    match window.history() {
        Ok(history) => {
            if let Err(err) = history.push_state_with_url(&JsValue::NULL, "", Some(fragment)) {
                log::debug!("scroll: pushState failed: {}", dom::js_value_to_string(&err));
            }
        }
        Err(err) => log::debug!("scroll: no history: {}", dom::js_value_to_string(&err)),
    }
}

/// Returns the number of anchors wired.
pub fn install(window: &Window, document: &Document) -> Result<usize> {
    let links = dom::query_all(document, ANCHOR_SELECTOR);
    for link in &links {
        let window = window.clone();
        let document = document.clone();
        let target = link.clone();
        listen(link, "click", move |event| {
            follow_anchor(&window, &document, &target, &event);
        })?;
    }
    Ok(links.len())
}

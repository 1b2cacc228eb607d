use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, EventTarget, HtmlElement, Window};

use crate::error::{PageError, Result};

pub fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| PageError::missing("window"))
}

pub fn js_value_to_string(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

/// First element matching `selector`. Invalid selectors count as no match.
pub fn query(root: &Document, selector: &str) -> Option<HtmlElement> {
    root.query_selector(selector)
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
}

pub fn require(root: &Document, selector: &str) -> Result<HtmlElement> {
    query(root, selector).ok_or_else(|| PageError::missing(selector))
}

pub fn query_all(root: &Document, selector: &str) -> Vec<HtmlElement> {
    let Ok(list) = root.query_selector_all(selector) else {
        return Vec::new();
    };

    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .collect()
}

pub fn set_class(el: &Element, class: &str, on: bool) {
    let classes = el.class_list();
    let _ = if on {
        classes.add_1(class)
    } else {
        classes.remove_1(class)
    };
}

pub fn has_class(el: &Element, class: &str) -> bool {
    el.class_list().contains(class)
}

/// Registers `handler` for the lifetime of the page.
pub fn listen(
    target: &EventTarget,
    event_type: &str,
    handler: impl FnMut(Event) + 'static,
) -> Result<()> {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    target.add_event_listener_with_callback(event_type, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Runs `f` once after `delay_ms`; the returned handle can be passed to
/// [`clear_timeout`].
pub fn set_timeout(window: &Window, delay_ms: i32, f: impl FnOnce() + 'static) -> Result<i32> {
    let callback = Closure::once_into_js(f);
    Ok(window.set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.unchecked_ref(),
        delay_ms,
    )?)
}

pub fn clear_timeout(window: &Window, handle: i32) {
    window.clear_timeout_with_handle(handle);
}

/// True when the event was dispatched on `el` itself rather than a descendant.
pub fn targets_self(event: &Event, el: &Element) -> bool {
    event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok())
        .is_some_and(|target| &target == el)
}

/// `flag` is a full `key=value` pair, e.g. `noanim=1`.
pub fn query_flag(window: &Window, flag: &str) -> bool {
    let search = window.location().search().unwrap_or_default();
    search_has_flag(&search, flag)
}

fn search_has_flag(search: &str, flag: &str) -> bool {
    search
        .trim_start_matches('?')
        .split('&')
        .any(|pair| pair == flag)
}

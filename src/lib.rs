use std::cell::RefCell;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Window};

pub mod config;
pub mod contact;
pub mod dom;
pub mod error;
pub mod frame_loop;
pub mod menu;
pub mod modal;
pub mod motion;
pub mod projects;
pub mod reveal;
pub mod scroll;
pub mod walker;

use crate::config::PageConfig;
use crate::error::{PageError, Result};
use crate::frame_loop::FrameLoop;

thread_local! {
    static AVATAR_LOOP: RefCell<Option<FrameLoop>> = const { RefCell::new(None) };
}

fn set_page_status(document: &Document, status: &str) {
    if let Some(el) = document.document_element() {
        let _ = el.set_attribute("data-page-status", status);
    }
}

fn report(feature: &str, result: Result<()>) {
    if let Err(err) = result {
        log::warn!("{}: disabled ({})", feature, err);
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    let level = match web_sys::window() {
        Some(win) if dom::query_flag(&win, "debug=1") => log::Level::Debug,
        _ => log::Level::Info,
    };
    let _ = console_log::init_with_level(level);

    if let Err(err) = start_when_ready() {
        let message = format!("fatal: {}", err);
        if let Some(doc) = web_sys::window().and_then(|win| win.document()) {
            set_page_status(&doc, "error");
        }
        web_sys::console::error_1(&JsValue::from_str(&message));
    }
}

fn start_when_ready() -> Result<()> {
    let window = dom::window()?;
    let document = window
        .document()
        .ok_or_else(|| PageError::missing("document"))?;

    if document.ready_state() != "loading" {
        return start_impl(&window, &document);
    }

    let (win, doc) = (window.clone(), document.clone());
    let ready = Closure::once(move || {
        if let Err(err) = start_impl(&win, &doc) {
            set_page_status(&doc, "error");
            log::error!("fatal: {}", err);
        }
    });
    document
        .add_event_listener_with_callback("DOMContentLoaded", ready.as_ref().unchecked_ref())?;
    ready.forget();
    Ok(())
}

fn start_impl(window: &Window, document: &Document) -> Result<()> {
    let config = PageConfig::load(document);

    // Every behavior stands alone: a page without a menu or without the
    // avatar keeps everything else.
    match walker::mount(window, document, config.motion) {
        Ok(Some(frames)) => AVATAR_LOOP.with(|slot| *slot.borrow_mut() = Some(frames)),
        Ok(None) => {}
        Err(err) => log::warn!("avatar: disabled ({})", err),
    }

    report(
        "scroll",
        scroll::install(window, document).map(|count| log::debug!("scroll: {} anchors", count)),
    );
    report(
        "contact",
        contact::install(window, document, &config).map(|_| ()),
    );
    report("menu", menu::install(document).map(|_| ()));
    report(
        "reveal",
        reveal::install(window, document, config.reveal_delays(), config.home_threshold),
    );
    report(
        "projects",
        projects::install(window, document, &config.projects_url),
    );

    set_page_status(document, "ready");
    log::info!("portfolio page ready");
    Ok(())
}

/// Stops the avatar animation; the avatar stays where it is.
#[wasm_bindgen]
pub fn stop_avatar() {
    AVATAR_LOOP.with(|slot| {
        if let Some(frames) = slot.borrow_mut().take() {
            frames.stop();
        }
    });
}

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Array;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, Window};

use crate::dom::{clear_timeout, query, require, set_class, set_timeout};
use crate::error::Result;

const HOME_SELECTOR: &str = "#home";
const MENU_SELECTOR: &str = ".menu";
const GET_IN_TOUCH_SELECTOR: &str = ".get-in-touch-btn";

pub const SHOW_MENU_CLASS: &str = "show-menu";
pub const FIXED_CLASS: &str = "fixed";
pub const SHOW_BUTTON_CLASS: &str = "show-btn";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RevealDelays {
    pub reveal_ms: i32,
    pub show_ms: i32,
    pub hide_ms: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FixedButton {
    Menu,
    GetInTouch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClassChange {
    /// Milliseconds after the visibility change.
    pub at_ms: i32,
    pub button: FixedButton,
    pub class: &'static str,
    pub add: bool,
}

/// Class changes for the fixed buttons when `#home` scrolls into or out of
/// view, sorted by time.
///
/// Leaving home slides the buttons in after a short pause, and the
/// get-in-touch button is pinned (`fixed`) one beat before it becomes
/// visible so the CSS transition has a start state. Coming back hides both
/// at once and unpins only after the hide transition has played.
pub fn reveal_plan(home_visible: bool, delays: RevealDelays) -> Vec<ClassChange> {
    let change = |at_ms, button, class, add| ClassChange {
        at_ms,
        button,
        class,
        add,
    };

    if home_visible {
        vec![
            change(0, FixedButton::Menu, SHOW_MENU_CLASS, false),
            change(0, FixedButton::GetInTouch, SHOW_BUTTON_CLASS, false),
            change(delays.hide_ms, FixedButton::GetInTouch, FIXED_CLASS, false),
        ]
    } else {
        vec![
            change(delays.reveal_ms, FixedButton::Menu, SHOW_MENU_CLASS, true),
            change(delays.reveal_ms, FixedButton::GetInTouch, FIXED_CLASS, true),
            change(
                delays.reveal_ms.saturating_add(delays.show_ms),
                FixedButton::GetInTouch,
                SHOW_BUTTON_CLASS,
                true,
            ),
        ]
    }
}

/// Applies [`reveal_plan`] to the menu and get-in-touch buttons. Either
/// button may be absent.
pub struct FixedButtons {
    window: Window,
    menu: Option<HtmlElement>,
    get_in_touch: Option<HtmlElement>,
    delays: RevealDelays,
    pending: Vec<i32>,
}

impl FixedButtons {
    pub fn new(
        window: &Window,
        menu: Option<HtmlElement>,
        get_in_touch: Option<HtmlElement>,
        delays: RevealDelays,
    ) -> Self {
        Self {
            window: window.clone(),
            menu,
            get_in_touch,
            delays,
            pending: Vec::new(),
        }
    }

    fn element(&self, button: FixedButton) -> Option<&HtmlElement> {
        match button {
            FixedButton::Menu => self.menu.as_ref(),
            FixedButton::GetInTouch => self.get_in_touch.as_ref(),
        }
    }

    pub fn on_home_visibility(&mut self, visible: bool) {
        // A quick scroll back and forth must not let an older schedule
        // re-apply its classes after the newer one.
        for handle in self.pending.drain(..) {
            clear_timeout(&self.window, handle);
        }

        for step in reveal_plan(visible, self.delays) {
            let Some(el) = self.element(step.button).cloned() else {
                continue;
            };
            if step.at_ms <= 0 {
                set_class(&el, step.class, step.add);
                continue;
            }
            match set_timeout(&self.window, step.at_ms, move || {
                set_class(&el, step.class, step.add)
            }) {
                Ok(handle) => self.pending.push(handle),
                Err(err) => log::warn!("reveal: timer failed: {}", err),
            }
        }
    }
}

pub fn install(window: &Window, document: &Document, delays: RevealDelays, threshold: f64) -> Result<()> {
    let home = require(document, HOME_SELECTOR)?;
    let buttons = FixedButtons::new(
        window,
        query(document, MENU_SELECTOR),
        query(document, GET_IN_TOUCH_SELECTOR),
        delays,
    );
    if buttons.menu.is_none() && buttons.get_in_touch.is_none() {
        log::debug!("reveal: no fixed buttons on this page");
    }
    let buttons = Rc::new(RefCell::new(buttons));

    let on_intersect = Closure::wrap(Box::new(move |entries: Array| {
        for entry in entries.iter() {
            let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                continue;
            };
            let visible = entry.is_intersecting();
            log::debug!("reveal: home intersecting={}", visible);
            buttons.borrow_mut().on_home_visibility(visible);
        }
    }) as Box<dyn FnMut(Array)>);

    let options = IntersectionObserverInit::new();
    options.set_threshold(&JsValue::from_f64(threshold));
    let observer =
        IntersectionObserver::new_with_options(on_intersect.as_ref().unchecked_ref(), &options)?;
    observer.observe(&home);
    on_intersect.forget();
    Ok(())
}

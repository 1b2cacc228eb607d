use web_sys::{Document, EventTarget, HtmlElement};

use crate::dom::{has_class, js_value_to_string, listen, set_class, targets_self};
use crate::error::Result;

pub const ACTIVE_CLASS: &str = "active";

/// How the page body scrolls while an overlay is open or after it closes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyScroll {
    Locked,
    /// Inline overflow cleared, stylesheet decides.
    Restored,
    /// Horizontal overflow stays hidden.
    VerticalOnly,
}

impl BodyScroll {
    /// Inline style edits, in order. `None` removes the property.
    pub fn style_updates(self) -> &'static [(&'static str, Option<&'static str>)] {
        match self {
            BodyScroll::Locked => &[("overflow", Some("hidden"))],
            BodyScroll::Restored => &[("overflow", None)],
            BodyScroll::VerticalOnly => &[("overflow", Some("hidden")), ("overflow-y", Some("auto"))],
        }
    }

    pub fn apply(self, document: &Document) {
        let Some(body) = document.body() else {
            return;
        };
        let style = body.style();
        for (property, value) in self.style_updates() {
            let applied = match value {
                Some(value) => style.set_property(property, value),
                None => style.remove_property(property).map(|_| ()),
            };
            if let Err(err) = applied {
                log::debug!("body {}: {}", property, js_value_to_string(&err));
            }
        }
    }
}

#[derive(Clone)]
pub struct Overlay {
    el: HtmlElement,
    document: Document,
    release: BodyScroll,
}

impl Overlay {
    pub fn new(document: &Document, el: HtmlElement, release: BodyScroll) -> Self {
        Self {
            el,
            document: document.clone(),
            release,
        }
    }

    pub fn element(&self) -> &HtmlElement {
        &self.el
    }

    pub fn is_open(&self) -> bool {
        has_class(&self.el, ACTIVE_CLASS)
    }

    pub fn open(&self) {
        set_class(&self.el, ACTIVE_CLASS, true);
        BodyScroll::Locked.apply(&self.document);
    }

    pub fn close(&self) {
        set_class(&self.el, ACTIVE_CLASS, false);
        self.release.apply(&self.document);
    }

    pub fn open_on_click(&self, trigger: &EventTarget) -> Result<()> {
        let overlay = self.clone();
        listen(trigger, "click", move |_event| overlay.open())
    }

    pub fn close_on_click(&self, trigger: &EventTarget) -> Result<()> {
        let overlay = self.clone();
        listen(trigger, "click", move |_event| overlay.close())
    }

    /// Clicks on the dimmed backdrop close the overlay; clicks inside the
    /// dialog bubble up with a different target and are ignored.
    pub fn close_on_backdrop(&self) -> Result<()> {
        let overlay = self.clone();
        listen(&self.el, "click", move |event| {
            if targets_self(&event, overlay.element()) {
                overlay.close();
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::BodyScroll;

    #[test]
    fn locking_hides_overflow() {
        assert_eq!(BodyScroll::Locked.style_updates(), &[("overflow", Some("hidden"))]);
    }

    #[test]
    fn restoring_clears_inline_overflow() {
        assert_eq!(BodyScroll::Restored.style_updates(), &[("overflow", None)]);
    }

    #[test]
    fn vertical_only_sets_overflow_y_after_the_shorthand() {
        let updates = BodyScroll::VerticalOnly.style_updates();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0], ("overflow", Some("hidden")));
        assert_eq!(updates[1], ("overflow-y", Some("auto")));
    }
}

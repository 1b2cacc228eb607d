use web_sys::Document;

use crate::dom::{query, query_all, require};
use crate::error::Result;
use crate::modal::{BodyScroll, Overlay};

pub const OVERLAY_SELECTOR: &str = ".menu-modal-overlay";
const OPEN_SELECTOR: &str = ".menu";
const CLOSE_SELECTOR: &str = ".close-menu";
const LINK_SELECTOR: &str = ".menu-link";

/// Slide-out navigation. Closing keeps horizontal overflow hidden so the
/// off-canvas panel never produces a horizontal scrollbar.
pub fn install(document: &Document) -> Result<Overlay> {
    let overlay = Overlay::new(document, require(document, OVERLAY_SELECTOR)?, BodyScroll::VerticalOnly);

    match query(document, OPEN_SELECTOR) {
        Some(open) => overlay.open_on_click(&open)?,
        None => log::warn!("menu: {} missing, menu cannot be opened", OPEN_SELECTOR),
    }
    if let Some(close) = query(document, CLOSE_SELECTOR) {
        overlay.close_on_click(&close)?;
    }

    let links = query_all(document, LINK_SELECTOR);
    for link in &links {
        overlay.close_on_click(link)?;
    }
    overlay.close_on_backdrop()?;

    log::debug!("menu: wired with {} links", links.len());
    Ok(overlay)
}

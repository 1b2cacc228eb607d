use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::dom::window;
use crate::error::Result;

/// Calls a step function once per animation frame until it returns `false`
/// or the loop is stopped. At most one frame request is outstanding at a
/// time, and dropping the handle cancels it.
pub struct FrameLoop {
    inner: Rc<Inner>,
}

struct Inner {
    handle: Cell<Option<i32>>,
    stopped: Cell<bool>,
    callback: RefCell<Option<Closure<dyn FnMut(f64)>>>,
}

impl Inner {
    fn request(&self) -> Result<()> {
        if self.stopped.get() {
            return Ok(());
        }
        let callback = self.callback.borrow();
        let Some(cb) = callback.as_ref() else {
            return Ok(());
        };

        let id = window()?.request_animation_frame(cb.as_ref().unchecked_ref())?;
        self.handle.set(Some(id));
        Ok(())
    }

    fn cancel(&self) {
        if let Some(id) = self.handle.take() {
            if let Ok(win) = window() {
                let _ = win.cancel_animation_frame(id);
            }
        }
    }
}

impl FrameLoop {
    pub fn start(mut step: impl FnMut(f64) -> bool + 'static) -> Result<Self> {
        let inner = Rc::new(Inner {
            handle: Cell::new(None),
            stopped: Cell::new(false),
            callback: RefCell::new(None),
        });

        let weak: Weak<Inner> = Rc::downgrade(&inner);
        let cb = Closure::wrap(Box::new(move |ts: f64| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.handle.set(None);

            if !step(ts) {
                log::debug!("frame loop finished");
                return;
            }
            if let Err(err) = inner.request() {
                log::warn!("frame loop stalled: {}", err);
            }
        }) as Box<dyn FnMut(f64)>);

        *inner.callback.borrow_mut() = Some(cb);
        inner.request()?;
        Ok(Self { inner })
    }

    /// Cancels the pending frame. The step function is kept until the handle
    /// is dropped, so stopping from inside a step is safe.
    pub fn stop(&self) {
        self.inner.stopped.set(true);
        self.inner.cancel();
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
        self.inner.callback.borrow_mut().take();
    }
}

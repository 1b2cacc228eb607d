use std::cell::RefCell;
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use web_sys::{Document, Element, HtmlElement, Window};

use crate::dom::{js_value_to_string, query_flag, require};
use crate::error::Result;
use crate::frame_loop::FrameLoop;
use crate::motion::{self, Bounds, MotionParams, MotionState, RenderInstruction};

pub const AVATAR_SELECTOR: &str = ".avatar";
pub const CONTAINER_SELECTOR: &str = ".middle";
const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

pub struct AvatarWalker {
    avatar: HtmlElement,
    container: HtmlElement,
    state: MotionState,
    params: MotionParams,
    rng: SmallRng,
}

impl AvatarWalker {
    pub fn new(document: &Document, params: MotionParams, mut rng: SmallRng) -> Result<Self> {
        let avatar = require(document, AVATAR_SELECTOR)?;
        let container = require(document, CONTAINER_SELECTOR)?;
        let state = MotionState::new(measure(&container, &avatar), &mut rng);

        Ok(Self {
            avatar,
            container,
            state,
            params,
            rng,
        })
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    pub fn step(&mut self) -> RenderInstruction {
        let avatar = &self.avatar;
        let container = &self.container;

        let (next, instruction) = motion::tick(self.state, &self.params, &mut self.rng, || {
            measure(container, avatar)
        });
        self.state = next;
        if let Err(err) = avatar
            .style()
            .set_property("transform", &instruction.css_transform())
        {
            log::debug!("walker: transform rejected: {}", js_value_to_string(&err));
        }
        instruction
    }
}

// Layout read; only done when the walker needs a new target.
fn measure(container: &Element, avatar: &HtmlElement) -> Bounds {
    let rect = container.get_bounding_client_rect();
    Bounds::new(rect.width(), rect.height(), avatar.offset_width() as f64)
}

pub fn seeded_rng() -> SmallRng {
    let noise = (js_sys::Math::random() * u32::MAX as f64) as u64;
    let now = js_sys::Date::now() as u64;
    SmallRng::seed_from_u64((noise << 32) ^ now)
}

fn prefers_reduced_motion(window: &Window) -> bool {
    window
        .match_media(REDUCED_MOTION_QUERY)
        .ok()
        .flatten()
        .is_some_and(|list| list.matches())
}

/// Starts the avatar loop. `Ok(None)` means animation is turned off for this
/// visit; a missing avatar or container is reported as an error and nothing
/// is scheduled.
pub fn mount(window: &Window, document: &Document, params: MotionParams) -> Result<Option<FrameLoop>> {
    if query_flag(window, "noanim=1") {
        log::info!("avatar: disabled via noanim=1");
        return Ok(None);
    }
    if prefers_reduced_motion(window) {
        log::info!("avatar: disabled, reduced motion requested");
        return Ok(None);
    }

    let walker = AvatarWalker::new(document, params, seeded_rng())?;
    log::debug!("avatar: starting at {:?}", walker.state().position);

    let walker = Rc::new(RefCell::new(walker));
    let frames = FrameLoop::start(move |_ts| {
        walker.borrow_mut().step();
        true
    })?;
    Ok(Some(frames))
}

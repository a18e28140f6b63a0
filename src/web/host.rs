use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use wasm_bindgen::prelude::*;
use web_sys::Window;

use crate::error::ScrollweaveError;
use crate::lifecycle::{EventHost, ListenerId, ListenerKind, StageEvent};
use crate::util::frame_timing::FrameClock;

type Queue = Rc<RefCell<VecDeque<StageEvent>>>;
type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Longest frame delta forwarded; a tab returning from the background
/// reports one huge frame.
const MAX_FRAME_MS: f64 = 250.0;

enum Listener {
    Dom {
        event: &'static str,
        callback: Closure<dyn FnMut()>,
    },
    Frame {
        active: Rc<Cell<bool>>,
        request: Rc<Cell<i32>>,
        callback: FrameCallback,
    },
}

/// Event host over the browser window.
///
/// DOM callbacks only enqueue [`StageEvent`]s; the owner drains the queue
/// and dispatches them, so no callback ever re-enters the orchestrator.
pub struct WindowHost {
    window: Window,
    queue: Queue,
    listeners: FxHashMap<ListenerId, Listener>,
    next_id: u64,
}

impl WindowHost {
    /// Host bound to `window`.
    #[must_use]
    pub fn new(window: Window) -> Self {
        Self {
            window,
            queue: Rc::new(RefCell::new(VecDeque::new())),
            listeners: FxHashMap::default(),
            next_id: 0,
        }
    }

    /// Take every event queued since the last drain.
    pub fn drain(&self) -> Vec<StageEvent> {
        self.queue.borrow_mut().drain(..).collect()
    }

    /// Queue an event from outside the DOM (notification buttons).
    pub fn push(&self, event: StageEvent) {
        self.queue.borrow_mut().push_back(event);
    }

    fn dom_listener(
        &self,
        event: &'static str,
        stage_event: StageEvent,
    ) -> Result<Listener, ScrollweaveError> {
        let queue = Rc::clone(&self.queue);
        let callback = Closure::<dyn FnMut()>::new(move || {
            queue.borrow_mut().push_back(stage_event.clone());
        });
        self.window
            .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
            .map_err(|e| ScrollweaveError::Listener(format!("{event}: {e:?}")))?;
        Ok(Listener::Dom { event, callback })
    }

    fn frame_listener(&self) -> Result<Listener, ScrollweaveError> {
        let active = Rc::new(Cell::new(true));
        let request = Rc::new(Cell::new(0));
        let callback: FrameCallback = Rc::new(RefCell::new(None));

        let queue = Rc::clone(&self.queue);
        let window = self.window.clone();
        let (loop_active, loop_request, loop_callback) =
            (Rc::clone(&active), Rc::clone(&request), Rc::clone(&callback));
        let mut clock = FrameClock::new(MAX_FRAME_MS);
        *callback.borrow_mut() = Some(Closure::<dyn FnMut(f64)>::new(move |_now: f64| {
            if !loop_active.get() {
                return;
            }
            let delta_ms = clock.tick();
            queue.borrow_mut().push_back(StageEvent::Frame { delta_ms });
            if let Some(next) = loop_callback.borrow().as_ref() {
                if let Ok(id) = window.request_animation_frame(next.as_ref().unchecked_ref()) {
                    loop_request.set(id);
                }
            }
        }));

        let first = callback
            .borrow()
            .as_ref()
            .map(|cb| self.window.request_animation_frame(cb.as_ref().unchecked_ref()));
        match first {
            Some(Ok(id)) => request.set(id),
            _ => {
                return Err(ScrollweaveError::Listener(
                    "requestAnimationFrame unavailable".to_owned(),
                ))
            }
        }
        Ok(Listener::Frame {
            active,
            request,
            callback,
        })
    }
}

impl EventHost for WindowHost {
    fn attach(&mut self, kind: ListenerKind) -> Result<ListenerId, ScrollweaveError> {
        let listener = match kind {
            ListenerKind::Scroll => self.dom_listener("scroll", StageEvent::Scroll)?,
            ListenerKind::Resize => self.dom_listener("resize", StageEvent::Resize)?,
            ListenerKind::Frame => self.frame_listener()?,
        };
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        let _ = self.listeners.insert(id, listener);
        Ok(id)
    }

    fn detach(&mut self, id: ListenerId) {
        match self.listeners.remove(&id) {
            Some(Listener::Dom { event, callback }) => {
                let _ = self
                    .window
                    .remove_event_listener_with_callback(event, callback.as_ref().unchecked_ref());
            }
            Some(Listener::Frame {
                active,
                request,
                callback,
            }) => {
                active.set(false);
                let _ = self.window.cancel_animation_frame(request.get());
                // Break the closure's reference to itself.
                let _ = callback.borrow_mut().take();
            }
            None => {}
        }
    }
}

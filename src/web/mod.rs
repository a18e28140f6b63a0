//! Browser bindings (feature `web`).
//!
//! [`DomLayout`], [`StyleSink`] and [`WindowHost`] implement the
//! orchestrator's collaborator traits over `web-sys`. [`WebStage`] wires
//! them to a [`LifecycleManager`] and is exported to JavaScript; the page
//! calls `pump()` once per animation frame.

mod host;
mod layout;
mod scope;
mod style;

pub use host::WindowHost;
pub use layout::DomLayout;
pub use scope::DomScope;
pub use style::StyleSink;
use wasm_bindgen::prelude::*;

use crate::lifecycle::{ContextHandle, LifecycleManager, PageSpec, StageEvent};
use crate::options::Options;

fn js_error(message: &str) -> JsValue {
    JsValue::from_str(message)
}

/// Route `log` output to the browser console and panics to
/// `console.error`.
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

/// One mounted page driven by the browser.
#[wasm_bindgen]
pub struct WebStage {
    manager: LifecycleManager,
    host: WindowHost,
    layout: DomLayout,
    sink: StyleSink,
    handle: Option<ContextHandle>,
}

#[wasm_bindgen]
impl WebStage {
    /// Mount a page declared in TOML (`page_toml`) with options TOML. An
    /// empty page string mounts the reference landing page; empty options
    /// use the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(page_toml: &str, options_toml: &str) -> Result<WebStage, JsValue> {
        let window = web_sys::window().ok_or_else(|| js_error("no global window"))?;
        let document = window.document().ok_or_else(|| js_error("no document"))?;

        let page = if page_toml.trim().is_empty() {
            PageSpec::landing()
        } else {
            PageSpec::from_toml(page_toml)
        }
        .map_err(|e| js_error(&e.to_string()))?;
        let options = if options_toml.trim().is_empty() {
            Ok(Options::default())
        } else {
            Options::from_toml(options_toml)
        }
        .map_err(|e| js_error(&e.to_string()))?;

        let mut manager = LifecycleManager::new(options);
        let mut host = WindowHost::new(window.clone());
        let scope = DomScope::new(document, page.container.clone());
        let layout = DomLayout::new(window, scope.clone());
        let mut sink = StyleSink::new(scope);
        let handle = manager
            .mount(&page, &layout, &mut host, &mut sink)
            .map_err(|e| js_error(&e.to_string()))?;

        Ok(Self {
            manager,
            host,
            layout,
            sink,
            handle: Some(handle),
        })
    }

    /// Dispatch every queued DOM event. Returns the number dispatched.
    pub fn pump(&mut self) -> usize {
        let Some(handle) = self.handle else {
            return 0;
        };
        let events = self.host.drain();
        let count = events.len();
        for event in events {
            let _ = self
                .manager
                .dispatch(handle, event, &self.layout, &mut self.sink);
        }
        count
    }

    /// Show a notification; the configured default text when `message` is
    /// absent.
    pub fn toast(&self, message: Option<String>) {
        self.host.push(StageEvent::ToastRequest { message });
    }

    /// Hide the notification.
    #[wasm_bindgen(js_name = dismissToast)]
    pub fn dismiss_toast(&self) {
        self.host.push(StageEvent::ToastDismiss);
    }

    /// Tear the page down and restore every animated style.
    pub fn unmount(&mut self) -> bool {
        let Some(handle) = self.handle.take() else {
            return false;
        };
        let _ = self.host.drain();
        self.manager.unmount(handle, &mut self.host, &mut self.sink)
    }
}

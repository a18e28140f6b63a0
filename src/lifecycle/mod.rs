//! Page lifecycle: mount a declared page, feed it events, tear it down.
//!
//! Each mounted page is a [`PageContext`] owned by the
//! [`LifecycleManager`] and addressed by a [`ContextHandle`]. Every event
//! runs the same pipeline:
//!
//! 1. take one [`ViewportMetrics`](crate::viewport::ViewportMetrics)
//!    snapshot,
//! 2. recompile timelines whose stagger groups changed size,
//! 3. update every binding and pin from the snapshot,
//! 4. only then write values to the [`PropertySink`].
//!
//! Events addressed to a handle that is no longer mounted are dropped
//! silently, so a scroll racing a teardown is harmless.

mod host;
mod page;

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};

pub use host::{EventHost, ListenerId, ListenerKind, MountScope, RecordingHost};
pub use page::{BindingSpec, PageSpec, PinSpec, PIN_REGION_PREFIX};

use crate::error::ScrollweaveError;
use crate::options::{Options, TimingOptions};
use crate::pin::PinningEngine;
use crate::timeline::{
    AnimationTimeline, PlaybackState, PropertySink, PropertyValue, ScrubFollower, TargetKey,
    TimelineScheduler, TimelineSpec,
};
use crate::toast::ToastSlot;
use crate::trigger::{
    BindingId, DrivingMode, TriggerEvent, TriggerPhase, TriggerRegistry,
};
use crate::viewport::{measure, LayoutSource};

/// Handle of a mounted page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextHandle(u32);

impl fmt::Display for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page#{}", self.0)
    }
}

/// Input to [`LifecycleManager::dispatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum StageEvent {
    /// The page scrolled.
    Scroll,
    /// The viewport changed size; boundaries are re-resolved.
    Resize,
    /// An animation frame elapsed.
    Frame {
        /// Time since the previous frame.
        delta_ms: f64,
    },
    /// Show a notification.
    ToastRequest {
        /// Text; the configured default when absent.
        message: Option<String>,
    },
    /// Hide the notification.
    ToastDismiss,
}

/// Runtime state of one mounted page.
#[derive(Debug)]
pub struct PageContext {
    registry: TriggerRegistry,
    scheduler: TimelineScheduler,
    /// Declarations kept for recompiling once more elements mount.
    timeline_specs: Vec<TimelineSpec>,
    /// Group sizes each timeline was last compiled with.
    group_sizes: Vec<Vec<usize>>,
    timing: TimingOptions,
    pins: PinningEngine,
    toast: ToastSlot,
    /// Bindings in declaration order.
    bindings: Vec<BindingId>,
    pin_bindings: FxHashMap<String, BindingId>,
    followers: FxHashMap<BindingId, ScrubFollower>,
    listeners: Vec<ListenerId>,
    clock_ms: f64,
    hold_property: String,
    scrub_epsilon: f64,
}

impl PageContext {
    /// Region bindings and their progress.
    #[must_use]
    pub fn registry(&self) -> &TriggerRegistry {
        &self.registry
    }

    /// Compiled timelines and their playback state.
    #[must_use]
    pub fn scheduler(&self) -> &TimelineScheduler {
        &self.scheduler
    }

    /// Pin states.
    #[must_use]
    pub fn pins(&self) -> &PinningEngine {
        &self.pins
    }

    /// Notification slot.
    #[must_use]
    pub fn toast(&self) -> &ToastSlot {
        &self.toast
    }

    /// Binding created for the `index`-th declared binding.
    #[must_use]
    pub fn binding(&self, index: usize) -> Option<BindingId> {
        self.bindings.get(index).copied()
    }

    /// Binding tracking the pin with id `pin`.
    #[must_use]
    pub fn pin_binding(&self, pin: &str) -> Option<BindingId> {
        self.pin_bindings.get(pin).copied()
    }

    /// Time accumulated from frame events.
    #[must_use]
    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    /// Listeners owned by this page.
    #[must_use]
    pub fn listeners(&self) -> &[ListenerId] {
        &self.listeners
    }

    fn build(
        page: &PageSpec,
        layout: &dyn LayoutSource,
        options: &Options,
    ) -> Result<Self, ScrollweaveError> {
        page.validate()?;

        let mut scheduler = TimelineScheduler::new();
        let mut group_sizes = Vec::with_capacity(page.timelines.len());
        for spec in &page.timelines {
            group_sizes.push(spec.group_sizes(layout));
            scheduler.define(spec.compile(layout, &options.timing)?);
        }

        let mut registry = TriggerRegistry::new();
        for region in &page.regions {
            registry.define_region(region.clone());
        }

        // Pin regions first: declared bindings may drive a timeline from a
        // pin's progress.
        let mut pins = PinningEngine::new();
        let mut pin_bindings = FxHashMap::default();
        for pin in &page.pins {
            let region = pin.region();
            let region_id = region.id.clone();
            registry.define_region(region);
            let id = registry.register(&region_id, &region_id, DrivingMode::Scrub)?;
            if layout.target_count(pin.target()) == 0 {
                log::warn!("pin '{}': no element matches '{}'", pin.id, pin.target());
            }
            pins.register(id, TargetKey::new(pin.target(), 0), pin.distance);
            let _ = pin_bindings.insert(pin.id.clone(), id);
        }

        let mut bindings = Vec::with_capacity(page.bindings.len());
        let mut followers = FxHashMap::default();
        for spec in &page.bindings {
            let id = registry.register_with_lag(
                &spec.region,
                &spec.timeline,
                spec.driving,
                spec.scrub_lag_ms,
            )?;
            if spec.driving == DrivingMode::Scrub && spec.scrub_lag_ms > 0.0 {
                let _ = followers.insert(id, ScrubFollower::new(spec.scrub_lag_ms, 0.0));
            }
            bindings.push(id);
        }

        Ok(Self {
            registry,
            scheduler,
            timeline_specs: page.timelines.clone(),
            group_sizes,
            timing: options.timing.clone(),
            pins,
            toast: ToastSlot::new(&options.toast),
            bindings,
            pin_bindings,
            followers,
            listeners: Vec::new(),
            clock_ms: 0.0,
            hold_property: options.pin.hold_property.clone(),
            scrub_epsilon: options.timing.scrub_epsilon,
        })
    }

    fn is_pin(&self, id: BindingId) -> bool {
        self.pin_bindings.values().any(|&pin| pin == id)
    }

    /// Metrics pass shared by scroll, resize and mount.
    fn pass(
        &mut self,
        layout: &dyn LayoutSource,
        sink: &mut dyn PropertySink,
        full_resolve: bool,
    ) {
        let metrics = measure(layout);
        if !metrics.is_ready() {
            log::trace!("layout not ready, skipping pass");
            return;
        }

        // Bindings that were inert before this pass get a first render;
        // the rest keep their followers and playback.
        let pending: FxHashSet<BindingId> = self
            .registry
            .bindings()
            .map(|b| b.id)
            .filter(|&id| self.registry.resolved(id).is_none())
            .collect();
        if full_resolve {
            self.registry.resolve(&metrics, layout);
        } else {
            self.registry.resolve_pending(&metrics, layout);
        }
        let recompiled = if full_resolve || !pending.is_empty() {
            self.recompile_grown(layout)
        } else {
            FxHashSet::default()
        };
        for id in self.pin_bindings.values() {
            let start = self.registry.resolved(*id).map(|r| r.start);
            let _ = self.pins.resolve(*id, start);
        }

        // Every binding and pin moves before anything is written.
        let events = self.registry.on_metrics_update(&metrics);
        let pin_updates = self.pins.update(metrics.scroll_y);

        for event in &events {
            self.apply(event, sink);
        }
        for &id in &pending {
            self.render_initial(id, sink);
        }
        let stale: Vec<BindingId> = self
            .registry
            .bindings()
            .filter(|b| recompiled.contains(&b.timeline) && !pending.contains(&b.id))
            .map(|b| b.id)
            .collect();
        for id in stale {
            self.rerender(id, sink);
        }
        for update in pin_updates {
            sink.write(
                &update.target,
                &self.hold_property,
                PropertyValue::Scalar(update.state.hold_offset),
            );
        }
    }

    /// Recompile every timeline whose stagger groups changed size since it
    /// was last compiled. Returns the ids of the recompiled timelines.
    fn recompile_grown(&mut self, layout: &dyn LayoutSource) -> FxHashSet<String> {
        let mut recompiled = FxHashSet::default();
        for (spec, sizes) in self.timeline_specs.iter().zip(&mut self.group_sizes) {
            let current = spec.group_sizes(layout);
            if current == *sizes {
                continue;
            }
            match spec.compile(layout, &self.timing) {
                Ok(timeline) => {
                    let _ = self.scheduler.recompile(timeline);
                    *sizes = current;
                    let _ = recompiled.insert(spec.id.clone());
                }
                Err(e) => log::warn!("timeline '{}': {e}", spec.id),
            }
        }
        recompiled
    }

    fn apply(&mut self, event: &TriggerEvent, sink: &mut dyn PropertySink) {
        if self.is_pin(event.binding) {
            return;
        }
        let Some(timeline) = self
            .registry
            .binding(event.binding)
            .map(|b| b.timeline.clone())
        else {
            return;
        };

        match event.driving {
            DrivingMode::Scrub => {
                if let Some(follower) = self.followers.get_mut(&event.binding) {
                    follower.set_target(event.progress);
                } else {
                    let _ = self.scheduler.advance(&timeline, event.progress, sink);
                }
            }
            DrivingMode::OnceOnEnter => {
                if event.latched_now {
                    let _ = self.scheduler.play(&timeline);
                }
            }
            DrivingMode::Loop => match event.phase {
                TriggerPhase::Enter | TriggerPhase::Update => {
                    if !self.scheduler.resume(&timeline)
                        && self.scheduler.state(&timeline)
                            != Some(PlaybackState::Playing)
                    {
                        let _ = self.scheduler.play(&timeline);
                    }
                }
                TriggerPhase::Exit => {
                    let _ = self.scheduler.pause(&timeline);
                }
            },
        }
    }

    /// First render of a binding whose boundaries were just resolved.
    fn render_initial(&mut self, id: BindingId, sink: &mut dyn PropertySink) {
        if self.is_pin(id) {
            return;
        }
        let (Some(binding), Some(progress)) =
            (self.registry.binding(id), self.registry.progress(id))
        else {
            return;
        };
        if self.registry.resolved(id).is_none() {
            return;
        }
        let timeline = binding.timeline.clone();
        match binding.driving {
            DrivingMode::Scrub => {
                if let Some(follower) = self.followers.get_mut(&id) {
                    *follower = ScrubFollower::new(binding.scrub_lag_ms, progress);
                }
                let _ = self.scheduler.advance(&timeline, progress, sink);
            }
            DrivingMode::OnceOnEnter => {
                if self.scheduler.state(&timeline) == Some(PlaybackState::Idle) {
                    let _ = self.scheduler.advance(&timeline, 0.0, sink);
                }
            }
            DrivingMode::Loop => {}
        }
    }

    /// Write a recompiled timeline at the binding's current position.
    fn rerender(&mut self, id: BindingId, sink: &mut dyn PropertySink) {
        if self.is_pin(id) || self.registry.resolved(id).is_none() {
            return;
        }
        let (Some(binding), Some(progress)) =
            (self.registry.binding(id), self.registry.progress(id))
        else {
            return;
        };
        match binding.driving {
            DrivingMode::Scrub => {
                let progress = self
                    .followers
                    .get(&id)
                    .map_or(progress, ScrubFollower::current);
                let _ = self.scheduler.advance(&binding.timeline, progress, sink);
            }
            DrivingMode::OnceOnEnter => {
                if self.scheduler.state(&binding.timeline) == Some(PlaybackState::Idle) {
                    let _ = self.scheduler.advance(&binding.timeline, 0.0, sink);
                }
            }
            DrivingMode::Loop => {}
        }
    }

    fn frame(&mut self, delta_ms: f64, sink: &mut dyn PropertySink) {
        let delta_ms = delta_ms.max(0.0);
        self.clock_ms += delta_ms;
        if let Some(change) = self.toast.tick(self.clock_ms) {
            log::debug!("toast expired: {change:?}");
        }

        let mut moved: Vec<(BindingId, f64)> = self
            .followers
            .iter_mut()
            .filter_map(|(&id, follower)| {
                follower
                    .step(delta_ms, self.scrub_epsilon)
                    .map(|progress| (id, progress))
            })
            .collect();
        moved.sort_by_key(|&(id, _)| id);
        for (id, progress) in moved {
            if let Some(binding) = self.registry.binding(id) {
                let _ = self.scheduler.advance(&binding.timeline, progress, sink);
            }
        }

        let _ = self.scheduler.tick(delta_ms, sink);
    }

    /// Every `(element, property)` this page has written.
    fn touched(&self) -> Vec<(TargetKey, String)> {
        let mut touched: Vec<(TargetKey, String)> = self
            .scheduler
            .timelines()
            .flat_map(AnimationTimeline::touched)
            .map(|(target, prop)| (target.clone(), prop.to_owned()))
            .chain(
                self.pins
                    .targets()
                    .map(|target| (target.clone(), self.hold_property.clone())),
            )
            .collect();
        touched.sort();
        touched.dedup();
        touched
    }
}

/// Owns every mounted page.
#[derive(Debug, Default)]
pub struct LifecycleManager {
    contexts: FxHashMap<ContextHandle, PageContext>,
    next_handle: u32,
    options: Options,
}

impl LifecycleManager {
    /// Manager that mounts pages with `options`.
    #[must_use]
    pub fn new(options: Options) -> Self {
        Self {
            contexts: FxHashMap::default(),
            next_handle: 0,
            options,
        }
    }

    /// Options pages are mounted with.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Mount `page`: compile its timelines, register regions, bindings and
    /// pins, subscribe to events, and render the initial state.
    ///
    /// On error nothing stays registered and every listener acquired so far
    /// is detached.
    pub fn mount(
        &mut self,
        page: &PageSpec,
        layout: &dyn LayoutSource,
        host: &mut dyn EventHost,
        sink: &mut dyn PropertySink,
    ) -> Result<ContextHandle, ScrollweaveError> {
        let mut scope = MountScope::new(host);
        for kind in ListenerKind::ALL {
            let _ = scope.attach(kind)?;
        }
        let mut ctx = PageContext::build(page, layout, &self.options)?;
        ctx.listeners = scope.commit();

        ctx.pass(layout, sink, true);

        let handle = ContextHandle(self.next_handle);
        self.next_handle += 1;
        log::info!(
            "mounted {handle}: {} timeline(s), {} binding(s), {} pin(s)",
            ctx.scheduler.len(),
            ctx.bindings.len(),
            ctx.pins.len()
        );
        let _ = self.contexts.insert(handle, ctx);
        Ok(handle)
    }

    /// Tear a page down: stop its loops, cancel its notification, detach
    /// its listeners, and revert every property it animated.
    ///
    /// Returns `false` when the handle was not mounted.
    pub fn unmount(
        &mut self,
        handle: ContextHandle,
        host: &mut dyn EventHost,
        sink: &mut dyn PropertySink,
    ) -> bool {
        let Some(mut ctx) = self.contexts.remove(&handle) else {
            return false;
        };
        ctx.scheduler.stop_all();
        let _ = ctx.toast.dismiss();
        for id in ctx.listeners.drain(..) {
            host.detach(id);
        }
        for (target, property) in ctx.touched() {
            sink.revert(&target, &property);
        }
        ctx.registry.clear();
        ctx.scheduler.clear();
        ctx.pins.clear();
        log::info!("unmounted {handle}");
        true
    }

    /// Feed one event to a mounted page.
    ///
    /// Returns `false`, doing nothing, when the handle is not mounted.
    pub fn dispatch(
        &mut self,
        handle: ContextHandle,
        event: StageEvent,
        layout: &dyn LayoutSource,
        sink: &mut dyn PropertySink,
    ) -> bool {
        let Some(ctx) = self.contexts.get_mut(&handle) else {
            log::trace!("{handle} not mounted, dropping {event:?}");
            return false;
        };
        match event {
            StageEvent::Scroll => ctx.pass(layout, sink, false),
            StageEvent::Resize => ctx.pass(layout, sink, true),
            StageEvent::Frame { delta_ms } => ctx.frame(delta_ms, sink),
            StageEvent::ToastRequest { message } => {
                let clock = ctx.clock_ms;
                let _ = ctx.toast.request(message.as_deref(), clock);
            }
            StageEvent::ToastDismiss => {
                let _ = ctx.toast.dismiss();
            }
        }
        true
    }

    /// Whether `handle` is mounted.
    #[must_use]
    pub fn is_mounted(&self, handle: ContextHandle) -> bool {
        self.contexts.contains_key(&handle)
    }

    /// State of a mounted page.
    #[must_use]
    pub fn context(&self, handle: ContextHandle) -> Option<&PageContext> {
        self.contexts.get(&handle)
    }

    /// Number of mounted pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    /// Whether no page is mounted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pin::PinPhase;
    use crate::timeline::PropertyTable;
    use crate::viewport::{AnchorRect, SimulatedLayout};

    const PAGE: &str = r##"
    [[regions]]
    id = "fade"
    anchor = "#fade"
    start = "top top"
    end = "+=1000"

    [[regions]]
    id = "cards"
    anchor = "#cards"
    start = "top top"
    end = "+=500"

    [[timelines]]
    id = "fade"
    [[timelines.tweens]]
    targets = "#fade"
    easing = "linear"
    duration_ms = 1000
    props = [{ name = "opacity", from = 0, to = 1 }]

    [[timelines]]
    id = "float"
    [[timelines.tweens]]
    targets = ".card"
    easing = "linear"
    duration_ms = 1000
    repeat = -1
    yoyo = true
    props = [{ name = "y", from = 0, to = -20 }]

    [[timelines]]
    id = "reveal"
    [[timelines.tweens]]
    targets = ".card"
    easing = "linear"
    duration_ms = 400
    props = [{ name = "x", from = 50, to = 0 }]

    [[timelines]]
    id = "panel"
    [[timelines.tweens]]
    targets = ".panel"
    easing = "linear"
    duration_ms = 1000
    props = [{ name = "opacity", from = 0, to = 1 }]

    [[bindings]]
    region = "fade"
    timeline = "fade"

    [[bindings]]
    region = "pin:stage"
    timeline = "panel"

    [[bindings]]
    region = "cards"
    timeline = "float"
    driving = "loop"

    [[bindings]]
    region = "cards"
    timeline = "reveal"
    driving = "once_on_enter"

    [[pins]]
    id = "stage"
    anchor = "#stage"
    distance = 600
    "##;

    /// `fade` spans [1000, 2000], `cards` [3000, 3500], the pin [5000, 5600].
    fn layout() -> SimulatedLayout {
        SimulatedLayout::new(800.0, 10_000.0)
            .with_anchor("#fade", 1000.0, 500.0)
            .with_anchor("#cards", 3000.0, 400.0)
            .with_anchor("#stage", 5000.0, 800.0)
            .with_targets(".card", 2)
            .with_targets(".panel", 1)
    }

    struct Stage {
        manager: LifecycleManager,
        host: RecordingHost,
        layout: SimulatedLayout,
        table: PropertyTable,
        handle: ContextHandle,
    }

    impl Stage {
        fn mount(page: &PageSpec, layout: SimulatedLayout) -> Self {
            let mut manager = LifecycleManager::default();
            let mut host = RecordingHost::new();
            let mut table = PropertyTable::new();
            let handle = manager
                .mount(page, &layout, &mut host, &mut table)
                .unwrap();
            Self {
                manager,
                host,
                layout,
                table,
                handle,
            }
        }

        fn new() -> Self {
            Self::mount(&PageSpec::from_toml(PAGE).unwrap(), layout())
        }

        fn send(&mut self, event: StageEvent) -> bool {
            self.manager
                .dispatch(self.handle, event, &self.layout, &mut self.table)
        }

        fn scroll(&mut self, y: f64) {
            self.layout.scroll_to(y);
            assert!(self.send(StageEvent::Scroll));
        }

        fn frames(&mut self, count: usize, delta_ms: f64) {
            for _ in 0..count {
                let _ = self.send(StageEvent::Frame { delta_ms });
            }
        }

        fn scalar(&self, selector: &str, index: usize, prop: &str) -> Option<f64> {
            self.table.scalar(selector, index, prop)
        }

        fn ctx(&self) -> &PageContext {
            self.manager.context(self.handle).unwrap()
        }
    }

    #[test]
    fn scrub_follows_scroll_both_ways() {
        let mut stage = Stage::new();
        assert_eq!(stage.scalar("#fade", 0, "opacity"), Some(0.0));
        stage.scroll(1500.0);
        assert_eq!(stage.scalar("#fade", 0, "opacity"), Some(0.5));
        stage.scroll(1250.0);
        assert_eq!(stage.scalar("#fade", 0, "opacity"), Some(0.25));
        stage.scroll(3000.0);
        assert_eq!(stage.scalar("#fade", 0, "opacity"), Some(1.0));
    }

    #[test]
    fn once_on_enter_plays_forward_once() {
        let mut stage = Stage::new();
        assert_eq!(stage.scalar(".card", 1, "x"), Some(50.0));

        stage.scroll(3100.0);
        stage.frames(1, 200.0);
        assert_eq!(stage.scalar(".card", 0, "x"), Some(25.0));
        stage.frames(1, 300.0);
        assert_eq!(stage.scalar(".card", 0, "x"), Some(0.0));
        assert_eq!(
            stage.ctx().scheduler().state("reveal"),
            Some(PlaybackState::Finished)
        );

        stage.scroll(0.0);
        stage.scroll(3100.0);
        assert_eq!(
            stage.ctx().scheduler().state("reveal"),
            Some(PlaybackState::Finished)
        );
        assert_eq!(stage.scalar(".card", 0, "x"), Some(0.0));
    }

    #[test]
    fn loop_runs_only_while_visible() {
        let mut stage = Stage::new();
        stage.frames(10, 16.0);
        assert_eq!(stage.scalar(".card", 0, "y"), None);

        stage.scroll(3100.0);
        stage.frames(1, 250.0);
        assert_eq!(stage.scalar(".card", 0, "y"), Some(-5.0));

        stage.scroll(4000.0);
        stage.frames(5, 100.0);
        assert_eq!(stage.scalar(".card", 0, "y"), Some(-5.0));
        assert_eq!(
            stage.ctx().scheduler().state("float"),
            Some(PlaybackState::Paused)
        );

        stage.scroll(3100.0);
        stage.frames(1, 250.0);
        assert_eq!(stage.scalar(".card", 0, "y"), Some(-10.0));
    }

    #[test]
    fn unmount_silences_infinite_loop_and_reverts() {
        let mut stage = Stage::new();
        stage.scroll(3100.0);
        stage.frames(30, 16.0);
        assert!(stage.ctx().scheduler().is_animating());

        assert!(stage
            .manager
            .unmount(stage.handle, &mut stage.host, &mut stage.table));
        assert_eq!(stage.host.active_count(), 0);
        assert!(stage.table.is_empty());

        let writes = stage.table.write_count();
        for _ in 0..500 {
            assert!(!stage.send(StageEvent::Frame { delta_ms: 16.0 }));
        }
        assert_eq!(stage.table.write_count(), writes);
    }

    #[test]
    fn events_after_teardown_are_dropped() {
        let mut stage = Stage::new();
        assert!(stage
            .manager
            .unmount(stage.handle, &mut stage.host, &mut stage.table));
        assert!(!stage
            .manager
            .unmount(stage.handle, &mut stage.host, &mut stage.table));

        stage.layout.scroll_to(1500.0);
        assert!(!stage.send(StageEvent::Scroll));
        assert!(!stage.send(StageEvent::Resize));
        assert!(!stage.send(StageEvent::ToastDismiss));
        assert!(stage.table.is_empty());
    }

    #[test]
    fn refused_listener_fails_mount_cleanly() {
        let page = PageSpec::from_toml(PAGE).unwrap();
        let mut manager = LifecycleManager::default();
        let mut host = RecordingHost::failing_on(ListenerKind::Frame);
        let mut table = PropertyTable::new();

        let result = manager.mount(&page, &layout(), &mut host, &mut table);
        assert!(matches!(result, Err(ScrollweaveError::Listener(_))));
        assert_eq!(host.active_count(), 0);
        assert_eq!(host.detached_count(), 2);
        assert!(manager.is_empty());
        assert!(table.is_empty());
    }

    #[test]
    fn invalid_page_releases_listeners() {
        let mut page = PageSpec::from_toml(PAGE).unwrap();
        page.bindings[0].timeline = "missing".to_owned();
        let mut manager = LifecycleManager::default();
        let mut host = RecordingHost::new();
        let mut table = PropertyTable::new();

        let result = manager.mount(&page, &layout(), &mut host, &mut table);
        assert!(matches!(result, Err(ScrollweaveError::UnknownTimeline(_))));
        assert_eq!(host.active_count(), 0);
        assert_eq!(host.detached_count(), 3);
        assert!(manager.is_empty());
    }

    #[test]
    fn pin_holds_element_through_distance() {
        let mut stage = Stage::new();
        let pin = stage.ctx().pin_binding("stage").unwrap();
        assert_eq!(stage.scalar("#stage", 0, "translateY"), Some(0.0));

        stage.scroll(5000.0);
        assert_eq!(stage.ctx().pins().state(pin).unwrap().phase, PinPhase::Pinning);
        stage.scroll(5300.0);
        let state = stage.ctx().pins().state(pin).unwrap();
        assert_eq!(state.phase, PinPhase::Pinned);
        assert_eq!(state.progress, 0.5);
        assert_eq!(stage.scalar("#stage", 0, "translateY"), Some(300.0));

        stage.scroll(7000.0);
        let state = stage.ctx().pins().state(pin).unwrap();
        assert_eq!(state.phase, PinPhase::Unpinned);
        assert_eq!(state.progress, 1.0);
        assert_eq!(stage.scalar("#stage", 0, "translateY"), Some(600.0));
    }

    #[test]
    fn pin_progress_scrubs_nested_timeline() {
        let mut stage = Stage::new();
        assert_eq!(stage.scalar(".panel", 0, "opacity"), Some(0.0));

        stage.scroll(5300.0);
        assert_eq!(stage.scalar(".panel", 0, "opacity"), Some(0.5));
        stage.scroll(5150.0);
        assert_eq!(stage.scalar(".panel", 0, "opacity"), Some(0.25));
        stage.scroll(9000.0);
        assert_eq!(stage.scalar(".panel", 0, "opacity"), Some(1.0));
    }

    #[test]
    fn missing_anchor_stays_inert_until_mounted() {
        let mut layout = layout().with_targets("#fade", 1);
        layout.remove_anchor("#fade");
        let mut stage = Stage::mount(&PageSpec::from_toml(PAGE).unwrap(), layout);

        stage.scroll(1500.0);
        assert_eq!(stage.scalar("#fade", 0, "opacity"), None);
        let fade = stage.ctx().binding(0).unwrap();
        assert!(stage.ctx().registry().resolved(fade).is_none());

        let _ = stage.layout.anchors.insert(
            "#fade".to_owned(),
            AnchorRect {
                top: 1000.0,
                height: 500.0,
            },
        );
        stage.scroll(1500.0);
        assert_eq!(stage.scalar("#fade", 0, "opacity"), Some(0.5));
    }

    #[test]
    fn unready_layout_defers_everything() {
        let mut layout = layout();
        layout.laid_out = false;
        let mut stage = Stage::mount(&PageSpec::from_toml(PAGE).unwrap(), layout);
        assert!(stage.table.is_empty());

        stage.layout.laid_out = true;
        stage.scroll(0.0);
        assert_eq!(stage.scalar("#fade", 0, "opacity"), Some(0.0));
        assert_eq!(stage.scalar(".card", 0, "x"), Some(50.0));
    }

    #[test]
    fn resize_re_resolves_boundaries() {
        let mut stage = Stage::new();
        stage.scroll(1500.0);
        assert_eq!(stage.scalar("#fade", 0, "opacity"), Some(0.5));

        let _ = stage.layout.anchors.insert(
            "#fade".to_owned(),
            AnchorRect {
                top: 1250.0,
                height: 500.0,
            },
        );
        stage.layout.resize(700.0);
        assert!(stage.send(StageEvent::Resize));
        assert_eq!(stage.scalar("#fade", 0, "opacity"), Some(0.25));
    }

    #[test]
    fn scrub_lag_catches_up_on_frames() {
        let mut page = PageSpec::from_toml(PAGE).unwrap();
        page.bindings[0].scrub_lag_ms = 500.0;
        let mut stage = Stage::mount(&page, layout());

        stage.scroll(2000.0);
        assert_eq!(stage.scalar("#fade", 0, "opacity"), Some(0.0));

        stage.frames(1, 16.0);
        let first = stage.scalar("#fade", 0, "opacity").unwrap();
        assert!(first > 0.0 && first < 1.0);

        stage.frames(300, 16.0);
        assert_eq!(stage.scalar("#fade", 0, "opacity"), Some(1.0));
    }

    #[test]
    fn targets_mounted_later_join_their_timelines() {
        let mut layout = layout();
        let _ = layout.targets.remove(".card");
        let mut stage = Stage::mount(&PageSpec::from_toml(PAGE).unwrap(), layout);
        assert_eq!(stage.scalar(".card", 0, "x"), None);

        let _ = stage.layout.targets.insert(".card".to_owned(), 2);
        assert!(stage.send(StageEvent::Resize));
        assert_eq!(stage.scalar(".card", 1, "x"), Some(50.0));

        stage.scroll(3200.0);
        stage.frames(60, 16.0);
        assert_eq!(stage.scalar(".card", 0, "x"), Some(0.0));
        assert_eq!(stage.scalar(".card", 1, "x"), Some(0.0));
        assert!(stage.scalar(".card", 0, "y").is_some());
    }

    #[test]
    fn targets_arriving_with_their_anchor_play_on_enter() {
        let mut layout = layout();
        layout.remove_anchor("#cards");
        let _ = layout.targets.remove(".card");
        let mut stage = Stage::mount(&PageSpec::from_toml(PAGE).unwrap(), layout);
        stage.scroll(3200.0);
        stage.frames(5, 16.0);
        assert_eq!(stage.scalar(".card", 0, "x"), None);

        let _ = stage.layout.anchors.insert(
            "#cards".to_owned(),
            AnchorRect {
                top: 3000.0,
                height: 400.0,
            },
        );
        let _ = stage.layout.targets.insert(".card".to_owned(), 2);
        stage.scroll(3200.0);
        stage.frames(60, 16.0);
        assert_eq!(stage.scalar(".card", 1, "x"), Some(0.0));
        assert_eq!(
            stage.ctx().scheduler().state("float"),
            Some(PlaybackState::Playing)
        );
    }

    #[test]
    fn resize_keeps_scrub_lag_trailing() {
        let mut page = PageSpec::from_toml(PAGE).unwrap();
        page.bindings[0].scrub_lag_ms = 500.0;
        let mut stage = Stage::mount(&page, layout());
        let fade = stage.ctx().binding(0).unwrap();

        stage.scroll(2000.0);
        stage.frames(1, 16.0);
        let before = stage.scalar("#fade", 0, "opacity").unwrap();
        assert!(before > 0.0 && before < 1.0);

        assert!(stage.send(StageEvent::Resize));
        assert_eq!(stage.scalar("#fade", 0, "opacity"), Some(before));

        let _ = stage.layout.anchors.insert(
            "#fade".to_owned(),
            AnchorRect {
                top: 1250.0,
                height: 500.0,
            },
        );
        assert!(stage.send(StageEvent::Resize));
        assert_eq!(stage.scalar("#fade", 0, "opacity"), Some(before));
        assert_eq!(stage.ctx().followers[&fade].target(), 0.75);

        stage.frames(1, 16.0);
        let after = stage.scalar("#fade", 0, "opacity").unwrap();
        assert!(after > before && after < 0.75);
    }

    #[test]
    fn toast_is_preempted_and_expires() {
        let mut stage = Stage::new();
        assert!(stage.send(StageEvent::ToastRequest {
            message: Some("A".to_owned()),
        }));
        stage.frames(1, 1000.0);
        assert!(stage.send(StageEvent::ToastRequest {
            message: Some("B".to_owned()),
        }));
        stage.frames(1, 500.0);
        assert_eq!(stage.ctx().toast().visible(), Some("B"));
        stage.frames(1, 2500.0);
        assert_eq!(stage.ctx().toast().visible(), None);

        assert!(stage.send(StageEvent::ToastRequest { message: None }));
        assert_eq!(
            stage.ctx().toast().visible(),
            Some("Coming Soon :: System Alpha")
        );
        assert!(stage.send(StageEvent::ToastDismiss));
        assert_eq!(stage.ctx().toast().visible(), None);
    }

    #[test]
    fn contexts_are_independent() {
        let page = PageSpec::from_toml(PAGE).unwrap();
        let layout = layout();
        let mut manager = LifecycleManager::default();
        let mut host = RecordingHost::new();
        let mut table = PropertyTable::new();

        let a = manager.mount(&page, &layout, &mut host, &mut table).unwrap();
        let b = manager.mount(&page, &layout, &mut host, &mut table).unwrap();
        assert_ne!(a, b);
        assert_eq!(host.active_count(), 6);

        assert!(manager.unmount(a, &mut host, &mut table));
        assert_eq!(host.active_count(), 3);
        assert!(manager.dispatch(b, StageEvent::Scroll, &layout, &mut table));
        assert!(!manager.dispatch(a, StageEvent::Scroll, &layout, &mut table));
    }

    #[test]
    fn landing_page_end_to_end() {
        let layout: SimulatedLayout =
            toml::from_str(include_str!("../../assets/pages/landing_layout.toml"))
                .unwrap();
        let mut stage = Stage::mount(&PageSpec::landing().unwrap(), layout);

        stage.frames(200, 16.0);
        assert_eq!(stage.scalar(".hero-text", 6, "opacity"), Some(1.0));
        assert_eq!(stage.scalar(".hero-text", 0, "y"), Some(0.0));
        assert_eq!(
            stage.ctx().scheduler().state("hero-float"),
            Some(PlaybackState::Playing)
        );

        let max = stage.layout.max_scroll();
        let mut y = 0.0;
        while y < max {
            y += 100.0;
            stage.scroll(y);
            stage.frames(2, 16.0);
            for binding in stage.ctx().registry().bindings() {
                let p = stage.ctx().registry().progress(binding.id).unwrap();
                assert!((0.0..=1.0).contains(&p));
            }
        }
        stage.frames(400, 16.0);

        assert_eq!(
            stage.ctx().scheduler().state("hero-float"),
            Some(PlaybackState::Paused)
        );
        let background = stage
            .table
            .get(&TargetKey::new("main", 0), "backgroundColor")
            .and_then(|v| v.as_color())
            .unwrap();
        assert_eq!(background.to_string(), "#1e1e1e");
        let heading = stage
            .table
            .get(&TargetKey::new(".support-heading", 0), "color")
            .and_then(|v| v.as_color())
            .unwrap();
        assert_eq!(heading.to_string(), "#ffffff");

        assert!(stage
            .manager
            .unmount(stage.handle, &mut stage.host, &mut stage.table));
        assert!(stage.table.is_empty());
    }
}


//! Replay a page declaration against a simulated layout and log what it
//! writes.
//!
//! ```text
//! scrollweave [PAGE.toml [LAYOUT.toml [OPTIONS.toml]]]
//! ```
//!
//! Without arguments the bundled landing page is replayed.

use std::path::Path;

use scrollweave::lifecycle::RecordingHost;
use scrollweave::timeline::PropertyTable;
use scrollweave::viewport::SimulatedLayout;
use scrollweave::{LifecycleManager, Options, PageSpec, ScrollweaveError, StageEvent};

const LANDING_LAYOUT: &str = include_str!("../assets/pages/landing_layout.toml");

/// Scroll distance between two replay steps.
const STEP_PX: f64 = 250.0;
/// Frames simulated after every scroll step.
const FRAMES_PER_STEP: usize = 8;
const FRAME_MS: f64 = 1000.0 / 60.0;

fn load_layout(path: Option<&str>) -> Result<SimulatedLayout, ScrollweaveError> {
    let content = match path {
        Some(path) => std::fs::read_to_string(path)?,
        None => LANDING_LAYOUT.to_owned(),
    };
    toml::from_str(&content).map_err(|e| ScrollweaveError::PageParse(e.to_string()))
}

fn replay(args: &[String]) -> Result<(), ScrollweaveError> {
    let page = match args.first() {
        Some(path) => PageSpec::load(Path::new(path))?,
        None => PageSpec::landing()?,
    };
    let mut layout = load_layout(args.get(1).map(String::as_str))?;
    let options = match args.get(2) {
        Some(path) => Options::load(Path::new(path))?,
        None => Options::default(),
    };

    let mut manager = LifecycleManager::new(options);
    let mut host = RecordingHost::new();
    let mut table = PropertyTable::new();
    let handle = manager.mount(&page, &layout, &mut host, &mut table)?;

    let max = layout.max_scroll();
    let mut y = 0.0;
    loop {
        layout.scroll_to(y);
        let _ = manager.dispatch(handle, StageEvent::Scroll, &layout, &mut table);
        for _ in 0..FRAMES_PER_STEP {
            let _ = manager.dispatch(
                handle,
                StageEvent::Frame { delta_ms: FRAME_MS },
                &layout,
                &mut table,
            );
        }

        log::info!("scroll {y:>6.0}: {} value(s), {} write(s)", table.len(), table.write_count());
        for (target, property, value) in table.sorted() {
            log::debug!("  {target} {property} = {value}");
        }

        if y >= max {
            break;
        }
        y = (y + STEP_PX).min(max);
    }

    let _ = manager.unmount(handle, &mut host, &mut table);
    log::info!("unmounted; {} value(s) left applied", table.len());
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = replay(&args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

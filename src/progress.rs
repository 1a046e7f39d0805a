// src/progress.rs
//! Scan progress accounting with a throttled indicatif display
//!
//! Accounting always happens; drawing only happens when a bar exists and at
//! most once per render interval.

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Fixed progress budget for one scan
pub const PROGRESS_TOTAL: u64 = 100;

const RENDER_INTERVAL: Duration = Duration::from_millis(500);
const BAR_WIDTH: usize = 50;

#[derive(Debug)]
struct ProgressState {
    current: u64,
    active_task: Option<String>,
    last_render: Instant,
    renders: u64,
}

/// Snapshot of progress at a point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub current: u64,
    pub total: u64,
    pub percent: u64,
    pub active_task: Option<String>,
    pub renders: u64,
}

/// Thread-safe progress accumulator. Clones share state.
#[derive(Clone)]
pub struct ProgressTracker {
    state: Arc<Mutex<ProgressState>>,
    bar: Option<ProgressBar>,
    render_interval: Duration,
}

impl ProgressTracker {
    /// Create a tracker; with `interactive` false nothing is ever drawn
    pub fn new(interactive: bool) -> Self {
        let bar = interactive.then(|| {
            let bar = ProgressBar::new(PROGRESS_TOTAL);
            let style = ProgressStyle::default_bar()
                .template(&format!("[{{bar:{}}}] {{pos:>3}}% {{msg}}", BAR_WIDTH))
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("# ");
            bar.set_style(style);
            bar
        });

        Self::with_bar(bar, RENDER_INTERVAL)
    }

    /// Headless tracker with a custom render interval, mainly for tests
    pub fn headless_with_interval(render_interval: Duration) -> Self {
        Self::with_bar(None, render_interval)
    }

    fn with_bar(bar: Option<ProgressBar>, render_interval: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(ProgressState {
                current: 0,
                active_task: None,
                last_render: Instant::now(),
                renders: 0,
            })),
            bar,
            render_interval,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ProgressState> {
        // Accounting must never fail, even after a panicking holder
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record progress, optionally switching the active task label
    pub fn advance(&self, task: Option<&str>, delta: u64) {
        let mut state = self.lock();

        if let Some(task) = task {
            state.active_task = Some(task.to_string());
        }
        state.current = state.current.saturating_add(delta);

        if state.last_render.elapsed() >= self.render_interval {
            self.render(&state);
            state.renders += 1;
            state.last_render = Instant::now();
        }
    }

    /// Convenience for the common "switch task and add" call
    pub fn task(&self, task: &str, delta: u64) {
        self.advance(Some(task), delta);
    }

    fn render(&self, state: &ProgressState) {
        if let Some(ref bar) = self.bar {
            bar.set_position(percent(state.current));
            bar.set_message(
                state
                    .active_task
                    .as_deref()
                    .map(|task| format!("Current: {}", task))
                    .unwrap_or_default(),
            );
        }
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let state = self.lock();
        ProgressSnapshot {
            current: state.current,
            total: PROGRESS_TOTAL,
            percent: percent(state.current),
            active_task: state.active_task.clone(),
            renders: state.renders,
        }
    }

    /// Run `f` with the bar hidden so other output is not garbled
    pub fn suspend<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        match self.bar {
            Some(ref bar) => bar.suspend(f),
            None => f(),
        }
    }

    /// Draw the final state and clear the bar
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            let state = self.lock();
            self.render(&state);
            bar.finish_and_clear();
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.bar.is_some()
    }
}

fn percent(current: u64) -> u64 {
    (current * 100 / PROGRESS_TOTAL).min(100)
}

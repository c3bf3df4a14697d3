//! State container and render-lane scheduling.
//!
//! Each lane moves through `idle -> pending -> rendering -> idle`:
//!
//! ```text
//!            enqueue                 frame              finish
//!   Idle ─────────────▶ Pending ─────────────▶ Rendering ────────▶ Idle
//!     ▲  (queue merged     (tick callback          │  (queue non-empty:
//!     │   into state)       scheduled)             │   pending again)
//!     └────────────────────────────────────────────┘
//! ```
//!
//! The sync and async lanes are independent. Render patches wait in the
//! lane's queue until the lane is idle; the queue is merged into the state,
//! with deletions, right before the tick is scheduled.

use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::dispatch::Lane;
use crate::merge::merge_state;
use crate::options::AppOptions;
use crate::State;

/// Render counters. Purely observational.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Patches submitted (ignored ones excluded)
    pub patch_count: u64,
    /// Effects (futures, streams, tasks) still running
    pub live_effect_count: u64,
    /// Render patches queued on the sync lane, plus flushes
    pub sync_render_patch_count: u64,
    /// Render patches queued on the async lane
    pub async_render_patch_count: u64,
    pub sync_render_count: u64,
    pub async_render_count: u64,
    pub last_sync_render_time: Duration,
    pub last_async_render_time: Duration,
}

/// Handle of the page transition running an async tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub id: u64,
}

#[derive(Debug)]
pub(crate) struct Scheduler {
    pub(crate) state: State,
    q_sync: Option<Map<String, Value>>,
    q_async: Option<Map<String, Value>>,
    rendering: bool,
    animating: bool,
    sync_frame: bool,
    async_frame: bool,
    transition: Option<Transition>,
    next_transition_id: u64,
    transitions: bool,
    hidden: bool,
    pub(crate) stats: Stats,
}

impl Scheduler {
    pub(crate) fn new(state: Map<String, Value>, options: &AppOptions) -> Self {
        Self {
            state: Value::Object(state),
            q_sync: None,
            q_async: None,
            rendering: false,
            animating: false,
            sync_frame: false,
            async_frame: false,
            transition: None,
            next_transition_id: 1,
            transitions: options.view_transitions,
            hidden: options.hidden,
            stats: Stats::default(),
        }
    }

    /// Whether batched patches go to the async lane.
    pub(crate) fn async_available(&self) -> bool {
        self.transitions && !self.hidden
    }

    pub(crate) fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    pub(crate) fn transition(&self) -> Option<Transition> {
        self.transition
    }

    /// Queue a render patch on a lane and request a tick for it.
    pub(crate) fn enqueue(&mut self, patch: Map<String, Value>, lane: Lane) {
        match lane {
            Lane::Sync => {
                self.stats.sync_render_patch_count += 1;
                merge_state(self.q_sync.get_or_insert_with(Map::new), patch, false);
                self.request_sync();
            }
            Lane::Async => {
                self.stats.async_render_patch_count += 1;
                merge_state(self.q_async.get_or_insert_with(Map::new), patch, false);
                self.request_async();
            }
        }
    }

    /// Fold the async queue into the sync queue, cancel an async tick that
    /// has not run yet and request a sync tick, even with nothing queued.
    ///
    /// A cancelled tick's patches are already in the state, so the sync
    /// tick renders them.
    pub(crate) fn flush(&mut self) {
        let queue = self.q_sync.get_or_insert_with(Map::new);
        if let Some(pending) = self.q_async.take() {
            merge_state(queue, pending, false);
        }
        if std::mem::take(&mut self.async_frame) {
            self.animating = false;
            if let Some(transition) = self.transition.take() {
                tracing::debug!(id = transition.id, "transition skipped");
            }
        }
        self.stats.sync_render_patch_count += 1;
        self.request_sync();
    }

    fn request_sync(&mut self) {
        if self.rendering {
            return;
        }
        let Some(queue) = self.q_sync.take() else {
            return;
        };
        self.rendering = true;
        self.apply(queue);
        self.sync_frame = true;
        tracing::trace!("sync tick scheduled");
    }

    fn request_async(&mut self) {
        if self.animating {
            return;
        }
        let Some(queue) = self.q_async.take() else {
            return;
        };
        self.animating = true;
        self.apply(queue);
        if self.async_available() {
            let id = self.next_transition_id;
            self.next_transition_id += 1;
            self.transition = Some(Transition { id });
            tracing::trace!(id, "async tick scheduled in transition");
        } else {
            tracing::trace!("async tick scheduled on next frame");
        }
        self.async_frame = true;
    }

    fn apply(&mut self, queue: Map<String, Value>) {
        if let Value::Object(state) = &mut self.state {
            merge_state(state, queue, true);
        }
    }

    pub(crate) fn take_frame(&mut self, lane: Lane) -> bool {
        match lane {
            Lane::Sync => std::mem::take(&mut self.sync_frame),
            Lane::Async => std::mem::take(&mut self.async_frame),
        }
    }

    pub(crate) fn has_pending_frame(&self) -> bool {
        self.sync_frame || self.async_frame
    }

    /// Close a tick, then request the next one if patches arrived meanwhile.
    pub(crate) fn finish(&mut self, lane: Lane, elapsed: Duration) {
        match lane {
            Lane::Sync => {
                self.stats.last_sync_render_time = elapsed;
                self.stats.sync_render_count += 1;
                self.rendering = false;
                self.request_sync();
            }
            Lane::Async => {
                self.stats.last_async_render_time = elapsed;
                self.stats.async_render_count += 1;
                self.animating = false;
                self.transition = None;
                self.request_async();
            }
        }
    }

    /// Drop everything queued or scheduled.
    pub(crate) fn clear(&mut self) {
        self.q_sync = None;
        self.q_async = None;
        self.sync_frame = false;
        self.async_frame = false;
        self.transition = None;
    }
}

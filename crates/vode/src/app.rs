//! The app: a view function bound to a container and a state.

use std::time::Instant;

use futures::channel::mpsc::UnboundedReceiver;
use futures::executor::{LocalPool, LocalSpawner};
use futures::task::LocalSpawnExt;
use futures::{Future, StreamExt};
use serde_json::Value;
use vode_dom::NodeId;

use crate::attached::AttachedVode;
use crate::dispatch::{Dispatch, Lane, Message, Yielder};
use crate::error::{Result, VodeError};
use crate::hydrate::hydrate_for_render;
use crate::options::AppOptions;
use crate::patch::Patch;
use crate::props::{Event, CATCH, ON_MOUNT, ON_UNMOUNT};
use crate::render::Renderer;
use crate::scheduler::{Scheduler, Stats, Transition};
use crate::vode::Vode;
use crate::{LiveDocument, State};

type View = Box<dyn Fn(&State) -> Vode>;

/// A mounted app.
///
/// The app owns the document, the state and the effect executor. Nothing
/// happens in the background: frames and effects run when the embedder
/// calls [`App::frame`] or [`App::run_until_stalled`].
pub struct App {
    doc: LiveDocument,
    container: NodeId,
    parent: NodeId,
    root_index: usize,
    view: View,
    vode: Option<AttachedVode>,
    scheduler: Scheduler,
    dispatch: Dispatch,
    inbox: UnboundedReceiver<Message>,
    pool: LocalPool,
    spawner: LocalSpawner,
    options: AppOptions,
    defused: bool,
}

impl App {
    /// Mount `view` over `container` with default options.
    pub fn mount<V, I>(doc: LiveDocument, container: NodeId, state: Value, view: V, initial_patches: I) -> Result<Self>
    where
        V: Fn(&State) -> Vode + 'static,
        I: IntoIterator<Item = Patch>,
    {
        Self::mount_with_options(doc, container, state, view, initial_patches, AppOptions::default())
    }

    /// Mount `view` over `container`.
    ///
    /// The existing content of `container` is hydrated as the baseline and
    /// the first render happens right away, in place of the container. The
    /// initial patches are then submitted in order; their renders run on the
    /// next frame.
    pub fn mount_with_options<V, I>(
        mut doc: LiveDocument,
        container: NodeId,
        state: Value,
        view: V,
        initial_patches: I,
        options: AppOptions,
    ) -> Result<Self>
    where
        V: Fn(&State) -> Vode + 'static,
        I: IntoIterator<Item = Patch>,
    {
        let parent = doc.parent(container).ok_or(VodeError::InvalidContainer)?;
        let root_index = doc.index_of(container).ok_or(VodeError::InvalidContainer)?;
        let Value::Object(state) = state else {
            return Err(VodeError::InvalidState);
        };

        let baseline = hydrate_for_render(&mut doc, container);
        let (dispatch, inbox) = Dispatch::channel();
        let pool = LocalPool::new();
        let spawner = pool.spawner();

        let mut app = Self {
            doc,
            container,
            parent,
            root_index,
            view: Box::new(view),
            vode: baseline,
            scheduler: Scheduler::new(state, &options),
            dispatch,
            inbox,
            pool,
            spawner,
            options,
            defused: false,
        };

        app.render_root()?;
        tracing::debug!(container = app.container, "app mounted");

        for patch in initial_patches {
            app.patch(patch)?;
        }
        Ok(app)
    }

    /// Submit a patch to the sync lane.
    pub fn patch(&mut self, patch: impl Into<Patch>) -> Result<()> {
        self.submit(patch.into(), Lane::Sync)
    }

    /// Submit a patch to the async lane.
    pub fn patch_async(&mut self, patch: impl Into<Patch>) -> Result<()> {
        self.submit(patch.into(), Lane::Async)
    }

    /// A handle for submitting patches from listeners, hooks and tasks.
    pub fn dispatch(&self) -> Dispatch {
        self.dispatch.clone()
    }

    pub fn state(&self) -> &State {
        &self.scheduler.state
    }

    pub fn stats(&self) -> Stats {
        self.scheduler.stats
    }

    pub fn document(&self) -> &LiveDocument {
        &self.doc
    }

    /// The live root node. Follows the root when its tag changes.
    pub fn container(&self) -> NodeId {
        self.container
    }

    /// The attached tree of the last render.
    pub fn vode(&self) -> Option<&AttachedVode> {
        self.vode.as_ref()
    }

    pub fn options(&self) -> &AppOptions {
        &self.options
    }

    /// The transition of the async tick in flight, if any.
    pub fn current_transition(&self) -> Option<Transition> {
        self.scheduler.transition()
    }

    /// Change document visibility. While hidden, batched patches use the
    /// sync lane and async ticks run without a transition.
    pub fn set_hidden(&mut self, hidden: bool) {
        self.scheduler.set_hidden(hidden);
    }

    pub fn is_defused(&self) -> bool {
        self.defused
    }

    fn submit(&mut self, patch: Patch, lane: Lane) -> Result<()> {
        self.ensure_live()?;
        if patch.is_ignored() {
            return Ok(());
        }
        self.scheduler.stats.patch_count += 1;

        match patch {
            Patch::Ignore => {}
            Patch::Render(map) => self.scheduler.enqueue(map, lane),
            Patch::Action(action) => {
                let next = action(&self.scheduler.state);
                self.submit(next, lane)?;
            }
            Patch::Batch(patches) if patches.is_empty() => self.flush()?,
            Patch::Batch(patches) => {
                let lane = if self.scheduler.async_available() {
                    Lane::Async
                } else {
                    Lane::Sync
                };
                for patch in patches {
                    self.submit(patch, lane)?;
                }
            }
            Patch::Future(future) => {
                let dispatch = self.dispatch.clone();
                self.spawn_effect(async move {
                    dispatch.submit(future.await, lane);
                });
            }
            Patch::Stream(mut stream) => {
                let dispatch = self.dispatch.clone();
                self.spawn_effect(async move {
                    while let Some(patch) = stream.next().await {
                        dispatch.submit(patch, lane);
                    }
                });
            }
            Patch::Task(task) => {
                let dispatch = self.dispatch.clone();
                let future = task(Yielder::new(dispatch.clone(), lane));
                self.spawn_effect(async move {
                    dispatch.submit(future.await, lane);
                });
            }
        }
        Ok(())
    }

    fn spawn_effect(&mut self, effect: impl Future<Output = ()> + 'static) {
        let dispatch = self.dispatch.clone();
        let task = async move {
            effect.await;
            dispatch.settled();
        };
        self.scheduler.stats.live_effect_count += 1;
        match self.spawner.spawn_local(task) {
            Ok(()) => tracing::trace!("effect spawned"),
            Err(err) => {
                tracing::warn!(error = %err, "failed to spawn effect");
                self.scheduler.stats.live_effect_count -= 1;
            }
        }
    }

    /// Skip the running transition and render everything queued on both
    /// lanes synchronously, right now.
    fn flush(&mut self) -> Result<()> {
        tracing::debug!("flush");
        self.scheduler.flush();
        while self.scheduler.take_frame(Lane::Sync) {
            self.tick(Lane::Sync)?;
        }
        Ok(())
    }

    /// Run the pending frame callbacks: the sync tick first, then the
    /// update of the pending transition.
    pub fn frame(&mut self) -> Result<()> {
        self.ensure_live()?;
        if self.scheduler.take_frame(Lane::Sync) {
            self.tick(Lane::Sync)?;
        }
        if self.scheduler.take_frame(Lane::Async) {
            self.tick(Lane::Async)?;
        }
        Ok(())
    }

    /// Process submitted patches, drive effects and run frames until nothing
    /// is left to do. Effects waiting on something outside the app stay
    /// suspended; call again once they can make progress.
    pub fn run_until_stalled(&mut self) -> Result<()> {
        self.ensure_live()?;
        let mut frames = 0;
        loop {
            self.drain_inbox()?;
            self.pool.run_until_stalled();
            if self.drain_inbox()? > 0 {
                continue;
            }
            if !self.scheduler.has_pending_frame() {
                return Ok(());
            }
            if frames == self.options.max_ticks_per_flush {
                tracing::warn!(frames, "frame limit reached with renders still pending");
                return Ok(());
            }
            frames += 1;
            self.frame()?;
        }
    }

    fn drain_inbox(&mut self) -> Result<usize> {
        let mut processed = 0;
        while let Ok(Some(message)) = self.inbox.try_next() {
            processed += 1;
            match message {
                Message::Patch(patch, lane) => self.submit(patch, lane)?,
                Message::Settled => {
                    self.scheduler.stats.live_effect_count = self.scheduler.stats.live_effect_count.saturating_sub(1);
                    tracing::trace!("effect settled");
                }
            }
        }
        Ok(processed)
    }

    fn tick(&mut self, lane: Lane) -> Result<()> {
        let span = tracing::debug_span!("render", ?lane);
        let _enter = span.enter();

        let started = Instant::now();
        let result = self.render_root();
        self.scheduler.finish(lane, started.elapsed());
        tracing::debug!(elapsed = ?started.elapsed(), ok = result.is_ok(), "tick rendered");
        result
    }

    fn render_root(&mut self) -> Result<()> {
        let new = (self.view)(&self.scheduler.state);
        let old = self.vode.take();
        let result = Renderer::new(&mut self.doc, &self.scheduler.state, &self.dispatch)
            .render(self.parent, self.root_index, old, new, None);

        match result {
            Ok(attached) => {
                self.vode = attached;
                if let Some(root) = &self.vode {
                    if root.node != self.container {
                        tracing::debug!(old = self.container, new = root.node, "root replaced");
                        self.container = root.node;
                    }
                    if let Some(index) = self.doc.index_of(root.node) {
                        self.root_index = index;
                    }
                }
                Ok(())
            }
            Err(err) => {
                self.vode = self
                    .doc
                    .child_at(self.parent, self.root_index)
                    .and_then(|node| hydrate_for_render(&mut self.doc, node));
                Err(err)
            }
        }
    }

    /// Fire the listener registered for `event` on `node`, submitting its
    /// patch to the sync lane. Returns whether a listener was found.
    pub fn dispatch_event(&mut self, node: NodeId, event: Event) -> Result<bool> {
        self.ensure_live()?;
        let Some(handler) = self.doc.listener(node, &event.name).cloned() else {
            return Ok(false);
        };
        let patch = handler.call(&self.scheduler.state, &event);
        self.submit(patch, Lane::Sync)?;
        Ok(true)
    }

    /// Tear the app down: every listener installed by the app is removed and
    /// patching and rendering stop. The dispatch channel is closed and
    /// running effects are dropped. Live nodes stay in the document.
    pub fn defuse(&mut self) {
        if self.defused {
            return;
        }
        if let Some(root) = &self.vode {
            let doc = &mut self.doc;
            root.walk(&mut |attached| {
                let Some(props) = attached.props() else {
                    return;
                };
                for key in props.keys() {
                    if !key.starts_with("on") || matches!(key, ON_MOUNT | ON_UNMOUNT | CATCH) {
                        continue;
                    }
                    if let Err(err) = doc.set_listener(attached.node, &key[2..], None) {
                        tracing::trace!(error = %err, "listener already gone");
                    }
                }
            });
        }
        self.scheduler.clear();
        self.inbox.close();
        while let Ok(Some(message)) = self.inbox.try_next() {
            tracing::trace!(?message, "discarding message after defuse");
        }
        self.pool = LocalPool::new();
        self.spawner = self.pool.spawner();
        self.scheduler.stats.live_effect_count = 0;
        self.defused = true;
        tracing::debug!(container = self.container, "app defused");
    }

    fn ensure_live(&self) -> Result<()> {
        if self.defused {
            Err(VodeError::Defused)
        } else {
            Ok(())
        }
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("container", &self.container)
            .field("state", &self.scheduler.state)
            .field("stats", &self.scheduler.stats)
            .field("defused", &self.defused)
            .finish_non_exhaustive()
    }
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The native drag backend.

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;
use core::hash::Hash;
use core::time::Duration;

use hashbrown::HashMap;
use kurbo::Point;
use smallvec::SmallVec;
use understory_dnd::scheduler::TaskId;
use understory_dnd::{
    Backend, BeginDragOptions, Disconnect, DndError, DragDropCore, DropResult, HandlerId, Profile,
};

use crate::enter_leave::EnterLeaveCounter;
use crate::environment::Html5Environment;
use crate::event::{DragEventKind, DropEffect, NativeDragEvent};
use crate::native_types::{NativeDragSource, NativeItem, NativeKind};
use crate::offset::drag_preview_offset;
use crate::options::{Html5Options, PreviewOptions, SourceOptions};

/// Delay before the removed-source probe starts listening to `mousemove`.
///
/// Rendering the drag preview can emit a mouse move right after `dragstart`;
/// probing before this delay would end drags whose source is merely being
/// re-rendered.
pub const SOURCE_REMOVAL_PROBE_DELAY: Duration = Duration::from_millis(1000);

type Ids = SmallVec<[HandlerId; 2]>;

struct NativeDrag {
    id: HandlerId,
    item: Rc<NativeItem>,
}

struct DragState<N> {
    /// Root the listeners are installed on, while set up.
    root: Option<N>,

    source_nodes: HashMap<HandlerId, N>,
    source_node_options: HashMap<HandlerId, SourceOptions>,
    source_preview_nodes: HashMap<HandlerId, N>,
    source_preview_node_options: HashMap<HandlerId, PreviewOptions>,

    /// Node-level `dragstart` listeners, in connection order.
    drag_start_listeners: HashMap<N, Ids>,
    /// Node-level `dragenter`/`dragover`/`drop` listeners, in connection order.
    drop_listeners: HashMap<N, Ids>,

    drag_start_source_ids: Option<Vec<HandlerId>>,
    drag_enter_target_ids: Vec<HandlerId>,
    drag_over_target_ids: Vec<HandlerId>,
    drop_target_ids: Vec<HandlerId>,

    enter_leave: EnterLeaveCounter<N>,
    native: Option<NativeDrag>,

    current_drag_source_node: Option<N>,
    probe_timeout: Option<TaskId>,
    probe_armed: bool,

    alt_key_pressed: bool,
    last_client_offset: Option<Point>,
    hover_frame: Option<TaskId>,
    hover_target_ids: Vec<HandlerId>,
}

impl<N> Default for DragState<N> {
    fn default() -> Self {
        Self {
            root: None,
            source_nodes: HashMap::new(),
            source_node_options: HashMap::new(),
            source_preview_nodes: HashMap::new(),
            source_preview_node_options: HashMap::new(),
            drag_start_listeners: HashMap::new(),
            drop_listeners: HashMap::new(),
            drag_start_source_ids: None,
            drag_enter_target_ids: Vec::new(),
            drag_over_target_ids: Vec::new(),
            drop_target_ids: Vec::new(),
            enter_leave: EnterLeaveCounter::default(),
            native: None,
            current_drag_source_node: None,
            probe_timeout: None,
            probe_armed: false,
            alt_key_pressed: false,
            last_client_offset: None,
            hover_frame: None,
            hover_target_ids: Vec::new(),
        }
    }
}

struct Inner<E: Html5Environment> {
    core: DragDropCore,
    env: E,
    options: Html5Options<E::Node>,
    state: RefCell<DragState<E::Node>>,
}

/// Drag and drop over the browser's native drag events.
///
/// The host forwards `dragstart`, `dragend`, `dragenter`, `dragleave`,
/// `dragover`, `drop` and `mousemove` to [`handle_event`](Self::handle_event)
/// for any node inside the root. The backend replays DOM propagation itself:
/// root capture listeners first, then the listeners of connected nodes from
/// the event target outward, then root bubble listeners.
///
/// ```
/// use std::rc::Rc;
/// use understory_dnd::scheduler::LocalScheduler;
/// use understory_dnd::DragDropManager;
/// use understory_dnd_html5::{Html5Backend, Html5Environment, Html5Options};
/// # use understory_dnd_html5::kurbo::{Point, Size};
/// # #[derive(Debug)]
/// # struct NoDocument;
/// # impl Html5Environment for NoDocument {
/// #     type Node = u32;
/// #     fn root(&self) -> Option<u32> { None }
/// #     fn parent(&self, _: &u32) -> Option<u32> { None }
/// #     fn is_in_document(&self, _: &u32) -> bool { false }
/// #     fn client_offset(&self, _: &u32) -> Option<Point> { None }
/// #     fn offset_size(&self, _: &u32) -> Size { Size::ZERO }
/// #     fn image_size(&self, _: &u32) -> Option<Size> { None }
/// #     fn set_draggable(&self, _: &u32, _: bool) {}
/// #     fn has_draggable_attribute(&self, _: &u32) -> bool { false }
/// #     fn claim_root(&self, _: &u32) -> bool { true }
/// #     fn release_root(&self, _: &u32) {}
/// # }
///
/// let manager = DragDropManager::new(Rc::new(LocalScheduler::new()), |core| {
///     Html5Backend::new(core, NoDocument, Html5Options::default())
/// });
/// assert!(!manager.backend().is_set_up());
/// ```
pub struct Html5Backend<E: Html5Environment> {
    inner: Rc<Inner<E>>,
}

impl<E: Html5Environment> fmt::Debug for Html5Backend<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("Html5Backend")
            .field("root", &state.root)
            .field("sources", &state.source_nodes.len())
            .field("targets", &state.drop_listeners.len())
            .field("native", &state.native.as_ref().map(|n| n.id))
            .finish_non_exhaustive()
    }
}

impl<E: Html5Environment + 'static> Html5Backend<E> {
    /// Creates the backend. Pass this from the closure given to
    /// [`DragDropManager::new`](understory_dnd::DragDropManager::new).
    pub fn new(core: DragDropCore, env: E, options: Html5Options<E::Node>) -> Self {
        Self {
            inner: Rc::new(Inner {
                core,
                env,
                options,
                state: RefCell::new(DragState::default()),
            }),
        }
    }

    /// The host environment.
    #[must_use]
    pub fn environment(&self) -> &E {
        &self.inner.env
    }

    /// Whether listeners are installed.
    #[must_use]
    pub fn is_set_up(&self) -> bool {
        self.inner.state.borrow().root.is_some()
    }

    /// Whether the current drag carries a native item from outside the
    /// document.
    #[must_use]
    pub fn is_dragging_native_item(&self) -> bool {
        self.inner.is_dragging_native_item()
    }

    /// Feeds one native event through the capture, node and bubble listeners.
    ///
    /// Events are ignored while the backend is not set up or when their
    /// target lies outside the root.
    pub fn handle_event(&self, event: &mut NativeDragEvent<'_, E::Node>) -> Result<(), DndError> {
        let Some(root) = self.inner.state.borrow().root.clone() else {
            return Ok(());
        };
        if !self.inner.env.contains(&root, &event.target) {
            return Ok(());
        }
        log::trace!("native {:?} on {:?}", event.kind, event.target);
        Inner::handle_event(&self.inner, event)
    }
}

impl<E: Html5Environment + 'static> Inner<E> {
    fn handle_event(
        this: &Rc<Self>,
        event: &mut NativeDragEvent<'_, E::Node>,
    ) -> Result<(), DndError> {
        match event.kind {
            DragEventKind::DragStart => {
                this.drag_start_capture();
                this.replay_node_listeners(event);
                Self::drag_start(this, event)
            }
            DragEventKind::DragEnd => this.drag_end_capture(),
            DragEventKind::DragEnter => {
                this.drag_enter_capture(event)?;
                this.replay_node_listeners(event);
                this.drag_enter(event)
            }
            DragEventKind::DragLeave => {
                Self::drag_leave_capture(this, event);
                Ok(())
            }
            DragEventKind::DragOver => {
                this.drag_over_capture(event);
                this.replay_node_listeners(event);
                Self::drag_over(this, event)
            }
            DragEventKind::Drop => {
                this.drop_capture(event);
                this.replay_node_listeners(event);
                Self::drop(this, event)
            }
            DragEventKind::MouseMove => {
                if this.state.borrow().probe_armed {
                    this.end_drag_if_source_was_removed()?;
                }
                Ok(())
            }
        }
    }

    /// Runs the per-node listeners from the target outward. Each listener
    /// prepends its id, so the collected lists end up outermost first.
    fn replay_node_listeners(&self, event: &NativeDragEvent<'_, E::Node>) {
        let mut state = self.state.borrow_mut();
        let root = state.root.clone();
        let mut node = Some(event.target.clone());
        while let Some(current) = node {
            match event.kind {
                DragEventKind::DragStart => {
                    if !event.is_default_prevented() {
                        let ids = state.drag_start_listeners.get(&current).cloned();
                        if let Some(ids) = ids {
                            let list = state.drag_start_source_ids.get_or_insert_with(Vec::new);
                            for id in ids {
                                list.insert(0, id);
                            }
                        }
                    }
                }
                DragEventKind::DragEnter | DragEventKind::DragOver | DragEventKind::Drop => {
                    let ids = state.drop_listeners.get(&current).cloned();
                    if let Some(ids) = ids {
                        let list = match event.kind {
                            DragEventKind::DragEnter => &mut state.drag_enter_target_ids,
                            DragEventKind::DragOver => &mut state.drag_over_target_ids,
                            _ => &mut state.drop_target_ids,
                        };
                        for id in ids {
                            list.insert(0, id);
                        }
                    }
                }
                _ => {}
            }
            if root.as_ref() == Some(&current) {
                break;
            }
            node = self.env.parent(&current);
        }
    }

    fn is_dragging_native_item(&self) -> bool {
        self.core
            .monitor()
            .item_type()
            .is_some_and(|t| NativeKind::from_item_type(&t).is_some())
    }

    fn source_client_offset(&self, source_id: HandlerId) -> Option<Point> {
        let node = self.state.borrow().source_nodes.get(&source_id).cloned()?;
        self.env.client_offset(&node)
    }

    fn current_drop_effect(&self) -> DropEffect {
        if self.is_dragging_native_item() {
            return DropEffect::Copy;
        }
        let state = self.state.borrow();
        let configured = self
            .core
            .monitor()
            .source_id()
            .and_then(|id| state.source_node_options.get(&id))
            .and_then(|options| options.drop_effect);
        configured.unwrap_or(if state.alt_key_pressed {
            DropEffect::Copy
        } else {
            DropEffect::Move
        })
    }

    fn current_preview_options(&self) -> PreviewOptions {
        let state = self.state.borrow();
        self.core
            .monitor()
            .source_id()
            .and_then(|id| state.source_preview_node_options.get(&id).copied())
            .unwrap_or_default()
    }

    fn can_drop_on_any(&self, target_ids: &[HandlerId]) -> Result<bool, DndError> {
        for &id in target_ids {
            if self.core.monitor().can_drop_on_target(id)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn begin_drag_native_item(
        &self,
        kind: NativeKind,
        event: &NativeDragEvent<'_, E::Node>,
    ) -> Result<(), DndError> {
        self.clear_current_drag_source_node();
        let source = Rc::new(NativeDragSource::new(kind));
        let item = source.item().clone();
        item.load(event.data_transfer());
        let id = self.core.registry().add_source(kind.item_type(), source)?;
        self.state.borrow_mut().native = Some(NativeDrag { id, item });
        log::debug!("native {kind:?} drag entered the document");
        self.core.actions().begin_drag(&[id], BeginDragOptions::default())
    }

    fn end_drag_native_item(&self) -> Result<(), DndError> {
        if !self.is_dragging_native_item() {
            return Ok(());
        }
        self.core.actions().end_drag()?;
        let native = self.state.borrow_mut().native.take();
        if let Some(native) = native {
            self.core.registry().remove_source(native.id)?;
        }
        Ok(())
    }

    fn load_native_data(&self, event: &NativeDragEvent<'_, E::Node>) {
        if !self.is_dragging_native_item() {
            return;
        }
        let item = self.state.borrow().native.as_ref().map(|n| n.item.clone());
        if let Some(item) = item {
            item.load(event.data_transfer());
        }
    }

    fn set_current_drag_source_node(this: &Rc<Self>, node: E::Node) {
        this.clear_current_drag_source_node();
        let weak = Rc::downgrade(this);
        let id = this.core.scheduler().set_timeout(
            SOURCE_REMOVAL_PROBE_DELAY,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    let mut state = inner.state.borrow_mut();
                    state.probe_timeout = None;
                    state.probe_armed = state.root.is_some();
                }
            }),
        );
        let mut state = this.state.borrow_mut();
        state.current_drag_source_node = Some(node);
        state.probe_timeout = Some(id);
    }

    /// Returns `true` if a source node was being tracked.
    fn clear_current_drag_source_node(&self) -> bool {
        let mut state = self.state.borrow_mut();
        if state.current_drag_source_node.take().is_none() {
            return false;
        }
        if let Some(id) = state.probe_timeout.take() {
            self.core.scheduler().clear_timeout(id);
        }
        state.probe_armed = false;
        true
    }

    fn end_drag_if_source_was_removed(&self) -> Result<(), DndError> {
        let node = self.state.borrow().current_drag_source_node.clone();
        let Some(node) = node else {
            return Ok(());
        };
        if self.env.is_in_document(&node) {
            return Ok(());
        }
        if self.clear_current_drag_source_node() && self.core.monitor().is_dragging() {
            log::debug!("drag source node left the document; ending the drag");
            self.core.actions().end_drag()?;
        }
        self.cancel_hover();
        Ok(())
    }

    fn cancel_hover(&self) {
        let frame = self.state.borrow_mut().hover_frame.take();
        if let Some(id) = frame {
            self.core.scheduler().cancel_animation_frame(id);
        }
    }

    fn drag_start_capture(&self) {
        self.clear_current_drag_source_node();
        self.state.borrow_mut().drag_start_source_ids = Some(Vec::new());
    }

    fn drag_start(
        this: &Rc<Self>,
        event: &mut NativeDragEvent<'_, E::Node>,
    ) -> Result<(), DndError> {
        if event.is_default_prevented() {
            return Ok(());
        }
        let source_ids = this
            .state
            .borrow_mut()
            .drag_start_source_ids
            .take()
            .unwrap_or_default();
        let monitor = this.core.monitor();
        let actions = this.core.actions();

        if monitor.is_dragging() {
            // A previous drag never received its dragend.
            actions.end_drag()?;
            this.cancel_hover();
        }

        let resolve = |id: HandlerId| this.source_client_offset(id);
        actions.begin_drag(
            &source_ids,
            BeginDragOptions::default()
                .with_publish_source(false)
                .with_client_offset(event.client_offset, &resolve),
        )?;

        if monitor.is_dragging() {
            this.set_drag_image(event);
            if let Some(dt) = event.data_transfer.as_deref_mut() {
                // Firefox will not start the drag without some data.
                if !dt.set_data("application/json", "{}") {
                    log::warn!("the browser rejected drag data; the drag may not start");
                }
            }
            Self::set_current_drag_source_node(this, event.target.clone());

            if this.current_preview_options().capture_dragging_state {
                actions.publish_drag_source()?;
            } else {
                // Publishing now would let the browser capture the preview in
                // its dragging style; wait for the next turn.
                let weak = Rc::downgrade(this);
                this.core.scheduler().set_timeout(
                    Duration::ZERO,
                    Box::new(move || {
                        if let Some(inner) = weak.upgrade() {
                            if let Err(err) = inner.core.actions().publish_drag_source() {
                                log::warn!("publishing the drag source failed: {err}");
                            }
                        }
                    }),
                );
            }
        } else if let Some(kind) = NativeKind::matching(event.data_transfer()) {
            this.begin_drag_native_item(kind, event)?;
        } else if event.data_transfer.as_ref().is_some_and(|dt| dt.types().is_none())
            && !this.env.has_draggable_attribute(&event.target)
        {
            // Safari reports no types for text selections dragged without a
            // draggable element; let the browser handle it.
        } else {
            // Nothing to drag; keep the browser from starting a native drag.
            event.prevent_default();
        }
        Ok(())
    }

    fn set_drag_image(&self, event: &mut NativeDragEvent<'_, E::Node>) {
        let Some(dt) = event.data_transfer.as_deref_mut() else {
            return;
        };
        if !dt.supports_drag_image() {
            log::warn!("drag images are not supported; using the browser default");
            return;
        }
        let Some(source_id) = self.core.monitor().source_id() else {
            return;
        };
        let (source_node, preview) = {
            let state = self.state.borrow();
            let source_node = state.source_nodes.get(&source_id).cloned();
            let preview = state
                .source_preview_nodes
                .get(&source_id)
                .cloned()
                .or_else(|| source_node.clone());
            (source_node, preview)
        };
        let (Some(source_node), Some(preview)) = (source_node, preview) else {
            return;
        };
        let options = self.current_preview_options();
        let offset = drag_preview_offset(
            &self.env,
            &source_node,
            &preview,
            event.client_offset,
            &options,
        );
        dt.set_drag_image(&preview, offset);
    }

    fn drag_end_capture(&self) -> Result<(), DndError> {
        if self.clear_current_drag_source_node() && self.core.monitor().is_dragging() {
            self.core.actions().end_drag()?;
        }
        self.cancel_hover();
        Ok(())
    }

    fn drag_enter_capture(&self, event: &NativeDragEvent<'_, E::Node>) -> Result<(), DndError> {
        self.state.borrow_mut().drag_enter_target_ids.clear();
        self.load_native_data(event);

        let is_first_enter = {
            let env = &self.env;
            self.state.borrow_mut().enter_leave.enter(
                event.target.clone(),
                |n| env.is_in_document(n),
                |a, n| env.contains(a, n),
            )
        };
        if !is_first_enter || self.core.monitor().is_dragging() {
            return Ok(());
        }
        if let Some(kind) = NativeKind::matching(event.data_transfer()) {
            self.begin_drag_native_item(kind, event)?;
        }
        Ok(())
    }

    fn drag_enter(&self, event: &mut NativeDragEvent<'_, E::Node>) -> Result<(), DndError> {
        let target_ids = core::mem::take(&mut self.state.borrow_mut().drag_enter_target_ids);
        if !self.core.monitor().is_dragging() {
            return Ok(());
        }
        self.state.borrow_mut().alt_key_pressed = event.alt_key;
        if !target_ids.is_empty() {
            self.core
                .actions()
                .hover(&target_ids, Some(event.client_offset))?;
        }
        if self.can_drop_on_any(&target_ids)? {
            event.prevent_default();
            event.set_drop_effect(self.current_drop_effect());
        }
        Ok(())
    }

    fn drag_over_capture(&self, event: &NativeDragEvent<'_, E::Node>) {
        self.state.borrow_mut().drag_over_target_ids.clear();
        self.load_native_data(event);
    }

    fn drag_over(
        this: &Rc<Self>,
        event: &mut NativeDragEvent<'_, E::Node>,
    ) -> Result<(), DndError> {
        let target_ids = core::mem::take(&mut this.state.borrow_mut().drag_over_target_ids);
        if !this.core.monitor().is_dragging() {
            event.prevent_default();
            event.set_drop_effect(DropEffect::None);
            return Ok(());
        }

        let needs_frame = {
            let mut state = this.state.borrow_mut();
            state.alt_key_pressed = event.alt_key;
            state.last_client_offset = Some(event.client_offset);
            state.hover_target_ids.clone_from(&target_ids);
            state.hover_frame.is_none()
        };
        if needs_frame {
            let weak = Rc::downgrade(this);
            let id = this.core.scheduler().request_animation_frame(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.flush_hover();
                }
            }));
            this.state.borrow_mut().hover_frame = Some(id);
        }

        if this.can_drop_on_any(&target_ids)? {
            event.prevent_default();
            event.set_drop_effect(this.current_drop_effect());
        } else if this.is_dragging_native_item() {
            // Keep the browser from opening the file; the effect stays as is.
            event.prevent_default();
        } else {
            event.prevent_default();
            event.set_drop_effect(DropEffect::None);
        }
        Ok(())
    }

    /// Dispatches the hover collected since the last frame.
    fn flush_hover(&self) {
        let (target_ids, offset) = {
            let mut state = self.state.borrow_mut();
            state.hover_frame = None;
            (
                core::mem::take(&mut state.hover_target_ids),
                state.last_client_offset,
            )
        };
        let monitor = self.core.monitor();
        if monitor.is_dragging() && !monitor.did_drop() {
            if let Err(err) = self.core.actions().hover(&target_ids, offset) {
                log::warn!("coalesced hover failed: {err}");
            }
        }
    }

    fn drag_leave_capture(this: &Rc<Self>, event: &mut NativeDragEvent<'_, E::Node>) {
        if this.is_dragging_native_item() {
            event.prevent_default();
        }
        let is_last_leave = {
            let env = &this.env;
            this.state
                .borrow_mut()
                .enter_leave
                .leave(&event.target, |n| env.is_in_document(n))
        };
        if !is_last_leave {
            return;
        }
        if this.is_dragging_native_item() {
            // A drop may still follow the leave within this turn.
            let weak = Rc::downgrade(this);
            this.core.scheduler().set_timeout(
                Duration::ZERO,
                Box::new(move || {
                    if let Some(inner) = weak.upgrade() {
                        if let Err(err) = inner.end_drag_native_item() {
                            log::warn!("ending the native drag failed: {err}");
                        }
                    }
                }),
            );
        }
        this.cancel_hover();
    }

    fn drop_capture(&self, event: &mut NativeDragEvent<'_, E::Node>) {
        self.state.borrow_mut().drop_target_ids.clear();
        if self.is_dragging_native_item() {
            event.prevent_default();
            self.load_native_data(event);
        } else if NativeKind::matching(event.data_transfer()).is_some() {
            // Unhandled native payload; keep the browser from navigating to it.
            event.prevent_default();
        }
        self.state.borrow_mut().enter_leave.reset();
    }

    fn drop(&self, event: &mut NativeDragEvent<'_, E::Node>) -> Result<(), DndError> {
        let target_ids = core::mem::take(&mut self.state.borrow_mut().drop_target_ids);
        let monitor = self.core.monitor();
        let actions = self.core.actions();
        if monitor.is_dragging() && !monitor.did_drop() {
            actions.hover(&target_ids, Some(event.client_offset))?;
            let mut options = DropResult::new();
            options.insert(
                "drop_effect".into(),
                self.current_drop_effect().as_str().into(),
            );
            actions.drop(&options)?;
        }
        if self.is_dragging_native_item() {
            self.end_drag_native_item()?;
        } else if monitor.is_dragging() {
            actions.end_drag()?;
        }
        self.cancel_hover();
        Ok(())
    }
}

fn remove_listener<N: Eq + Hash>(
    listeners: &mut HashMap<N, Ids>,
    node: &N,
    id: HandlerId,
) {
    if let Some(ids) = listeners.get_mut(node) {
        ids.retain(|i| *i != id);
        if ids.is_empty() {
            listeners.remove(node);
        }
    }
}

impl<E: Html5Environment + 'static> Backend for Html5Backend<E> {
    type Node = E::Node;
    type SourceOptions = SourceOptions;
    type PreviewOptions = PreviewOptions;
    type TargetOptions = ();

    fn setup(&self) -> Result<(), DndError> {
        let inner = &self.inner;
        let Some(root) = inner.options.root.clone().or_else(|| inner.env.root()) else {
            log::debug!("no document; the HTML5 backend stays inert");
            return Ok(());
        };
        if !inner.env.claim_root(&root) {
            return Err(DndError::BackendAlreadySetUp("HTML5"));
        }
        inner.state.borrow_mut().root = Some(root);
        Ok(())
    }

    fn teardown(&self) {
        let inner = &self.inner;
        let Some(root) = inner.state.borrow_mut().root.take() else {
            return;
        };
        inner.env.release_root(&root);
        inner.clear_current_drag_source_node();
        inner.cancel_hover();
    }

    fn connect_drag_source(
        &self,
        source_id: HandlerId,
        node: E::Node,
        options: SourceOptions,
    ) -> Disconnect {
        {
            let mut state = self.inner.state.borrow_mut();
            state.source_nodes.insert(source_id, node.clone());
            state.source_node_options.insert(source_id, options);
            state
                .drag_start_listeners
                .entry(node.clone())
                .or_default()
                .push(source_id);
        }
        self.inner.env.set_draggable(&node, true);

        let weak = Rc::downgrade(&self.inner);
        Disconnect::new(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            {
                let mut state = inner.state.borrow_mut();
                remove_listener(&mut state.drag_start_listeners, &node, source_id);
                state.source_nodes.remove(&source_id);
                state.source_node_options.remove(&source_id);
            }
            inner.env.set_draggable(&node, false);
        })
    }

    fn connect_drag_preview(
        &self,
        source_id: HandlerId,
        node: E::Node,
        options: PreviewOptions,
    ) -> Disconnect {
        {
            let mut state = self.inner.state.borrow_mut();
            state.source_preview_nodes.insert(source_id, node);
            state.source_preview_node_options.insert(source_id, options);
        }
        let weak: Weak<Inner<E>> = Rc::downgrade(&self.inner);
        Disconnect::new(move || {
            if let Some(inner) = weak.upgrade() {
                let mut state = inner.state.borrow_mut();
                state.source_preview_nodes.remove(&source_id);
                state.source_preview_node_options.remove(&source_id);
            }
        })
    }

    fn connect_drop_target(
        &self,
        target_id: HandlerId,
        node: E::Node,
        _options: (),
    ) -> Disconnect {
        self.inner
            .state
            .borrow_mut()
            .drop_listeners
            .entry(node.clone())
            .or_default()
            .push(target_id);
        let weak = Rc::downgrade(&self.inner);
        Disconnect::new(move || {
            if let Some(inner) = weak.upgrade() {
                remove_listener(&mut inner.state.borrow_mut().drop_listeners, &node, target_id);
            }
        })
    }

    fn profile(&self) -> Profile {
        let state = self.inner.state.borrow();
        Vec::from([
            ("source_preview_nodes", state.source_preview_nodes.len()),
            (
                "source_preview_node_options",
                state.source_preview_node_options.len(),
            ),
            ("source_node_options", state.source_node_options.len()),
            ("source_nodes", state.source_nodes.len()),
            (
                "drag_start_source_ids",
                state.drag_start_source_ids.as_ref().map_or(0, Vec::len),
            ),
            ("drop_target_ids", state.drop_target_ids.len()),
            ("drag_enter_target_ids", state.drag_enter_target_ids.len()),
            ("drag_over_target_ids", state.drag_over_target_ids.len()),
            ("drop_listener_nodes", state.drop_listeners.len()),
        ])
    }
}

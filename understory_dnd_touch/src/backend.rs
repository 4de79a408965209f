// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The touch and mouse backend.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;
use core::hash::Hash;

use hashbrown::HashMap;
use kurbo::Point;
use smallvec::SmallVec;
use understory_dnd::scheduler::TaskId;
use understory_dnd::{
    Backend, BeginDragOptions, Disconnect, DndError, DragDropCore, DropResult, HandlerId, Profile,
};

use crate::environment::TouchEnvironment;
use crate::event::{PointerEvent, PointerEventKind, TouchPoint};
use crate::math::in_angle_ranges;
use crate::options::{PreviewOptions, TouchOptions};

type Ids = SmallVec<[HandlerId; 2]>;

/// Where a gesture started, captured when the press begins so a delayed start
/// can record it later.
struct StartPoint<N> {
    position: Option<Point>,
    is_touch: bool,
    fallback: Option<TouchPoint<N>>,
}

impl<N: Clone + PartialEq> StartPoint<N> {
    fn of(event: &PointerEvent<N>) -> Self {
        Self {
            position: event.position(None),
            is_touch: event.kind.is_touch(),
            fallback: event.target_touches.first().cloned(),
        }
    }
}

struct GestureState<N> {
    root: Option<N>,

    source_nodes: HashMap<HandlerId, N>,
    source_preview_nodes: HashMap<HandlerId, N>,
    source_preview_node_options: HashMap<HandlerId, PreviewOptions>,
    /// Connected targets in connection order.
    target_nodes: Vec<(HandlerId, N)>,

    /// Node-level start listeners, in connection order.
    move_start_listeners: HashMap<N, Ids>,

    move_start_source_ids: Option<Vec<HandlerId>>,
    drag_over_target_ids: Vec<HandlerId>,

    /// Position of the press that may turn into a drag.
    mouse_client_offset: Option<Point>,
    last_target_touch_fallback: Option<TouchPoint<N>>,
    waiting_for_delay: bool,
    start_timeout: Option<TaskId>,
    is_scrolling: bool,

    dragged_source_node: Option<N>,
    /// Parent whose child list is watched for the dragged node's removal.
    observed_parent: Option<N>,
}

impl<N> Default for GestureState<N> {
    fn default() -> Self {
        Self {
            root: None,
            source_nodes: HashMap::new(),
            source_preview_nodes: HashMap::new(),
            source_preview_node_options: HashMap::new(),
            target_nodes: Vec::new(),
            move_start_listeners: HashMap::new(),
            move_start_source_ids: None,
            drag_over_target_ids: Vec::new(),
            mouse_client_offset: None,
            last_target_touch_fallback: None,
            waiting_for_delay: false,
            start_timeout: None,
            is_scrolling: false,
            dragged_source_node: None,
            observed_parent: None,
        }
    }
}

impl<N: PartialEq> GestureState<N> {
    fn target_node(&self, id: HandlerId) -> Option<&N> {
        self.target_nodes
            .iter()
            .find(|(target_id, _)| *target_id == id)
            .map(|(_, node)| node)
    }
}

struct Inner<E: TouchEnvironment> {
    core: DragDropCore,
    env: E,
    options: TouchOptions<E::Node>,
    state: RefCell<GestureState<E::Node>>,
}

/// Drag and drop driven by touch, mouse and keyboard events.
///
/// Unlike [native drags](https://html.spec.whatwg.org/multipage/dnd.html),
/// nothing tells the backend which node the pointer is over; drop targets are
/// found by hit-testing the pointer position with
/// [`TouchEnvironment::elements_from_point`] on every move.
///
/// A press on a connected source arms the gesture. It becomes a drag once the
/// start delay has elapsed and the pointer has moved further than the touch
/// slop, unless the first movement fell in one of the scroll angle ranges, in
/// which case the whole gesture is treated as a scroll.
///
/// ```
/// use std::rc::Rc;
/// use understory_dnd::scheduler::LocalScheduler;
/// use understory_dnd::DragDropManager;
/// use understory_dnd_touch::{TouchBackend, TouchEnvironment, TouchOptions};
/// # use understory_dnd_touch::kurbo::Point;
/// # #[derive(Debug)]
/// # struct NoDocument;
/// # impl TouchEnvironment for NoDocument {
/// #     type Node = u32;
/// #     fn root(&self) -> Option<u32> { None }
/// #     fn parent(&self, _: &u32) -> Option<u32> { None }
/// #     fn elements_from_point(&self, _: Point) -> Vec<u32> { Vec::new() }
/// #     fn client_offset(&self, _: &u32) -> Option<Point> { None }
/// #     fn hide_and_append_to_body(&self, _: &u32) {}
/// #     fn claim_root(&self, _: &u32) -> bool { true }
/// #     fn release_root(&self, _: &u32) {}
/// # }
///
/// let options = TouchOptions::default().with_mouse_events(true).with_touch_slop(4.0);
/// let manager = DragDropManager::new(Rc::new(LocalScheduler::new()), |core| {
///     TouchBackend::new(core, NoDocument, options)
/// });
/// assert!(!manager.backend().is_set_up());
/// ```
pub struct TouchBackend<E: TouchEnvironment> {
    inner: Rc<Inner<E>>,
}

impl<E: TouchEnvironment> fmt::Debug for TouchBackend<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("TouchBackend")
            .field("root", &state.root)
            .field("sources", &state.source_nodes.len())
            .field("targets", &state.target_nodes.len())
            .field("is_scrolling", &state.is_scrolling)
            .finish_non_exhaustive()
    }
}

impl<E: TouchEnvironment + 'static> TouchBackend<E> {
    /// Creates the backend. Pass this from the closure given to
    /// [`DragDropManager::new`](understory_dnd::DragDropManager::new).
    pub fn new(core: DragDropCore, env: E, options: TouchOptions<E::Node>) -> Self {
        Self {
            inner: Rc::new(Inner {
                core,
                env,
                options,
                state: RefCell::new(GestureState::default()),
            }),
        }
    }

    /// The host environment.
    #[must_use]
    pub fn environment(&self) -> &E {
        &self.inner.env
    }

    /// The options the backend was created with.
    #[must_use]
    pub fn options(&self) -> &TouchOptions<E::Node> {
        &self.inner.options
    }

    /// Whether listeners are installed.
    #[must_use]
    pub fn is_set_up(&self) -> bool {
        self.inner.state.borrow().root.is_some()
    }

    /// Whether the current gesture was classified as a scroll.
    #[must_use]
    pub fn is_scrolling(&self) -> bool {
        self.inner.state.borrow().is_scrolling
    }

    /// Feeds one event through the capture, node and bubble listeners.
    ///
    /// Events of a disabled kind are ignored, as are all events while the
    /// backend is not set up or whose target lies outside the root.
    pub fn handle_event(&self, event: &mut PointerEvent<E::Node>) -> Result<(), DndError> {
        if !self.inner.listens_to(event.kind) {
            return Ok(());
        }
        let Some(root) = self.inner.state.borrow().root.clone() else {
            return Ok(());
        };
        if !self.inner.env.contains(&root, &event.target) {
            return Ok(());
        }
        log::trace!("pointer {:?} on {:?}", event.kind, event.target);
        Inner::handle_event(&self.inner, event)
    }

    /// Reports that the children of `parent` changed.
    ///
    /// If `parent` held the dragged source node and the node is now detached,
    /// it is hidden and re-attached to the document body so the touch sequence
    /// it started keeps delivering events.
    pub fn notify_child_list_changed(&self, parent: &E::Node) {
        self.inner.child_list_changed(parent);
    }
}

impl<E: TouchEnvironment + 'static> Inner<E> {
    fn listens_to(&self, kind: PointerEventKind) -> bool {
        let options = &self.options;
        match kind {
            PointerEventKind::KeyDown => options.enable_keyboard_events,
            PointerEventKind::ContextMenu => {
                options.enable_mouse_events && !options.ignore_context_menu
            }
            kind if kind.is_touch() => options.enable_touch_events,
            _ => options.enable_mouse_events,
        }
    }

    fn handle_event(this: &Rc<Self>, event: &mut PointerEvent<E::Node>) -> Result<(), DndError> {
        match event.kind {
            PointerEventKind::MouseDown | PointerEventKind::TouchStart => {
                this.move_start_capture(event);
                this.replay_move_start_listeners(event);
                Self::move_start(this, event);
                Ok(())
            }
            PointerEventKind::MouseMove | PointerEventKind::TouchMove => {
                this.state.borrow_mut().drag_over_target_ids.clear();
                this.replay_move_listeners(event);
                this.move_top(event)
            }
            PointerEventKind::MouseUp
            | PointerEventKind::TouchEnd
            | PointerEventKind::ContextMenu => this.move_end_capture(event),
            PointerEventKind::KeyDown => this.cancel_on_escape(event),
        }
    }

    fn source_client_offset(&self, source_id: HandlerId) -> Option<Point> {
        let node = self.state.borrow().source_nodes.get(&source_id).cloned()?;
        self.env.client_offset(&node)
    }

    fn move_start_capture(&self, event: &PointerEvent<E::Node>) {
        if event.should_start_drag() {
            self.state.borrow_mut().move_start_source_ids = Some(Vec::new());
        }
    }

    /// Runs the source listeners from the target outward, prepending ids so
    /// the list ends up outermost first.
    fn replay_move_start_listeners(&self, event: &PointerEvent<E::Node>) {
        let mut state = self.state.borrow_mut();
        let root = state.root.clone();
        let mut node = Some(event.target.clone());
        while let Some(current) = node {
            let ids = state.move_start_listeners.get(&current).cloned();
            if let (Some(ids), Some(list)) = (ids, state.move_start_source_ids.as_mut()) {
                for id in ids {
                    list.insert(0, id);
                }
            }
            if root.as_ref() == Some(&current) {
                break;
            }
            node = self.env.parent(&current);
        }
    }

    fn move_start(this: &Rc<Self>, event: &PointerEvent<E::Node>) {
        if !event.should_start_drag() {
            return;
        }
        let options = &this.options;
        let uses_delay = !options.delay_touch_start.is_zero() || !options.delay_mouse_start.is_zero();
        if !uses_delay {
            this.record_start(StartPoint::of(event));
            return;
        }

        let delay = if event.kind == PointerEventKind::TouchStart {
            options.delay_touch_start
        } else {
            options.delay_mouse_start
        };
        this.clear_start_timeout();
        let start = StartPoint::of(event);
        let weak = Rc::downgrade(this);
        let id = this.core.scheduler().set_timeout(
            delay,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.state.borrow_mut().start_timeout = None;
                    inner.record_start(start);
                }
            }),
        );
        let mut state = this.state.borrow_mut();
        state.start_timeout = Some(id);
        state.waiting_for_delay = true;
    }

    fn record_start(&self, start: StartPoint<E::Node>) {
        let mut state = self.state.borrow_mut();
        if let Some(position) = start.position {
            if start.is_touch {
                state.last_target_touch_fallback = start.fallback;
            }
            state.mouse_client_offset = Some(position);
        }
        state.waiting_for_delay = false;
    }

    fn clear_start_timeout(&self) {
        let timeout = self.state.borrow_mut().start_timeout.take();
        if let Some(id) = timeout {
            self.core.scheduler().clear_timeout(id);
        }
    }

    /// Runs the per-target move listeners in connection order. A target
    /// collects the move when the topmost element under the pointer is its
    /// node or lies inside it.
    fn replay_move_listeners(&self, event: &PointerEvent<E::Node>) {
        if !self.core.monitor().is_dragging() {
            return;
        }
        let position = if event.kind.is_touch() {
            event.touches.first().map(|touch| touch.client_offset)
        } else {
            Some(event.client_offset)
        };
        let Some(hit) = position.and_then(|p| self.env.element_from_point(p)) else {
            return;
        };
        let mut state = self.state.borrow_mut();
        let matching: Vec<HandlerId> = state
            .target_nodes
            .iter()
            .filter(|(_, node)| *node == hit || self.env.contains(node, &hit))
            .map(|(id, _)| *id)
            .collect();
        for id in matching {
            state.drag_over_target_ids.insert(0, id);
        }
    }

    fn move_top(&self, event: &mut PointerEvent<E::Node>) -> Result<(), DndError> {
        self.clear_start_timeout();
        if self.state.borrow().waiting_for_delay {
            return Ok(());
        }
        let fallback = self.state.borrow().last_target_touch_fallback.clone();
        let Some(position) = event.position(fallback.as_ref()) else {
            return Ok(());
        };
        let monitor = self.core.monitor();
        let actions = self.core.actions();

        {
            let mut state = self.state.borrow_mut();
            let start = state.mouse_client_offset.unwrap_or(Point::ZERO);
            if state.is_scrolling
                || (!monitor.is_dragging()
                    && in_angle_ranges(start, position, &self.options.scroll_angle_ranges))
            {
                if !state.is_scrolling {
                    log::debug!("gesture classified as a scroll");
                }
                state.is_scrolling = true;
                return Ok(());
            }
        }

        if !monitor.is_dragging() {
            let begin = {
                let mut state = self.state.borrow_mut();
                match state.mouse_client_offset {
                    Some(start)
                        if state.move_start_source_ids.is_some()
                            && start.distance(position) > self.options.touch_slop =>
                    {
                        state.move_start_source_ids.take().map(|ids| (start, ids))
                    }
                    _ => None,
                }
            };
            if let Some((start, source_ids)) = begin {
                let resolve = |id: HandlerId| self.source_client_offset(id);
                actions.begin_drag(
                    &source_ids,
                    BeginDragOptions::default()
                        .with_publish_source(false)
                        .with_client_offset(start, &resolve),
                )?;
            }
        }
        if !monitor.is_dragging() {
            return Ok(());
        }

        let source_node = monitor
            .source_id()
            .and_then(|id| self.state.borrow().source_nodes.get(&id).cloned());
        self.install_source_node_removal_observer(source_node.clone());
        actions.publish_drag_source()?;
        event.prevent_default();

        let target_ids = self.hovered_target_ids(position, source_node.as_ref());
        actions.hover(&target_ids, Some(position))
    }

    /// Drop targets under `position`, innermost last.
    fn hovered_target_ids(&self, position: Point, source_node: Option<&E::Node>) -> Vec<HandlerId> {
        let (over_nodes, targets) = {
            let state = self.state.borrow();
            let over_nodes: Vec<E::Node> = state
                .drag_over_target_ids
                .iter()
                .filter_map(|id| state.target_node(*id).cloned())
                .collect();
            (over_nodes, state.target_nodes.clone())
        };

        let elements = match &self.options.drop_target_elements_at_point {
            Some(elements_at_point) => elements_at_point(position, &over_nodes),
            None => self.env.elements_from_point(position),
        };

        // Zero-sized elements and SVG groups are never hit themselves; reach
        // them through the ancestors of what was hit.
        let mut extended: Vec<E::Node> = Vec::new();
        for element in elements {
            let mut current = Some(element);
            while let Some(node) = current {
                current = self.env.parent(&node);
                if !extended.contains(&node) {
                    extended.push(node);
                }
            }
        }

        let mut ids: Vec<HandlerId> = Vec::new();
        for node in extended.iter().filter(|node| over_nodes.contains(*node)) {
            let first = targets.iter().find(|(_, n)| n == node).map(|(id, _)| *id);
            if let Some(id) = first {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }

        if self.options.enable_hover_outside_target {
            if let Some(source) = source_node {
                let outside = targets
                    .iter()
                    .find(|(id, node)| !ids.contains(id) && self.env.contains(node, source))
                    .map(|(id, _)| *id);
                if let Some(id) = outside {
                    ids.insert(0, id);
                }
            }
        }

        ids.reverse();
        ids
    }

    fn move_end_capture(&self, event: &mut PointerEvent<E::Node>) -> Result<(), DndError> {
        {
            let mut state = self.state.borrow_mut();
            state.is_scrolling = false;
            state.last_target_touch_fallback = None;
        }
        if !event.should_end_drag() {
            return Ok(());
        }
        self.clear_start_timeout();

        let monitor = self.core.monitor();
        if !monitor.is_dragging() || monitor.did_drop() {
            self.state.borrow_mut().move_start_source_ids = None;
            return Ok(());
        }
        event.prevent_default();
        self.state.borrow_mut().mouse_client_offset = None;
        self.uninstall_source_node_removal_observer();

        let actions = self.core.actions();
        actions.drop(&DropResult::new())?;
        actions.end_drag()
    }

    fn cancel_on_escape(&self, event: &PointerEvent<E::Node>) -> Result<(), DndError> {
        if event.key.as_deref() != Some("Escape") || !self.core.monitor().is_dragging() {
            return Ok(());
        }
        log::debug!("drag cancelled with Escape");
        self.state.borrow_mut().mouse_client_offset = None;
        self.uninstall_source_node_removal_observer();
        self.core.actions().end_drag()
    }

    fn install_source_node_removal_observer(&self, node: Option<E::Node>) {
        let parent = node.as_ref().and_then(|n| self.env.parent(n));
        let mut state = self.state.borrow_mut();
        state.dragged_source_node = node;
        state.observed_parent = parent;
    }

    fn uninstall_source_node_removal_observer(&self) {
        let mut state = self.state.borrow_mut();
        state.dragged_source_node = None;
        state.observed_parent = None;
    }

    fn child_list_changed(&self, parent: &E::Node) {
        let node = {
            let state = self.state.borrow();
            if state.observed_parent.as_ref() != Some(parent) {
                return;
            }
            state.dragged_source_node.clone()
        };
        let Some(node) = node else {
            return;
        };
        if self.env.parent(&node).is_some() {
            return;
        }
        log::debug!("dragged source node {node:?} was removed; re-attaching it to the body");
        self.env.hide_and_append_to_body(&node);
        self.uninstall_source_node_removal_observer();
    }
}

fn remove_listener<N: Eq + Hash>(listeners: &mut HashMap<N, Ids>, node: &N, id: HandlerId) {
    if let Some(ids) = listeners.get_mut(node) {
        ids.retain(|i| *i != id);
        if ids.is_empty() {
            listeners.remove(node);
        }
    }
}

impl<E: TouchEnvironment + 'static> Backend for TouchBackend<E> {
    type Node = E::Node;
    type SourceOptions = ();
    type PreviewOptions = PreviewOptions;
    type TargetOptions = ();

    fn setup(&self) -> Result<(), DndError> {
        let inner = &self.inner;
        let Some(root) = inner.options.root.clone().or_else(|| inner.env.root()) else {
            log::debug!("no document; the touch backend stays inert");
            return Ok(());
        };
        if !inner.env.claim_root(&root) {
            return Err(DndError::BackendAlreadySetUp("touch"));
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
        {
            let mut state = inner.state.borrow_mut();
            state.mouse_client_offset = None;
            state.move_start_source_ids = None;
            state.waiting_for_delay = false;
            state.is_scrolling = false;
        }
        inner.clear_start_timeout();
        inner.uninstall_source_node_removal_observer();
    }

    fn connect_drag_source(&self, source_id: HandlerId, node: E::Node, _options: ()) -> Disconnect {
        {
            let mut state = self.inner.state.borrow_mut();
            state.source_nodes.insert(source_id, node.clone());
            state
                .move_start_listeners
                .entry(node.clone())
                .or_default()
                .push(source_id);
        }
        let weak = Rc::downgrade(&self.inner);
        Disconnect::new(move || {
            if let Some(inner) = weak.upgrade() {
                let mut state = inner.state.borrow_mut();
                remove_listener(&mut state.move_start_listeners, &node, source_id);
                state.source_nodes.remove(&source_id);
            }
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
        let weak = Rc::downgrade(&self.inner);
        Disconnect::new(move || {
            if let Some(inner) = weak.upgrade() {
                let mut state = inner.state.borrow_mut();
                state.source_preview_nodes.remove(&source_id);
                state.source_preview_node_options.remove(&source_id);
            }
        })
    }

    fn connect_drop_target(&self, target_id: HandlerId, node: E::Node, _options: ()) -> Disconnect {
        {
            let mut state = self.inner.state.borrow_mut();
            match state.target_nodes.iter_mut().find(|(id, _)| *id == target_id) {
                Some(entry) => entry.1 = node,
                None => state.target_nodes.push((target_id, node)),
            }
        }
        let weak = Rc::downgrade(&self.inner);
        Disconnect::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner
                    .state
                    .borrow_mut()
                    .target_nodes
                    .retain(|(id, _)| *id != target_id);
            }
        })
    }

    fn profile(&self) -> Profile {
        let state = self.inner.state.borrow();
        Vec::from([
            ("source_nodes", state.source_nodes.len()),
            ("source_preview_nodes", state.source_preview_nodes.len()),
            (
                "source_preview_node_options",
                state.source_preview_node_options.len(),
            ),
            ("target_nodes", state.target_nodes.len()),
            ("drag_over_target_ids", state.drag_over_target_ids.len()),
        ])
    }
}

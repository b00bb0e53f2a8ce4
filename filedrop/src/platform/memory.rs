//! In-memory platform
//!
//! A small element tree with bubbling event delivery, a virtual clock and a
//! local task pool. It backs headless hosts (no document, no window) and
//! drives every controller test: events are fired by hand, time only moves
//! through [`MemoryPlatform::advance`], and notifications are collected
//! instead of dispatched.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};
use std::time::Duration;

use futures::executor::{LocalPool, LocalSpawner};
use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;

use super::{Capabilities, Handler, ListenTarget, Platform};
use crate::event::{EventKind, Extraction};
use crate::notification::Notification;
use crate::options::PickerAttributes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryFile {
    pub name: String,
    pub mime: String,
    pub size: u64,
}

impl MemoryFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            size: 0,
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }
}

#[derive(Debug)]
struct EventData {
    kind: EventKind,
    target: Option<NodeId>,
    files: Vec<MemoryFile>,
    carries_files: bool,
    key: Option<String>,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
}

/// Event delivered by the memory platform. Clones share the
/// prevented/stopped flags, like references to one DOM event.
#[derive(Debug, Clone)]
pub struct MemoryEvent(Rc<EventData>);

impl MemoryEvent {
    fn new(kind: EventKind, target: Option<NodeId>) -> Self {
        Self(Rc::new(EventData {
            kind,
            target,
            files: Vec::new(),
            carries_files: false,
            key: None,
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
        }))
    }

    fn build(kind: EventKind, target: Option<NodeId>, files: Vec<MemoryFile>, key: Option<String>) -> Self {
        Self(Rc::new(EventData {
            kind,
            target,
            carries_files: !files.is_empty(),
            files,
            key,
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
        }))
    }

    /// Drag or drop carrying `files`; an empty list behaves like a text drag.
    pub fn drag(kind: EventKind, target: NodeId, files: Vec<MemoryFile>) -> Self {
        Self::build(kind, Some(target), files, None)
    }

    pub fn key(target: NodeId, key: impl Into<String>) -> Self {
        Self::build(EventKind::KeyDown, Some(target), Vec::new(), Some(key.into()))
    }

    pub fn click(target: NodeId) -> Self {
        Self::new(EventKind::Click, Some(target))
    }

    pub fn change(target: NodeId) -> Self {
        Self::new(EventKind::Change, Some(target))
    }

    pub fn focus() -> Self {
        Self::new(EventKind::Focus, None)
    }

    pub fn kind(&self) -> EventKind {
        self.0.kind
    }

    pub fn target_node(&self) -> Option<NodeId> {
        self.0.target
    }

    pub fn files(&self) -> &[MemoryFile] {
        &self.0.files
    }

    pub fn default_prevented(&self) -> bool {
        self.0.default_prevented.get()
    }

    pub fn propagation_stopped(&self) -> bool {
        self.0.propagation_stopped.get()
    }

    /// Same underlying event, not merely equal fields.
    pub fn same_event(&self, other: &MemoryEvent) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[derive(Debug)]
pub struct MemoryListener(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hop {
    Node(NodeId),
    Document,
    Window,
}

impl From<ListenTarget<'_, NodeId>> for Hop {
    fn from(target: ListenTarget<'_, NodeId>) -> Self {
        match target {
            ListenTarget::Element(node) => Hop::Node(*node),
            ListenTarget::Document => Hop::Document,
            ListenTarget::Window => Hop::Window,
        }
    }
}

struct Registration {
    hop: Hop,
    kind: EventKind,
    handler: Handler<MemoryEvent>,
}

#[derive(Debug, Default)]
struct Node {
    tag: String,
    input_type: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    tab_index: i32,
    hidden: bool,
    classes: BTreeSet<String>,
    multiple: bool,
    accept: Option<String>,
    autocomplete: Option<String>,
    files: Vec<MemoryFile>,
    dialog_requests: usize,
}

impl Node {
    fn is_input(&self) -> bool {
        self.tag.eq_ignore_ascii_case("input")
    }

    fn is_file_input(&self) -> bool {
        self.is_input()
            && self
                .input_type
                .as_deref()
                .is_some_and(|ty| ty.eq_ignore_ascii_case("file"))
    }
}

/// A notification together with the element it was dispatched on.
#[derive(Debug)]
pub struct Dispatched {
    pub target: NodeId,
    pub notification: Notification<MemoryPlatform>,
}

#[derive(Default)]
struct Clock {
    now: Cell<Duration>,
    timers: RefCell<Vec<(Duration, Waker)>>,
}

struct Shared {
    nodes: RefCell<Vec<Node>>,
    body: NodeId,
    listeners: RefCell<BTreeMap<usize, Registration>>,
    next_listener: Cell<usize>,
    dispatched: RefCell<Vec<Dispatched>>,
    capabilities: Cell<Capabilities>,
    clock: Clock,
    pool: RefCell<LocalPool>,
    spawner: LocalSpawner,
}

/// Cheap to clone; clones share one element tree, clock and task pool.
#[derive(Clone)]
pub struct MemoryPlatform {
    shared: Rc<Shared>,
}

impl fmt::Debug for MemoryPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryPlatform")
            .field("nodes", &self.shared.nodes.borrow().len())
            .field("listeners", &self.listener_count())
            .field("now", &self.now())
            .finish()
    }
}

impl Default for MemoryPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPlatform {
    /// Browser-like environment with a `body` element.
    pub fn new() -> Self {
        Self::with_capabilities(Capabilities::default())
    }

    /// No document or window: only container and picker routes are used.
    pub fn headless() -> Self {
        Self::with_capabilities(Capabilities {
            browser: false,
            deferred_dialog_open: false,
        })
    }

    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        let body = Node {
            tag: "body".to_string(),
            tab_index: -1,
            ..Node::default()
        };
        Self {
            shared: Rc::new(Shared {
                nodes: RefCell::new(vec![body]),
                body: NodeId(0),
                listeners: RefCell::new(BTreeMap::new()),
                next_listener: Cell::new(0),
                dispatched: RefCell::new(Vec::new()),
                capabilities: Cell::new(capabilities),
                clock: Clock::default(),
                pool: RefCell::new(pool),
                spawner,
            }),
        }
    }

    pub fn set_capabilities(&self, capabilities: Capabilities) {
        self.shared.capabilities.set(capabilities);
    }

    // ===== ELEMENT TREE =====

    pub fn body(&self) -> NodeId {
        self.shared.body
    }

    /// Detached element; append it to [`body`](Self::body) for events to reach the document.
    pub fn create_element(&self, tag: &str) -> NodeId {
        self.insert(Node {
            tag: tag.to_string(),
            tab_index: if tag.eq_ignore_ascii_case("input") { 0 } else { -1 },
            ..Node::default()
        })
    }

    pub fn create_element_with_type(&self, tag: &str, input_type: &str) -> NodeId {
        let node = self.create_element(tag);
        self.with_node(node, |n| n.input_type = Some(input_type.to_string()));
        node
    }

    fn insert(&self, node: Node) -> NodeId {
        let mut nodes = self.shared.nodes.borrow_mut();
        nodes.push(node);
        NodeId(nodes.len() - 1)
    }

    fn with_node<R>(&self, node: NodeId, f: impl FnOnce(&mut Node) -> R) -> R {
        f(&mut self.shared.nodes.borrow_mut()[node.0])
    }

    fn read_node<R>(&self, node: NodeId, f: impl FnOnce(&Node) -> R) -> R {
        f(&self.shared.nodes.borrow()[node.0])
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.read_node(node, |n| n.parent)
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.read_node(node, |n| n.children.clone())
    }

    pub fn is_hidden(&self, node: NodeId) -> bool {
        self.read_node(node, |n| n.hidden)
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.read_node(node, |n| n.classes.contains(class))
    }

    pub fn is_multiple(&self, node: NodeId) -> bool {
        self.read_node(node, |n| n.multiple)
    }

    pub fn accept(&self, node: NodeId) -> Option<String> {
        self.read_node(node, |n| n.accept.clone())
    }

    pub fn autocomplete(&self, node: NodeId) -> Option<String> {
        self.read_node(node, |n| n.autocomplete.clone())
    }

    pub fn files(&self, node: NodeId) -> Vec<MemoryFile> {
        self.read_node(node, |n| n.files.clone())
    }

    /// Fill the picker without a change event, like a file list that
    /// populates while the dialog is closing.
    pub fn set_files(&self, node: NodeId, files: Vec<MemoryFile>) {
        self.with_node(node, |n| n.files = files);
    }

    /// Times a file dialog was requested through a click on this element.
    pub fn dialog_requests(&self, node: NodeId) -> usize {
        self.read_node(node, |n| n.dialog_requests)
    }

    fn is_connected(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == self.shared.body {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    fn descendants(&self, node: NodeId, out: &mut Vec<NodeId>) {
        for child in self.children(node) {
            out.push(child);
            self.descendants(child, out);
        }
    }

    // ===== EVENTS =====

    pub fn listener_count(&self) -> usize {
        self.shared.listeners.borrow().len()
    }

    pub fn listener_count_on(&self, target: ListenTarget<'_, NodeId>) -> usize {
        let hop = Hop::from(target);
        self.shared
            .listeners
            .borrow()
            .values()
            .filter(|registration| registration.hop == hop)
            .count()
    }

    /// Deliver `event` to its target, then up through its ancestors and on
    /// to the document when the target is attached. Target-less events go to
    /// the window. Spawned work runs to completion before returning.
    pub fn fire(&self, event: MemoryEvent) -> MemoryEvent {
        let mut path = Vec::new();
        match event.target_node() {
            Some(node) => {
                let mut current = Some(node);
                while let Some(id) = current {
                    path.push(Hop::Node(id));
                    current = self.parent(id);
                }
                if self.is_connected(node) {
                    path.push(Hop::Document);
                }
            }
            None => path.push(Hop::Window),
        }

        for hop in path {
            let handlers: Vec<(usize, Handler<MemoryEvent>)> = self
                .shared
                .listeners
                .borrow()
                .iter()
                .filter(|(_, registration)| {
                    registration.hop == hop && registration.kind == event.kind()
                })
                .map(|(id, registration)| (*id, registration.handler.clone()))
                .collect();
            for (id, handler) in handlers {
                // Listeners removed by an earlier handler of this hop are skipped
                if !self.shared.listeners.borrow().contains_key(&id) {
                    continue;
                }
                handler(event.clone());
            }
            if event.propagation_stopped() {
                break;
            }
        }

        self.run_until_stalled();
        event
    }

    pub fn drag(&self, kind: EventKind, target: NodeId, files: Vec<MemoryFile>) -> MemoryEvent {
        self.fire(MemoryEvent::drag(kind, target, files))
    }

    pub fn drop_files(&self, target: NodeId, files: Vec<MemoryFile>) -> MemoryEvent {
        self.drag(EventKind::Drop, target, files)
    }

    pub fn press_key(&self, target: NodeId, key: &str) -> MemoryEvent {
        self.fire(MemoryEvent::key(target, key))
    }

    pub fn focus_window(&self) -> MemoryEvent {
        self.fire(MemoryEvent::focus())
    }

    /// Commit a selection in the picker's dialog: files land in the picker
    /// and a change event fires on it.
    pub fn choose_files(&self, picker: NodeId, files: Vec<MemoryFile>) -> MemoryEvent {
        self.set_files(picker, files);
        self.fire(MemoryEvent::change(picker))
    }

    pub fn take_dispatched(&self) -> Vec<Dispatched> {
        std::mem::take(&mut *self.shared.dispatched.borrow_mut())
    }

    pub fn take_notifications(&self) -> Vec<Notification<MemoryPlatform>> {
        self.take_dispatched()
            .into_iter()
            .map(|dispatched| dispatched.notification)
            .collect()
    }

    /// Names of notifications dispatched so far, without consuming them.
    pub fn notification_names(&self) -> Vec<&'static str> {
        self.shared
            .dispatched
            .borrow()
            .iter()
            .map(|dispatched| dispatched.notification.name())
            .collect()
    }

    // ===== TIME AND TASKS =====

    pub fn now(&self) -> Duration {
        self.shared.clock.now.get()
    }

    /// Run spawned tasks until none can make progress. A no-op when called
    /// from inside a running task.
    pub fn run_until_stalled(&self) {
        if let Ok(mut pool) = self.shared.pool.try_borrow_mut() {
            pool.run_until_stalled();
        }
    }

    /// Move the virtual clock forward, firing timers in deadline order.
    pub fn advance(&self, by: Duration) {
        let target = self.now() + by;
        loop {
            self.run_until_stalled();
            let next = self
                .shared
                .clock
                .timers
                .borrow()
                .iter()
                .map(|(deadline, _)| *deadline)
                .filter(|deadline| *deadline <= target)
                .min();
            let Some(deadline) = next else {
                break;
            };
            self.shared.clock.now.set(deadline.max(self.now()));

            let now = self.now();
            let due: Vec<Waker> = {
                let mut timers = self.shared.clock.timers.borrow_mut();
                let (due, pending): (Vec<_>, Vec<_>) =
                    timers.drain(..).partition(|(deadline, _)| *deadline <= now);
                *timers = pending;
                due.into_iter().map(|(_, waker)| waker).collect()
            };
            for waker in due {
                waker.wake();
            }
        }
        self.shared.clock.now.set(target);
        self.run_until_stalled();
    }
}

struct Sleep {
    shared: Rc<Shared>,
    deadline: Duration,
}

impl Future for Sleep {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.shared.clock.now.get() >= self.deadline {
            return Poll::Ready(());
        }
        self.shared
            .clock
            .timers
            .borrow_mut()
            .push((self.deadline, cx.waker().clone()));
        Poll::Pending
    }
}

/// Suspends once so extraction is observably asynchronous.
#[derive(Default)]
struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            return Poll::Ready(());
        }
        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

impl Platform for MemoryPlatform {
    type Element = NodeId;
    type Event = MemoryEvent;
    type File = MemoryFile;
    type Listener = MemoryListener;

    fn capabilities(&self) -> Capabilities {
        self.shared.capabilities.get()
    }

    fn is_input(&self, element: &NodeId) -> bool {
        self.read_node(*element, Node::is_input)
    }

    fn is_file_input(&self, element: &NodeId) -> bool {
        self.read_node(*element, Node::is_file_input)
    }

    fn file_inputs(&self, container: &NodeId) -> Vec<NodeId> {
        let mut all = Vec::new();
        self.descendants(*container, &mut all);
        all.into_iter()
            .filter(|node| self.is_file_input(node))
            .collect()
    }

    fn create_file_input(&self) -> NodeId {
        self.create_element_with_type("input", "file")
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) {
        self.remove_element(child);
        self.with_node(*child, |n| n.parent = Some(*parent));
        self.with_node(*parent, |n| n.children.push(*child));
    }

    fn remove_element(&self, element: &NodeId) {
        if let Some(parent) = self.with_node(*element, |n| n.parent.take()) {
            self.with_node(parent, |n| n.children.retain(|child| child != element));
        }
    }

    fn contains(&self, container: &NodeId, node: &NodeId) -> bool {
        let mut current = Some(*node);
        while let Some(id) = current {
            if id == *container {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    fn tab_index(&self, element: &NodeId) -> i32 {
        self.read_node(*element, |n| n.tab_index)
    }

    fn set_tab_index(&self, element: &NodeId, index: i32) {
        self.with_node(*element, |n| n.tab_index = index);
    }

    fn hide(&self, element: &NodeId) {
        self.with_node(*element, |n| n.hidden = true);
    }

    fn toggle_class(&self, element: &NodeId, class: &str, enabled: bool) {
        self.with_node(*element, |n| {
            if enabled {
                n.classes.insert(class.to_string());
            } else {
                n.classes.remove(class);
            }
        });
    }

    fn set_picker_attributes(&self, picker: &NodeId, attributes: &PickerAttributes) {
        self.with_node(*picker, |n| {
            n.multiple = attributes.multiple;
            if let Some(accept) = &attributes.accept {
                n.accept = Some(accept.clone());
            }
            n.autocomplete = Some("off".to_string());
        });
    }

    fn picker_file_count(&self, picker: &NodeId) -> usize {
        self.read_node(*picker, |n| n.files.len())
    }

    fn clear_picker(&self, picker: &NodeId) {
        self.with_node(*picker, |n| n.files.clear());
    }

    fn click(&self, element: &NodeId) {
        if self.is_file_input(element) {
            self.with_node(*element, |n| n.dialog_requests += 1);
        }
        self.fire(MemoryEvent::click(*element));
    }

    fn has_files(&self, event: &MemoryEvent) -> bool {
        event.0.carries_files
    }

    fn key(&self, event: &MemoryEvent) -> Option<String> {
        event.0.key.clone()
    }

    fn target(&self, event: &MemoryEvent) -> Option<NodeId> {
        event.target_node()
    }

    fn prevent_default(&self, event: &MemoryEvent) {
        event.0.default_prevented.set(true);
    }

    fn stop_propagation(&self, event: &MemoryEvent) {
        event.0.propagation_stopped.set(true);
    }

    fn listen(
        &self,
        target: ListenTarget<'_, NodeId>,
        kind: EventKind,
        handler: Handler<MemoryEvent>,
    ) -> MemoryListener {
        let id = self.shared.next_listener.get();
        self.shared.next_listener.set(id + 1);
        self.shared.listeners.borrow_mut().insert(
            id,
            Registration {
                hop: target.into(),
                kind,
                handler,
            },
        );
        MemoryListener(id)
    }

    fn unlisten(&self, listener: MemoryListener) {
        self.shared.listeners.borrow_mut().remove(&listener.0);
    }

    fn dispatch(&self, container: &NodeId, notification: Notification<Self>) {
        self.shared.dispatched.borrow_mut().push(Dispatched {
            target: *container,
            notification,
        });
    }

    fn extract_files(
        &self,
        event: &MemoryEvent,
        extraction: Extraction,
    ) -> LocalBoxFuture<'static, Vec<MemoryFile>> {
        let files = if event.0.carries_files {
            event.files().to_vec()
        } else {
            match (extraction, event.target_node()) {
                (Extraction::Full, Some(node)) if self.is_file_input(&node) => self.files(node),
                _ => Vec::new(),
            }
        };
        Box::pin(async move {
            YieldNow::default().await;
            files
        })
    }

    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        if let Err(error) = self.shared.spawner.spawn_local(task) {
            log::warn!("memory platform could not spawn task: {error}");
        }
    }

    async fn sleep(&self, duration: Duration) {
        Sleep {
            shared: self.shared.clone(),
            deadline: self.now() + duration,
        }
        .await
    }
}

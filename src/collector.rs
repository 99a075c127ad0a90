//! Cycle collection for captured frames.
//!
//! A function defined inside another function keeps the defining frame
//! alive, and that frame usually stores the function in one of its
//! variables. Reference counting alone never frees such a pair, so every
//! frame a closure captures is recorded in the [`FrameRegistry`] of its run.
//!
//! A collection looks at the values reachable from the recorded frames and
//! compares, for each of them, the references found inside that graph with
//! its total reference count. Anything with more references than the graph
//! explains is held from outside (a running call, the host, the globals) and
//! stays alive together with everything it reaches. The rest is garbage:
//! its maps, lists and return slots are emptied, which breaks the cycles and
//! lets reference counting free the frames.

use std::{
    cell::{Cell, RefCell},
    mem,
    rc::{Rc, Weak},
};

use log::debug;
use rustc_hash::FxHashMap;

use crate::{
    context::{ContextKind, FunctionState, OperationContext},
    objects::{Closure, Function, List, Map, Value},
};

/// Recorded frames that trigger the first collection.
const MIN_THRESHOLD: usize = 64;

/// The frames captured by closures during one run.
#[derive(Debug)]
pub struct FrameRegistry {
    frames: RefCell<Vec<Weak<OperationContext>>>,
    threshold: Cell<usize>,
}

impl Default for FrameRegistry {
    fn default() -> Self {
        FrameRegistry {
            frames: RefCell::new(Vec::new()),
            threshold: Cell::new(MIN_THRESHOLD),
        }
    }
}

impl FrameRegistry {
    pub fn new() -> Self {
        FrameRegistry::default()
    }

    /// Number of recorded frames that are still alive.
    pub fn len(&self) -> usize {
        self.frames
            .borrow()
            .iter()
            .filter(|frame| frame.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn record(&self, frame: &Rc<OperationContext>) {
        self.frames.borrow_mut().push(Rc::downgrade(frame));
    }

    /// Collects once the registry has doubled since the last collection.
    pub fn collect_if_due(&self) -> usize {
        if self.frames.borrow().len() < self.threshold.get() {
            return 0;
        }
        let freed = self.collect();
        let survivors = self.frames.borrow().len();
        self.threshold.set((survivors * 2).max(MIN_THRESHOLD));
        freed
    }

    /// Frees every recorded frame that only garbage refers to, returning how
    /// many were freed.
    pub fn collect(&self) -> usize {
        let roots: Vec<Rc<OperationContext>> = {
            let mut frames = self.frames.borrow_mut();
            frames.retain(|frame| frame.strong_count() > 0);
            frames.iter().filter_map(Weak::upgrade).collect()
        };
        if roots.is_empty() {
            return 0;
        }

        let mut graph = Graph::default();
        for root in roots {
            graph.discover(Node::Context(root));
        }
        graph.scan();
        let live = graph.mark();

        let mut freed = 0;
        let mut doomed = Vec::new();
        for (node, live) in graph.nodes.iter().zip(&live) {
            if !live {
                if matches!(node.handle, Node::Context(_)) {
                    freed += 1;
                }
                node.handle.clear(&mut doomed);
            }
        }
        // Our handles go first, so the contents dropped last free the
        // frames.
        drop(graph);
        drop(doomed);

        self.frames
            .borrow_mut()
            .retain(|frame| frame.strong_count() > 0);
        debug!("collected {freed} frames, {} left", self.len());
        freed
    }
}

/// A reference-counted object that can take part in a cycle.
#[derive(Clone)]
enum Node {
    Context(Rc<OperationContext>),
    State(Rc<FunctionState>),
    Map(Map),
    List(List),
    Closure(Closure),
}

impl Node {
    fn from_value(value: &Value) -> Option<Node> {
        match value {
            Value::Map(map) => Some(Node::Map(Rc::clone(map))),
            Value::List(list) => Some(Node::List(Rc::clone(list))),
            Value::Function(Function::Closure(closure)) => {
                Some(Node::Closure(Rc::clone(closure)))
            }
            _ => None,
        }
    }

    /// Global and API contexts are held by the interpreter for the whole run
    /// and stay out of the graph.
    fn from_context(ctx: &Rc<OperationContext>) -> Option<Node> {
        match ctx.kind {
            ContextKind::Global | ContextKind::Api => None,
            _ => Some(Node::Context(Rc::clone(ctx))),
        }
    }

    fn address(&self) -> *const () {
        match self {
            Node::Context(rc) => Rc::as_ptr(rc).cast(),
            Node::State(rc) => Rc::as_ptr(rc).cast(),
            Node::Map(rc) => Rc::as_ptr(rc).cast(),
            Node::List(rc) => Rc::as_ptr(rc).cast(),
            Node::Closure(rc) => Rc::as_ptr(rc).cast(),
        }
    }

    fn strong_count(&self) -> usize {
        match self {
            Node::Context(rc) => Rc::strong_count(rc),
            Node::State(rc) => Rc::strong_count(rc),
            Node::Map(rc) => Rc::strong_count(rc),
            Node::List(rc) => Rc::strong_count(rc),
            Node::Closure(rc) => Rc::strong_count(rc),
        }
    }

    /// Every reference this object holds to another node, once per
    /// reference. `None` when the object is borrowed and cannot be read.
    fn children(&self) -> Option<Vec<Node>> {
        let mut children = Vec::new();
        match self {
            Node::Context(ctx) => {
                children.push(Node::Map(Rc::clone(ctx.scope())));
                if let Some(state) = &ctx.function_state {
                    children.push(Node::State(Rc::clone(state)));
                }
                children.extend(ctx.previous.as_ref().and_then(Node::from_context));
            }
            Node::State(state) => {
                children.extend(Node::from_value(&*state.value.try_borrow().ok()?));
                children.extend(state.receiver.as_ref().and_then(Node::from_value));
            }
            Node::Map(map) => {
                children.extend(map.try_entries()?.values().filter_map(Node::from_value));
                children.extend(map.prototype().map(|proto| Node::Map(Rc::clone(proto))));
            }
            Node::List(list) => {
                children.extend(list.try_items()?.iter().filter_map(Node::from_value));
            }
            Node::Closure(closure) => {
                children.extend(closure.outer.as_ref().and_then(Node::from_context));
            }
        }
        Some(children)
    }

    /// Empties the object, moving what it held into `doomed`.
    fn clear(&self, doomed: &mut Vec<Value>) {
        match self {
            Node::State(state) => {
                if let Ok(mut value) = state.value.try_borrow_mut() {
                    doomed.push(mem::take(&mut *value));
                }
            }
            Node::Map(map) => {
                if let Some(entries) = map.take_entries() {
                    doomed.extend(entries.into_values());
                }
            }
            Node::List(list) => {
                if let Some(items) = list.take_items() {
                    doomed.extend(items);
                }
            }
            Node::Context(_) | Node::Closure(_) => {}
        }
    }
}

struct Entry {
    handle: Node,
    /// References found inside the graph.
    internal: usize,
    edges: Vec<usize>,
    /// Could not be read, so counts as held from outside.
    pinned: bool,
}

#[derive(Default)]
struct Graph {
    nodes: Vec<Entry>,
    index: FxHashMap<*const (), usize>,
}

impl Graph {
    fn discover(&mut self, node: Node) -> usize {
        let address = node.address();
        if let Some(&i) = self.index.get(&address) {
            return i;
        }
        let i = self.nodes.len();
        self.index.insert(address, i);
        self.nodes.push(Entry {
            handle: node,
            internal: 0,
            edges: Vec::new(),
            pinned: false,
        });
        i
    }

    /// Walks everything reachable from the discovered nodes, counting the
    /// references between them.
    fn scan(&mut self) {
        let mut next = 0;
        while next < self.nodes.len() {
            match self.nodes[next].handle.children() {
                Some(children) => {
                    let mut edges = Vec::with_capacity(children.len());
                    for child in children {
                        let j = self.discover(child);
                        self.nodes[j].internal += 1;
                        edges.push(j);
                    }
                    self.nodes[next].edges = edges;
                }
                None => self.nodes[next].pinned = true,
            }
            next += 1;
        }
    }

    /// Marks the nodes held from outside the graph and everything they
    /// reach. Each node carries one extra reference: our own handle.
    fn mark(&self) -> Vec<bool> {
        let mut live = vec![false; self.nodes.len()];
        let mut stack: Vec<usize> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.pinned || entry.handle.strong_count() > entry.internal + 1)
            .map(|(i, _)| i)
            .collect();
        while let Some(i) = stack.pop() {
            if live[i] {
                continue;
            }
            live[i] = true;
            stack.extend(self.nodes[i].edges.iter().filter(|&&j| !live[j]));
        }
        live
    }
}

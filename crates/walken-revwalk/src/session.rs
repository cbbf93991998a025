//! One walk from seeded entry points to a final report.

use std::collections::HashMap;

use walken_hash::{ObjectId, OidSet};
use walken_object::{Commit, FileMode, Object, ObjectType};
use walken_odb::{ObjectStore, RefResolver, StoreError};

use crate::dispatch::{Dispatcher, Visitor, WalkCounts};
use crate::filter::{FilterChain, StructuralFilter};
use crate::frontier::Frontier;
use crate::interrupt::Interrupt;
use crate::ordering::{order_commits, CommitMeta, SortOrder};
use crate::WalkError;

/// Which objects a walk emits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WalkMode {
    /// Commits only.
    #[default]
    Commits,
    /// Commits, then the trees and blobs below each one, plus tags.
    Objects,
}

/// Options for a walk session.
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    pub mode: WalkMode,
    pub sort: SortOrder,
    pub reverse: bool,
    /// Stop after emitting this many commits.
    pub max_count: Option<usize>,
}

/// Lifecycle of a [`WalkSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkPhase {
    Seeded,
    Expanding,
    Ordering,
    Emitting,
    Done,
}

/// Result of a completed walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkReport {
    pub counts: WalkCounts,
    /// Objects excluded by the structural filter, in byte order.
    pub omitted: Vec<ObjectId>,
}

/// What expansion found, before ordering.
#[derive(Default)]
struct Expanded {
    commits: Vec<(ObjectId, Commit)>,
    tags: Vec<(ObjectId, Object)>,
    /// Trees and blobs reached directly rather than through a commit.
    roots: Vec<(ObjectId, Object)>,
}

/// A tree entry waiting to be expanded during an object walk.
struct PendingEntry {
    oid: ObjectId,
    mode: FileMode,
    depth: u32,
}

/// Walk state for a single invocation.
///
/// Seed it with [`push`](Self::push) or [`seed_names`](Self::seed_names),
/// then [`run`](Self::run) it once. Counts live in the session's
/// dispatcher, so separate sessions never share state.
pub struct WalkSession<S> {
    store: S,
    options: WalkOptions,
    filters: FilterChain,
    frontier: Frontier,
    interrupt: Option<Interrupt>,
    unresolved: Vec<String>,
    phase: WalkPhase,
}

impl<S: ObjectStore> WalkSession<S> {
    pub fn new(store: S, options: WalkOptions) -> Self {
        Self {
            store,
            options,
            filters: FilterChain::default(),
            frontier: Frontier::new(),
            interrupt: None,
            unresolved: Vec::new(),
            phase: WalkPhase::Seeded,
        }
    }

    pub fn with_filters(mut self, filters: FilterChain) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = Some(interrupt);
        self
    }

    pub fn phase(&self) -> WalkPhase {
        self.phase
    }

    /// Add an entry point. Returns `false` if it was already queued.
    pub fn push(&mut self, oid: ObjectId) -> bool {
        self.frontier.seed(oid)
    }

    /// Resolve each name and seed the frontier with whatever matches.
    ///
    /// Names that match nothing are remembered and reported if the frontier
    /// ends up empty. Returns the number of references seeded.
    pub fn seed_names<R, N>(&mut self, resolver: &R, names: &[N]) -> Result<usize, WalkError>
    where
        R: RefResolver + ?Sized,
        N: AsRef<str>,
    {
        let mut seeded = 0;
        for name in names {
            let name = name.as_ref();
            let resolved = resolver
                .resolve_name(name)
                .map_err(|source| WalkError::Name {
                    name: name.to_string(),
                    source,
                })?;
            match resolved {
                Some(oid) => {
                    tracing::debug!(name, %oid, "seeded entry point");
                    if self.frontier.seed(oid) {
                        seeded += 1;
                    }
                }
                None => {
                    tracing::debug!(name, "entry point did not resolve");
                    self.unresolved.push(name.to_string());
                }
            }
        }
        Ok(seeded)
    }

    /// Walk everything reachable from the frontier, dispatching to `visitor`.
    ///
    /// Any store failure, interrupt or visitor error aborts the walk and no
    /// report is produced.
    ///
    /// # Panics
    ///
    /// If called more than once on the same session.
    pub fn run<V: Visitor>(&mut self, visitor: V) -> Result<WalkReport, WalkError> {
        assert!(
            self.phase == WalkPhase::Seeded,
            "BUG: walk session run twice (phase {:?})",
            self.phase
        );
        if self.frontier.is_empty() {
            return Err(WalkError::EmptyFrontier {
                names: std::mem::take(&mut self.unresolved),
            });
        }
        if let Some(filter) = self.filters.structural() {
            tracing::debug!(%filter, "filtered object walk");
        }

        self.enter(WalkPhase::Expanding);
        let expanded = self.expand()?;

        self.enter(WalkPhase::Ordering);
        let metas: Vec<CommitMeta> = expanded
            .commits
            .iter()
            .map(|(oid, commit)| CommitMeta::new(*oid, commit))
            .collect();
        let order = order_commits(&metas, self.options.sort, self.options.reverse);
        let mut commits: HashMap<ObjectId, Commit> = expanded.commits.into_iter().collect();
        let ordered: Vec<(ObjectId, Commit)> = order
            .into_iter()
            .filter_map(|oid| commits.remove(&oid).map(|c| (oid, c)))
            .collect();

        self.enter(WalkPhase::Emitting);
        let mut dispatcher = Dispatcher::new(visitor);
        let mut trees = TreeState::new(self.filters.structural());
        self.emit(ordered, expanded.tags, expanded.roots, &mut dispatcher, &mut trees)?;

        self.enter(WalkPhase::Done);
        let report = WalkReport {
            counts: *dispatcher.counts(),
            omitted: trees.omitted.to_sorted_vec(),
        };
        tracing::debug!(
            commits = report.counts.commits,
            trees = report.counts.trees,
            blobs = report.counts.blobs,
            tags = report.counts.tags,
            omitted = report.counts.omitted,
            "walk finished"
        );
        Ok(report)
    }

    fn enter(&mut self, phase: WalkPhase) {
        tracing::debug!(from = ?self.phase, to = ?phase, "walk phase");
        self.phase = phase;
    }

    fn check_interrupt(&self) -> Result<(), WalkError> {
        match &self.interrupt {
            Some(interrupt) => interrupt.check(),
            None => Ok(()),
        }
    }

    fn resolve(&self, oid: &ObjectId) -> Result<Object, WalkError> {
        self.check_interrupt()?;
        self.store.resolve(oid).map_err(|source| WalkError::Resolution {
            oid: *oid,
            source,
        })
    }

    /// Resolve `oid` and insist on its type.
    fn resolve_as(&self, oid: &ObjectId, expected: ObjectType) -> Result<Object, WalkError> {
        let object = self.resolve(oid)?;
        let actual = object.object_type();
        if actual != expected {
            return Err(WalkError::Resolution {
                oid: *oid,
                source: StoreError::Corrupt {
                    oid: *oid,
                    reason: format!("expected {expected}, found {actual}"),
                },
            });
        }
        Ok(object)
    }

    /// Drain the frontier through commits and tags.
    fn expand(&mut self) -> Result<Expanded, WalkError> {
        let mut found = Expanded::default();
        while let Some(oid) = self.frontier.take_next() {
            if !self.frontier.mark_seen(oid) {
                continue;
            }
            let object = self.resolve(&oid)?;
            tracing::trace!(%oid, kind = %object.object_type(), "expanded");
            match object {
                Object::Commit(commit) => {
                    for parent in &commit.parents {
                        self.frontier.seed(*parent);
                    }
                    found.commits.push((oid, commit));
                }
                Object::Tag(tag) => {
                    self.frontier.seed(tag.target);
                    if self.options.mode == WalkMode::Objects {
                        found.tags.push((oid, Object::Tag(tag)));
                    }
                }
                Object::Tree(_) | Object::Blob(_) => {
                    if self.options.mode == WalkMode::Objects {
                        found.roots.push((oid, object));
                    } else {
                        tracing::debug!(%oid, "ignoring non-commit entry point in commit walk");
                    }
                }
            }
        }
        Ok(found)
    }

    fn emit<V: Visitor>(
        &mut self,
        commits: Vec<(ObjectId, Commit)>,
        tags: Vec<(ObjectId, Object)>,
        roots: Vec<(ObjectId, Object)>,
        dispatcher: &mut Dispatcher<V>,
        trees: &mut TreeState,
    ) -> Result<(), WalkError> {
        let objects = self.options.mode == WalkMode::Objects;

        for (oid, tag) in &tags {
            self.check_interrupt()?;
            dispatcher.dispatch_object(oid, tag)?;
        }

        let mut emitted = 0usize;
        for (oid, commit) in &commits {
            if self.options.max_count.is_some_and(|max| emitted >= max) {
                break;
            }
            if !self.filters.admits_commit(oid, commit) {
                tracing::trace!(%oid, "commit filtered out");
                continue;
            }
            self.check_interrupt()?;
            dispatcher.dispatch_commit(oid, commit)?;
            emitted += 1;

            if objects {
                self.walk_commit_tree(commit.tree, dispatcher, trees)?;
            }
        }

        // Directly named roots bypass the structural filter themselves.
        for (oid, object) in roots {
            self.check_interrupt()?;
            dispatcher.dispatch_object(&oid, &object)?;
            trees.record(oid, 0);
            self.walk_below(&object, 1, dispatcher, trees)?;
        }
        Ok(())
    }

    /// Visit a commit's root tree at depth 0.
    ///
    /// A root tree already dispatched as somebody's subtree is expanded again
    /// from depth 0 but not dispatched twice.
    fn walk_commit_tree<V: Visitor>(
        &mut self,
        tree: ObjectId,
        dispatcher: &mut Dispatcher<V>,
        trees: &mut TreeState,
    ) -> Result<(), WalkError> {
        let first = self.frontier.mark_seen(tree);
        if !first && !trees.is_shallower(&tree, 0) {
            return Ok(());
        }
        let root = self.resolve_as(&tree, ObjectType::Tree)?;
        if first {
            if trees.omitted.remove(&tree) {
                dispatcher.set_omitted(trees.omitted.len());
            }
            self.check_interrupt()?;
            dispatcher.dispatch_object(&tree, &root)?;
        } else {
            tracing::trace!(oid = %tree, "re-expanding tree as a commit root");
        }
        trees.record(tree, 0);
        self.walk_below(&root, 1, dispatcher, trees)
    }

    /// Pre-order, depth-first walk of the entries below `parent`, whose
    /// children sit at `depth`.
    fn walk_below<V: Visitor>(
        &mut self,
        parent: &Object,
        depth: u32,
        dispatcher: &mut Dispatcher<V>,
        trees: &mut TreeState,
    ) -> Result<(), WalkError> {
        let mut stack = Vec::new();
        push_children(&mut stack, parent, depth);

        while let Some(entry) = stack.pop() {
            if !self.filters.admits_entry(entry.mode, entry.depth) {
                if !self.frontier.is_seen(&entry.oid) && trees.omitted.insert(entry.oid) {
                    tracing::trace!(oid = %entry.oid, depth = entry.depth, "omitted");
                    dispatcher.set_omitted(trees.omitted.len());
                }
                continue;
            }
            let first = self.frontier.mark_seen(entry.oid);
            let shallower =
                !first && entry.mode.is_tree() && trees.is_shallower(&entry.oid, entry.depth);
            if !first && !shallower {
                continue;
            }

            let expected = if entry.mode.is_tree() {
                ObjectType::Tree
            } else {
                ObjectType::Blob
            };
            let object = self.resolve_as(&entry.oid, expected)?;
            if first {
                if trees.omitted.remove(&entry.oid) {
                    dispatcher.set_omitted(trees.omitted.len());
                }
                self.check_interrupt()?;
                dispatcher.dispatch_object(&entry.oid, &object)?;
            } else {
                tracing::trace!(oid = %entry.oid, depth = entry.depth, "expanding tree again");
            }
            if entry.mode.is_tree() {
                trees.record(entry.oid, entry.depth);
            }
            push_children(&mut stack, &object, entry.depth + 1);
        }
        Ok(())
    }
}

/// Tree traversal bookkeeping for one emission pass.
struct TreeState {
    omitted: OidSet,
    /// Shallowest depth each tree has been expanded at. Only kept under a
    /// depth filter, where a shallower visit can admit more entries.
    depths: Option<HashMap<ObjectId, u32>>,
}

impl TreeState {
    fn new(filter: Option<StructuralFilter>) -> Self {
        let track = matches!(filter, Some(StructuralFilter::TreeDepth(_)));
        Self {
            omitted: OidSet::new(),
            depths: track.then(HashMap::new),
        }
    }

    /// Whether `oid` was expanded before, but only deeper than `depth`.
    fn is_shallower(&self, oid: &ObjectId, depth: u32) -> bool {
        self.depths
            .as_ref()
            .and_then(|depths| depths.get(oid))
            .is_some_and(|&seen| depth < seen)
    }

    fn record(&mut self, oid: ObjectId, depth: u32) {
        if let Some(depths) = &mut self.depths {
            depths
                .entry(oid)
                .and_modify(|seen| *seen = (*seen).min(depth))
                .or_insert(depth);
        }
    }
}

/// Queue the entries of `object`, if it is a tree, at `depth` so that they
/// pop in entry order. Gitlinks point into other repositories and are skipped.
fn push_children(stack: &mut Vec<PendingEntry>, object: &Object, depth: u32) {
    if let Object::Tree(tree) = object {
        for entry in tree.entries.iter().rev() {
            if entry.mode.is_gitlink() {
                continue;
            }
            stack.push(PendingEntry {
                oid: entry.oid,
                mode: entry.mode,
                depth,
            });
        }
    }
}

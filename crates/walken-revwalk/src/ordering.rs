//! Commit ordering policies.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use walken_hash::ObjectId;
use walken_object::Commit;

/// Order in which buffered commits are emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Parents before children; ties by discovery order.
    #[default]
    Topological,
    /// By committer date, newest first.
    CommitDate,
    /// By author date, newest first.
    AuthorDate,
}

/// The parts of a commit the ordering policies look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMeta {
    pub oid: ObjectId,
    pub parents: Vec<ObjectId>,
    pub commit_time: i64,
    pub author_time: i64,
}

impl CommitMeta {
    pub fn new(oid: ObjectId, commit: &Commit) -> Self {
        Self {
            oid,
            parents: commit.parents.clone(),
            commit_time: commit.committer.time,
            author_time: commit.author.time,
        }
    }
}

/// Order `commits`, given in discovery order, by `sort`.
///
/// `reverse` inverts the sequence after ordering. Parents outside `commits`
/// are ignored.
pub fn order_commits(commits: &[CommitMeta], sort: SortOrder, reverse: bool) -> Vec<ObjectId> {
    let mut order = match sort {
        SortOrder::Topological => topo_order(commits),
        SortOrder::CommitDate => date_order(commits, |c| c.commit_time),
        SortOrder::AuthorDate => date_order(commits, |c| c.author_time),
    };
    if reverse {
        order.reverse();
    }
    order
}

fn date_order(commits: &[CommitMeta], key: impl Fn(&CommitMeta) -> i64) -> Vec<ObjectId> {
    let mut sorted: Vec<&CommitMeta> = commits.iter().collect();
    sorted.sort_by(|a, b| key(b).cmp(&key(a)).then_with(|| a.oid.cmp(&b.oid)));
    sorted.into_iter().map(|c| c.oid).collect()
}

/// Kahn's algorithm over parent edges. The ready set is a min-heap on
/// discovery index so equal-rank commits keep the order they were found in.
fn topo_order(commits: &[CommitMeta]) -> Vec<ObjectId> {
    let index: HashMap<ObjectId, usize> = commits
        .iter()
        .enumerate()
        .map(|(i, c)| (c.oid, i))
        .collect();

    // pending[i]: parents of commit i not yet emitted.
    let mut pending = vec![0usize; commits.len()];
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); commits.len()];
    for (i, commit) in commits.iter().enumerate() {
        for parent in &commit.parents {
            if let Some(&p) = index.get(parent) {
                pending[i] += 1;
                children[p].push(i);
            }
        }
    }

    let mut ready: BinaryHeap<Reverse<usize>> = pending
        .iter()
        .enumerate()
        .filter(|&(_, &n)| n == 0)
        .map(|(i, _)| Reverse(i))
        .collect();

    let mut emitted = vec![false; commits.len()];
    let mut out = Vec::with_capacity(commits.len());
    while let Some(Reverse(i)) = ready.pop() {
        emitted[i] = true;
        out.push(commits[i].oid);
        for &child in &children[i] {
            pending[child] -= 1;
            if pending[child] == 0 {
                ready.push(Reverse(child));
            }
        }
    }

    // Only reachable on a cyclic parent graph.
    if out.len() < commits.len() {
        tracing::warn!(
            stuck = commits.len() - out.len(),
            "parent cycle detected; appending remaining commits in discovery order"
        );
        out.extend(
            commits
                .iter()
                .zip(&emitted)
                .filter(|&(_, &done)| !done)
                .map(|(c, _)| c.oid),
        );
    }
    out
}

//! Comment thread engine: rebuilds the parent/child forest from the flat
//! comment collection and performs cascading subtree deletion. Pure
//! functions; the caller owns load/save around them.

use std::collections::{HashMap, HashSet};

use crate::models::{Comment, CommentNode, Id};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ThreadError {
    #[error("comment not found")]
    NotFound,
}

pub type ThreadResult<T> = Result<T, ThreadError>;

/// Build the ordered reply forest for one post.
///
/// Roots are comments without a parent, in input order; every `replies` list
/// likewise preserves the relative input order of its siblings. Expansion is
/// worklist-driven rather than recursive, so thread depth is bounded by heap
/// only. A comment whose parent chain never reaches a root (dangling parent,
/// or a corrupt cycle) is left out of the forest, as is any id seen twice.
pub fn build_tree(comments: &[Comment], post_id: Id) -> Vec<CommentNode> {
    let scoped: Vec<&Comment> = comments.iter().filter(|c| c.post_id == post_id).collect();
    if scoped.is_empty() {
        return Vec::new();
    }

    let known: HashSet<Id> = scoped.iter().map(|c| c.id).collect();
    let mut children: HashMap<Id, Vec<&Comment>> = HashMap::new();
    let mut roots: Vec<&Comment> = Vec::new();
    for &c in &scoped {
        match c.parent_id {
            None => roots.push(c),
            Some(p) if known.contains(&p) => children.entry(p).or_default().push(c),
            Some(_) => {} // parent outside this post's thread; unreachable from any root
        }
    }

    // Two-phase depth-first walk with an explicit frame stack. `siblings`
    // accumulates finished nodes per depth; Exit pops a level and attaches
    // it as the replies of the comment being closed.
    enum Frame<'a> {
        Enter(&'a Comment),
        Exit(&'a Comment),
    }

    let mut visited: HashSet<Id> = HashSet::new();
    let mut frames: Vec<Frame<'_>> = roots.into_iter().rev().map(Frame::Enter).collect();
    let mut siblings: Vec<Vec<CommentNode>> = vec![Vec::new()];

    while let Some(frame) = frames.pop() {
        match frame {
            Frame::Enter(c) => {
                if !visited.insert(c.id) {
                    tracing::warn!(comment_id = c.id, "comment id revisited while building thread; skipping");
                    continue;
                }
                frames.push(Frame::Exit(c));
                siblings.push(Vec::new());
                if let Some(kids) = children.get(&c.id) {
                    for &k in kids.iter().rev() {
                        frames.push(Frame::Enter(k));
                    }
                }
            }
            Frame::Exit(c) => {
                let replies = siblings.pop().unwrap_or_default();
                let node = CommentNode { comment: c.clone(), replies };
                if let Some(level) = siblings.last_mut() {
                    level.push(node);
                }
            }
        }
    }

    siblings.pop().unwrap_or_default()
}

/// Remove the comment with `root_id` and everything transitively below it.
///
/// The reachable set is collected depth-first over `parent_id` edges before
/// anything is removed, so the caller sees either the whole subtree gone or,
/// when the root id does not exist, the collection untouched behind
/// `Err(NotFound)`. A revisited id (corrupt parent cycle) counts as already
/// collected and terminates the walk.
pub fn delete_subtree(comments: Vec<Comment>, root_id: Id) -> ThreadResult<Vec<Comment>> {
    if !comments.iter().any(|c| c.id == root_id) {
        return Err(ThreadError::NotFound);
    }

    let mut children: HashMap<Id, Vec<Id>> = HashMap::new();
    for c in &comments {
        if let Some(p) = c.parent_id {
            children.entry(p).or_default().push(c.id);
        }
    }

    let mut doomed: HashSet<Id> = HashSet::new();
    let mut stack = vec![root_id];
    while let Some(id) = stack.pop() {
        if !doomed.insert(id) {
            continue;
        }
        if let Some(kids) = children.get(&id) {
            stack.extend(kids.iter().copied());
        }
    }

    Ok(comments.into_iter().filter(|c| !doomed.contains(&c.id)).collect())
}

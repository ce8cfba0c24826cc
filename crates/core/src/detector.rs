// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deadlock detection over the wait-for graph
//!
//! Depth-first search from every unvisited node in graph order, tracking the
//! recursion stack. The first back edge found closes a cycle, which is
//! reconstructed from parent pointers. O(V + E) per call.

use crate::id::ClientId;
use crate::wait_for::WaitForGraph;
use std::collections::HashMap;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    OnStack,
    Done,
}

/// Find one wait-for cycle.
///
/// The returned sequence starts at the node the back edge pointed to and
/// follows wait order, so every consecutive pair (and last -> first) is an
/// edge of `graph`. Only the first cycle found is returned; for a given graph
/// the result is always the same.
pub fn detect(graph: &WaitForGraph) -> Option<Vec<ClientId>> {
    let mut marks: HashMap<&ClientId, Mark> = HashMap::new();
    let mut parent: HashMap<&ClientId, &ClientId> = HashMap::new();

    for start in graph.nodes() {
        if marks.contains_key(start) {
            continue;
        }

        // (node, index of the next successor to visit)
        let mut stack: Vec<(&ClientId, usize)> = vec![(start, 0)];
        marks.insert(start, Mark::OnStack);

        while let Some((node, idx)) = stack.last().copied() {
            let Some(next) = graph.successors(node).get(idx) else {
                marks.insert(node, Mark::Done);
                stack.pop();
                continue;
            };
            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }

            match marks.get(next) {
                None => {
                    marks.insert(next, Mark::OnStack);
                    parent.insert(next, node);
                    stack.push((next, 0));
                }
                Some(Mark::OnStack) => {
                    let cycle = reconstruct(node, next, &parent);
                    tracing::debug!(len = cycle.len(), "wait-for cycle found");
                    return Some(cycle);
                }
                Some(Mark::Done) => {}
            }
        }
    }

    None
}

/// Walk parents from `from` back to `to`, then reverse into wait order
fn reconstruct(
    from: &ClientId,
    to: &ClientId,
    parent: &HashMap<&ClientId, &ClientId>,
) -> Vec<ClientId> {
    let mut path = vec![from.clone()];
    let mut cur = from;
    while cur != to {
        match parent.get(cur) {
            Some(&p) => {
                cur = p;
                path.push(cur.clone());
            }
            None => break,
        }
    }
    path.reverse();
    path
}

#[cfg(test)]
#[path = "detector_tests.rs"]
mod tests;

//! Wait-for graph over package loads.
//!
//! An edge `a -> b` means the load of `a` is blocked until `b` is loaded.
//! Adding an edge that closes a loop would deadlock, so it is refused and
//! the loop is reported instead.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

#[derive(Debug, Default)]
pub(crate) struct WaitForGraph {
    edges: Mutex<FxHashMap<String, Vec<String>>>,
}

impl WaitForGraph {
    /// Record that `waiter` blocks on `target`.
    ///
    /// On a would-be cycle returns its nodes starting and ending with
    /// `target`, e.g. `["a", "b", "a"]`, and records nothing.
    pub(crate) fn wait(&self, waiter: &str, target: &str) -> Result<(), Vec<String>> {
        let mut edges = self.edges.lock();
        if let Some(mut path) = find_path(&edges, target, waiter) {
            path.push(target.to_string());
            return Err(path);
        }
        edges
            .entry(waiter.to_string())
            .or_default()
            .push(target.to_string());
        Ok(())
    }

    pub(crate) fn done(&self, waiter: &str, target: &str) {
        let mut edges = self.edges.lock();
        if let Some(targets) = edges.get_mut(waiter) {
            if let Some(i) = targets.iter().position(|t| t == target) {
                targets.swap_remove(i);
            }
            if targets.is_empty() {
                edges.remove(waiter);
            }
        }
    }
}

/// Depth-first search for a path `from -> .. -> to`.
fn find_path(edges: &FxHashMap<String, Vec<String>>, from: &str, to: &str) -> Option<Vec<String>> {
    let mut stack = vec![vec![from.to_string()]];
    let mut seen = rustc_hash::FxHashSet::default();
    while let Some(path) = stack.pop() {
        let last = path.last()?.clone();
        if last == to {
            return Some(path);
        }
        if !seen.insert(last.clone()) {
            continue;
        }
        for next in edges.get(&last).into_iter().flatten() {
            let mut longer = path.clone();
            longer.push(next.clone());
            stack.push(longer);
        }
    }
    None
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;

    #[test]
    fn direct_cycle_names_both() {
        let graph = WaitForGraph::default();
        graph.wait("a", "b").unwrap();
        assert_eq!(graph.wait("b", "a").unwrap_err(), ["a", "b", "a"]);
    }

    #[test]
    fn self_import_is_a_cycle() {
        let graph = WaitForGraph::default();
        assert_eq!(graph.wait("a", "a").unwrap_err(), ["a", "a"]);
    }

    #[test]
    fn finished_waits_do_not_count() {
        let graph = WaitForGraph::default();
        graph.wait("a", "b").unwrap();
        graph.done("a", "b");
        assert!(graph.wait("b", "a").is_ok());
    }

    #[test]
    fn longer_cycle() {
        let graph = WaitForGraph::default();
        graph.wait("a", "b").unwrap();
        graph.wait("b", "c").unwrap();
        assert_eq!(graph.wait("c", "a").unwrap_err(), ["a", "b", "c", "a"]);
    }
}

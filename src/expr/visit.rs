//! Traversal of the distinct nodes of a graph.
//!
//! Nodes are identified by handle identity, so a node referenced from many places is visited once.
//! All traversals use an explicit stack.

use std::collections::{HashMap,HashSet};

use super::MX;

/// All distinct nodes reachable from `roots`, each after its dependencies. Null handles are
/// skipped.
pub fn topological(roots : &[MX]) -> Vec<MX> {
    let mut res = Vec::new();
    let mut done : HashSet<MX> = HashSet::new();
    // (node, whether its dependencies have been pushed)
    let mut stack : Vec<(MX,bool)> = roots.iter().rev().filter(|r| ! r.is_null()).map(|r| (r.clone(),false)).collect();

    while let Some((x,expanded)) = stack.pop() {
        if done.contains(&x) {
            continue;
        }
        if expanded {
            done.insert(x.clone());
            res.push(x);
        }
        else {
            let deps : Vec<MX> = x.get().map(|n| n.deps().to_vec()).unwrap_or_default();
            stack.push((x,true));
            stack.extend(deps.into_iter().rev().filter(|d| ! d.is_null() && ! done.contains(d)).map(|d| (d,false)));
        }
    }
    res
}

impl MX {
    /// Length of the longest dependency chain below this node; zero for leaves and null handles.
    pub fn depth(&self) -> usize {
        let order = topological(std::slice::from_ref(self));
        let mut depth : HashMap<&MX,usize> = HashMap::with_capacity(order.len());
        for x in order.iter() {
            let d = x.get()
                .map(|n| n.deps().iter().filter_map(|d| depth.get(d)).map(|&d| d+1).max().unwrap_or(0))
                .unwrap_or(0);
            depth.insert(x,d);
        }
        depth.get(self).copied().unwrap_or(0)
    }

    /// Number of distinct nodes reachable from this one, itself included.
    pub fn count_nodes(&self) -> usize {
        topological(std::slice::from_ref(self)).len()
    }
}

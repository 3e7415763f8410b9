// Dotlanth
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Random tree generation with an injected randomness source

use super::{Ast, NodeId, NodeKind};
use rand::Rng;

/// A node whose children are still being generated
struct Frame {
    parent: NodeId,
    /// Levels below `parent`, always at least one
    depth: usize,
    /// Children of `parent` not yet created
    remaining: usize,
}

/// Builds synthetic syntax trees from a pluggable [`Rng`].
///
/// Seeding the source (e.g. `StdRng::seed_from_u64`) makes generation
/// reproducible.
pub struct TreeGenerator<R: Rng> {
    rng: R,
}

impl<R: Rng> TreeGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Generates a regular tree where every inner node has `breadth` children.
    ///
    /// A node is a leaf when `depth` or `breadth` is zero.
    ///
    /// Nodes are created in pre-order from an explicit frame stack, never by
    /// recursion, so depth is not limited by the thread stack.
    pub fn generate(&mut self, depth: usize, breadth: usize) -> Ast {
        let (kind, name) = self.next_node();
        let mut ast = Ast::new(kind, name);
        if depth == 0 || breadth == 0 {
            return ast;
        }

        let mut frames = vec![Frame {
            parent: ast.root(),
            depth,
            remaining: breadth,
        }];
        while let Some(frame) = frames.last_mut() {
            if frame.remaining == 0 {
                frames.pop();
                continue;
            }
            frame.remaining -= 1;
            let (parent, child_depth) = (frame.parent, frame.depth - 1);

            let (kind, name) = self.next_node();
            let child = ast.add_child(parent, kind, name);
            if child_depth > 0 {
                frames.push(Frame {
                    parent: child,
                    depth: child_depth,
                    remaining: breadth,
                });
            }
        }
        ast
    }

    fn next_node(&mut self) -> (NodeKind, String) {
        let kind = NodeKind::ALL[self.rng.gen_range(0..NodeKind::ALL.len())];
        let name = format!("node_{}", self.rng.r#gen::<u64>());
        (kind, name)
    }
}

/// Node count of a regular tree: `1 + b + b^2 + ... + b^depth`
pub fn expected_node_count(depth: usize, breadth: usize) -> usize {
    let mut total = 1usize;
    let mut level = 1usize;
    for _ in 0..depth {
        level = level.saturating_mul(breadth);
        if level == 0 {
            break;
        }
        total = total.saturating_add(level);
    }
    total
}

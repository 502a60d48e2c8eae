//! Symbolic matrix expression graphs over sparse matrices.
//!
//! Expressions are built bottom-up from constants and symbols. Every operation returns a new
//! [MX] handle referencing a node of a directed acyclic graph; handles are cheap to clone and
//! compare by node identity, so common subexpressions are shared rather than copied.
//!
//! Each node carries a [Sparsity] pattern. Elementwise operators pick their evaluation strategy
//! from the operand patterns, and a few algebraic identities are applied while the graph is built
//! (see [Options]). Indexing and assignment produce nonzero gather nodes that are collapsed
//! eagerly, so repeated indexing does not grow the graph.
//!
//! # Example
//! ```
//! use mxgraph::*;
//!
//! let x = MX::symbol("x",3,3);
//! let y = x.mul(&MX::scalar(1.0)).unwrap();
//! assert!(MX::same_node(&x,&y));
//!
//! let mut z = x.clone();
//! z.set_sub(&MX::symbol("m",2,2),[0,2],[1,2]).unwrap();
//! let m = z.sub([0,2],[1,2]).unwrap();
//! assert_eq!(m.name(),"m");
//! ```

mod error;
mod options;
mod sparsity;
mod utils;
pub mod op;
pub mod expr;

pub use error::{Error,Result,Shape};
pub use options::Options;
pub use sparsity::{Sparsity,UnionSlot};
pub use op::Op;
pub use expr::{MX,Node,Payload,Dispatcher,BinaryKernel,Mapping,NzRef,IndexSet,IMatrix,Slice,NormKind,Function};
pub use expr::visit::topological;

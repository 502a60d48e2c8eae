//! Expression graph nodes and the reference counted [MX] handle.
//!
//! An expression is a directed acyclic graph of [Node]s. Each node has an operator tag, a
//! [Sparsity] pattern, an ordered list of dependency handles and an operator specific [Payload].
//! Nodes are only ever created through [MX::create] from handles that already exist, so a node
//! can never (directly or indirectly) depend on itself.
//!
//! [MX] is a cheap, value-like handle: cloning it shares the node, comparing two handles compares
//! node identity. Operations never modify a node that is observable through another handle; the
//! few in-place modifications (see [MX::make_unique]) copy the node first when it is shared.

mod binary;
mod unary;
mod mapping;
mod index;
mod mul;
mod call;
pub mod visit;

pub use binary::{Dispatcher,BinaryKernel};
pub use mapping::{Mapping,NzRef};
pub use index::{IndexSet,IMatrix,Slice};
pub use mul::NormKind;
pub use call::Function;

use std::fmt;
use std::rc::Rc;

use crate::error::{Error,Result,Shape};
use crate::op::Op;
use crate::sparsity::Sparsity;

/// Operator specific data carried by a node.
#[derive(Clone)]
pub enum Payload {
    /// Nothing beyond the operator tag and the dependencies.
    None,
    /// One value per nonzero of the node's pattern.
    Constant(Vec<f64>),
    /// Name of a symbolic leaf.
    Symbol(String),
    /// Evaluation strategy of a binary elementwise node.
    Binary(BinaryKernel),
    /// Nonzero gather table.
    Mapping(Mapping),
    Norm(NormKind),
    /// Externally defined function applied to the dependencies.
    Call(Rc<dyn Function>),
    /// Index of the function output selected from a call node.
    Output(usize),
}

impl fmt::Debug for Payload {
    fn fmt(&self, f : &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::None          => f.write_str("None"),
            Payload::Constant(v)   => f.debug_tuple("Constant").field(v).finish(),
            Payload::Symbol(s)     => f.debug_tuple("Symbol").field(s).finish(),
            Payload::Binary(k)     => f.debug_tuple("Binary").field(k).finish(),
            Payload::Mapping(m)    => f.debug_tuple("Mapping").field(m).finish(),
            Payload::Norm(k)       => f.debug_tuple("Norm").field(k).finish(),
            Payload::Call(func)    => f.debug_tuple("Call").field(&func.name()).finish(),
            Payload::Output(i)     => f.debug_tuple("Output").field(i).finish(),
        }
    }
}

/// A node of the expression graph.
#[derive(Clone)]
pub struct Node {
    op       : Op,
    sparsity : Sparsity,
    deps     : Vec<MX>,
    payload  : Payload,
}

impl Node {
    pub fn op(&self) -> Op { self.op }
    pub fn sparsity(&self) -> &Sparsity { &self.sparsity }
    pub fn deps(&self) -> &[MX] { self.deps.as_slice() }
    pub fn payload(&self) -> &Payload { &self.payload }

    pub fn mapping(&self) -> Option<&Mapping> {
        if let Payload::Mapping(ref m) = self.payload { Some(m) } else { None }
    }
    fn mapping_mut(&mut self) -> Option<&mut Mapping> {
        if let Payload::Mapping(ref mut m) = self.payload { Some(m) } else { None }
    }
    pub fn constant_values(&self) -> Option<&[f64]> {
        if let Payload::Constant(ref v) = self.payload { Some(v.as_slice()) } else { None }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f : &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("op",&self.op)
            .field("sparsity",&format_args!("{}",self.sparsity))
            .field("ndep",&self.deps.len())
            .field("payload",&self.payload)
            .finish()
    }
}

/// Releasing a deep graph through nested destructors would use one stack frame per level. Instead
/// the dependencies of a dying node are moved to a work list, and every node on it whose last
/// reference is the one on the list is dismantled the same way.
impl Drop for Node {
    fn drop(&mut self) {
        let mut stack : Vec<Rc<Node>> = self.deps.drain(..).filter_map(|d| d.node).collect();
        while let Some(rc) = stack.pop() {
            if let Ok(mut node) = Rc::try_unwrap(rc) {
                stack.extend(node.deps.drain(..).filter_map(|d| d.node));
            }
        }
    }
}

////////////////////////////////////////////////////////////

/// Handle to an expression node. A default constructed handle is null.
#[derive(Clone,Default)]
pub struct MX {
    node : Option<Rc<Node>>
}

/// Handles compare by node identity.
impl PartialEq for MX {
    fn eq(&self, other : &MX) -> bool { MX::same_node(self,other) }
}

impl Eq for MX {}

impl std::hash::Hash for MX {
    fn hash<H : std::hash::Hasher>(&self, state : &mut H) {
        self.node.as_ref().map(|n| Rc::as_ptr(n) as usize).unwrap_or(0).hash(state)
    }
}

impl fmt::Debug for MX {
    fn fmt(&self, f : &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            None => f.write_str("MX(null)"),
            Some(n) => write!(f,"MX({}, {})",n.op,n.sparsity),
        }
    }
}

impl From<f64> for MX {
    fn from(v : f64) -> MX { MX::scalar(v) }
}

impl MX {
    /// The node factory. Every node of the graph is created here.
    pub(crate) fn create(op : Op, sparsity : Sparsity, deps : Vec<MX>, payload : Payload) -> MX {
        MX{ node : Some(Rc::new(Node{ op, sparsity, deps, payload })) }
    }

    /// Constant without validation; `values.len()` must equal `sparsity.nnz()`.
    pub(crate) fn constant_unchecked(sparsity : Sparsity, values : Vec<f64>) -> MX {
        debug_assert_eq!(sparsity.nnz(),values.len());
        MX::create(Op::Const,sparsity,Vec::new(),Payload::Constant(values))
    }

    /// Null handle.
    pub fn null() -> MX { MX::default() }
    pub fn is_null(&self) -> bool { self.node.is_none() }

    /// The referenced node, if any.
    pub fn get(&self) -> Option<&Node> { self.node.as_deref() }

    /// The referenced node, failing with [Error::NullExpression] for a null handle.
    pub fn node(&self) -> Result<&Node> { self.get().ok_or(Error::NullExpression) }

    /// Identity comparison: both handles reference the same node, or both are null.
    pub fn same_node(a : &MX, b : &MX) -> bool {
        match (&a.node,&b.node) {
            (Some(a),Some(b)) => Rc::ptr_eq(a,b),
            (None,None)       => true,
            _                 => false
        }
    }

    /// Number of handles sharing the node.
    pub fn ref_count(&self) -> usize { self.node.as_ref().map(Rc::strong_count).unwrap_or(0) }

    /// Obtain exclusive access to the node, copying it first if other handles share it. After
    /// this call, changes to the node are not observable through any other handle.
    pub fn make_unique(&mut self) -> Result<&mut Node> {
        let rc = self.node.as_mut().ok_or(Error::NullExpression)?;
        Ok(Rc::make_mut(rc))
    }

    ////////////////////////////////////////////////////////////
    // Constructors

    /// Dense 1x1 constant.
    pub fn scalar(v : f64) -> MX {
        MX::constant_unchecked(Sparsity::scalar(),vec![v])
    }

    /// Constant with one value per nonzero of `sparsity`.
    pub fn constant(sparsity : Sparsity, values : Vec<f64>) -> Result<MX> {
        if sparsity.nnz() != values.len() {
            Err(Error::DimensionMismatch{ lhs : Shape(sparsity.nnz(),1), rhs : Shape(values.len(),1) })
        }
        else {
            Ok(MX::constant_unchecked(sparsity,values))
        }
    }

    /// Dense constant from row-major data.
    pub fn dense(nrow : usize, ncol : usize, data : Vec<f64>) -> Result<MX> {
        MX::constant(Sparsity::dense(nrow,ncol),data)
    }

    /// Constant with the same value in every nonzero of `sparsity`.
    pub fn uniform(sparsity : Sparsity, v : f64) -> MX {
        let n = sparsity.nnz();
        MX::constant_unchecked(sparsity,vec![v; n])
    }

    /// Dense zero matrix.
    pub fn zeros(nrow : usize, ncol : usize) -> MX { MX::uniform(Sparsity::dense(nrow,ncol),0.0) }
    /// Zero matrix without structural nonzeros.
    pub fn sparse(nrow : usize, ncol : usize) -> MX { MX::uniform(Sparsity::empty(nrow,ncol),0.0) }
    pub fn ones(nrow : usize, ncol : usize) -> MX { MX::uniform(Sparsity::dense(nrow,ncol),1.0) }
    pub fn eye(n : usize) -> MX { MX::uniform(Sparsity::diagonal(n),1.0) }
    pub fn inf(nrow : usize, ncol : usize) -> MX { MX::uniform(Sparsity::dense(nrow,ncol),f64::INFINITY) }
    pub fn nan(nrow : usize, ncol : usize) -> MX { MX::uniform(Sparsity::dense(nrow,ncol),f64::NAN) }

    /// Zero constant with the pattern of `self`.
    pub fn zeros_like(&self) -> Result<MX> {
        Ok(MX::uniform(self.node()?.sparsity.clone(),0.0))
    }

    /// Dense symbolic leaf.
    pub fn symbol(name : &str, nrow : usize, ncol : usize) -> MX {
        MX::symbol_with_sparsity(name,Sparsity::dense(nrow,ncol))
    }

    /// Symbolic leaf with a given pattern.
    pub fn symbol_with_sparsity(name : &str, sparsity : Sparsity) -> MX {
        MX::create(Op::Parameter,sparsity,Vec::new(),Payload::Symbol(name.to_string()))
    }

    /// Broadcast a scalar onto `sparsity`. A structurally zero scalar gives a matrix without
    /// nonzeros.
    pub fn fill_pattern(sparsity : Sparsity, val : &MX) -> Result<MX> {
        let vs = val.node()?.sparsity();
        if ! vs.is_scalar() {
            return Err(Error::ShapeMismatch{ lhs : Shape(1,1), rhs : vs.shape() });
        }
        if vs.nnz() == 0 {
            Ok(MX::sparse(sparsity.nrow(),sparsity.ncol()))
        }
        else {
            let nz = vec![0usize; sparsity.nnz()];
            val.get_nonzeros(sparsity,&nz)
        }
    }

    /// Dense `nrow x ncol` matrix with every element equal to the scalar `val`.
    pub fn fill(nrow : usize, ncol : usize, val : &MX) -> Result<MX> {
        MX::fill_pattern(Sparsity::dense(nrow,ncol),val)
    }

    /// Repeat `x` in a `nrow x ncol` block pattern. Only scalars are supported.
    pub fn repmat(x : &MX, nrow : usize, ncol : usize) -> Result<MX> {
        if x.is_scalar() {
            MX::fill(nrow,ncol,x)
        }
        else {
            Err(Error::UnsupportedOperation("repmat of a non-scalar expression"))
        }
    }

    /// Make all elements structural nonzeros. Returns `self` if already dense.
    pub fn densify(&self) -> Result<MX> {
        let sp = self.node()?.sparsity();
        if sp.is_dense() {
            Ok(self.clone())
        }
        else if self.is_constant() {
            // Fold into a dense constant
            let mut data = vec![0.0; sp.numel()];
            let ncol = sp.ncol();
            for ((i,j),&v) in sp.entries().zip(self.constant_values().unwrap_or(&[])) {
                data[i*ncol+j] = v;
            }
            MX::dense(sp.nrow(),ncol,data)
        }
        else {
            tracing::debug!(shape = %sp.shape(), nnz = sp.nnz(), "densify");
            Ok(MX::create(Op::Densify,Sparsity::dense(sp.nrow(),sp.ncol()),vec![self.clone()],Payload::None))
        }
    }

    ////////////////////////////////////////////////////////////
    // Shape queries. A null handle behaves as an empty 0x0 matrix.

    /// The node's pattern.
    pub fn sparsity(&self) -> Result<&Sparsity> { Ok(self.node()?.sparsity()) }
    pub fn nrow(&self) -> usize { self.get().map(|n| n.sparsity.nrow()).unwrap_or(0) }
    pub fn ncol(&self) -> usize { self.get().map(|n| n.sparsity.ncol()).unwrap_or(0) }
    pub fn shape(&self) -> Shape { Shape(self.nrow(),self.ncol()) }
    pub fn nnz(&self) -> usize { self.get().map(|n| n.sparsity.nnz()).unwrap_or(0) }
    pub fn numel(&self) -> usize { self.nrow()*self.ncol() }
    pub fn is_dense(&self) -> bool { self.get().map(|n| n.sparsity.is_dense()).unwrap_or(false) }
    pub fn is_scalar(&self) -> bool { self.get().map(|n| n.sparsity.is_scalar()).unwrap_or(false) }
    /// A 1x1 expression with no structural nonzero.
    pub fn is_scalar_sparse(&self) -> bool { self.is_scalar() && self.nnz() == 0 }
    pub fn is_vector(&self) -> bool { self.ncol() == 1 }

    ////////////////////////////////////////////////////////////
    // Node queries

    pub fn op(&self) -> Option<Op> { self.get().map(|n| n.op) }
    pub fn is_operation(&self, op : Op) -> bool { self.op() == Some(op) }
    pub fn n_dep(&self) -> usize { self.get().map(|n| n.deps.len()).unwrap_or(0) }

    /// The `i`th dependency.
    pub fn dep(&self, i : usize) -> Result<MX> {
        let node = self.node()?;
        node.deps.get(i).cloned().ok_or(Error::IndexError{ index : i, shape : Shape(node.deps.len(),1) })
    }

    pub fn is_constant(&self) -> bool { self.is_operation(Op::Const) }
    pub fn is_symbolic(&self) -> bool { self.is_operation(Op::Parameter) }
    pub fn is_mapping(&self) -> bool { self.is_operation(Op::Mapping) }
    pub fn is_call(&self) -> bool { self.is_operation(Op::Call) }
    pub fn is_call_output(&self) -> bool { self.is_operation(Op::Output) }
    pub fn is_densification(&self) -> bool { self.is_operation(Op::Densify) }
    pub fn is_norm(&self) -> bool { self.is_operation(Op::Norm) }
    pub fn is_multiplication(&self) -> bool { self.is_operation(Op::MatMul) }
    pub fn is_unary(&self) -> bool { self.op().map(Op::is_unary).unwrap_or(false) }
    pub fn is_binary(&self) -> bool { self.op().map(Op::is_binary).unwrap_or(false) }

    /// Whether the operator of an elementwise node commutes.
    pub fn is_commutative(&self) -> Result<bool> {
        let op = self.node()?.op;
        if op.is_unary() || op.is_binary() {
            Ok(op.is_commutative())
        }
        else {
            Err(Error::UnsupportedOperation("commutativity of a non-elementwise node"))
        }
    }

    /// Symbol name for leaves, operator name for other nodes and `"null"` for a null handle.
    pub fn name(&self) -> &str {
        match self.get() {
            None => "null",
            Some(n) => if let Payload::Symbol(ref s) = n.payload { s.as_str() } else { n.op.name() }
        }
    }

    /// The values of a constant node.
    pub fn constant_values(&self) -> Option<&[f64]> { self.get().and_then(Node::constant_values) }

    /// The value of a dense scalar constant.
    pub fn value(&self) -> Option<f64> {
        if self.is_scalar() && self.is_dense() { self.constant_values().map(|v| v[0]) } else { None }
    }

    /// A constant whose nonzeros are all zero, including one without nonzeros.
    pub fn is_zero(&self) -> bool {
        self.constant_values().map(|v| v.iter().all(|&x| x == 0.0)).unwrap_or(false)
    }

    /// A dense constant whose elements are all one.
    pub fn is_one(&self) -> bool { self.is_dense_constant_equal_to(1.0) }
    /// A dense constant whose elements are all minus one.
    pub fn is_minus_one(&self) -> bool { self.is_dense_constant_equal_to(-1.0) }

    fn is_dense_constant_equal_to(&self, c : f64) -> bool {
        self.is_dense() && self.constant_values().map(|v| v.iter().all(|&x| x == c)).unwrap_or(false)
    }

    /// Gather table of a mapping node.
    pub fn mapping(&self) -> Option<&Mapping> { self.get().and_then(Node::mapping) }

    /// For a mapping node, the nonzero of dependency `dep` feeding each result nonzero, or `None`
    /// where another dependency (or nothing) feeds it.
    pub fn mapping_for(&self, dep : usize) -> Result<Vec<Option<usize>>> {
        let m = self.mapping().ok_or(Error::UnsupportedOperation("mapping query on a non-mapping node"))?;
        Ok(m.table().iter().map(|s| s.filter(|r| r.dep == dep).map(|r| r.nz)).collect())
    }

    /// For a mapping node, the dependency feeding each result nonzero.
    pub fn dep_indices(&self) -> Result<Vec<Option<usize>>> {
        let m = self.mapping().ok_or(Error::UnsupportedOperation("mapping query on a non-mapping node"))?;
        Ok(m.table().iter().map(|s| s.map(|r| r.dep)).collect())
    }
}

//! Nodes applying an externally defined function.
//!
//! The graph only needs to know the signature of a function: how many inputs and outputs it has
//! and their patterns. Calling a function creates one call node holding the arguments, and one
//! output node per function output that selects it.

use std::rc::Rc;

use super::{MX,Payload};
use crate::error::{Error,Result,Shape};
use crate::op::Op;
use crate::sparsity::Sparsity;

/// Signature of a function that can be called from an expression.
pub trait Function {
    fn name(&self) -> &str;
    fn n_in(&self) -> usize;
    fn n_out(&self) -> usize;
    /// Pattern of input `i`, `i < n_in()`.
    fn input_sparsity(&self, i : usize) -> Sparsity;
    /// Pattern of output `i`, `i < n_out()`.
    fn output_sparsity(&self, i : usize) -> Sparsity;
}

impl MX {
    /// Apply `f` to `args` and return one expression per function output.
    ///
    /// An argument must have the shape of the corresponding input. If its pattern differs from
    /// the input pattern, it is projected onto it.
    ///
    /// # Errors
    /// - [Error::DimensionMismatch] if the number of arguments is not `f.n_in()`.
    /// - [Error::ShapeMismatch] if an argument has the wrong shape.
    pub fn call(f : Rc<dyn Function>, args : &[MX]) -> Result<Vec<MX>> {
        if args.len() != f.n_in() {
            return Err(Error::DimensionMismatch{ lhs : Shape(f.n_in(),1), rhs : Shape(args.len(),1) });
        }
        let mut deps = Vec::with_capacity(args.len());
        for (i,a) in args.iter().enumerate() {
            let sp = a.node()?.sparsity();
            let isp = f.input_sparsity(i);
            if sp.shape() != isp.shape() {
                return Err(Error::ShapeMismatch{ lhs : isp.shape(), rhs : sp.shape() });
            }
            deps.push(if *sp == isp { a.clone() } else { a.sub_pattern(&isp)? });
        }

        tracing::trace!(function = f.name(), nin = f.n_in(), nout = f.n_out(), "call");
        let nout = f.n_out();
        let outsp : Vec<Sparsity> = (0..nout).map(|i| f.output_sparsity(i)).collect();
        let call = MX::create(Op::Call,Sparsity::empty(0,0),deps,Payload::Call(f));
        Ok(outsp.into_iter().enumerate()
            .map(|(i,sp)| MX::create(Op::Output,sp,vec![call.clone()],Payload::Output(i)))
            .collect())
    }

    /// The function applied by a call node.
    pub fn function(&self) -> Option<Rc<dyn Function>> {
        match self.get()?.payload() {
            Payload::Call(f) => Some(f.clone()),
            _ => None
        }
    }

    /// Number of outputs of a call node, zero for other nodes.
    pub fn n_outputs(&self) -> usize {
        self.function().map(|f| f.n_out()).unwrap_or(0)
    }

    /// A new output node selecting output `i` of a call node.
    pub fn output(&self, i : usize) -> Result<MX> {
        let f = self.function().ok_or(Error::UnsupportedOperation("output of a non-call node"))?;
        if i >= f.n_out() {
            return Err(Error::IndexError{ index : i, shape : Shape(f.n_out(),1) });
        }
        Ok(MX::create(Op::Output,f.output_sparsity(i),vec![self.clone()],Payload::Output(i)))
    }

    /// For an output node, which output of the call it selects.
    pub fn call_output_index(&self) -> Option<usize> {
        match self.get()?.payload() {
            Payload::Output(i) => Some(*i),
            _ => None
        }
    }
}

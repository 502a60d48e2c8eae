//! Matrix products, transposition and norms.

use super::{Dispatcher,MX,Payload};
use crate::error::{Error,Result};
use crate::op::Op;
use crate::sparsity::Sparsity;

/// Which norm a [Op::Norm] node computes.
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash)]
pub enum NormKind {
    /// Sum of absolute values of the elements.
    One,
    /// Euclidean norm of a vector.
    Two,
    /// Largest absolute value of the elements.
    Inf,
    /// Square root of the sum of squared elements.
    Frobenius,
}

impl Dispatcher {
    /// Matrix product `x * y`. A scalar operand gives the elementwise product. With zero
    /// absorption enabled, a zero operand gives an empty pattern of the product's shape.
    ///
    /// # Errors
    /// [Error::ShapeMismatch] if the inner dimensions differ.
    pub fn mtimes(&self, x : &MX, y : &MX) -> Result<MX> {
        let xs = x.node()?.sparsity();
        let ys = y.node()?.sparsity();
        if xs.is_scalar() || ys.is_scalar() {
            return self.binary(Op::Mul,x,y);
        }
        if xs.ncol() != ys.nrow() {
            return Err(Error::ShapeMismatch{ lhs : xs.shape(), rhs : ys.shape() });
        }
        if self.options().zero_absorption && (x.is_zero() || y.is_zero()) {
            tracing::trace!("zero operand of matrix product absorbed");
            return Ok(MX::sparse(xs.nrow(),ys.ncol()));
        }
        let sp = xs.product(ys)?;
        Ok(MX::create(Op::MatMul,sp,vec![x.clone(),y.clone()],Payload::None))
    }
}

impl MX {
    /// Matrix product `self * y` with the default [Dispatcher].
    pub fn mtimes(&self, y : &MX) -> Result<MX> {
        Dispatcher::default().mtimes(self,y)
    }

    /// Transpose. The result gathers the nonzeros of `self` in transposed order; transposing twice
    /// gives back `self`.
    pub fn transpose(&self) -> Result<MX> {
        let (sp,mapping) = self.node()?.sparsity().transpose();
        self.get_nonzeros(sp,&mapping)
    }

    /// `self' * y` for two column vectors of the same length.
    pub fn inner_prod(&self, y : &MX) -> Result<MX> {
        if ! (self.is_vector() && y.is_vector() && self.nrow() == y.nrow()) {
            return Err(Error::ShapeMismatch{ lhs : self.shape(), rhs : y.shape() });
        }
        self.transpose()?.mtimes(y)
    }

    /// `self * y'`
    pub fn outer_prod(&self, y : &MX) -> Result<MX> {
        self.mtimes(&y.transpose()?)
    }

    fn norm(&self, kind : NormKind) -> Result<MX> {
        self.node()?;
        Ok(MX::create(Op::Norm,Sparsity::scalar(),vec![self.clone()],Payload::Norm(kind)))
    }

    pub fn norm_1(&self) -> Result<MX> { self.norm(NormKind::One) }
    pub fn norm_inf(&self) -> Result<MX> { self.norm(NormKind::Inf) }
    pub fn norm_fro(&self) -> Result<MX> { self.norm(NormKind::Frobenius) }

    /// Euclidean norm; only defined for vectors.
    pub fn norm_2(&self) -> Result<MX> {
        if self.is_vector() {
            self.norm(NormKind::Two)
        }
        else {
            Err(Error::UnsupportedOperation("2-norm of a matrix"))
        }
    }
}

//! Construction of elementwise binary nodes.
//!
//! The [Dispatcher] validates operand shapes, applies algebraic simplifications and zero
//! absorption, and then picks an evaluation strategy from the operand patterns and the
//! operator's zero behaviour (see [crate::op::OpTraits]).

use tracing::{debug,trace};

use super::{MX,Payload};
use crate::error::{Error,Result,Shape};
use crate::op::Op;
use crate::options::Options;
use crate::sparsity::{Sparsity,UnionSlot};

/// How a binary node combines the nonzeros of its operands.
#[derive(Debug,Clone,PartialEq)]
pub enum BinaryKernel {
    /// `x` is a dense scalar, combined with each nonzero of `y`. The result has the pattern of `y`.
    ScalarNonzeros,
    /// `y` is a dense scalar, combined with each nonzero of `x`. The result has the pattern of `x`.
    NonzerosScalar,
    /// Operands have the same pattern as the result and are combined nonzero by nonzero.
    NonzerosNonzeros,
    /// Operands have different patterns. Each result nonzero takes its operand nonzeros from the
    /// corresponding slot; a side missing from the slot is a structural zero.
    SparseSparse(Vec<UnionSlot>),
}

/// Builds unary and binary elementwise nodes under a fixed set of [Options].
#[derive(Debug,Clone,Copy,Default,PartialEq,Eq)]
pub struct Dispatcher {
    options : Options
}

fn broadcast_shape(xs : &Sparsity, ys : &Sparsity) -> Shape {
    if xs.is_scalar() { ys.shape() } else { xs.shape() }
}

impl Dispatcher {
    pub fn new(options : Options) -> Dispatcher { Dispatcher{ options } }
    pub fn options(&self) -> &Options { &self.options }

    /// Create the node for `op(x,y)`.
    ///
    /// The operands must have the same shape, or one of them must be a scalar which is then
    /// broadcast to the shape of the other.
    ///
    /// # Errors
    /// - [Error::UnsupportedOperation] if `op` is not a binary elementwise operator.
    /// - [Error::NullExpression] if an operand is null.
    /// - [Error::ShapeMismatch] if the shapes are incompatible.
    pub fn binary(&self, op : Op, x : &MX, y : &MX) -> Result<MX> {
        if ! op.is_binary() {
            return Err(Error::UnsupportedOperation("not a binary elementwise operator"));
        }
        let xs = x.node()?.sparsity();
        let ys = y.node()?.sparsity();
        if ! (xs.is_scalar() || ys.is_scalar() || xs.shape() == ys.shape()) {
            return Err(Error::ShapeMismatch{ lhs : xs.shape(), rhs : ys.shape() });
        }

        if self.options.simplify {
            if let Some(r) = self.simplify(op,x,y)? {
                return Ok(r);
            }
        }

        if self.options.zero_absorption &&
            ((op.is_left_absorbing() && x.is_zero()) || (op.is_right_absorbing() && y.is_zero())) {
            let Shape(nrow,ncol) = broadcast_shape(xs,ys);
            trace!(op = %op, "zero absorbed");
            return Ok(MX::sparse(nrow,ncol));
        }

        if xs.is_scalar() && ! ys.is_scalar() {
            self.scalar_matrix(op,x,y)
        }
        else if ys.is_scalar() && ! xs.is_scalar() {
            self.matrix_scalar(op,x,y)
        }
        else {
            self.matrix_matrix(op,x,y)
        }
    }

    /// Algebraic identities. Returns `None` if no rule applies.
    fn simplify(&self, op : Op, x : &MX, y : &MX) -> Result<Option<MX>> {
        let samedim = x.shape() == y.shape();
        let r = match op {
            Op::Add => {
                if (samedim || x.is_scalar()) && x.is_zero() {
                    trace!("0+y -> y");
                    Some(y.clone())
                }
                else if (samedim || y.is_scalar()) && y.is_zero() {
                    trace!("x+0 -> x");
                    Some(x.clone())
                }
                else if y.is_operation(Op::Neg) {
                    trace!("x+(-y) -> x-y");
                    Some(self.binary(Op::Sub,x,&y.dep(0)?)?)
                }
                else if x.is_operation(Op::Neg) {
                    trace!("(-x)+y -> y-x");
                    Some(self.binary(Op::Sub,y,&x.dep(0)?)?)
                }
                else if let Some(r) = cancel_difference(x,y)? {
                    trace!("(a-y)+y -> a");
                    Some(r)
                }
                else if let Some(r) = cancel_difference(y,x)? {
                    trace!("x+(a-x) -> a");
                    Some(r)
                }
                else {
                    None
                }
            },
            Op::Sub => {
                if (samedim || x.is_scalar()) && x.is_zero() {
                    trace!("0-y -> -y");
                    Some(self.unary(Op::Neg,y)?)
                }
                else if (samedim || y.is_scalar()) && y.is_zero() {
                    trace!("x-0 -> x");
                    Some(x.clone())
                }
                else if y.is_operation(Op::Neg) {
                    trace!("x-(-y) -> x+y");
                    Some(self.binary(Op::Add,x,&y.dep(0)?)?)
                }
                else if MX::same_node(x,y) {
                    trace!("x-x -> 0");
                    Some(MX::sparse(x.nrow(),x.ncol()))
                }
                else {
                    None
                }
            },
            Op::Mul => {
                if (samedim || x.is_scalar()) && x.is_one() {
                    trace!("1*y -> y");
                    Some(y.clone())
                }
                else if (samedim || x.is_scalar()) && x.is_minus_one() {
                    trace!("(-1)*y -> -y");
                    Some(self.unary(Op::Neg,y)?)
                }
                else if (samedim || y.is_scalar()) && y.is_one() {
                    trace!("x*1 -> x");
                    Some(x.clone())
                }
                else if (samedim || y.is_scalar()) && y.is_minus_one() {
                    trace!("x*(-1) -> -x");
                    Some(self.unary(Op::Neg,x)?)
                }
                else {
                    None
                }
            },
            Op::Div => {
                if (samedim || y.is_scalar()) && y.is_one() {
                    trace!("x/1 -> x");
                    Some(x.clone())
                }
                else {
                    None
                }
            },
            _ => None
        };
        Ok(r)
    }

    fn scalar_matrix(&self, op : Op, x : &MX, y : &MX) -> Result<MX> {
        if x.is_scalar_sparse() {
            return self.scalar_matrix(op,&MX::scalar(0.0),y);
        }
        if y.is_dense() || op.traits().fx0_zero {
            Ok(MX::create(op,y.node()?.sparsity().clone(),vec![x.clone(),y.clone()],Payload::Binary(BinaryKernel::ScalarNonzeros)))
        }
        else {
            debug!(op = %op, "densify matrix operand of scalar-matrix operation");
            self.scalar_matrix(op,x,&y.densify()?)
        }
    }

    fn matrix_scalar(&self, op : Op, x : &MX, y : &MX) -> Result<MX> {
        if y.is_scalar_sparse() {
            return self.matrix_scalar(op,x,&MX::scalar(0.0));
        }
        if x.is_dense() || op.traits().f0x_zero {
            Ok(MX::create(op,x.node()?.sparsity().clone(),vec![x.clone(),y.clone()],Payload::Binary(BinaryKernel::NonzerosScalar)))
        }
        else {
            debug!(op = %op, "densify matrix operand of matrix-scalar operation");
            self.matrix_scalar(op,&x.densify()?,y)
        }
    }

    fn matrix_matrix(&self, op : Op, x : &MX, y : &MX) -> Result<MX> {
        let xs = x.node()?.sparsity();
        let ys = y.node()?.sparsity();

        if (xs.is_dense() && ys.is_dense()) || (op.preserves_equal_patterns() && xs == ys) {
            Ok(MX::create(op,xs.clone(),vec![x.clone(),y.clone()],Payload::Binary(BinaryKernel::NonzerosNonzeros)))
        }
        else if ! op.preserves_equal_patterns() {
            debug!(op = %op, "densify operands of matrix-matrix operation");
            let (xd,yd) = (x.densify()?,y.densify()?);
            Ok(MX::create(op,xd.node()?.sparsity().clone(),vec![xd,yd],Payload::Binary(BinaryKernel::NonzerosNonzeros)))
        }
        else {
            let t = op.traits();
            let (sp,slots) = xs.combine(ys, ! t.fx0_zero, ! t.f0x_zero)?;
            debug!(op = %op, nnz = sp.nnz(), "sparse-sparse operation");
            Ok(MX::create(op,sp,vec![x.clone(),y.clone()],Payload::Binary(BinaryKernel::SparseSparse(slots))))
        }
    }
}

/// If `x` is `a-y` and `a` has the shape of `x`, return `a`.
fn cancel_difference(x : &MX, y : &MX) -> Result<Option<MX>> {
    if x.is_operation(Op::Sub) && MX::same_node(&x.dep(1)?,y) {
        let a = x.dep(0)?;
        if a.shape() == x.shape() {
            return Ok(Some(a));
        }
    }
    Ok(None)
}

////////////////////////////////////////////////////////////

impl MX {
    /// Create `op(x,y)` with the default [Dispatcher].
    pub fn binary(op : Op, x : &MX, y : &MX) -> Result<MX> {
        Dispatcher::default().binary(op,x,y)
    }

    /// Elementwise sum.
    pub fn add(&self, y : &MX) -> Result<MX> { MX::binary(Op::Add,self,y) }
    /// Elementwise difference.
    pub fn minus(&self, y : &MX) -> Result<MX> { MX::binary(Op::Sub,self,y) }
    /// Elementwise product.
    pub fn mul(&self, y : &MX) -> Result<MX> { MX::binary(Op::Mul,self,y) }
    /// Elementwise quotient.
    pub fn div(&self, y : &MX) -> Result<MX> { MX::binary(Op::Div,self,y) }

    /// Elementwise power. A constant exponent gives a [Op::ConstPow] node.
    pub fn pow(&self, y : &MX) -> Result<MX> {
        MX::binary(if y.is_constant() { Op::ConstPow } else { Op::Pow },self,y)
    }

    pub fn fmin(&self, y : &MX) -> Result<MX> { MX::binary(Op::Fmin,self,y) }
    pub fn fmax(&self, y : &MX) -> Result<MX> { MX::binary(Op::Fmax,self,y) }
    pub fn atan2(&self, y : &MX) -> Result<MX> { MX::binary(Op::Atan2,self,y) }
    pub fn lt(&self, y : &MX) -> Result<MX> { MX::binary(Op::Lt,self,y) }
    pub fn le(&self, y : &MX) -> Result<MX> { MX::binary(Op::Le,self,y) }
    /// `y < self`
    pub fn gt(&self, y : &MX) -> Result<MX> { MX::binary(Op::Lt,y,self) }
    /// `y <= self`
    pub fn ge(&self, y : &MX) -> Result<MX> { MX::binary(Op::Le,y,self) }
    pub fn equal(&self, y : &MX) -> Result<MX> { MX::binary(Op::Eq,self,y) }
    pub fn not_equal(&self, y : &MX) -> Result<MX> { MX::binary(Op::Ne,self,y) }
    pub fn logic_and(&self, y : &MX) -> Result<MX> { MX::binary(Op::And,self,y) }
    pub fn logic_or(&self, y : &MX) -> Result<MX> { MX::binary(Op::Or,self,y) }
    /// `y` where `self` is nonzero, zero elsewhere.
    pub fn if_else_zero(&self, y : &MX) -> Result<MX> { MX::binary(Op::IfElseZero,self,y) }

    /// Replace `self` by a [Op::Lift] node that marks it as a lifted variable with initial guess
    /// `guess`. The value of the node is the value of `self`.
    pub fn lift(&mut self, guess : &MX) -> Result<()> {
        *self = MX::binary(Op::Lift,self,guess)?;
        Ok(())
    }

    /// `self / y` for a scalar `y`.
    ///
    /// # Errors
    /// [Error::UnsupportedOperation] if `y` is not a scalar.
    pub fn mrdivide(&self, y : &MX) -> Result<MX> {
        y.node()?;
        if ! y.is_scalar() {
            return Err(Error::UnsupportedOperation("mrdivide with a non-scalar divisor"));
        }
        self.div(y)
    }

    /// Matrix power, computed elementwise as [MX::pow].
    pub fn mpower(&self, y : &MX) -> Result<MX> { self.pow(y) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kernel(x : &MX) -> &BinaryKernel {
        match x.get().map(|n| n.payload()) {
            Some(Payload::Binary(k)) => k,
            _ => panic!("not a binary node: {:?}",x)
        }
    }

    #[test]
    fn shape_validation() {
        let a = MX::symbol("a",2,3);
        let b = MX::symbol("b",3,2);
        assert_eq!(a.add(&b).unwrap_err(),Error::ShapeMismatch{ lhs : Shape(2,3), rhs : Shape(3,2) });
        assert_eq!(a.add(&MX::null()).unwrap_err(),Error::NullExpression);
        assert!(matches!(MX::binary(Op::Exp,&a,&a),Err(Error::UnsupportedOperation(_))));
        assert_eq!(a.add(&MX::symbol("s",1,1)).unwrap().shape(),Shape(2,3));
        assert_eq!(MX::symbol("s",1,1).mul(&a).unwrap().shape(),Shape(2,3));
    }

    #[test]
    fn strategies() {
        let s = MX::symbol("s",1,1);
        let d = MX::symbol("d",3,3);
        let e = MX::symbol_with_sparsity("e",Sparsity::diagonal(3));

        // Scalar times sparse keeps the pattern
        let r = s.mul(&e).unwrap();
        assert_eq!(kernel(&r),&BinaryKernel::ScalarNonzeros);
        assert_eq!(r.sparsity().unwrap(),e.sparsity().unwrap());

        // Scalar plus sparse must densify the sparse operand
        let r = s.add(&e).unwrap();
        assert!(r.is_dense());
        assert!(r.dep(1).unwrap().is_densification());

        // Sparse divided by scalar keeps the pattern, scalar divided by sparse does not
        let r = e.div(&s).unwrap();
        assert_eq!(kernel(&r),&BinaryKernel::NonzerosScalar);
        assert_eq!(r.nnz(),3);
        assert!(s.div(&e).unwrap().is_dense());

        let r = d.add(&d).unwrap();
        assert_eq!(kernel(&r),&BinaryKernel::NonzerosNonzeros);

        let r = e.add(&e).unwrap();
        assert_eq!(kernel(&r),&BinaryKernel::NonzerosNonzeros);
        assert_eq!(r.nnz(),3);

        // Pow of a sparse matrix is dense since 0^0 = 1
        let r = e.pow(&e).unwrap();
        assert!(r.is_dense());
        assert_eq!(r.op(),Some(Op::Pow));
        assert_eq!(e.pow(&MX::scalar(2.0)).unwrap().op(),Some(Op::ConstPow));
    }

    #[test]
    fn sparse_sparse_patterns() {
        let e = MX::symbol_with_sparsity("e",Sparsity::diagonal(3));
        let f = MX::symbol_with_sparsity("f",Sparsity::new(3,3,vec![0,2,2,3],vec![0,1,2]).unwrap());

        // Union for addition
        let r = e.add(&f).unwrap();
        assert_eq!(r.sparsity().unwrap().entries().collect::<Vec<_>>(),&[(0,0),(0,1),(1,1),(2,2)]);
        match kernel(&r) {
            BinaryKernel::SparseSparse(slots) => assert_eq!(slots,&[UnionSlot::Both(0,0),UnionSlot::Right(1),UnionSlot::Left(1),UnionSlot::Both(2,2)]),
            k => panic!("unexpected kernel {:?}",k)
        }

        // Intersection for multiplication
        let r = e.mul(&f).unwrap();
        assert_eq!(r.sparsity().unwrap().entries().collect::<Vec<_>>(),&[(0,0),(2,2)]);

        // Division densifies since 0/0 is not zero
        let r = e.div(&f);
        assert!(r.unwrap().is_dense());
    }

    #[test]
    fn zero_absorption() {
        let x = MX::symbol("x",2,2);
        let z = MX::zeros(2,2);
        let r = x.mul(&z).unwrap();
        assert!(r.is_zero());
        assert_eq!(r.nnz(),0);
        assert_eq!(r.shape(),Shape(2,2));

        let r = MX::scalar(0.0).div(&x).unwrap();
        assert!(r.is_zero());
        assert_eq!(r.shape(),Shape(2,2));

        // Division by zero is not absorbed
        assert!(! x.div(&z).unwrap().is_zero());

        let raw = Dispatcher::new(Options::default().with_zero_absorption(false));
        assert_eq!(raw.binary(Op::Mul,&x,&z).unwrap().op(),Some(Op::Mul));
    }

    #[test]
    fn simplifications() {
        let x = MX::symbol("x",2,2);
        let y = MX::symbol("y",2,2);

        assert_eq!(x.add(&MX::zeros(2,2)).unwrap(),x);
        assert_eq!(MX::scalar(0.0).add(&x).unwrap(),x);
        assert_eq!(x.minus(&MX::sparse(1,1)).unwrap(),x);
        assert_eq!(x.mul(&MX::scalar(1.0)).unwrap(),x);
        assert_eq!(MX::ones(2,2).mul(&x).unwrap(),x);
        assert_eq!(x.div(&MX::scalar(1.0)).unwrap(),x);

        let r = x.minus(&x).unwrap();
        assert!(r.is_zero());
        assert_eq!(r.shape(),Shape(2,2));

        let r = x.mul(&MX::scalar(-1.0)).unwrap();
        assert!(r.is_operation(Op::Neg));
        assert_eq!(r.dep(0).unwrap(),x);

        let r = MX::scalar(0.0).minus(&x).unwrap();
        assert!(r.is_operation(Op::Neg));

        // x + (-y) becomes x - y
        let r = x.add(&y.neg().unwrap()).unwrap();
        assert!(r.is_operation(Op::Sub));
        assert_eq!(r.dep(0).unwrap(),x);
        assert_eq!(r.dep(1).unwrap(),y);

        // (x - y) + y becomes x
        let d = x.minus(&y).unwrap();
        assert_eq!(d.add(&y).unwrap(),x);

        // A scalar one does not hide a shape change
        let s = MX::symbol("s",1,1);
        assert_eq!(s.mul(&MX::ones(2,2)).unwrap().shape(),Shape(2,2));
    }

    #[test]
    fn lift_keeps_value_operand() {
        let x = MX::symbol("x",2,2);
        let g = MX::zeros(2,2);
        let mut y = x.clone();
        y.lift(&g).unwrap();
        assert!(y.is_operation(Op::Lift));
        assert_eq!(y.dep(0).unwrap(),x);
        assert_eq!(y.dep(1).unwrap(),g);
        assert_eq!(y.is_commutative(),Ok(false));

        // Sparse value, scalar guess: the pattern of the value is kept
        let mut e = MX::symbol_with_sparsity("e",Sparsity::diagonal(3));
        e.lift(&MX::scalar(1.0)).unwrap();
        assert_eq!(e.sparsity().unwrap(),&Sparsity::diagonal(3));
        assert!(matches!(e.lift(&MX::symbol("g",2,2)),Err(Error::ShapeMismatch{..})));
        assert!(e.is_operation(Op::Lift));
    }

    #[test]
    fn matrix_division_and_power() {
        let x = MX::symbol("x",2,2);
        let s = MX::symbol("s",1,1);
        let r = x.mrdivide(&s).unwrap();
        assert!(r.is_operation(Op::Div));
        assert_eq!(r.dep(1).unwrap(),s);
        assert_eq!(x.mrdivide(&MX::scalar(1.0)).unwrap(),x);
        assert!(matches!(x.mrdivide(&MX::symbol("y",2,2)),Err(Error::UnsupportedOperation(_))));
        assert_eq!(x.mrdivide(&MX::null()).unwrap_err(),Error::NullExpression);

        assert_eq!(x.mpower(&s).unwrap().op(),Some(Op::Pow));
        assert_eq!(x.mpower(&MX::scalar(2.0)).unwrap().op(),Some(Op::ConstPow));
    }

    #[test]
    fn simplification_can_be_disabled() {
        let x = MX::symbol("x",2,2);
        let d = Dispatcher::new(Options::raw());
        let r = d.binary(Op::Add,&x,&MX::zeros(2,2)).unwrap();
        assert!(r.is_operation(Op::Add));
        let r = d.binary(Op::Sub,&x,&x).unwrap();
        assert!(r.is_operation(Op::Sub));
    }
}

//! Construction of elementwise unary nodes.

use super::{Dispatcher,MX,Payload};
use crate::error::{Error,Result};
use crate::op::Op;

impl Dispatcher {
    /// Create the node for `op(x)`.
    ///
    /// Operators with `f(0) = 0` keep the pattern of `x`; other operators are applied to the
    /// densified operand. With simplification enabled, `-(-x)` gives `x`.
    pub fn unary(&self, op : Op, x : &MX) -> Result<MX> {
        if ! op.is_unary() {
            return Err(Error::UnsupportedOperation("not a unary elementwise operator"));
        }
        let node = x.node()?;
        if self.options().simplify && op.is_involutive_negation() && node.op() == op {
            tracing::trace!("-(-x) -> x");
            return Ok(node.deps()[0].clone());
        }
        if op.preserves_zero() || node.sparsity().is_dense() {
            Ok(MX::create(op,node.sparsity().clone(),vec![x.clone()],Payload::None))
        }
        else {
            tracing::debug!(op = %op, "densify operand of unary operation");
            let xd = x.densify()?;
            let sp = xd.node()?.sparsity().clone();
            Ok(MX::create(op,sp,vec![xd],Payload::None))
        }
    }
}

macro_rules! unary_methods {
    ($($(#[$doc:meta])* $name:ident => $op:ident),* $(,)?) => {
        impl MX {
            $(
                $(#[$doc])*
                pub fn $name(&self) -> Result<MX> { MX::unary(Op::$op,self) }
            )*
        }
    }
}

unary_methods!{
    /// Elementwise negation.
    neg => Neg,
    exp => Exp,
    log => Log,
    sqrt => Sqrt,
    sin => Sin,
    cos => Cos,
    tan => Tan,
    asin => Asin,
    acos => Acos,
    atan => Atan,
    sinh => Sinh,
    cosh => Cosh,
    tanh => Tanh,
    asinh => Asinh,
    acosh => Acosh,
    atanh => Atanh,
    floor => Floor,
    ceil => Ceil,
    /// Elementwise absolute value.
    fabs => Fabs,
    sign => Sign,
    erf => Erf,
    erfinv => Erfinv,
    /// Elementwise logical negation.
    logic_not => Not,
}

impl MX {
    /// Create `op(x)` with the default [Dispatcher].
    pub fn unary(op : Op, x : &MX) -> Result<MX> {
        Dispatcher::default().unary(op,x)
    }

    /// Base 10 logarithm, `log(x) * (1/ln 10)`.
    pub fn log10(&self) -> Result<MX> {
        self.log()?.mul(&MX::scalar(1.0/std::f64::consts::LN_10))
    }

    /// `x*x`
    pub fn sq(&self) -> Result<MX> { self.mul(self) }
}

impl std::ops::Neg for &MX {
    type Output = Result<MX>;
    fn neg(self) -> Result<MX> { MX::neg(self) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;
    use crate::sparsity::Sparsity;

    #[test]
    fn pattern_of_unary_result() {
        let e = MX::symbol_with_sparsity("e",Sparsity::diagonal(3));
        let r = e.sin().unwrap();
        assert_eq!(r.sparsity().unwrap(),e.sparsity().unwrap());
        assert_eq!(r.dep(0).unwrap(),e);

        // cos(0) = 1
        let r = e.cos().unwrap();
        assert!(r.is_dense());
        assert!(r.dep(0).unwrap().is_densification());

        assert!(matches!(MX::unary(Op::Add,&e),Err(Error::UnsupportedOperation(_))));
        assert_eq!(MX::null().exp().unwrap_err(),Error::NullExpression);
    }

    #[test]
    fn double_negation() {
        let x = MX::symbol("x",2,1);
        let n = (-&x).unwrap();
        assert!(n.is_operation(Op::Neg));
        assert_eq!(n.neg().unwrap(),x);

        let raw = Dispatcher::new(Options::raw());
        let nn = raw.unary(Op::Neg,&n).unwrap();
        assert!(nn.is_operation(Op::Neg));
        assert_eq!(nn.dep(0).unwrap(),n);
    }

    #[test]
    fn log10() {
        let x = MX::symbol("x",1,1);
        let r = x.log10().unwrap();
        assert!(r.is_operation(Op::Mul));
        assert!(r.dep(0).unwrap().is_operation(Op::Log));
    }
}

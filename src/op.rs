//! Operator tags and the per-operator metadata used by the dispatcher.
//!
//! Every node carries an [Op] tag. Elementwise operators additionally have an [OpTraits] entry
//! that classifies how they treat structural zeros; all sparsity decisions and simplification
//! predicates of the dispatcher read this one table.

use std::fmt;

/// Tag identifying the kind of a node.
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash)]
pub enum Op {
    // Sources
    Const,
    Parameter,

    // Structural
    Mapping,
    Densify,
    MatMul,
    Norm,
    Call,
    Output,

    // Unary elementwise
    Neg,
    Exp,
    Log,
    Sqrt,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Asinh,
    Acosh,
    Atanh,
    Floor,
    Ceil,
    Fabs,
    Sign,
    Erf,
    Erfinv,
    Not,

    // Binary elementwise
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    ConstPow,
    Fmin,
    Fmax,
    Atan2,
    Lt,
    Le,
    Eq,
    Ne,
    And,
    Or,
    IfElseZero,
    Lift,
}

/// How an elementwise operator treats structural zeros.
///
/// For a binary operator `f(x,y)`:
/// - `f0x_zero`: `f(0,y) = 0` for all `y`. A zero left operand absorbs the result.
/// - `fx0_zero`: `f(x,0) = 0` for all `x`. A zero right operand absorbs the result.
/// - `f00_zero`: `f(0,0) = 0`. Elements that are zero in both operands stay zero.
///
/// For a unary operator only `f00_zero` is used and means `f(0) = 0`.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct OpTraits {
    pub name        : &'static str,
    pub arity       : usize,
    pub f0x_zero    : bool,
    pub fx0_zero    : bool,
    pub f00_zero    : bool,
    pub commutative : bool,
}

const fn unary(name : &'static str, f0_zero : bool) -> OpTraits {
    OpTraits{ name, arity : 1, f0x_zero : f0_zero, fx0_zero : f0_zero, f00_zero : f0_zero, commutative : true }
}

const fn binary(name : &'static str, f0x_zero : bool, fx0_zero : bool, f00_zero : bool, commutative : bool) -> OpTraits {
    OpTraits{ name, arity : 2, f0x_zero, fx0_zero, f00_zero, commutative }
}

const fn structural(name : &'static str, arity : usize) -> OpTraits {
    OpTraits{ name, arity, f0x_zero : false, fx0_zero : false, f00_zero : false, commutative : false }
}

impl Op {
    /// The metadata table.
    pub const fn traits(self) -> OpTraits {
        use Op::*;
        match self {
            Const      => structural("const",0),
            Parameter  => structural("parameter",0),
            Mapping    => structural("mapping",usize::MAX),
            Densify    => structural("densify",1),
            MatMul     => structural("mtimes",2),
            Norm       => structural("norm",1),
            Call       => structural("call",usize::MAX),
            Output     => structural("output",1),

            Neg    => unary("neg",true),
            Exp    => unary("exp",false),
            Log    => unary("log",false),
            Sqrt   => unary("sqrt",true),
            Sin    => unary("sin",true),
            Cos    => unary("cos",false),
            Tan    => unary("tan",true),
            Asin   => unary("asin",true),
            Acos   => unary("acos",false),
            Atan   => unary("atan",true),
            Sinh   => unary("sinh",true),
            Cosh   => unary("cosh",false),
            Tanh   => unary("tanh",true),
            Asinh  => unary("asinh",true),
            Acosh  => unary("acosh",false),
            Atanh  => unary("atanh",true),
            Floor  => unary("floor",true),
            Ceil   => unary("ceil",true),
            Fabs   => unary("fabs",true),
            Sign   => unary("sign",true),
            Erf    => unary("erf",true),
            Erfinv => unary("erfinv",true),
            Not    => unary("not",false),

            //                      f(0,y) f(x,0) f(0,0) comm
            Add        => binary("add",      false, false, true,  true),
            Sub        => binary("sub",      false, false, true,  false),
            Mul        => binary("mul",      true,  true,  true,  true),
            Div        => binary("div",      true,  false, false, false),
            Pow        => binary("pow",      false, false, false, false),
            ConstPow   => binary("constpow", false, false, false, false),
            Fmin       => binary("fmin",     false, false, true,  true),
            Fmax       => binary("fmax",     false, false, true,  true),
            Atan2      => binary("atan2",    false, false, true,  false),
            Lt         => binary("lt",       false, false, true,  false),
            Le         => binary("le",       false, false, false, false),
            Eq         => binary("eq",       false, false, false, true),
            Ne         => binary("ne",       false, false, true,  true),
            And        => binary("and",      true,  true,  true,  true),
            Or         => binary("or",       false, false, true,  true),
            IfElseZero => binary("if_else_zero", true, true, true, false),
            Lift       => binary("lift",     true,  false, true,  false),
        }
    }

    pub fn name(self) -> &'static str { self.traits().name }

    pub fn is_unary(self) -> bool {
        let t = self.traits();
        t.arity == 1 && ! matches!(self, Op::Densify | Op::Norm | Op::Output)
    }

    pub fn is_binary(self) -> bool {
        self.traits().arity == 2 && self != Op::MatMul
    }

    /// `x op y` is the zero matrix whenever `x` is zero.
    pub fn is_left_absorbing(self) -> bool { self.is_binary() && self.traits().f0x_zero }
    /// `x op y` is the zero matrix whenever `y` is zero.
    pub fn is_right_absorbing(self) -> bool { self.is_binary() && self.traits().fx0_zero }
    /// A binary operator whose result is structurally contained in the union of the operand
    /// patterns, so two operands with equal patterns can be combined nonzero by nonzero.
    pub fn preserves_equal_patterns(self) -> bool { self.traits().f00_zero }
    /// A unary operator that maps zero to zero and can therefore keep the operand's pattern.
    pub fn preserves_zero(self) -> bool { self.is_unary() && self.traits().f00_zero }
    /// `-(-x) = x`.
    pub fn is_involutive_negation(self) -> bool { self == Op::Neg }
    pub fn is_commutative(self) -> bool { self.traits().commutative }
}

impl fmt::Display for Op {
    fn fmt(&self, f : &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert!(Op::Mul.is_left_absorbing() && Op::Mul.is_right_absorbing());
        assert!(Op::Div.is_left_absorbing() && ! Op::Div.is_right_absorbing());
        assert!(! Op::Add.is_left_absorbing());
        assert!(Op::Add.preserves_equal_patterns());
        assert!(! Op::Pow.preserves_equal_patterns());

        assert!(Op::Sin.preserves_zero());
        assert!(! Op::Cos.preserves_zero());
        assert!(Op::Neg.is_involutive_negation());

        assert!(Op::Exp.is_unary());
        assert!(! Op::Densify.is_unary());
        assert!(Op::Atan2.is_binary());
        assert!(! Op::MatMul.is_binary());
        assert!(! Op::Const.is_binary() && ! Op::Const.is_unary());
        assert!(Op::Lift.is_binary() && ! Op::Lift.is_commutative());
        assert!(Op::Lift.is_left_absorbing() && ! Op::Lift.is_right_absorbing());
    }

    #[test]
    fn display() {
        assert_eq!(Op::IfElseZero.to_string(),"if_else_zero");
        assert_eq!(format!("{}",Op::Mapping),"mapping");
    }
}

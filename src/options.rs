//! Construction time configuration of the operator dispatcher.

/// Switches for the rewrites the [crate::Dispatcher] applies before it allocates a node.
///
/// Options are passed explicitly to a dispatcher; there is no process wide option state.
/// Collapsing of mapping chains is not an option, it always happens.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct Options {
    /// Apply algebraic identities: `x+0`, `x-x`, `x*1`, `x*(-1)`, `x/1` and
    /// folding of negations into additions.
    pub simplify : bool,
    /// Short-circuit absorbing operators when the absorbing operand is a zero constant.
    pub zero_absorption : bool,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            simplify        : true,
            zero_absorption : true,
        }
    }
}

impl Options {
    /// Options with every rewrite disabled. Nodes are created exactly as requested.
    pub fn raw() -> Options {
        Options { simplify : false, zero_absorption : false }
    }
    pub fn with_simplify(self, simplify : bool) -> Options { Options{ simplify, ..self } }
    pub fn with_zero_absorption(self, zero_absorption : bool) -> Options { Options{ zero_absorption, ..self } }
}

//! Nonzero gather nodes.
//!
//! A mapping node assembles its nonzeros from nonzeros of its dependencies. The table has one
//! entry per result nonzero: either a reference to a dependency nonzero, or `None` for a slot
//! that no write has reached (and that therefore holds zero).
//!
//! Mappings are always kept in collapsed form. When a mapping is built on top of other mappings
//! the references are resolved through them, so a mapping never depends on another mapping.
//! Dependencies that are referenced twice are merged and unreferenced ones are dropped. A mapping
//! that reproduces a single dependency is replaced by the dependency, and one that only reads
//! constants is folded into a constant.

use std::collections::HashMap;

use super::{MX,Node,Payload};
use crate::error::{Error,Result,Shape};
use crate::op::Op;
use crate::sparsity::{Sparsity,UnionSlot};

/// Reference to nonzero `nz` of dependency `dep`.
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash)]
pub struct NzRef {
    pub dep : usize,
    pub nz  : usize,
}

impl NzRef {
    pub fn new(dep : usize, nz : usize) -> NzRef { NzRef{ dep, nz } }
}

/// Gather table of a mapping node.
#[derive(Debug,Clone,PartialEq)]
pub struct Mapping {
    table : Vec<Option<NzRef>>
}

impl Mapping {
    /// One entry per result nonzero.
    pub fn table(&self) -> &[Option<NzRef>] { self.table.as_slice() }

    /// Iterate over `(dep, dep_nz, result_nz)` for every assigned result nonzero.
    pub fn triples(&self) -> impl Iterator<Item = (usize,usize,usize)> + '_ {
        self.table.iter().enumerate().filter_map(|(k,s)| s.map(|r| (r.dep,r.nz,k)))
    }

    /// Number of result nonzeros that no dependency feeds.
    pub fn unassigned(&self) -> usize { self.table.iter().filter(|s| s.is_none()).count() }
}

/// Follow `(d,nz)` through mapping nodes until it reaches a non-mapping node. Returns `None` if
/// the nonzero is an unassigned slot of some mapping along the way.
fn resolve(mut d : &MX, mut nz : usize) -> Option<(&MX,usize)> {
    loop {
        match d.get() {
            Some(node) if node.op == Op::Mapping => {
                let r = node.mapping()?.table.get(nz).copied()??;
                d = &node.deps[r.dep];
                nz = r.nz;
            },
            _ => return Some((d,nz))
        }
    }
}

/// Build a mapping node in collapsed form, see the module documentation.
///
/// # Arguments
/// - `sparsity` Result pattern; `table.len()` must equal `sparsity.nnz()`.
/// - `deps` Dependencies referenced by `table`.
/// - `table` Source of each result nonzero.
pub(crate) fn build(sparsity : Sparsity, deps : &[MX], table : Vec<Option<NzRef>>) -> MX {
    debug_assert_eq!(sparsity.nnz(),table.len());

    let mut rdeps : Vec<MX> = Vec::new();
    let mut lookup : HashMap<MX,usize> = HashMap::new();
    let rtable : Vec<Option<NzRef>> = table.into_iter()
        .map(|s| s.and_then(|r| resolve(&deps[r.dep],r.nz)))
        .map(|s| s.map(|(d,nz)| {
            let dep = *lookup.entry(d.clone()).or_insert_with(|| { rdeps.push(d.clone()); rdeps.len()-1 });
            NzRef{ dep, nz }
        }))
        .collect();

    if rdeps.iter().all(MX::is_constant) {
        tracing::trace!(sparsity = %sparsity, ndep = rdeps.len(), "mapping folded into constant");
        let values = rtable.iter()
            .map(|s| s.and_then(|r| rdeps[r.dep].constant_values().map(|v| v[r.nz])).unwrap_or(0.0))
            .collect();
        return MX::constant_unchecked(sparsity,values);
    }

    if let [d] = rdeps.as_slice() {
        let identity =
            d.get().map(|n| n.sparsity == sparsity).unwrap_or(false) &&
            rtable.iter().enumerate().all(|(k,s)| s.map(|r| r.nz == k).unwrap_or(false));
        if identity {
            tracing::trace!(sparsity = %sparsity, "identity mapping collapsed");
            return d.clone();
        }
    }

    MX::create(Op::Mapping,sparsity,rdeps,Payload::Mapping(Mapping{ table : rtable }))
}

/// Wrap `x` in a single-dependency identity mapping without collapsing it, so that nonzeros can
/// be assigned in place.
pub(super) fn wrap_identity(x : &MX) -> Result<MX> {
    let sp = x.node()?.sparsity.clone();
    let table = (0..sp.nnz()).map(|k| Some(NzRef{ dep : 0, nz : k })).collect();
    Ok(MX::create(Op::Mapping,sp,vec![x.clone()],Payload::Mapping(Mapping{ table })))
}

/// Rebuild an exclusively owned mapping node in collapsed form.
pub(super) fn simplify(node : &mut Node) -> MX {
    let deps = std::mem::take(&mut node.deps);
    let table = node.mapping_mut().map(|m| std::mem::take(&mut m.table)).unwrap_or_default();
    build(node.sparsity.clone(),deps.as_slice(),table)
}

/// Assign nonzero `src` of a new dependency `el` to each result nonzero listed in `k`. `node`
/// must be an exclusively owned mapping node.
pub(super) fn assign(node : &mut Node, k : &[usize], el : &MX, broadcast : bool) {
    let dep = node.deps.len();
    node.deps.push(el.clone());
    if let Some(m) = node.mapping_mut() {
        for (i,&kk) in k.iter().enumerate() {
            m.table[kk] = Some(NzRef{ dep, nz : if broadcast { 0 } else { i } });
        }
    }
}

impl MX {
    /// Gather nonzeros of `self` into a new expression with pattern `sparsity`; result nonzero `k`
    /// is nonzero `nz[k]` of `self`.
    pub fn get_nonzeros(&self, sparsity : Sparsity, nz : &[usize]) -> Result<MX> {
        let n = self.node()?.sparsity.nnz();
        if nz.len() != sparsity.nnz() {
            return Err(Error::DimensionMismatch{ lhs : Shape(sparsity.nnz(),1), rhs : Shape(nz.len(),1) });
        }
        if let Some(&k) = nz.iter().find(|&&k| k >= n) {
            return Err(Error::NonzeroIndexError{ index : k as i64, nnz : n });
        }
        Ok(build(sparsity,std::slice::from_ref(self),nz.iter().map(|&k| Some(NzRef{ dep : 0, nz : k })).collect()))
    }

    /// Overlay two expressions of equal shape. The result has the union pattern; where both have a
    /// nonzero, the one from `b` is used.
    pub fn unite(a : &MX, b : &MX) -> Result<MX> {
        let (sp,slots) = a.node()?.sparsity.pattern_union(b.node()?.sparsity())?;
        let table = slots.into_iter()
            .map(|s| Some(match s {
                UnionSlot::Left(k)    => NzRef{ dep : 0, nz : k },
                UnionSlot::Right(l)   => NzRef{ dep : 1, nz : l },
                UnionSlot::Both(_,l)  => NzRef{ dep : 1, nz : l },
            }))
            .collect();
        Ok(build(sp,&[a.clone(),b.clone()],table))
    }

    /// Stack expressions vertically. Empty `0x0` operands are skipped, and a single remaining
    /// operand is returned as it is.
    pub fn vertcat(parts : &[MX]) -> Result<MX> {
        let parts = non_empty_parts(parts)?;
        if let [p] = parts.as_slice() {
            return Ok(p.handle.clone());
        }
        let sp = Sparsity::vertcat(&parts.iter().map(|p| &p.sparsity).collect::<Vec<_>>())?;
        let table = parts.iter().enumerate()
            .flat_map(|(d,p)| (0..p.sparsity.nnz()).map(move |k| Some(NzRef{ dep : d, nz : k })))
            .collect();
        Ok(build(sp,&parts.iter().map(|p| p.handle.clone()).collect::<Vec<_>>(),table))
    }

    /// Stack `y` below `self`, replacing `self`. Appending to a null handle makes it `y`.
    pub fn append(&mut self, y : &MX) -> Result<()> {
        *self = if self.is_null() { y.clone() } else { MX::vertcat(&[self.clone(),y.clone()])? };
        Ok(())
    }

    /// Put expressions side by side. Empty `0x0` operands are skipped, and a single remaining
    /// operand is returned as it is.
    pub fn horzcat(parts : &[MX]) -> Result<MX> {
        let parts = non_empty_parts(parts)?;
        if let [p] = parts.as_slice() {
            return Ok(p.handle.clone());
        }
        let sp = Sparsity::horzcat(&parts.iter().map(|p| &p.sparsity).collect::<Vec<_>>())?;
        let mut table = Vec::with_capacity(sp.nnz());
        for i in 0..sp.nrow() {
            for (d,p) in parts.iter().enumerate() {
                let ptr = p.sparsity.rowptr();
                table.extend((ptr[i]..ptr[i+1]).map(|k| Some(NzRef{ dep : d, nz : k })));
            }
        }
        Ok(build(sp,&parts.iter().map(|p| p.handle.clone()).collect::<Vec<_>>(),table))
    }
}

struct Part {
    handle   : MX,
    sparsity : Sparsity,
}

fn non_empty_parts(parts : &[MX]) -> Result<Vec<Part>> {
    let mut res = Vec::with_capacity(parts.len());
    for p in parts {
        let sp = p.node()?.sparsity();
        if sp.nrow() > 0 || sp.ncol() > 0 {
            res.push(Part{ handle : p.clone(), sparsity : sp.clone() });
        }
    }
    Ok(res)
}

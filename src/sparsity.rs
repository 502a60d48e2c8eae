//! Compressed row sparsity patterns.
//!
//! A [Sparsity] describes which elements of a `nrow x ncol` matrix are structurally nonzero. The
//! nonzeros are stored in compressed row format: `rowptr[i]..rowptr[i+1]` is the range of nonzero
//! indexes belonging to row `i`, and `col[k]` is the column of the `k`th nonzero. Columns are
//! strictly increasing within each row, so the nonzero order is canonical and two patterns are
//! equal exactly when their shapes and compressed data are equal.
//!
//! Patterns are shared between nodes. Cloning a [Sparsity] is cheap; the few operations that
//! modify a pattern in place copy the underlying data first if it is shared.

use std::fmt;
use std::rc::Rc;

use itertools::{EitherOrBoth, Itertools};

use crate::error::{Error, Result, Shape};
use crate::utils::*;

/// Membership of a nonzero of a pattern union: `Left(k)` if only the left pattern has it (as its
/// `k`th nonzero), `Right(k)` if only the right pattern has it, `Both(k,l)` for the intersection.
pub type UnionSlot = EitherOrBoth<usize,usize>;

#[derive(Debug,Clone,PartialEq,Eq,Hash)]
struct SparsityData {
    nrow   : usize,
    ncol   : usize,
    rowptr : Vec<usize>,
    col    : Vec<usize>,
}

/// Shared, structurally compared sparsity pattern.
#[derive(Debug,Clone)]
pub struct Sparsity(Rc<SparsityData>);

impl PartialEq for Sparsity {
    fn eq(&self, other : &Sparsity) -> bool {
        Rc::ptr_eq(&self.0,&other.0) || *self.0 == *other.0
    }
}

impl Eq for Sparsity {}

impl std::hash::Hash for Sparsity {
    fn hash<H : std::hash::Hasher>(&self, state : &mut H) {
        self.0.hash(state)
    }
}

impl fmt::Display for Sparsity {
    fn fmt(&self, f : &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dense() {
            write!(f,"{}x{}, dense",self.nrow(),self.ncol())
        }
        else {
            write!(f,"{}x{}, {} nonzeros",self.nrow(),self.ncol(),self.nnz())
        }
    }
}

impl Sparsity {
    fn raw(nrow : usize, ncol : usize, rowptr : Vec<usize>, col : Vec<usize>) -> Sparsity {
        Sparsity(Rc::new(SparsityData{ nrow, ncol, rowptr, col }))
    }

    /// Create a pattern from compressed row data, checking that the data is valid.
    ///
    /// # Arguments
    /// - `rowptr` Row pointers, `nrow+1` non-decreasing values starting at 0.
    /// - `col` Column index of each nonzero; strictly increasing within each row.
    pub fn new(nrow : usize, ncol : usize, rowptr : Vec<usize>, col : Vec<usize>) -> Result<Sparsity> {
        if rowptr.len() != nrow+1 {
            Err(Error::InvalidSparsity(format!("Expected {} row pointers, got {}",nrow+1,rowptr.len())))
        }
        else if rowptr[0] != 0 || rowptr[nrow] != col.len() {
            Err(Error::InvalidSparsity("Row pointers do not span the column indexes".to_string()))
        }
        else if rowptr.iter().zip(rowptr[1..].iter()).any(|(p0,p1)| p1 < p0) {
            Err(Error::InvalidSparsity("Row pointers are decreasing".to_string()))
        }
        else if col.chunks_ptr(&rowptr).any(|js| ! is_strictly_increasing(js)) {
            Err(Error::InvalidSparsity("Columns are unsorted or contain duplicates".to_string()))
        }
        else if let Some(j) = first_out_of_bounds(&col, ncol) {
            Err(Error::IndexError{ index : j, shape : Shape(nrow,ncol) })
        }
        else {
            Ok(Sparsity::raw(nrow,ncol,rowptr,col))
        }
    }

    /// Fully dense pattern.
    pub fn dense(nrow : usize, ncol : usize) -> Sparsity {
        Sparsity::raw(nrow,ncol,
                      (0..nrow+1).map(|i| i*ncol).collect(),
                      (0..nrow).flat_map(|_| 0..ncol).collect())
    }

    /// Pattern without nonzeros.
    pub fn empty(nrow : usize, ncol : usize) -> Sparsity {
        Sparsity::raw(nrow,ncol,vec![0; nrow+1],Vec::new())
    }

    /// Dense 1x1 pattern.
    pub fn scalar() -> Sparsity { Sparsity::dense(1,1) }

    /// 1x1 pattern with no nonzero, i.e. a structural zero scalar.
    pub fn scalar_sparse() -> Sparsity { Sparsity::empty(1,1) }

    /// Square pattern with nonzeros on the diagonal.
    pub fn diagonal(n : usize) -> Sparsity {
        Sparsity::raw(n,n,(0..n+1).collect(),(0..n).collect())
    }

    /// Create a pattern from a list of `(row,col)` coordinates, in any order and possibly with
    /// duplicates. Returns the pattern and, for each input coordinate, the nonzero it ended up in.
    pub fn from_triplets(nrow : usize, ncol : usize, coords : &[(usize,usize)]) -> Result<(Sparsity,Vec<usize>)> {
        if let Some(&(i,j)) = coords.iter().find(|&&(i,j)| i >= nrow || j >= ncol) {
            return Err(Error::IndexError{ index : if i >= nrow { i } else { j }, shape : Shape(nrow,ncol) });
        }
        let mut perm : Vec<usize> = (0..coords.len()).collect();
        perm.sort_by_key(|&p| coords[p]);

        let mut rowptr = vec![0usize; nrow+1];
        let mut col = Vec::with_capacity(coords.len());
        let mut mapping = vec![0usize; coords.len()];
        let mut last = None;
        for &p in perm.iter() {
            let (i,j) = coords[p];
            if last != Some((i,j)) {
                col.push(j);
                rowptr[i+1] += 1;
                last = Some((i,j));
            }
            mapping[p] = col.len()-1;
        }
        rowptr.cummulate();
        Ok((Sparsity::raw(nrow,ncol,rowptr,col),mapping))
    }

    pub fn nrow(&self) -> usize { self.0.nrow }
    pub fn ncol(&self) -> usize { self.0.ncol }
    pub fn shape(&self) -> Shape { Shape(self.0.nrow,self.0.ncol) }
    /// Number of structural nonzeros.
    pub fn nnz(&self) -> usize { self.0.col.len() }
    /// Number of elements, `nrow*ncol`.
    pub fn numel(&self) -> usize { self.0.nrow * self.0.ncol }
    pub fn rowptr(&self) -> &[usize] { self.0.rowptr.as_slice() }
    pub fn col(&self) -> &[usize] { self.0.col.as_slice() }
    /// All elements are structurally nonzero.
    pub fn is_dense(&self) -> bool { self.nnz() == self.numel() }
    /// The pattern is 1x1, whether or not its element is a nonzero.
    pub fn is_scalar(&self) -> bool { self.0.nrow == 1 && self.0.ncol == 1 }
    /// Two patterns are backed by the same shared data.
    pub fn same_data(&self, other : &Sparsity) -> bool { Rc::ptr_eq(&self.0,&other.0) }

    /// Iterate over the column indexes of each row.
    pub fn rows(&self) -> crate::utils::iter::ChunksByIter<'_,'_,usize> {
        self.0.col.chunks_ptr(&self.0.rowptr)
    }

    /// Iterate over the `(row,col)` coordinates of the nonzeros in nonzero order.
    pub fn entries(&self) -> impl Iterator<Item = (usize,usize)> + '_ {
        self.rows().enumerate().flat_map(|(i,js)| js.iter().map(move |&j| (i,j)))
    }

    /// Return the nonzero index of element `(i,j)`, or `None` if it is not a structural nonzero.
    pub fn get_nz(&self, i : usize, j : usize) -> Option<usize> {
        if i >= self.nrow() || j >= self.ncol() {
            return None;
        }
        let p0 = self.0.rowptr[i];
        self.0.col[p0..self.0.rowptr[i+1]].binary_search(&j).ok().map(|k| p0+k)
    }

    fn check_indexes(&self, rows : &[usize], cols : &[usize]) -> Result<()> {
        if let Some(index) = first_out_of_bounds(rows, self.nrow()).or_else(|| first_out_of_bounds(cols, self.ncol())) {
            Err(Error::IndexError{ index, shape : self.shape() })
        }
        else {
            Ok(())
        }
    }

    /// Compute the sub-pattern selected by `rows` and `cols`.
    ///
    /// Row `r` of the result is row `rows[r]` of this pattern and column `c` is column `cols[c]`.
    /// The index lists may be in any order and may repeat indexes. Returns the pattern and, for each
    /// nonzero of the result, the nonzero of this pattern it was taken from.
    pub fn sub(&self, rows : &[usize], cols : &[usize]) -> Result<(Sparsity,Vec<usize>)> {
        self.check_indexes(rows, cols)?;

        // For each original column, the result columns that select it.
        let mut colptr = vec![0usize; self.ncol()+1];
        cols.iter().for_each(|&j| colptr[j+1] += 1);
        colptr.cummulate();
        let mut colpos = vec![0usize; cols.len()];
        {
            let mut next = colptr.clone();
            for (c,&j) in cols.iter().enumerate() {
                colpos[next[j]] = c;
                next[j] += 1;
            }
        }

        let mut rrowptr = Vec::with_capacity(rows.len()+1);
        let mut rcol = Vec::new();
        let mut mapping = Vec::new();
        let mut buf : Vec<(usize,usize)> = Vec::new();
        rrowptr.push(0);
        for &i in rows {
            buf.clear();
            for k in self.0.rowptr[i]..self.0.rowptr[i+1] {
                let j = self.0.col[k];
                buf.extend(colpos[colptr[j]..colptr[j+1]].iter().map(|&c| (c,k)));
            }
            buf.sort_unstable();
            rcol.extend(buf.iter().map(|&(c,_)| c));
            mapping.extend(buf.iter().map(|&(_,k)| k));
            rrowptr.push(rcol.len());
        }

        Ok((Sparsity::raw(rows.len(),cols.len(),rrowptr,rcol),mapping))
    }

    /// Merge two patterns of the same shape row by row.
    ///
    /// # Arguments
    /// - `keep_left_only` Keep nonzeros that appear only in this pattern.
    /// - `keep_right_only` Keep nonzeros that appear only in `other`.
    ///
    /// Nonzeros present in both are always kept. Returns the merged pattern and one [UnionSlot] per
    /// nonzero of the result.
    pub fn combine(&self, other : &Sparsity, keep_left_only : bool, keep_right_only : bool) -> Result<(Sparsity,Vec<UnionSlot>)> {
        if self.shape() != other.shape() {
            return Err(Error::ShapeMismatch{ lhs : self.shape(), rhs : other.shape() });
        }
        let mut rowptr = Vec::with_capacity(self.nrow()+1);
        let mut rcol   = Vec::with_capacity(self.nnz().max(other.nnz()));
        let mut slots  = Vec::with_capacity(self.nnz().max(other.nnz()));
        rowptr.push(0);
        for (i,(lrow,rrow)) in self.rows().zip(other.rows()).enumerate() {
            let l0 = self.0.rowptr[i];
            let r0 = other.0.rowptr[i];
            for item in lrow.iter().enumerate().merge_join_by(rrow.iter().enumerate(), |a,b| a.1.cmp(b.1)) {
                match item {
                    EitherOrBoth::Left((k,&j)) => if keep_left_only {
                        rcol.push(j);
                        slots.push(EitherOrBoth::Left(l0+k));
                    },
                    EitherOrBoth::Right((k,&j)) => if keep_right_only {
                        rcol.push(j);
                        slots.push(EitherOrBoth::Right(r0+k));
                    },
                    EitherOrBoth::Both((k,&j),(l,_)) => {
                        rcol.push(j);
                        slots.push(EitherOrBoth::Both(l0+k,r0+l));
                    }
                }
            }
            rowptr.push(rcol.len());
        }
        Ok((Sparsity::raw(self.nrow(),self.ncol(),rowptr,rcol),slots))
    }

    /// Structural union of two patterns of the same shape, see [Sparsity::combine].
    pub fn pattern_union(&self, other : &Sparsity) -> Result<(Sparsity,Vec<UnionSlot>)> {
        self.combine(other,true,true)
    }

    /// Structural intersection of two patterns of the same shape. Returns the pattern and, for
    /// each of its nonzeros, the nonzero index in this pattern and in `other`.
    pub fn pattern_intersection(&self, other : &Sparsity) -> Result<(Sparsity,Vec<(usize,usize)>)> {
        let (sp,slots) = self.combine(other,false,false)?;
        Ok((sp,slots.into_iter().filter_map(|s| s.both()).collect()))
    }

    /// Embed the pattern into a `nrow x ncol` pattern, placing row `i` at `rows[i]` and column `j`
    /// at `cols[j]`. Returns, for each original nonzero, its nonzero index in the enlarged pattern.
    /// If `rows` or `cols` contain duplicates, colliding nonzeros share a slot.
    pub fn enlarge(&mut self, nrow : usize, ncol : usize, rows : &[usize], cols : &[usize]) -> Result<Vec<usize>> {
        if rows.len() != self.nrow() || cols.len() != self.ncol() {
            return Err(Error::DimensionMismatch{ lhs : Shape(rows.len(),cols.len()), rhs : self.shape() });
        }
        if let Some(index) = first_out_of_bounds(rows, nrow).or_else(|| first_out_of_bounds(cols, ncol)) {
            return Err(Error::IndexError{ index, shape : Shape(nrow,ncol) });
        }

        let coords : Vec<(usize,usize)> = self.entries().map(|(i,j)| (rows[i],cols[j])).collect();
        if is_strictly_increasing(rows) && is_strictly_increasing(cols) {
            // Order is preserved, only the coordinates change.
            let mut rowptr = vec![0usize; nrow+1];
            coords.iter().for_each(|&(i,_)| rowptr[i+1] += 1);
            rowptr.cummulate();
            let col = coords.iter().map(|&(_,j)| j).collect();
            let n = coords.len();
            self.0 = Rc::new(SparsityData{ nrow, ncol, rowptr, col });
            Ok((0..n).collect())
        }
        else {
            let (sp,mapping) = Sparsity::from_triplets(nrow, ncol, coords.as_slice())?;
            *self = sp;
            Ok(mapping)
        }
    }

    /// Remove the elements at the intersection of `rows` and `cols`. Returns the original indexes
    /// of the surviving nonzeros, in their new order.
    pub fn erase(&mut self, rows : &[usize], cols : &[usize]) -> Result<Vec<usize>> {
        self.check_indexes(rows, cols)?;
        let rmask = mask_of(rows,self.nrow());
        let cmask = mask_of(cols,self.ncol());

        let surviving : Vec<usize> = self.entries().enumerate()
            .filter(|(_,(i,j))| ! (rmask[*i] && cmask[*j]))
            .map(|(k,_)| k)
            .collect();

        if surviving.len() < self.nnz() {
            let d = Rc::make_mut(&mut self.0);
            let mut counts = vec![0usize; d.nrow+1];
            let mut k = 0;
            for i in 0..d.nrow {
                while k < surviving.len() && surviving[k] < d.rowptr[i+1] {
                    counts[i+1] += 1;
                    k += 1;
                }
            }
            counts.cummulate();
            d.col = d.col.as_slice().permute_by(&surviving).cloned().collect();
            d.rowptr = counts;
        }
        Ok(surviving)
    }

    /// Transposed pattern. Returns the pattern and, for each of its nonzeros, the nonzero of this
    /// pattern it corresponds to.
    pub fn transpose(&self) -> (Sparsity,Vec<usize>) {
        let (nrow,ncol,nnz) = (self.nrow(),self.ncol(),self.nnz());
        let mut ptr = vec![0usize; ncol+1];
        self.0.col.iter().for_each(|&j| ptr[j+1] += 1);
        ptr.cummulate();

        let mut next = ptr[..ncol].to_vec();
        let mut tcol = vec![0usize; nnz];
        let mut mapping = vec![0usize; nnz];
        for (k,(i,j)) in self.entries().enumerate() {
            let p = next[j];
            tcol[p] = i;
            mapping[p] = k;
            next[j] += 1;
        }
        (Sparsity::raw(ncol,nrow,ptr,tcol),mapping)
    }

    /// Pattern of the matrix product `self * other`.
    pub fn product(&self, other : &Sparsity) -> Result<Sparsity> {
        if self.ncol() != other.nrow() {
            return Err(Error::ShapeMismatch{ lhs : self.shape(), rhs : other.shape() });
        }
        let m = other.ncol();
        let mut marker = vec![usize::MAX; m];
        let mut rowptr = Vec::with_capacity(self.nrow()+1);
        let mut col = Vec::new();
        rowptr.push(0);
        for (i,js) in self.rows().enumerate() {
            let p0 = col.len();
            for &j in js {
                for &l in &other.0.col[other.0.rowptr[j]..other.0.rowptr[j+1]] {
                    if marker[l] != i {
                        marker[l] = i;
                        col.push(l);
                    }
                }
            }
            col[p0..].sort_unstable();
            rowptr.push(col.len());
        }
        Ok(Sparsity::raw(self.nrow(),m,rowptr,col))
    }

    /// Stack patterns on top of each other. All patterns must have the same number of columns.
    pub fn vertcat(parts : &[&Sparsity]) -> Result<Sparsity> {
        let Some(first) = parts.first() else { return Ok(Sparsity::empty(0,0)) };
        if let Some(p) = parts.iter().find(|p| p.ncol() != first.ncol()) {
            return Err(Error::ShapeMismatch{ lhs : first.shape(), rhs : p.shape() });
        }
        let mut rowptr = vec![0usize];
        let mut col = Vec::with_capacity(parts.iter().map(|p| p.nnz()).sum());
        for p in parts {
            let base = col.len();
            rowptr.extend(p.0.rowptr[1..].iter().map(|&r| r+base));
            col.extend_from_slice(p.col());
        }
        Ok(Sparsity::raw(parts.iter().map(|p| p.nrow()).sum(),first.ncol(),rowptr,col))
    }

    /// Put patterns side by side. All patterns must have the same number of rows.
    pub fn horzcat(parts : &[&Sparsity]) -> Result<Sparsity> {
        let Some(first) = parts.first() else { return Ok(Sparsity::empty(0,0)) };
        if let Some(p) = parts.iter().find(|p| p.nrow() != first.nrow()) {
            return Err(Error::ShapeMismatch{ lhs : first.shape(), rhs : p.shape() });
        }
        let nrow = first.nrow();
        let mut rowptr = vec![0usize];
        let mut col = Vec::with_capacity(parts.iter().map(|p| p.nnz()).sum());
        for i in 0..nrow {
            let mut offset = 0;
            for p in parts {
                col.extend(p.0.col[p.0.rowptr[i]..p.0.rowptr[i+1]].iter().map(|&j| j+offset));
                offset += p.ncol();
            }
            rowptr.push(col.len());
        }
        Ok(Sparsity::raw(nrow,parts.iter().map(|p| p.ncol()).sum(),rowptr,col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    //     | x . x |
    // A = | . x . |
    //     | x x . |
    fn sparse_3x3() -> Sparsity {
        Sparsity::new(3,3,vec![0,2,3,5],vec![0,2,1,0,1]).unwrap()
    }

    #[test]
    fn validate() {
        assert!(Sparsity::new(2,2,vec![0,1],vec![0]).is_err());
        assert!(Sparsity::new(2,2,vec![0,2,2],vec![1,0]).is_err());
        assert!(Sparsity::new(2,2,vec![0,1,2],vec![0,2]).is_err());
        assert!(Sparsity::new(2,2,vec![0,1,2],vec![0,1]).is_ok());
        assert_eq!(sparse_3x3().nnz(),5);
        assert!(Sparsity::dense(2,3).is_dense());
        assert!(! sparse_3x3().is_dense());
        assert!(Sparsity::scalar_sparse().is_scalar());
    }

    #[test]
    fn structural_equality() {
        let a = sparse_3x3();
        let b = Sparsity::from_triplets(3,3,&[(2,1),(0,0),(1,1),(2,0),(0,2)]).unwrap().0;
        assert!(! a.same_data(&b));
        assert_eq!(a,b);
        assert_ne!(Sparsity::dense(2,3),Sparsity::dense(3,2));
        assert_ne!(Sparsity::empty(2,2),Sparsity::diagonal(2));
    }

    #[test]
    fn triplets_with_duplicates() {
        let (sp,mapping) = Sparsity::from_triplets(2,2,&[(1,1),(0,1),(1,1)]).unwrap();
        assert_eq!(sp.nnz(),2);
        assert_eq!(mapping,&[1,0,1]);
        assert!(matches!(Sparsity::from_triplets(2,2,&[(2,0)]),Err(Error::IndexError{ index : 2, .. })));
    }

    #[test]
    fn get_nz() {
        let a = sparse_3x3();
        assert_eq!(a.get_nz(0,2),Some(1));
        assert_eq!(a.get_nz(2,1),Some(4));
        assert_eq!(a.get_nz(1,0),None);
        assert_eq!(a.get_nz(5,0),None);
    }

    #[test]
    fn sub_pattern() {
        let a = sparse_3x3();
        let (sp,mapping) = a.sub(&[2,0],&[0,1]).unwrap();
        assert_eq!(sp.shape(),Shape(2,2));
        assert_eq!(sp.entries().collect::<Vec<_>>(),&[(0,0),(0,1),(1,0)]);
        assert_eq!(mapping,&[3,4,0]);

        // Reversed and repeated columns
        let (sp,mapping) = a.sub(&[0],&[2,0,0]).unwrap();
        assert_eq!(sp.entries().collect::<Vec<_>>(),&[(0,0),(0,1),(0,2)]);
        assert_eq!(mapping,&[1,0,0]);

        let (sp,mapping) = a.sub(&[0,1,2],&[0,1,2]).unwrap();
        assert_eq!(sp,a);
        assert_eq!(mapping,&[0,1,2,3,4]);

        assert_eq!(a.sub(&[3],&[0]).unwrap_err(),Error::IndexError{ index : 3, shape : Shape(3,3) });
    }

    #[test]
    fn union_and_intersection() {
        let a = sparse_3x3();
        let b = Sparsity::diagonal(3);
        let (u,slots) = a.pattern_union(&b).unwrap();
        assert_eq!(u.entries().collect::<Vec<_>>(),&[(0,0),(0,2),(1,1),(2,0),(2,1),(2,2)]);
        assert_eq!(slots,&[EitherOrBoth::Both(0,0),
                           EitherOrBoth::Left(1),
                           EitherOrBoth::Both(2,1),
                           EitherOrBoth::Left(3),
                           EitherOrBoth::Left(4),
                           EitherOrBoth::Right(2)]);

        let (i,pairs) = a.pattern_intersection(&b).unwrap();
        assert_eq!(i.entries().collect::<Vec<_>>(),&[(0,0),(1,1)]);
        assert_eq!(pairs,&[(0,0),(2,1)]);

        assert!(matches!(a.pattern_union(&Sparsity::dense(3,2)),Err(Error::ShapeMismatch{..})));
    }

    #[test]
    fn enlarge() {
        let mut sp = Sparsity::dense(2,2);
        let mapping = sp.enlarge(3,4,&[0,2],&[1,3]).unwrap();
        assert_eq!(sp.entries().collect::<Vec<_>>(),&[(0,1),(0,3),(2,1),(2,3)]);
        assert_eq!(mapping,&[0,1,2,3]);

        let mut sp = Sparsity::dense(2,2);
        let mapping = sp.enlarge(3,3,&[2,0],&[0,1]).unwrap();
        assert_eq!(sp.entries().collect::<Vec<_>>(),&[(0,0),(0,1),(2,0),(2,1)]);
        assert_eq!(mapping,&[2,3,0,1]);

        let mut sp = Sparsity::dense(2,2);
        assert!(matches!(sp.enlarge(3,3,&[0,1,2],&[0,1]),Err(Error::DimensionMismatch{..})));
        assert!(matches!(sp.enlarge(3,3,&[0,3],&[0,1]),Err(Error::IndexError{ index : 3, .. })));
    }

    #[test]
    fn erase_copies_shared_data() {
        let a = sparse_3x3();
        let mut b = a.clone();
        let surviving = b.erase(&[0,2],&[0]).unwrap();
        assert_eq!(surviving,&[1,2,4]);
        assert_eq!(b.entries().collect::<Vec<_>>(),&[(0,2),(1,1),(2,1)]);
        // The original is untouched
        assert_eq!(a.nnz(),5);

        let mut c = a.clone();
        assert_eq!(c.erase(&[1],&[0]).unwrap(),&[0,1,2,3,4]);
        assert!(c.same_data(&a));
    }

    #[test]
    fn transpose() {
        let a = sparse_3x3();
        let (t,mapping) = a.transpose();
        assert_eq!(t.entries().collect::<Vec<_>>(),&[(0,0),(0,2),(1,1),(1,2),(2,0)]);
        assert_eq!(mapping,&[0,3,2,4,1]);
        assert_eq!(t.transpose().0,a);
    }

    #[test]
    fn product_and_concatenation() {
        let a = sparse_3x3();
        let p = a.product(&Sparsity::diagonal(3)).unwrap();
        assert_eq!(p,a);
        let p = Sparsity::dense(2,3).product(&Sparsity::dense(3,1)).unwrap();
        assert_eq!(p,Sparsity::dense(2,1));
        assert!(a.product(&Sparsity::dense(2,2)).is_err());

        let v = Sparsity::vertcat(&[&a,&Sparsity::dense(1,3)]).unwrap();
        assert_eq!(v.shape(),Shape(4,3));
        assert_eq!(v.nnz(),8);
        let h = Sparsity::horzcat(&[&Sparsity::diagonal(2),&Sparsity::dense(2,1)]).unwrap();
        assert_eq!(h.entries().collect::<Vec<_>>(),&[(0,0),(0,2),(1,1),(1,2)]);
        assert!(Sparsity::horzcat(&[&a,&Sparsity::dense(2,1)]).is_err());
    }
}

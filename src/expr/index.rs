//! Reading and writing parts of an expression.
//!
//! All reads produce mapping nodes (see [super::Mapping]); writes turn the target handle into a
//! mapping over the old target and the written value. Because mappings are kept collapsed,
//! reading back a region that was just written yields the written expression again.

use super::mapping::{self,NzRef};
use super::MX;
use crate::error::{Error,Result,Shape};
use crate::sparsity::Sparsity;
use crate::utils::first_out_of_bounds;

/// Anything that can select a list of indexes along a dimension of length `dim`.
///
/// Selections are resolved to explicit index lists; indexes beyond `dim` are reported by the
/// operation that uses them, never clamped.
pub trait IndexSet {
    fn resolve(self, dim : usize) -> Result<Vec<usize>>;
}

impl IndexSet for usize {
    fn resolve(self, _dim : usize) -> Result<Vec<usize>> { Ok(vec![self]) }
}

impl IndexSet for std::ops::Range<usize> {
    fn resolve(self, _dim : usize) -> Result<Vec<usize>> { Ok(self.collect()) }
}

impl IndexSet for std::ops::RangeInclusive<usize> {
    fn resolve(self, _dim : usize) -> Result<Vec<usize>> { Ok(self.collect()) }
}

impl IndexSet for std::ops::RangeFrom<usize> {
    fn resolve(self, dim : usize) -> Result<Vec<usize>> {
        // A start past the end is kept so that the bounds check reports it
        if self.start > dim { Ok(vec![self.start]) } else { Ok((self.start..dim).collect()) }
    }
}

impl IndexSet for std::ops::RangeTo<usize> {
    fn resolve(self, _dim : usize) -> Result<Vec<usize>> { Ok((0..self.end).collect()) }
}

impl IndexSet for std::ops::RangeFull {
    fn resolve(self, dim : usize) -> Result<Vec<usize>> { Ok((0..dim).collect()) }
}

/// Python style slice `start..stop` with a positive step.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct Slice {
    pub start : usize,
    pub stop  : usize,
    pub step  : usize,
}

impl IndexSet for Slice {
    fn resolve(self, _dim : usize) -> Result<Vec<usize>> {
        if self.step == 0 {
            return Err(Error::InvalidSlice{ start : self.start, stop : self.stop, step : self.step });
        }
        Ok((self.start..self.stop).step_by(self.step).collect())
    }
}

impl IndexSet for &[usize] {
    fn resolve(self, _dim : usize) -> Result<Vec<usize>> { Ok(self.to_vec()) }
}

impl<const N : usize> IndexSet for [usize; N] {
    fn resolve(self, _dim : usize) -> Result<Vec<usize>> { Ok(self.to_vec()) }
}

impl<const N : usize> IndexSet for &[usize; N] {
    fn resolve(self, _dim : usize) -> Result<Vec<usize>> { Ok(self.to_vec()) }
}

impl IndexSet for Vec<usize> {
    fn resolve(self, _dim : usize) -> Result<Vec<usize>> { Ok(self) }
}

impl IndexSet for &Vec<usize> {
    fn resolve(self, _dim : usize) -> Result<Vec<usize>> { Ok(self.clone()) }
}

/// Boolean mask: selects the positions holding `true`.
impl IndexSet for &[bool] {
    fn resolve(self, _dim : usize) -> Result<Vec<usize>> {
        Ok(self.iter().enumerate().filter(|(_,&b)| b).map(|(i,_)| i).collect())
    }
}

////////////////////////////////////////////////////////////

/// Sparse integer matrix used as an index argument. The pattern of the index matrix becomes the
/// pattern of the result; each nonzero holds the index to read.
#[derive(Debug,Clone,PartialEq)]
pub struct IMatrix {
    sparsity : Sparsity,
    data     : Vec<usize>,
}

impl IMatrix {
    pub fn new(sparsity : Sparsity, data : Vec<usize>) -> Result<IMatrix> {
        if sparsity.nnz() != data.len() {
            Err(Error::DimensionMismatch{ lhs : Shape(sparsity.nnz(),1), rhs : Shape(data.len(),1) })
        }
        else {
            Ok(IMatrix{ sparsity, data })
        }
    }

    /// Dense index matrix from row-major data.
    pub fn dense(nrow : usize, ncol : usize, data : Vec<usize>) -> Result<IMatrix> {
        IMatrix::new(Sparsity::dense(nrow,ncol),data)
    }

    /// Dense column vector.
    pub fn column(data : Vec<usize>) -> IMatrix {
        IMatrix{ sparsity : Sparsity::dense(data.len(),1), data }
    }

    pub fn sparsity(&self) -> &Sparsity { &self.sparsity }
    pub fn data(&self) -> &[usize] { self.data.as_slice() }
    pub fn nnz(&self) -> usize { self.data.len() }
    pub fn numel(&self) -> usize { self.sparsity.numel() }
    pub fn shape(&self) -> Shape { self.sparsity.shape() }
}

////////////////////////////////////////////////////////////

fn check_nz(k : &[usize], nnz : usize) -> Result<()> {
    match first_out_of_bounds(k,nnz) {
        Some(index) => Err(Error::NonzeroIndexError{ index : index as i64, nnz }),
        None => Ok(())
    }
}

/// Turn a possibly negative nonzero index into an offset.
fn normalize_nz(k : i64, nnz : usize) -> Result<usize> {
    let kk = if k < 0 { k + nnz as i64 } else { k };
    if kk < 0 || kk >= nnz as i64 {
        Err(Error::NonzeroIndexError{ index : k, nnz })
    }
    else {
        Ok(kk as usize)
    }
}

fn gather(x : &MX, sparsity : Sparsity, nz : &[usize]) -> MX {
    mapping::build(sparsity,std::slice::from_ref(x),nz.iter().map(|&k| Some(NzRef::new(0,k))).collect())
}

impl MX {
    ////////////////////////////////////////////////////////////
    // Reads

    /// Sub-matrix with rows `rows` and columns `cols`, in the given order and possibly repeated.
    ///
    /// # Example
    /// ```
    /// use mxgraph::MX;
    /// let x = MX::symbol("x",4,4);
    /// let y = x.sub(1..3,[0,3]).unwrap();
    /// assert_eq!(y.nrow(),2);
    /// assert_eq!(y.ncol(),2);
    /// ```
    pub fn sub<R : IndexSet, C : IndexSet>(&self, rows : R, cols : C) -> Result<MX> {
        let sp = self.node()?.sparsity();
        let rows = rows.resolve(sp.nrow())?;
        let cols = cols.resolve(sp.ncol())?;
        let (rsp,mapping) = sp.sub(&rows,&cols)?;
        Ok(gather(self,rsp,&mapping))
    }

    /// Gather nonzeros by an index matrix. The result has the pattern of `k` and result nonzero
    /// `i` is nonzero `k.data()[i]` of `self`.
    pub fn sub_nz(&self, k : &IMatrix) -> Result<MX> {
        let nnz = self.node()?.sparsity().nnz();
        check_nz(&k.data,nnz)?;
        Ok(gather(self,k.sparsity.clone(),&k.data))
    }

    /// Element-wise selection: result nonzero `k` is element `(i[k],j[k])` of `self`. `i` and `j`
    /// must have the same pattern, which becomes the pattern of the result. Selected elements that
    /// are structural zeros of `self` are zero in the result.
    pub fn sub_elements(&self, i : &IMatrix, j : &IMatrix) -> Result<MX> {
        let sp = self.node()?.sparsity();
        if i.sparsity != j.sparsity {
            return Err(Error::ShapeMismatch{ lhs : i.shape(), rhs : j.shape() });
        }
        if let Some(index) = first_out_of_bounds(&i.data,sp.nrow()).or_else(|| first_out_of_bounds(&j.data,sp.ncol())) {
            return Err(Error::IndexError{ index, shape : sp.shape() });
        }
        let table = i.data.iter().zip(j.data.iter())
            .map(|(&ii,&jj)| sp.get_nz(ii,jj).map(|k| NzRef::new(0,k)))
            .collect();
        Ok(mapping::build(i.sparsity.clone(),std::slice::from_ref(self),table))
    }

    /// For each row in `rows`, the elements of that row at the columns given by `k`, each block
    /// with the pattern of `k`. The blocks are stacked vertically.
    pub fn sub_rows_nz<R : IndexSet>(&self, rows : R, k : &IMatrix) -> Result<MX> {
        let sp = self.node()?.sparsity();
        let rows = rows.resolve(sp.nrow())?;
        if let Some(index) = first_out_of_bounds(&rows,sp.nrow()).or_else(|| first_out_of_bounds(&k.data,sp.ncol())) {
            return Err(Error::IndexError{ index, shape : sp.shape() });
        }
        let blocks = vec![&k.sparsity; rows.len()];
        let rsp = Sparsity::vertcat(&blocks)?;
        let kn = k.sparsity.nrow();
        let table = rsp.entries()
            .map(|(ii,j)| {
                let (b,il) = (ii / kn, ii % kn);
                k.sparsity.get_nz(il,j).and_then(|s| sp.get_nz(rows[b],k.data[s])).map(|nz| NzRef::new(0,nz))
            })
            .collect();
        Ok(mapping::build(rsp,std::slice::from_ref(self),table))
    }

    /// For each column in `cols`, the elements of that column at the rows given by `k`, each block
    /// with the pattern of `k`. The blocks are placed side by side.
    pub fn sub_cols_nz<C : IndexSet>(&self, k : &IMatrix, cols : C) -> Result<MX> {
        let sp = self.node()?.sparsity();
        let cols = cols.resolve(sp.ncol())?;
        if let Some(index) = first_out_of_bounds(&k.data,sp.nrow()).or_else(|| first_out_of_bounds(&cols,sp.ncol())) {
            return Err(Error::IndexError{ index, shape : sp.shape() });
        }
        let blocks = vec![&k.sparsity; cols.len()];
        let rsp = Sparsity::horzcat(&blocks)?;
        let kn = k.sparsity.ncol();
        let table = rsp.entries()
            .map(|(i,jj)| {
                let (b,jl) = (jj / kn, jj % kn);
                k.sparsity.get_nz(i,jl).and_then(|s| sp.get_nz(k.data[s],cols[b])).map(|nz| NzRef::new(0,nz))
            })
            .collect();
        Ok(mapping::build(rsp,std::slice::from_ref(self),table))
    }

    /// Project onto a pattern of the same shape. Nonzeros of `self` outside `sparsity` are
    /// dropped, nonzeros of `sparsity` that `self` does not have are zero.
    pub fn sub_pattern(&self, sparsity : &Sparsity) -> Result<MX> {
        let sp = self.node()?.sparsity();
        let (_,pairs) = sp.pattern_intersection(sparsity)?;
        let mut table = vec![None; sparsity.nnz()];
        for (k,l) in pairs {
            table[l] = Some(NzRef::new(0,k));
        }
        Ok(mapping::build(sparsity.clone(),std::slice::from_ref(self),table))
    }

    /// The `k`th nonzero as a 1x1 expression. A negative `k` counts from the end.
    pub fn get_nz(&self, k : i64) -> Result<MX> {
        let nnz = self.node()?.sparsity().nnz();
        let k = normalize_nz(k,nnz)?;
        self.get_nz_list(&[k])
    }

    /// The nonzeros listed in `k` as a dense column vector.
    pub fn get_nz_list(&self, k : &[usize]) -> Result<MX> {
        let nnz = self.node()?.sparsity().nnz();
        check_nz(k,nnz)?;
        Ok(gather(self,Sparsity::dense(k.len(),1),k))
    }

    ////////////////////////////////////////////////////////////
    // Writes

    /// Assign `m` to the sub-matrix `rows x cols`. A scalar `m` is broadcast to the whole
    /// selection. Elements of the selection that are structural zeros of `m` become structural
    /// zeros of `self`.
    ///
    /// # Errors
    /// - [Error::DimensionMismatch] if `m` does not have the shape of the selection.
    /// - [Error::IndexError] if an index is out of bounds.
    pub fn set_sub<R : IndexSet, C : IndexSet>(&mut self, m : &MX, rows : R, cols : C) -> Result<()> {
        let sp = self.node()?.sparsity();
        let rows = rows.resolve(sp.nrow())?;
        let cols = cols.resolve(sp.ncol())?;
        m.node()?;
        self.set_sub_resolved(m,&rows,&cols)
    }

    fn set_sub_resolved(&mut self, m : &MX, rows : &[usize], cols : &[usize]) -> Result<()> {
        if m.is_scalar() && (rows.len() != 1 || cols.len() != 1) {
            return self.set_sub_resolved(&MX::fill(rows.len(),cols.len(),m)?,rows,cols);
        }
        if rows.len() != m.nrow() || cols.len() != m.ncol() {
            return Err(Error::DimensionMismatch{ lhs : Shape(rows.len(),cols.len()), rhs : m.shape() });
        }
        let (nrow,ncol) = (self.nrow(),self.ncol());
        if let Some(index) = first_out_of_bounds(rows,nrow).or_else(|| first_out_of_bounds(cols,ncol)) {
            return Err(Error::IndexError{ index, shape : Shape(nrow,ncol) });
        }

        if self.is_dense() && m.is_dense() {
            let k : Vec<usize> = rows.iter().flat_map(|&i| cols.iter().map(move |&j| i*ncol+j)).collect();
            self.set_nz_list(&k,m)
        }
        else {
            tracing::debug!(target_shape = %Shape(nrow,ncol), nnz = m.nnz(), "sparse sub-matrix assignment");
            let mut pruned = self.clone();
            pruned.erase(rows,cols)?;
            let mut ext = m.clone();
            ext.enlarge(nrow,ncol,rows,cols)?;
            *self = MX::unite(&pruned,&ext)?;
            Ok(())
        }
    }

    /// Assignment through a nonzero index matrix.
    ///
    /// # Errors
    /// Always fails: with [Error::DimensionMismatch] if `m` cannot match the pattern of `k`, and
    /// with [Error::UnsupportedOperation] otherwise.
    pub fn set_sub_nz(&mut self, m : &MX, k : &IMatrix) -> Result<()> {
        self.node()?;
        let m = if m.is_scalar() && k.numel() > 1 { MX::fill_pattern(k.sparsity.clone(),m)? } else { m.clone() };
        if *m.node()?.sparsity() != k.sparsity {
            return Err(Error::DimensionMismatch{ lhs : k.shape(), rhs : m.shape() });
        }
        Err(Error::UnsupportedOperation("set_sub with a nonzero index matrix"))
    }

    /// Assignment through a pattern.
    ///
    /// # Errors
    /// Always fails: with [Error::ShapeMismatch] if the pattern does not have the shape of
    /// `self`, and with [Error::UnsupportedOperation] otherwise.
    pub fn set_sub_pattern(&mut self, _m : &MX, sparsity : &Sparsity) -> Result<()> {
        let sp = self.node()?.sparsity();
        if sp.shape() != sparsity.shape() {
            return Err(Error::ShapeMismatch{ lhs : sp.shape(), rhs : sparsity.shape() });
        }
        Err(Error::UnsupportedOperation("set_sub with a sparsity pattern"))
    }

    /// Element-wise assignment: element `(i[k],j[k])` of `self` becomes nonzero `k` of `m`. A
    /// scalar `m` is broadcast to the pattern of `i`.
    pub fn set_sub_elements(&mut self, m : &MX, i : &IMatrix, j : &IMatrix) -> Result<()> {
        self.node()?;
        if i.sparsity != j.sparsity {
            return Err(Error::ShapeMismatch{ lhs : i.shape(), rhs : j.shape() });
        }
        let m = if m.is_scalar() && i.numel() > 1 { MX::fill_pattern(i.sparsity.clone(),m)? } else { m.clone() };
        if *m.node()?.sparsity() != i.sparsity {
            return Err(Error::DimensionMismatch{ lhs : i.shape(), rhs : m.shape() });
        }
        for (k,(&ii,&jj)) in i.data.iter().zip(j.data.iter()).enumerate() {
            self.set_sub_resolved(&m.get_nz_list(&[k])?,&[ii],&[jj])?;
        }
        Ok(())
    }

    /// Assign the 1x1 `el` to nonzero `k`. A negative `k` counts from the end.
    pub fn set_nz(&mut self, k : i64, el : &MX) -> Result<()> {
        let nnz = self.node()?.sparsity().nnz();
        let k = normalize_nz(k,nnz)?;
        self.set_nz_list(&[k],el)
    }

    /// Assign nonzero `i` of `el` to nonzero `k[i]` of `self`, or broadcast `el` to every `k[i]`
    /// if it is a dense scalar. The pattern of `self` does not change. When `k` repeats an index,
    /// the last assignment wins.
    ///
    /// # Errors
    /// - [Error::DimensionMismatch] if `el` is not a dense scalar and its nonzero count differs
    ///   from `k.len()`.
    /// - [Error::NonzeroIndexError] if an index in `k` is out of bounds.
    pub fn set_nz_list(&mut self, k : &[usize], el : &MX) -> Result<()> {
        let nnz = self.node()?.sparsity().nnz();
        let elnz = el.node()?.sparsity().nnz();
        let broadcast = el.is_scalar() && elnz == 1;
        if k.len() != elnz && ! broadcast {
            return Err(Error::DimensionMismatch{ lhs : Shape(k.len(),1), rhs : el.shape() });
        }
        check_nz(k,nnz)?;
        if k.is_empty() {
            return Ok(());
        }

        if ! self.is_mapping() {
            *self = mapping::wrap_identity(self)?;
        }
        let node = self.make_unique()?;
        mapping::assign(node,k,el,broadcast);
        let r = mapping::simplify(node);
        *self = r;
        Ok(())
    }

    /// Nonzero assignment through an index matrix; `m` must have the pattern of `k` unless it is a
    /// scalar.
    pub fn set_nz_matrix(&mut self, k : &IMatrix, m : &MX) -> Result<()> {
        let msp = m.node()?.sparsity();
        if ! (msp.is_scalar() && msp.nnz() == 1) && *msp != k.sparsity {
            return Err(Error::DimensionMismatch{ lhs : k.shape(), rhs : msp.shape() });
        }
        self.set_nz_list(&k.data,m)
    }

    ////////////////////////////////////////////////////////////
    // Pattern changes

    /// Remove the elements at the intersection of `rows` and `cols` from the pattern.
    pub fn erase(&mut self, rows : &[usize], cols : &[usize]) -> Result<()> {
        let mut sp = self.node()?.sparsity().clone();
        let surviving = sp.erase(rows,cols)?;
        if surviving.len() != self.nnz() {
            *self = gather(self,sp,&surviving);
        }
        Ok(())
    }

    /// Embed `self` into a `nrow x ncol` matrix, placing row `i` at `rows[i]` and column `j` at
    /// `cols[j]`.
    pub fn enlarge(&mut self, nrow : usize, ncol : usize, rows : &[usize], cols : &[usize]) -> Result<()> {
        let mut sp = self.node()?.sparsity().clone();
        let mapping = sp.enlarge(nrow,ncol,rows,cols)?;
        let mut table = vec![None; sp.nnz()];
        for (k,&p) in mapping.iter().enumerate() {
            table[p] = Some(NzRef::new(0,k));
        }
        *self = mapping::build(sp,std::slice::from_ref(self),table);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_selections() {
        assert_eq!(3usize.resolve(5).unwrap(),&[3]);
        assert_eq!((1usize..3).resolve(5).unwrap(),&[1,2]);
        assert_eq!((2usize..).resolve(5).unwrap(),&[2,3,4]);
        assert_eq!((5usize..).resolve(5).unwrap(),Vec::<usize>::new());
        assert_eq!((7usize..).resolve(5).unwrap(),&[7]);
        assert_eq!((..2usize).resolve(5).unwrap(),&[0,1]);
        assert_eq!((..).resolve(3).unwrap(),&[0,1,2]);
        assert_eq!(Slice{ start : 1, stop : 6, step : 2 }.resolve(6).unwrap(),&[1,3,5]);
        assert_eq!(Slice{ start : 0, stop : 3, step : 0 }.resolve(3).unwrap_err(),Error::InvalidSlice{ start : 0, stop : 3, step : 0 });
        assert_eq!([true,false,true].as_slice().resolve(3).unwrap(),&[0,2]);
        assert_eq!(vec![4usize,0,4].resolve(5).unwrap(),&[4,0,4]);
    }

    #[test]
    fn negative_nonzero_index() {
        let x = MX::dense(1,3,vec![1.0,2.0,3.0]).unwrap();
        assert_eq!(x.get_nz(-1).unwrap().value(),Some(3.0));
        assert_eq!(x.get_nz(0).unwrap().value(),Some(1.0));
        assert_eq!(x.get_nz(3).unwrap_err(),Error::NonzeroIndexError{ index : 3, nnz : 3 });
        assert_eq!(x.get_nz(-4).unwrap_err(),Error::NonzeroIndexError{ index : -4, nnz : 3 });
    }

    #[test]
    fn imatrix() {
        assert!(IMatrix::new(Sparsity::diagonal(2),vec![1]).is_err());
        let k = IMatrix::dense(2,1,vec![3,0]).unwrap();
        assert_eq!(k.nnz(),2);
        assert_eq!(k,IMatrix::column(vec![3,0]));
    }

    #[test]
    fn set_nz_keeps_pattern() {
        let x = MX::symbol("x",2,2);
        let y = MX::symbol("y",1,1);
        let mut z = x.clone();
        z.set_nz(1,&y).unwrap();
        assert_eq!(z.sparsity().unwrap(),x.sparsity().unwrap());
        assert!(z.is_mapping());
        assert_eq!(z.mapping_for(0).unwrap(),&[Some(0),None,Some(2),Some(3)]);
        // The original handle is not affected
        assert!(x.is_symbolic());
    }

    #[test]
    fn enlarge_and_erase() {
        let mut x = MX::dense(2,2,vec![1.0,2.0,3.0,4.0]).unwrap();
        x.enlarge(3,3,&[0,2],&[0,2]).unwrap();
        assert_eq!(x.nnz(),4);
        assert_eq!(x.sparsity().unwrap().entries().collect::<Vec<_>>(),&[(0,0),(0,2),(2,0),(2,2)]);
        assert_eq!(x.constant_values().unwrap(),&[1.0,2.0,3.0,4.0]);

        x.erase(&[0],&[0,1,2]).unwrap();
        assert_eq!(x.nnz(),2);
        assert_eq!(x.constant_values().unwrap(),&[3.0,4.0]);
    }
}

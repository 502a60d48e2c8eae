/// Permutation iterator. For an indexable object (for example a slice or a vector), this is an
/// iterator that iterates over the elements of that object in some mutated or permutated order. A
/// permutation may contain duplicate indexes and may not map to all elements in the object.
pub struct PermIter<'a,'b,T> {
    data : & 'b [T],
    perm : & 'a [usize],
    i : usize
}

impl<'a,'b,T> Iterator for PermIter<'a,'b,T> {
    type Item = & 'b T;
    fn next(&mut self) -> Option<Self::Item> {
        let &i = self.perm.get(self.i)?;
        self.i += 1;
        self.data.get(i)
    }
}

/// Extends slices with `permute_by` function.
pub trait PermuteByEx<'a,'b,T> {
    /// Return an iterator that traverses `self` in some order given by `perm`. Iteration stops at
    /// the first index that is out of bounds.
    fn permute_by(self,perm:&'a[usize]) -> PermIter<'a,'b,T>;
}

impl<'a,'b,T> PermuteByEx<'a,'b,T> for &'b [T] {
    fn permute_by(self,perm:&'a [usize]) -> PermIter<'a,'b,T> {
        PermIter{ data: self,perm, i:0 }
    }
}

////////////////////////////////////////////////////////////

/// Iterator over the chunks of a slice delimited by consecutive entries of a pointer array, e.g.
/// the column indexes of each row of a compressed row pattern.
pub struct ChunksByIter<'a,'b,T>
{
    data : &'a [T],
    ptr  : std::iter::Zip<std::slice::Iter<'b,usize>,std::iter::Skip<std::slice::Iter<'b,usize>>>
}

impl<'a,'b,T> Iterator for ChunksByIter<'a,'b,T>
{
    type Item = &'a[T];
    fn next(& mut self) -> Option<Self::Item> {
        let (&p0,&p1) = self.ptr.next()?;
        Some(&self.data[p0..p1])
    }
}

pub trait ChunksByIterExt<T> {
    /// Iterate over `self[ptr[i]..ptr[i+1]]` for `i in 0..ptr.len()-1`.
    ///
    /// The pointer array must be non-decreasing with `ptr.last() <= self.len()`.
    fn chunks_ptr<'a,'b>(&'a self, ptr : &'b[usize]) -> ChunksByIter<'a,'b,T>;
}

impl<T> ChunksByIterExt<T> for [T] {
    fn chunks_ptr<'a,'b>(& 'a self, ptr : &'b[usize]) -> ChunksByIter<'a,'b,T> {
        debug_assert!(ptr.last().map(|&p| p <= self.len()).unwrap_or(true));
        debug_assert!(ptr.iter().zip(ptr.iter().skip(1)).all(|(p0,p1)| p0 <= p1));
        ChunksByIter{ data : self, ptr : ptr.iter().zip(ptr.iter().skip(1)) }
    }
}

pub mod iter;

pub use iter::{ChunksByIterExt,PermuteByEx};

/// In-place running sum. Turns per-row counts `[0,c0,c1,...]` into row pointers.
pub trait Cummulate {
    fn cummulate(& mut self);
}

impl<T> Cummulate for [T] where
    T : Copy+std::ops::AddAssign
{
    fn cummulate(& mut self) {
        if ! self.is_empty() {
            let v0 = self[0];
            self[1..].iter_mut().fold(v0,|c,v| { *v += c; *v });
        }
    }
}

impl<T> Cummulate for Vec<T> where
    T : Copy+std::ops::AddAssign
{
    fn cummulate(& mut self) {
        self.as_mut_slice().cummulate()
    }
}

/// Check that a list of indexes is strictly increasing, i.e. sorted and free of duplicates.
pub fn is_strictly_increasing(v : &[usize]) -> bool {
    v.iter().zip(v.iter().skip(1)).all(|(a,b)| a < b)
}

/// Return the first element of `v` that is not smaller than `bound`.
pub fn first_out_of_bounds(v : &[usize], bound : usize) -> Option<usize> {
    v.iter().find(|&&i| i >= bound).copied()
}

/// Build a membership mask of length `n` from a list of indexes. Indexes must be in bounds.
pub fn mask_of(idx : &[usize], n : usize) -> Vec<bool> {
    let mut mask = vec![false; n];
    idx.iter().for_each(|&i| mask[i] = true);
    mask
}

use num::{Float, NumCast};
use std::{
    fmt::{Debug, Display, LowerExp}, iter::Sum, ops::{AddAssign, SubAssign}
};

pub trait Primitive: AddAssign + SubAssign + Sum + Float + NumCast
                + PartialOrd + Copy + Default + Display + Debug + Sync + Send + LowerExp + 'static {
    /// Lossless-enough conversion for counters (sample counts, cluster sizes).
    #[inline(always)]
    fn from_usize(v: usize) -> Self {
        <Self as NumCast>::from(v).unwrap_or_else(Self::infinity)
    }
    #[inline(always)]
    fn from_f64(v: f64) -> Self {
        <Self as NumCast>::from(v).unwrap_or_else(Self::nan)
    }
}
impl Primitive for f32 {}
impl Primitive for f64 {}


/// Row **idx** of a row-major buffer with **dims** columns.
#[inline(always)]
pub(crate) fn row<T: Primitive>(buf: &[T], idx: usize, dims: usize) -> &[T] {
    &buf[dims * idx..dims * (idx + 1)]
}

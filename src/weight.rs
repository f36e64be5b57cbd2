use std::fmt::Debug;
use total_float_wrap::TotalF64;

/// A frequency or probability attached to a node.
///
/// Nodes are merged by adding their weights, so implementors only need a
/// total order, a checked sum and a positivity test.
pub trait Weight: Clone + Ord + Debug {
    /// Sum of two weights, or `None` if it cannot be represented.
    fn checked_combine(&self, other: &Self) -> Option<Self>;

    fn is_positive(&self) -> bool;
}

macro_rules! unsigned_weight {
    ($($t:ty),*) => {
        $(
            impl Weight for $t {
                fn checked_combine(&self, other: &Self) -> Option<Self> {
                    self.checked_add(*other)
                }

                fn is_positive(&self) -> bool {
                    *self > 0
                }
            }
        )*
    };
}

unsigned_weight!(u8, u16, u32, u64, u128, usize);

impl Weight for TotalF64 {
    fn checked_combine(&self, other: &Self) -> Option<Self> {
        let sum = self.0 + other.0;
        sum.is_finite().then_some(TotalF64(sum))
    }

    fn is_positive(&self) -> bool {
        self.0.is_finite() && self.0 > 0.0
    }
}

use num_traits::{Float, FromPrimitive, NumAssign};
use std::fmt::{Debug, Display, LowerExp};

/// Main trait for floating point values stored in a model.
///
/// Coefficients held in the triple pool and exported to packed formats are
/// represented on values implementing `FloatT`.  Implementations are provided
/// for any type satisfying the bounds below, which in practice means `f32`
/// and `f64`.
///
/// `FloatT` relies on [`num_traits`](num_traits) for most of its constituent trait bounds.
pub trait FloatT:
    'static + Send + Float + NumAssign + Default + FromPrimitive + Display + LowerExp + Debug + Sized
{
}

impl<T> FloatT for T where
    T: 'static
        + Send
        + Float
        + NumAssign
        + Default
        + FromPrimitive
        + Display
        + LowerExp
        + Debug
        + Sized
{
}

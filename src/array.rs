//! `ndarray` interop.

use ndarray::{ArrayView2, ArrayViewMut1, Zip};

use crate::scalar::magnitude_squared;

/// Accumulates the squared magnitudes of the rows of `ef` into `ai`.
///
/// `ef` has shape `(len, 2)`: one `[re, im]` row per accumulator slot.
/// Contiguous standard-layout views run the dispatched slice kernel; strided
/// or transposed views take an element-wise `Zip` walk with the same f64
/// arithmetic.
///
/// # Panics
///
/// Panics if `ef` does not have exactly two columns or its row count differs
/// from `ai.len()`.
///
/// # Examples
///
/// ```rust
/// use ndarray::{array, Array1};
///
/// let mut ai = Array1::<f32>::zeros(2);
/// let ef = array![[3.0f32, 4.0], [1.0, 1.0]];
///
/// magsq::array::accumulate_magnitudes_array(ai.view_mut(), ef.view());
/// assert_eq!(ai, array![25.0, 2.0]);
/// ```
pub fn accumulate_magnitudes_array(mut ai: ArrayViewMut1<f32>, ef: ArrayView2<f32>) {
    assert_eq!(ef.ncols(), 2, "Samples must have shape (len, 2)");
    assert_eq!(
        ai.len(),
        ef.nrows(),
        "Accumulator and samples must have the same length"
    );

    let len = ai.len();

    if let (Some(ai_slice), Some(ef_slice)) = (ai.as_slice_mut(), ef.as_slice()) {
        crate::accumulate_magnitudes(len, ai_slice, ef_slice);
        return;
    }

    Zip::from(&mut ai)
        .and(ef.rows())
        .for_each(|acc, pair| *acc = (*acc as f64 + magnitude_squared(pair[0], pair[1])) as f32);
}

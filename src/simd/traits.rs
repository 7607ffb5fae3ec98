/// Method-style access to the magnitude kernels.
///
/// `self` is the accumulator; its length is the number of samples processed.
/// Implementations panic when `samples` holds fewer than `self.len()` samples.
pub trait MagnitudeAccumulate<Samples> {
    /// Best kernel for the running CPU.
    fn accumulate_magnitudes(&mut self, samples: Samples);

    /// Best kernel for the running CPU, split over the rayon thread pool.
    fn par_accumulate_magnitudes(&mut self, samples: Samples);

    /// Sequential reference kernel.
    fn scalar_accumulate_magnitudes(&mut self, samples: Samples);
}

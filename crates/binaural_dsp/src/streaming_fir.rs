/// A FIR filter which runs over a continuous stream delivered in blocks.
///
/// The filter keeps the last `taps - 1` input samples between calls to [StreamingFir::process], so splitting a signal
/// into blocks (of any sizes) produces exactly the same output as filtering it in one go.
///
/// Evaluation is direct: `theta(M*N)` where `M` is the number of taps and `N` the block length.  HRIRs are short enough
/// that this beats FFT convolution at the block sizes we run at.
///
/// Changing the taps with [StreamingFir::set_coefficients] does not touch the history.  Swapping taps under a running
/// stream is audible, because the history was produced for the old response; smoothing that over is the caller's
/// problem.
#[derive(Clone, Debug)]
pub struct StreamingFir {
    /// The taps, reversed, so that the inner loop can run forward over the input.
    reversed_taps: Vec<f32>,

    /// The last `taps - 1` input samples, oldest first.
    history: Vec<f32>,

    /// `history ++ block`, kept around to avoid allocating per block.
    work: Vec<f32>,
}

impl StreamingFir {
    /// Make a filter with an all-zero history.
    ///
    /// # Panics
    ///
    /// Panics if `taps` is empty.
    pub fn new(taps: &[f32]) -> StreamingFir {
        Self::with_max_block(taps, 0)
    }

    /// Like [StreamingFir::new], but reserve enough scratch space that blocks of up to `max_block` frames never
    /// allocate.
    pub fn with_max_block(taps: &[f32], max_block: usize) -> StreamingFir {
        assert!(!taps.is_empty(), "A FIR filter needs at least one tap");

        let history_len = taps.len() - 1;
        StreamingFir {
            reversed_taps: taps.iter().rev().copied().collect(),
            history: vec![0.0; history_len],
            work: Vec::with_capacity(history_len + max_block),
        }
    }

    pub fn tap_count(&self) -> usize {
        self.reversed_taps.len()
    }

    /// The taps in their natural order.
    pub fn coefficients(&self) -> impl Iterator<Item = f32> + '_ {
        self.reversed_taps.iter().rev().copied()
    }

    /// The retained input, oldest sample first.
    pub fn history(&self) -> &[f32] {
        &self.history[..]
    }

    /// Replace the taps without clearing the history.
    ///
    /// If the tap count changes, the history is resized keeping the most recent samples (and zero-filling the oldest if
    /// it grew).
    ///
    /// # Panics
    ///
    /// Panics if `taps` is empty.
    pub fn set_coefficients(&mut self, taps: &[f32]) {
        assert!(!taps.is_empty(), "A FIR filter needs at least one tap");

        if taps.len() != self.reversed_taps.len() {
            let new_len = taps.len() - 1;
            let old_len = self.history.len();
            if new_len < old_len {
                self.history.drain(..old_len - new_len);
            } else {
                self.history
                    .splice(0..0, std::iter::repeat(0.0).take(new_len - old_len));
            }
            self.reversed_taps.resize(taps.len(), 0.0);
        }

        for (dest, src) in self.reversed_taps.iter_mut().zip(taps.iter().rev()) {
            *dest = *src;
        }
    }

    /// Forget all input, as if the filter had only ever seen silence.
    pub fn reset(&mut self) {
        self.history.fill(0.0);
    }

    /// Replace this filter's history with another filter's, so that it continues the same input stream.
    ///
    /// If the histories differ in length, the most recent samples are aligned and anything older than `other` knows
    /// about is zero.
    pub fn copy_history_from(&mut self, other: &StreamingFir) {
        let ours = self.history.len();
        let theirs = other.history.len();
        if ours <= theirs {
            self.history.copy_from_slice(&other.history[theirs - ours..]);
        } else {
            let pad = ours - theirs;
            self.history[..pad].fill(0.0);
            self.history[pad..].copy_from_slice(&other.history[..]);
        }
    }

    /// Filter one block.
    ///
    /// # Panics
    ///
    /// Panics if `input` and `output` are not the same length.
    pub fn process(&mut self, input: &[f32], output: &mut [f32]) {
        assert_eq!(input.len(), output.len());

        if input.is_empty() {
            return;
        }

        self.work.clear();
        self.work.extend_from_slice(&self.history);
        self.work.extend_from_slice(input);

        let taps = &self.reversed_taps[..];
        for (frame, out) in output.iter_mut().enumerate() {
            let window = &self.work[frame..frame + taps.len()];
            // f32 accumulation, as elsewhere: these are short filters.
            let mut sum = 0.0f32;
            for (t, x) in taps.iter().zip(window.iter()) {
                sum += t * x;
            }
            *out = sum;
        }

        let keep_from = self.work.len() - self.history.len();
        self.history.copy_from_slice(&self.work[keep_from..]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    const TAPS: [f32; 3] = [1.0, 2.0, 3.0];
    const INPUT: [f32; 5] = [1.0, 2.0, 3.0, 4.0, 5.0];
    const EXPECTED: [f32; 5] = [1.0, 4.0, 10.0, 16.0, 22.0];

    #[test]
    fn test_single_block() {
        let mut fir = StreamingFir::new(&TAPS);
        let mut output = [0.0f32; 5];
        fir.process(&INPUT, &mut output);
        assert_eq!(output, EXPECTED);
        assert_eq!(fir.history(), &[4.0, 5.0]);
    }

    fn run_split(block: usize) -> Vec<f32> {
        let mut fir = StreamingFir::new(&TAPS);
        let mut output = vec![0.0f32; INPUT.len()];
        for (i, o) in INPUT.chunks(block).zip(output.chunks_mut(block)) {
            fir.process(i, o);
        }
        output
    }

    macro_rules! split_test {
        ($block: literal) => {
            paste::paste! {
                #[test]
                fn [<split_into_blocks_of_ $block>]() {
                    assert_eq!(run_split($block), EXPECTED.to_vec());
                }
            }
        };
    }

    split_test!(1);
    split_test!(2);
    split_test!(3);
    split_test!(4);

    #[test]
    fn test_single_tap_has_no_history() {
        let mut fir = StreamingFir::new(&[0.5]);
        let mut output = [0.0f32; 3];
        fir.process(&[2.0, 4.0, 6.0], &mut output);
        assert_eq!(output, [1.0, 2.0, 3.0]);
        assert!(fir.history().is_empty());
    }

    #[test]
    fn test_set_coefficients_keeps_history() {
        let mut fir = StreamingFir::new(&TAPS);
        let mut output = [0.0f32; 2];
        fir.process(&[1.0, 2.0], &mut output);

        // A pure 2-sample delay: the next outputs are the history.
        fir.set_coefficients(&[0.0, 0.0, 1.0]);
        fir.process(&[0.0, 0.0], &mut output);
        assert_eq!(output, [1.0, 2.0]);
    }

    #[test]
    fn test_set_coefficients_resizes_history() {
        let mut fir = StreamingFir::new(&TAPS);
        let mut output = [0.0f32; 3];
        fir.process(&[1.0, 2.0, 3.0], &mut output);
        assert_eq!(fir.history(), &[2.0, 3.0]);

        fir.set_coefficients(&[1.0, 0.0]);
        assert_eq!(fir.history(), &[3.0]);
        assert_eq!(fir.coefficients().collect::<Vec<_>>(), vec![1.0, 0.0]);

        fir.set_coefficients(&[1.0, 0.0, 0.0, 0.0]);
        assert_eq!(fir.history(), &[0.0, 0.0, 3.0]);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut fir = StreamingFir::new(&TAPS);
        let mut output = [0.0f32; 5];
        fir.process(&INPUT, &mut output);
        fir.reset();
        fir.process(&INPUT, &mut output);
        assert_eq!(output, EXPECTED);
    }

    #[test]
    fn test_copy_history_continues_stream() {
        let mut a = StreamingFir::new(&TAPS);
        let mut out_a = [0.0f32; 3];
        a.process(&INPUT[..3], &mut out_a);

        let mut b = StreamingFir::new(&[3.0, 2.0, 1.0]);
        b.copy_history_from(&a);
        let mut out_b = [0.0f32; 2];
        b.process(&INPUT[3..], &mut out_b);

        // 3*4 + 2*3 + 1*2 and 3*5 + 2*4 + 1*3.
        assert_eq!(out_b, [20.0, 26.0]);
    }

    #[test]
    fn test_copy_history_across_lengths() {
        let mut long = StreamingFir::new(&[1.0; 4]);
        let mut out = [0.0f32; 3];
        long.process(&[1.0, 2.0, 3.0], &mut out);

        let mut short = StreamingFir::new(&[1.0, 1.0]);
        short.copy_history_from(&long);
        assert_eq!(short.history(), &[3.0]);

        let mut longer = StreamingFir::new(&[1.0; 6]);
        longer.copy_history_from(&long);
        assert_eq!(longer.history(), &[0.0, 0.0, 1.0, 2.0, 3.0]);
    }

    proptest! {
        #[test]
        fn block_boundaries_are_invisible(
            taps in prop::collection::vec(-1.0f32..1.0, 1..16),
            input in prop::collection::vec(-1.0f32..1.0, 1..200),
            block in 1usize..64,
        ) {
            let mut whole = StreamingFir::new(&taps);
            let mut expected = vec![0.0f32; input.len()];
            whole.process(&input, &mut expected);

            let mut split = StreamingFir::with_max_block(&taps, block);
            let mut got = vec![0.0f32; input.len()];
            for (i, o) in input.chunks(block).zip(got.chunks_mut(block)) {
                split.process(i, o);
            }

            prop_assert_eq!(got, expected);
        }
    }
}

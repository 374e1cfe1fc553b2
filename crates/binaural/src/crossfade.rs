//! Switching filters without clicks.
//!
//! Replacing the taps of a running filter is audible: its history was produced for the old response, so the output
//! jumps.  Instead the controller keeps two complete filter engines.  When the direction changes the new filter goes
//! into a second engine, and for a fixed number of frames both run and their outputs are blended with a raised-cosine
//! ramp.
//!
//! The roles are just which engine sits in which field.  Promoting and demoting engines moves them; no filter state is
//! rebuilt, and after construction nothing here allocates.
use std::num::NonZeroUsize;

use binaural_dsp::ramp::raised_cosine;
use binaural_dsp::StreamingFir;

use crate::interpolation::FilterPair;

/// What the controller is doing, for callers who want to look.
#[derive(Copy, Clone, Debug, Eq, PartialEq, derive_more::IsVariant)]
pub enum CrossfadeState {
    /// Only the current filter is heard.
    Steady,

    /// Blending from the outgoing filter to the current one, with `remaining` frames to go.
    Transitioning { remaining: usize },
}

/// One streaming filter per ear and the pair they were built from.
#[derive(Debug)]
struct FilterEngine {
    left: StreamingFir,
    right: StreamingFir,
    pair: FilterPair,
}

impl FilterEngine {
    fn new(pair: FilterPair, max_block: usize) -> FilterEngine {
        FilterEngine {
            left: StreamingFir::with_max_block(&pair.left, max_block),
            right: StreamingFir::with_max_block(&pair.right, max_block),
            pair,
        }
    }

    /// Swap in new taps, keeping the history.  Returns the pair which was here before.
    fn install(&mut self, pair: FilterPair) -> FilterPair {
        self.left.set_coefficients(&pair.left);
        self.right.set_coefficients(&pair.right);
        std::mem::replace(&mut self.pair, pair)
    }

    fn copy_history_from(&mut self, other: &FilterEngine) {
        self.left.copy_history_from(&other.left);
        self.right.copy_history_from(&other.right);
    }

    fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }

    fn process(&mut self, input: &[f32], left: &mut [f32], right: &mut [f32]) {
        self.left.process(input, left);
        self.right.process(input, right);
    }
}

#[derive(Debug)]
enum Phase {
    Steady,
    Transitioning {
        outgoing: FilterEngine,
        remaining: usize,
    },
}

#[derive(Debug)]
pub(crate) struct CrossfadeController {
    current: FilterEngine,
    phase: Phase,

    /// An engine which isn't doing anything, kept so that starting a transition from steady state doesn't allocate.
    ///
    /// Only `None` while transitioning.
    spare: Option<FilterEngine>,

    duration: NonZeroUsize,
    max_block: usize,

    /// Output of the outgoing engine.
    outgoing_left: Vec<f32>,
    outgoing_right: Vec<f32>,
}

impl CrossfadeController {
    pub(crate) fn new(
        initial: FilterPair,
        duration: NonZeroUsize,
        max_block: usize,
    ) -> CrossfadeController {
        let spare = FilterEngine::new(initial.clone(), max_block);
        CrossfadeController {
            current: FilterEngine::new(initial, max_block),
            phase: Phase::Steady,
            spare: Some(spare),
            duration,
            max_block,
            outgoing_left: vec![0.0; max_block],
            outgoing_right: vec![0.0; max_block],
        }
    }

    pub(crate) fn state(&self) -> CrossfadeState {
        match &self.phase {
            Phase::Steady => CrossfadeState::Steady,
            Phase::Transitioning { remaining, .. } => CrossfadeState::Transitioning {
                remaining: *remaining,
            },
        }
    }

    /// The pair which is (or is becoming) the only one heard.
    pub(crate) fn current_pair(&self) -> &FilterPair {
        &self.current.pair
    }

    /// Start fading to `pair`.
    ///
    /// If a transition is already running, its outgoing filter is dropped on the floor, the current filter becomes the
    /// outgoing one, and the fade starts over.  The new filter continues from the current filter's input history.
    ///
    /// Returns a pair which is no longer needed, so that the caller can reuse its buffers.
    pub(crate) fn begin_transition(&mut self, pair: FilterPair) -> FilterPair {
        let mut incoming = match std::mem::replace(&mut self.phase, Phase::Steady) {
            Phase::Transitioning { outgoing, .. } => {
                rt_debug!(
                    "Restarting crossfade toward {} before the previous one finished",
                    pair.direction_used
                );
                outgoing
            }
            Phase::Steady => {
                rt_debug!("Starting crossfade toward {}", pair.direction_used);
                match self.spare.take() {
                    Some(e) => e,
                    None => FilterEngine::new(pair.clone(), self.max_block),
                }
            }
        };

        let displaced = incoming.install(pair);
        incoming.copy_history_from(&self.current);

        let outgoing = std::mem::replace(&mut self.current, incoming);
        self.phase = Phase::Transitioning {
            outgoing,
            remaining: self.duration.get(),
        };

        displaced
    }

    /// Go straight to `pair` with cleared history and no transition.  Returns the displaced pair, as with
    /// [CrossfadeController::begin_transition].
    pub(crate) fn reset(&mut self, pair: FilterPair) -> FilterPair {
        if let Phase::Transitioning { outgoing, .. } = std::mem::replace(&mut self.phase, Phase::Steady) {
            self.spare = Some(outgoing);
        }

        let displaced = self.current.install(pair);
        self.current.reset();
        displaced
    }

    /// Filter one block of mono input into the two ears.
    ///
    /// # Panics
    ///
    /// Panics if the slices differ in length or are longer than the maximum block size.
    pub(crate) fn process(&mut self, input: &[f32], left: &mut [f32], right: &mut [f32]) {
        let frames = input.len();
        assert!(
            frames <= self.max_block,
            "Block of {} frames is larger than the maximum of {}",
            frames,
            self.max_block
        );
        assert_eq!(left.len(), frames);
        assert_eq!(right.len(), frames);

        self.current.process(input, left, right);

        let Phase::Transitioning {
            outgoing,
            remaining,
        } = &mut self.phase
        else {
            return;
        };

        // Past the end of the fade only the current filter matters, so the outgoing one doesn't need to run that far.
        let fading = frames.min(*remaining);
        let out_left = &mut self.outgoing_left[..fading];
        let out_right = &mut self.outgoing_right[..fading];
        outgoing.process(&input[..fading], out_left, out_right);

        let start = self.duration.get() - *remaining;
        for i in 0..fading {
            let alpha = raised_cosine(start + i, self.duration);
            let beta = 1.0 - alpha;
            left[i] = beta * out_left[i] + alpha * left[i];
            right[i] = beta * out_right[i] + alpha * right[i];
        }

        *remaining -= fading;
        if *remaining == 0 {
            rt_trace!("Crossfade to {} complete", self.current.pair.direction_used);
            if let Phase::Transitioning { outgoing, .. } = std::mem::replace(&mut self.phase, Phase::Steady) {
                self.spare = Some(outgoing);
            }
        }
    }
}

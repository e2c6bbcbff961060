//! Weight-stationary FIR where both `x` and the partial sum flow PE1 -> PE3.
//!
//! `x` is held two edges in every PE so that each sample meets the partial
//! sum it belongs to one PE further down. The result leaves PE3 with a
//! latency of two cycles: `y = w1 * x[k-2] + w2 * x[k-3] + w3 * x[k-4]`.

use crate::{
    architectures::{ramp_stimulus, Arch, Weights},
    framework::{Combiner, PeRule, Route, SystolicArray, Topology},
};

pub const ARCH: Arch = Arch {
    name: "w2",
    about: "x and partial sums both flow PE1 -> PE3, x double-buffered",
    default_weights: [1, 2, 3],
    streams_weights: false,
    build,
    stimulus: ramp_stimulus,
};

fn build(weights: &Weights) -> anyhow::Result<SystolicArray> {
    SystolicArray::new(
        ARCH.name,
        weights.map(|weight| PeRule::DoubleBuffered { weight }),
        Topology {
            x: Route::Chain([0, 1, 2]),
            y: Route::Chain([0, 1, 2]),
            w: Route::Open,
        },
        None,
        Combiner::Tail(2),
    )
}

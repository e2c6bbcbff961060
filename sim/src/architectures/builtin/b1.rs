//! Weight-stationary FIR with a broadcast input.
//!
//! Every PE sees the same `x`, the partial sum travels PE1 -> PE2 -> PE3 and
//! leaves PE3 one edge after the last product was added:
//! `y = w3 * x[k] + w2 * x[k-1] + w1 * x[k-2]`.

use crate::{
    architectures::{ramp_stimulus, Arch, Weights},
    framework::{Combiner, PeRule, Route, SystolicArray, Topology},
};

pub const ARCH: Arch = Arch {
    name: "b1",
    about: "broadcast x, stationary weights, partial sums chained to PE3",
    default_weights: [1, 2, 3],
    streams_weights: false,
    build,
    stimulus: ramp_stimulus,
};

fn build(weights: &Weights) -> anyhow::Result<SystolicArray> {
    SystolicArray::new(
        ARCH.name,
        weights.map(|weight| PeRule::Stationary { weight }),
        Topology {
            x: Route::Broadcast,
            y: Route::Chain([0, 1, 2]),
            w: Route::Open,
        },
        None,
        Combiner::Tail(2),
    )
}

//! Weight-stationary FIR with counter-flowing data: `x` enters PE3 and moves
//! towards PE1 while the partial sum moves from PE1 to PE3. A sample meets a
//! partial sum every other edge, so only every second input may carry data.

use crate::{
    architectures::{Arch, Weights},
    framework::{Combiner, PeRule, Route, SystolicArray, Topology},
    stimulus::Stimulus,
};

pub const ARCH: Arch = Arch {
    name: "w1",
    about: "x PE3 -> PE1 against partial sums PE1 -> PE3, one sample every 2 cycles",
    default_weights: [1, 2, 3],
    streams_weights: false,
    build,
    stimulus,
};

fn build(weights: &Weights) -> anyhow::Result<SystolicArray> {
    SystolicArray::new(
        ARCH.name,
        weights.map(|weight| PeRule::Stationary { weight }),
        Topology {
            x: Route::Chain([2, 1, 0]),
            y: Route::Chain([0, 1, 2]),
            w: Route::Open,
        },
        None,
        Combiner::Tail(2),
    )
}

fn stimulus(_: &Weights) -> Stimulus {
    Stimulus::new()
        .reset(1)
        .streams(&[1, 0, 2, 0, 3, 0, 4, 0, 5], &[], &[])
        .idle(8)
}

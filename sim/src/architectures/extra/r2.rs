//! `x` and the weight stream both flow PE1 -> PE3 side by side. Each PE
//! multiplies the pair it holds and an adder sums the three products, so
//! the result is a sliding window sum of `x[k] * w[k]`.

use crate::{
    architectures::{Arch, Weights},
    framework::{Combiner, PeRule, Route, SystolicArray, Topology, PE_COUNT},
    stimulus::Stimulus,
};

pub const ARCH: Arch = Arch {
    name: "r2",
    about: "x and weight streams co-flow PE1 -> PE3, products summed by an adder",
    default_weights: [1, 2, 3],
    streams_weights: true,
    build,
    stimulus,
};

fn build(_: &Weights) -> anyhow::Result<SystolicArray> {
    SystolicArray::new(
        ARCH.name,
        [PeRule::MovingProduct; PE_COUNT],
        Topology {
            x: Route::Chain([0, 1, 2]),
            y: Route::Open,
            w: Route::Chain([0, 1, 2]),
        },
        None,
        Combiner::StaticAdder,
    )
}

/// Descending `x` against the weights repeated.
fn stimulus(weights: &Weights) -> Stimulus {
    let x = [3, 2, 1, 0, 0];
    let w: Vec<_> = weights.iter().copied().cycle().take(x.len()).collect();
    Stimulus::new().reset(1).streams(&x, &w, &[]).idle(5)
}

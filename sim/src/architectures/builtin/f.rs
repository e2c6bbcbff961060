//! Broadcast input with a combinational adder over all PE products. The
//! result is available on the same edge the products are latched.
//!
//! Every PE multiplies the broadcast `x`, while the raw input is also passed
//! PE3 to PE2 to PE1, so `x_out` trails `x_in` by two edges.

use crate::{
    architectures::{Arch, Weights},
    framework::{Combiner, PeRule, Route, SystolicArray, Topology},
    stimulus::Stimulus,
};

pub const ARCH: Arch = Arch {
    name: "f",
    about: "broadcast x, per-PE products summed by an adder",
    default_weights: [1, 2, 3],
    streams_weights: false,
    build,
    stimulus,
};

fn build(weights: &Weights) -> anyhow::Result<SystolicArray> {
    SystolicArray::new(
        ARCH.name,
        weights.map(|weight| PeRule::Broadcast { weight }),
        Topology {
            x: Route::BroadcastChain([2, 1, 0]),
            y: Route::Open,
            w: Route::Open,
        },
        None,
        Combiner::StaticAdder,
    )
}

fn stimulus(_: &Weights) -> Stimulus {
    Stimulus::new().reset(1).streams(&[1, 2, 3, 4, 5], &[], &[]).idle(7)
}

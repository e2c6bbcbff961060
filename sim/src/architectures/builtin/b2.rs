//! Output-stationary FIR with a broadcast input and a weight ring.
//!
//! The taps circulate PE1 -> PE2 -> PE3 -> PE1, one slot per edge. Tap 1
//! carries the tag: whenever it enters a PE that PE has seen all three taps
//! and drains its sum. A priority mux picks the draining lane.

use crate::{
    architectures::{ramp_stimulus, Arch, Weights},
    framework::{Combiner, PeRule, RingSeed, Route, SystolicArray, Topology, PE_COUNT},
};

pub const ARCH: Arch = Arch {
    name: "b2",
    about: "broadcast x, tagged weights on a ring, priority mux",
    default_weights: [1, 2, 3],
    streams_weights: false,
    build,
    stimulus: ramp_stimulus,
};

/// PE `i` starts with tap `(N - i) mod N` so that tap 1 (tagged) reaches
/// every PE after the two others.
fn seed(weights: &Weights) -> RingSeed {
    let mut seed = [(0, false); PE_COUNT];
    for (pe, slot) in seed.iter_mut().enumerate() {
        let tap = (PE_COUNT - pe) % PE_COUNT;
        *slot = (weights[tap], tap == 0);
    }
    seed
}

fn build(weights: &Weights) -> anyhow::Result<SystolicArray> {
    SystolicArray::new(
        ARCH.name,
        [PeRule::MovingTagged; PE_COUNT],
        Topology {
            x: Route::Broadcast,
            y: Route::Open,
            w: Route::Ring([0, 1, 2]),
        },
        Some(seed(weights)),
        Combiner::PriorityMux([0, 1, 2]),
    )
}

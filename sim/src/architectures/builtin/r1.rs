//! Output-stationary FIR with counter-flowing data and weights.
//!
//! `x` enters PE1 and moves towards PE3, the weight stream and its tag enter
//! PE3 from outside and move towards PE1. Each PE drains when the tag passes
//! it; the staged output mux shifts the drained sums out of PE3's end.

use crate::{
    architectures::{Arch, Weights},
    framework::{Combiner, PeRule, Route, SystolicArray, Topology, PE_COUNT},
    stimulus::Stimulus,
};

pub const ARCH: Arch = Arch {
    name: "r1",
    about: "x PE1 -> PE3, tagged weight stream PE3 -> PE1, staged output mux",
    default_weights: [1, 2, 3],
    streams_weights: true,
    build,
    stimulus,
};

fn build(_: &Weights) -> anyhow::Result<SystolicArray> {
    SystolicArray::new(
        ARCH.name,
        [PeRule::MovingTagged; PE_COUNT],
        Topology {
            x: Route::Chain([0, 1, 2]),
            y: Route::Open,
            w: Route::Chain([2, 1, 0]),
        },
        None,
        Combiner::staged_mux([0, 1, 2]),
    )
}

/// Nine frames: two leading zeros of `x` while the taps cycle `w2, w3, w1`
/// with the tag on `w1`.
fn stimulus(weights: &Weights) -> Stimulus {
    let x = [0, 0, 1, 2, 3, 4, 5, 0, 0];
    let mut w = Vec::with_capacity(x.len());
    let mut tag = Vec::with_capacity(x.len());
    for k in 0..x.len() {
        let tap = (k + 1) % PE_COUNT;
        w.push(weights[tap]);
        tag.push(tap == 0);
    }
    Stimulus::new().reset(1).streams(&x, &w, &tag).idle(10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stimulus_tags_every_third_frame() {
        let stim = stimulus(&[1, 2, 3]);
        let frames = &stim.frames()[1..10];
        let w: Vec<_> = frames.iter().map(|f| f.w).collect();
        assert_eq!(w, [2, 3, 1, 2, 3, 1, 2, 3, 1]);
        let tagged: Vec<_> = (0..9).filter(|&k| frames[k].tag).collect();
        assert_eq!(tagged, [2, 5, 8]);
    }
}

use super::{Lanes, Scalar, PE_COUNT};

/// Reduces the result lanes of all PEs to the external result.
///
/// A drained value of 0 can not be told apart from "nothing drained". Both
/// muxes treat it as absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combiner {
    /// The result lane of one PE, usually the tail of a partial-sum chain,
    /// is the external result.
    Tail(usize),
    /// Combinational sum of all post-edge lanes.
    StaticAdder,
    /// Combinational; the first non-zero post-edge lane in the given order
    /// wins, zero if every lane is zero.
    PriorityMux([usize; PE_COUNT]),
    /// One register per stage. On each edge stage `i` loads lane `order[i]`
    /// of the pre-edge outputs if it is non-zero, otherwise the pre-edge
    /// value of stage `i - 1`. The last stage is the external result.
    StagedMux {
        order: [usize; PE_COUNT],
        regs: Lanes,
    },
}

impl Combiner {
    pub fn staged_mux(order: [usize; PE_COUNT]) -> Self {
        Combiner::StagedMux {
            order,
            regs: [0; PE_COUNT],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Combiner::Tail(_) => "tail",
            Combiner::StaticAdder => "adder",
            Combiner::PriorityMux(_) => "priority-mux",
            Combiner::StagedMux { .. } => "staged-mux",
        }
    }

    /// Registers of the staged mux.
    pub fn regs(&self) -> Option<&Lanes> {
        match self {
            Combiner::StagedMux { regs, .. } => Some(regs),
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        if let Combiner::StagedMux { regs, .. } = self {
            *regs = [0; PE_COUNT];
        }
    }

    /// Apply one clock edge. `pre` holds the lanes latched on the previous
    /// edge, `post` the lanes latched on this one.
    pub fn clock(&mut self, pre: &Lanes, post: &Lanes) -> Scalar {
        match self {
            Combiner::Tail(pe) => post[*pe],
            Combiner::StaticAdder => post.iter().fold(0, |sum, &v| sum.wrapping_add(v)),
            Combiner::PriorityMux(order) => order
                .iter()
                .map(|&pe| post[pe])
                .find(|&v| v != 0)
                .unwrap_or(0),
            Combiner::StagedMux { order, regs } => {
                let mut next = [0; PE_COUNT];
                for stage in 0..PE_COUNT {
                    let lane = pre[order[stage]];
                    next[stage] = if lane != 0 || stage == 0 {
                        lane
                    } else {
                        regs[stage - 1]
                    };
                }
                *regs = next;
                next[PE_COUNT - 1]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_mux_prefers_first() {
        let mut mux = Combiner::PriorityMux([0, 1, 2]);
        assert_eq!(mux.clock(&[0; PE_COUNT], &[5, 0, 7]), 5);
        assert_eq!(mux.clock(&[0; PE_COUNT], &[0, 0, 7]), 7);
        assert_eq!(mux.clock(&[0; PE_COUNT], &[0, -3, 7]), -3);
        assert_eq!(mux.clock(&[0; PE_COUNT], &[0, 0, 0]), 0);
    }

    #[test]
    fn test_priority_mux_ignores_pre_edge() {
        let mut mux = Combiner::PriorityMux([0, 1, 2]);
        assert_eq!(mux.clock(&[9, 9, 9], &[0, 0, 0]), 0);
    }

    #[test]
    fn test_drained_zero_is_no_result() {
        // A PE that drains a sum of 0 looks exactly like an idle array.
        let mut mux = Combiner::PriorityMux([0, 1, 2]);
        let drained_zero = [0, 0, 0];
        let idle = [0, 0, 0];
        assert_eq!(mux.clock(&idle, &drained_zero), mux.clock(&idle, &idle));
    }

    #[test]
    fn test_static_adder() {
        let mut adder = Combiner::StaticAdder;
        assert_eq!(adder.clock(&[0; PE_COUNT], &[4, 8, 12]), 24);
        assert_eq!(adder.clock(&[4, 8, 12], &[0, 0, 0]), 0);
    }

    #[test]
    fn test_tail() {
        let mut tail = Combiner::Tail(2);
        assert_eq!(tail.clock(&[0; PE_COUNT], &[1, 2, 3]), 3);
    }

    #[test]
    fn test_staged_mux_shifts_one_stage_per_edge() {
        let mut mux = Combiner::staged_mux([0, 1, 2]);
        let none = [0; PE_COUNT];

        // a drain on lane 0 needs one edge per stage to reach the output
        assert_eq!(mux.clock(&[6, 0, 0], &none), 0);
        assert_eq!(mux.regs(), Some(&[6, 0, 0]));
        assert_eq!(mux.clock(&none, &none), 0);
        assert_eq!(mux.regs(), Some(&[0, 6, 0]));
        assert_eq!(mux.clock(&none, &none), 6);
        assert_eq!(mux.clock(&none, &none), 0);
    }

    #[test]
    fn test_staged_mux_most_recent_drain_wins() {
        let mut mux = Combiner::staged_mux([0, 1, 2]);
        let none = [0; PE_COUNT];

        mux.clock(&[6, 0, 0], &none);
        mux.clock(&none, &none);
        // lane 2 overrides the value arriving from stage 1
        assert_eq!(mux.clock(&[0, 0, 9], &none), 9);
        assert_eq!(mux.clock(&none, &none), 0);
    }

    #[test]
    fn test_staged_mux_reset() {
        let mut mux = Combiner::staged_mux([0, 1, 2]);
        mux.clock(&[1, 2, 3], &[0; PE_COUNT]);
        assert_eq!(mux.regs(), Some(&[1, 2, 3]));
        mux.reset();
        assert_eq!(mux.regs(), Some(&[0; PE_COUNT]));
        assert_eq!(Combiner::StaticAdder.regs(), None);
    }
}

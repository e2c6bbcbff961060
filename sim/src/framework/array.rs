use super::{
    Combiner, Interconnect, Lanes, PeOut, PeRule, PeState, Phase, PortIn, PortOut,
    ProcessingElement, RingSeed, Topology, PE_COUNT,
};

/// Three processing elements, their wiring and a result combiner, clocked as
/// one unit.
///
/// The array owns every register. Cross-PE communication only happens in
/// [`SystolicArray::step`], through a snapshot of the outputs latched on the
/// previous edge, so the order in which PEs are clocked is irrelevant.
#[derive(Debug, Clone)]
pub struct SystolicArray {
    name: &'static str,
    pes: [ProcessingElement; PE_COUNT],
    interconnect: Interconnect,
    combiner: Combiner,
    phase: Phase,
    cycle_count: u64,
}

impl SystolicArray {
    /// Build an array with one rule per PE. `seed` preloads a weight ring.
    pub fn new(
        name: &'static str,
        rules: [PeRule; PE_COUNT],
        topology: Topology,
        seed: Option<RingSeed>,
        combiner: Combiner,
    ) -> anyhow::Result<Self> {
        let lanes_used: &[usize] = match &combiner {
            Combiner::Tail(pe) => std::slice::from_ref(pe),
            Combiner::PriorityMux(order) | Combiner::StagedMux { order, .. } => order,
            Combiner::StaticAdder => &[],
        };
        if let Some(pe) = lanes_used.iter().find(|&&pe| pe >= PE_COUNT) {
            anyhow::bail!("{name}: combiner reads unknown PE{}", pe + 1);
        }

        let interconnect = Interconnect::new(topology, seed)?;
        let pes = std::array::from_fn(|id| ProcessingElement::new(id, rules[id]));
        tracing::debug!(
            "build {name}: {:?} with {}",
            rules.map(|r| r.name()),
            combiner.name()
        );

        Ok(Self {
            name,
            pes,
            interconnect,
            combiner,
            phase: Phase::Reset,
            cycle_count: 0,
        })
    }

    /// Advance one clock edge with the given external inputs and return the
    /// external outputs after the edge.
    pub fn step(&mut self, input: &PortIn) -> PortOut {
        self.cycle_count += 1;

        if input.rst {
            if self.phase == Phase::Run {
                tracing::debug!("{}: reset at cycle {}", self.name, self.cycle_count);
            }
            for pe in self.pes.iter_mut() {
                pe.clock(true, Default::default());
            }
            self.combiner.reset();
            self.interconnect.reset();
            self.phase = Phase::Reset;
            return PortOut::default();
        }

        let pre: [PeOut; PE_COUNT] = self.outputs();
        let ins = self.interconnect.route(&pre, input);
        let mut post = [PeOut::default(); PE_COUNT];
        for ((pe, pe_in), out) in self.pes.iter_mut().zip(ins).zip(post.iter_mut()) {
            *out = pe.clock(false, pe_in);
        }

        let lanes = post.map(|o| o.y);
        let y = self.combiner.clock(&pre.map(|o| o.y), &lanes);
        let (x, w, tag) = self.interconnect.exits(&post);
        self.phase = Phase::Run;

        tracing::trace!(
            "{} cycle {}: x = {}, lanes = {:?}, y = {}",
            self.name,
            self.cycle_count,
            input.x,
            lanes,
            y
        );
        PortOut {
            x,
            w,
            tag,
            y,
            lanes,
        }
    }

    fn outputs(&self) -> [PeOut; PE_COUNT] {
        std::array::from_fn(|i| self.pes[i].output())
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of edges applied so far, reset edges included.
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    pub fn pes(&self) -> &[ProcessingElement; PE_COUNT] {
        &self.pes
    }

    pub fn pe_states(&self) -> [PeState; PE_COUNT] {
        std::array::from_fn(|i| *self.pes[i].state())
    }

    /// Result port of each PE as latched on the last edge.
    pub fn lanes(&self) -> Lanes {
        self.outputs().map(|o| o.y)
    }

    /// Registers of a staged mux, `None` for combinational combiners.
    pub fn combiner_regs(&self) -> Option<Lanes> {
        self.combiner.regs().copied()
    }
}

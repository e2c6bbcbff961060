use serde::Serialize;

use super::{Phase, Scalar};

/// Per-cycle update rule of a processing element. Every rule shares the same
/// reset/run skeleton in [`ProcessingElement::clock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeRule {
    /// Weight-stationary, single stage: `y_out = x_in * weight + y_in`, the
    /// sampled `x_in` is forwarded one cycle later.
    Stationary { weight: Scalar },
    /// Weight-stationary with a second x register. Same arithmetic as
    /// [`PeRule::Stationary`] but `x` leaves the PE two edges after it
    /// entered.
    DoubleBuffered { weight: Scalar },
    /// Weight and tag move through the PE. The product `x_in * w_in` is
    /// accumulated every edge. When `tag_in` is set the accumulator is
    /// emitted on `y_out` and accumulation restarts from this edge's product.
    MovingTagged,
    /// Weight moves through the PE, `y_out = x_in * w_in` without
    /// accumulation.
    MovingProduct,
    /// Every PE sees the same `x_in`; `y_out = x_in * weight` feeds an
    /// external adder. The raw value on `x_fwd` is latched and forwarded
    /// untouched.
    Broadcast { weight: Scalar },
}

impl PeRule {
    pub fn name(&self) -> &'static str {
        match self {
            PeRule::Stationary { .. } => "stationary",
            PeRule::DoubleBuffered { .. } => "double-buffered",
            PeRule::MovingTagged => "moving-tagged",
            PeRule::MovingProduct => "moving-product",
            PeRule::Broadcast { .. } => "broadcast",
        }
    }

    /// Compute the registers and output ports after one run edge. Only
    /// pre-edge values are read.
    pub fn evaluate(&self, cur: &PeState, input: PeIn) -> (PeState, PeOut) {
        let PeIn {
            x,
            x_fwd,
            y,
            w,
            tag,
        } = input;
        match *self {
            PeRule::Stationary { weight } => {
                let sum = x.wrapping_mul(weight).wrapping_add(y);
                let state = PeState {
                    x_reg: x,
                    acc: sum,
                    ..Default::default()
                };
                let out = PeOut {
                    x,
                    y: sum,
                    ..Default::default()
                };
                (state, out)
            }
            PeRule::DoubleBuffered { weight } => {
                let sum = x.wrapping_mul(weight).wrapping_add(y);
                let state = PeState {
                    x_reg: x,
                    x_reg2: cur.x_reg,
                    acc: sum,
                    ..Default::default()
                };
                let out = PeOut {
                    x: cur.x_reg,
                    y: sum,
                    ..Default::default()
                };
                (state, out)
            }
            PeRule::MovingTagged => {
                let (drained, acc) = if tag { (cur.acc, 0) } else { (0, cur.acc) };
                let acc = acc.wrapping_add(x.wrapping_mul(w));
                let state = PeState {
                    x_reg: x,
                    w_reg: w,
                    tag_reg: tag,
                    acc,
                    ..Default::default()
                };
                let out = PeOut {
                    x,
                    y: drained,
                    w,
                    tag,
                };
                (state, out)
            }
            PeRule::MovingProduct => {
                let product = x.wrapping_mul(w);
                let state = PeState {
                    x_reg: x,
                    w_reg: w,
                    ..Default::default()
                };
                let out = PeOut {
                    x,
                    y: product,
                    w,
                    tag: false,
                };
                (state, out)
            }
            PeRule::Broadcast { weight } => {
                let state = PeState {
                    x_reg: x_fwd,
                    ..Default::default()
                };
                let out = PeOut {
                    x: x_fwd,
                    y: x.wrapping_mul(weight),
                    ..Default::default()
                };
                (state, out)
            }
        }
    }
}

/// Internal registers of a processing element. Registers a rule does not use
/// stay zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PeState {
    /// Last sampled input data.
    pub x_reg: Scalar,
    /// Second data register of [`PeRule::DoubleBuffered`].
    pub x_reg2: Scalar,
    /// Last sampled moving weight.
    pub w_reg: Scalar,
    /// Running sum.
    pub acc: Scalar,
    /// Last sampled tag.
    pub tag_reg: bool,
}

/// Input ports of a processing element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeIn {
    pub x: Scalar,
    /// Raw data arriving on the forwarding path. Equal to `x` unless the
    /// data route broadcasts for compute and chains for forwarding.
    pub x_fwd: Scalar,
    /// Partial sum from the upstream PE.
    pub y: Scalar,
    pub w: Scalar,
    pub tag: bool,
}

/// Registered output ports of a processing element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeOut {
    pub x: Scalar,
    /// Partial sum, product, or drained accumulator depending on the rule.
    pub y: Scalar,
    pub w: Scalar,
    pub tag: bool,
}

/// A multiply-accumulate unit. Its output ports are registers: a value
/// written on an edge is what the neighbours sample on the next edge.
#[derive(Debug, Clone)]
pub struct ProcessingElement {
    id: usize,
    rule: PeRule,
    phase: Phase,
    state: PeState,
    out: PeOut,
}

impl ProcessingElement {
    /// All registers and ports start at zero.
    pub fn new(id: usize, rule: PeRule) -> Self {
        Self {
            id,
            rule,
            phase: Phase::Reset,
            state: PeState::default(),
            out: PeOut::default(),
        }
    }

    /// Apply one clock edge and return the new output ports.
    ///
    /// With `rst` set every register and port is forced to zero and `input`
    /// is ignored.
    pub fn clock(&mut self, rst: bool, input: PeIn) -> PeOut {
        if rst {
            if self.phase == Phase::Run {
                tracing::debug!("PE{} reset", self.id + 1);
            }
            self.phase = Phase::Reset;
            self.state = PeState::default();
            self.out = PeOut::default();
            return self.out;
        }

        let (state, out) = self.rule.evaluate(&self.state, input);
        if input.tag && self.rule == PeRule::MovingTagged {
            tracing::info!("PE{} drains y = {}", self.id + 1, out.y);
        }
        tracing::trace!("PE{} {:?} -> {:?}", self.id + 1, input, out);

        self.phase = Phase::Run;
        self.state = state;
        self.out = out;
        out
    }

    /// Output ports as latched on the last edge.
    pub fn output(&self) -> PeOut {
        self.out
    }

    pub fn state(&self) -> &PeState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }
}

//! The cycle-accurate engine shared by every array architecture.
//!
//! During a clock cycle the external ports and the registered outputs of the
//! previous edge are stable. On the edge every processing element samples its
//! inputs, which are routed exclusively from those pre-edge values, and
//! latches new registers. Combinational result paths (adder, priority mux)
//! then settle on the post-edge outputs before the cycle ends. Therefore a
//! single [`SystolicArray::step`] call is one atomic clock edge.
mod array;
mod combiner;
mod interconnect;
mod pe;

pub use array::SystolicArray;
pub use combiner::Combiner;
pub use interconnect::{Interconnect, RingSeed, Route, Topology};
pub use pe::{PeIn, PeOut, PeRule, PeState, ProcessingElement};

use serde::Serialize;

/// Value carried on every data, weight and result port.
pub type Scalar = i32;

/// Number of processing elements in every array.
pub const PE_COUNT: usize = 3;

/// Per-PE values, indexed by PE position (PE1 is index 0).
pub type Lanes = [Scalar; PE_COUNT];

/// The two states of the synchronous state machine shared by processing
/// elements and arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Phase {
    /// Registers are held at zero. This is also the state before the first
    /// clock edge.
    #[default]
    Reset,
    /// Registers update once per clock edge.
    Run,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (name, s) = match self {
            Phase::Reset => ("rst", crate::utils::YLW),
            Phase::Run => ("run", crate::utils::GRN),
        };
        write!(f, "{s}{name}{s:#}")
    }
}

/// External input ports sampled on one clock edge. Ports that an
/// architecture does not wire are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PortIn {
    /// Synchronous reset. Takes priority over everything else on the edge.
    pub rst: bool,
    /// Data stream.
    pub x: Scalar,
    /// Initial partial sum entering a weight-stationary chain.
    pub y: Scalar,
    /// Moving weight stream.
    pub w: Scalar,
    /// Drain tag travelling with `w`.
    pub tag: bool,
}

impl PortIn {
    /// A frame that asserts reset.
    pub fn reset() -> Self {
        Self {
            rst: true,
            ..Default::default()
        }
    }

    /// A frame that only drives the data stream.
    pub fn data(x: Scalar) -> Self {
        Self {
            x,
            ..Default::default()
        }
    }
}

/// External output ports after one clock edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PortOut {
    /// Data forwarded out of the tail of the x route.
    pub x: Scalar,
    /// Weight forwarded out of the tail of the w route.
    pub w: Scalar,
    /// Tag forwarded out of the tail of the w route.
    pub tag: bool,
    /// Combined result.
    pub y: Scalar,
    /// Result port of each PE.
    pub lanes: Lanes,
}

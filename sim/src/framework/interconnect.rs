//! Wiring between processing elements.
//!
//! Each PE input port is fed either from an external port, from the
//! registered output of exactly one neighbour, or from a constant zero. PEs
//! never hold references to each other: a route is a list of PE indices and
//! neighbours are found by position.

use super::{PeIn, PeOut, PortIn, Scalar, PE_COUNT};

/// How one signal (x, y, or the w/tag pair) travels through the array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// The external port fans out to every PE on the same edge.
    Broadcast,
    /// Data only: the external port fans out to every PE for compute, while
    /// the raw value each PE latched is forwarded along the given flow
    /// order, like [`Route::Chain`].
    BroadcastChain([usize; PE_COUNT]),
    /// Flow order along a linear pipeline. The first PE reads the external
    /// port, every other PE reads the one before it.
    Chain([usize; PE_COUNT]),
    /// Flow order along a closed ring. The first PE reads the last one.
    Ring([usize; PE_COUNT]),
    /// Not connected, every PE reads zero.
    Open,
}

/// Where a PE input port is sampled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    External,
    Pe(usize),
    Zero,
}

/// Position following `pos` on a ring.
pub fn ring_next(pos: usize) -> usize {
    (pos + 1) % PE_COUNT
}

impl Route {
    /// The PE that drives the external output of this route, if any.
    pub fn tail(&self) -> Option<usize> {
        match self {
            Route::Chain(order) | Route::BroadcastChain(order) => Some(order[PE_COUNT - 1]),
            Route::Broadcast => Some(PE_COUNT - 1),
            Route::Ring(_) | Route::Open => None,
        }
    }

    fn order(&self) -> Option<&[usize; PE_COUNT]> {
        match self {
            Route::Chain(order) | Route::Ring(order) | Route::BroadcastChain(order) => {
                Some(order)
            }
            Route::Broadcast | Route::Open => None,
        }
    }

    fn validate(&self, signal: &str) -> anyhow::Result<()> {
        if let Some(order) = self.order() {
            let mut seen = [false; PE_COUNT];
            for &pe in order {
                anyhow::ensure!(pe < PE_COUNT, "{signal} route names unknown PE{}", pe + 1);
                anyhow::ensure!(
                    !seen[pe],
                    "{signal} route visits PE{} twice; only broadcast may fan out",
                    pe + 1
                );
                seen[pe] = true;
            }
        }
        Ok(())
    }

    /// Resolve the source of every PE's input port.
    fn sources(&self) -> [Source; PE_COUNT] {
        let mut sources = [Source::Zero; PE_COUNT];
        match self {
            Route::Broadcast | Route::BroadcastChain(_) => sources = [Source::External; PE_COUNT],
            Route::Open => {}
            Route::Chain(order) => sources = chain_sources(order),
            Route::Ring(order) => {
                for pos in 0..PE_COUNT {
                    sources[order[ring_next(pos)]] = Source::Pe(order[pos]);
                }
            }
        }
        sources
    }

    /// Resolve where every PE's forwarded raw data comes from.
    fn forward_sources(&self) -> [Source; PE_COUNT] {
        match self {
            Route::BroadcastChain(order) => chain_sources(order),
            _ => self.sources(),
        }
    }
}

/// The head of `order` reads the external port, every other PE reads the one
/// before it.
fn chain_sources(order: &[usize; PE_COUNT]) -> [Source; PE_COUNT] {
    let mut sources = [Source::Zero; PE_COUNT];
    sources[order[0]] = Source::External;
    for pos in 1..PE_COUNT {
        sources[order[pos]] = Source::Pe(order[pos - 1]);
    }
    sources
}

/// Routes of all signals of an array. Fixed after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topology {
    pub x: Route,
    pub y: Route,
    /// Moving weight and its tag share one route.
    pub w: Route,
}

impl Topology {
    /// Check that no registered route has more than one reader per writer.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.x.validate("x")?;
        self.y.validate("y")?;
        self.w.validate("w")?;
        for (signal, route) in [("y", self.y), ("w", self.w)] {
            anyhow::ensure!(
                !matches!(route, Route::BroadcastChain(_)),
                "{signal} route can not broadcast and chain at once"
            );
        }
        Ok(())
    }
}

/// Initial `(w, tag)` held on each PE's ring input, indexed by PE.
pub type RingSeed = [(Scalar, bool); PE_COUNT];

/// The resolved wiring of an array.
#[derive(Debug, Clone)]
pub struct Interconnect {
    topology: Topology,
    x_src: [Source; PE_COUNT],
    x_fwd_src: [Source; PE_COUNT],
    y_src: [Source; PE_COUNT],
    w_src: [Source; PE_COUNT],
    seed: Option<RingSeed>,
    /// Set until the first run edge after a reset; the ring inputs then
    /// read the seed instead of the zeroed PE outputs.
    preload: bool,
}

impl Interconnect {
    pub fn new(topology: Topology, seed: Option<RingSeed>) -> anyhow::Result<Self> {
        topology.validate()?;
        anyhow::ensure!(
            seed.is_none() || matches!(topology.w, Route::Ring(_)),
            "a ring seed needs a w ring"
        );
        Ok(Self {
            x_src: topology.x.sources(),
            x_fwd_src: topology.x.forward_sources(),
            y_src: topology.y.sources(),
            w_src: topology.w.sources(),
            topology,
            seed,
            preload: true,
        })
    }

    /// Re-arm the ring preload.
    pub fn reset(&mut self) {
        self.preload = true;
    }

    /// Compute the input ports of every PE for the coming edge from the
    /// pre-edge PE outputs and the external ports.
    pub fn route(&mut self, pre: &[PeOut; PE_COUNT], port: &PortIn) -> [PeIn; PE_COUNT] {
        let mut ins = [PeIn::default(); PE_COUNT];
        let preload = std::mem::replace(&mut self.preload, false);
        let read = |src: Source, external: Scalar, field: fn(&PeOut) -> Scalar| match src {
            Source::External => external,
            Source::Pe(up) => field(&pre[up]),
            Source::Zero => 0,
        };

        for (pe, input) in ins.iter_mut().enumerate() {
            input.x = read(self.x_src[pe], port.x, |o| o.x);
            input.x_fwd = read(self.x_fwd_src[pe], port.x, |o| o.x);
            input.y = read(self.y_src[pe], port.y, |o| o.y);
            (input.w, input.tag) = match (self.w_src[pe], self.seed) {
                (Source::Pe(_), Some(seed)) if preload => seed[pe],
                (Source::External, _) => (port.w, port.tag),
                (Source::Pe(up), _) => (pre[up].w, pre[up].tag),
                (Source::Zero, _) => (0, false),
            };
        }
        ins
    }

    /// External forwarded outputs `(x, w, tag)`, taken from the tails of the
    /// x and w routes.
    pub fn exits(&self, post: &[PeOut; PE_COUNT]) -> (Scalar, Scalar, bool) {
        let x = self.topology.x.tail().map_or(0, |pe| post[pe].x);
        let (w, tag) = self
            .topology
            .w
            .tail()
            .map_or((0, false), |pe| (post[pe].w, post[pe].tag));
        (x, w, tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outs(vals: [Scalar; PE_COUNT]) -> [PeOut; PE_COUNT] {
        vals.map(|v| PeOut {
            x: v,
            y: v * 10,
            w: v * 100,
            tag: v == 2,
        })
    }

    #[test]
    fn test_ring_neighbours() {
        assert_eq!(ring_next(0), 1);
        assert_eq!(ring_next(PE_COUNT - 1), 0);
        let mut pos = 0;
        for _ in 0..PE_COUNT {
            pos = ring_next(pos);
        }
        assert_eq!(pos, 0);
    }

    #[test]
    fn test_chain_routes_from_upstream() -> anyhow::Result<()> {
        let topology = Topology {
            x: Route::Chain([2, 1, 0]),
            y: Route::Chain([0, 1, 2]),
            w: Route::Open,
        };
        let mut ic = Interconnect::new(topology, None)?;
        let port = PortIn {
            x: 7,
            y: 8,
            w: 9,
            tag: true,
            rst: false,
        };
        let ins = ic.route(&outs([1, 2, 3]), &port);
        assert_eq!(ins.map(|i| i.x), [2, 3, 7]);
        assert_eq!(ins.map(|i| i.x_fwd), [2, 3, 7]);
        assert_eq!(ins.map(|i| i.y), [8, 10, 20]);
        assert_eq!(ins.map(|i| i.w), [0, 0, 0]);
        assert!(ins.iter().all(|i| !i.tag));
        Ok(())
    }

    #[test]
    fn test_broadcast_fans_out() -> anyhow::Result<()> {
        let topology = Topology {
            x: Route::Broadcast,
            y: Route::Open,
            w: Route::Open,
        };
        let mut ic = Interconnect::new(topology, None)?;
        let ins = ic.route(&outs([1, 2, 3]), &PortIn::data(4));
        assert_eq!(ins.map(|i| i.x), [4, 4, 4]);
        assert_eq!(ins.map(|i| i.x_fwd), [4, 4, 4]);
        assert_eq!(ic.exits(&outs([1, 2, 3])).0, 3);
        Ok(())
    }

    #[test]
    fn test_broadcast_chain_forwards_upstream() -> anyhow::Result<()> {
        let topology = Topology {
            x: Route::BroadcastChain([2, 1, 0]),
            y: Route::Open,
            w: Route::Open,
        };
        let mut ic = Interconnect::new(topology, None)?;
        let ins = ic.route(&outs([1, 2, 3]), &PortIn::data(7));
        assert_eq!(ins.map(|i| i.x), [7, 7, 7]);
        // PE3 latches the port, PE2 reads PE3, PE1 reads PE2
        assert_eq!(ins.map(|i| i.x_fwd), [2, 3, 7]);
        assert_eq!(ic.exits(&outs([1, 2, 3])).0, 1);
        Ok(())
    }

    #[test]
    fn test_ring_preload_then_feedback() -> anyhow::Result<()> {
        let topology = Topology {
            x: Route::Broadcast,
            y: Route::Open,
            w: Route::Ring([0, 1, 2]),
        };
        let seed = [(1, true), (3, false), (2, false)];
        let mut ic = Interconnect::new(topology, Some(seed))?;

        let zero = [PeOut::default(); PE_COUNT];
        let ins = ic.route(&zero, &PortIn::default());
        assert_eq!(ins.map(|i| (i.w, i.tag)), seed);

        // PE1 reads PE3, PE2 reads PE1, PE3 reads PE2
        let ins = ic.route(&outs([1, 2, 3]), &PortIn::default());
        assert_eq!(ins.map(|i| i.w), [300, 100, 200]);
        assert_eq!(ins.map(|i| i.tag), [false, false, true]);

        ic.reset();
        let ins = ic.route(&outs([1, 2, 3]), &PortIn::default());
        assert_eq!(ins.map(|i| (i.w, i.tag)), seed);
        Ok(())
    }

    #[test]
    fn test_rejects_fan_out_on_chain() {
        let topology = Topology {
            x: Route::Chain([0, 0, 2]),
            y: Route::Open,
            w: Route::Open,
        };
        assert!(Interconnect::new(topology, None).is_err());

        let topology = Topology {
            x: Route::Broadcast,
            y: Route::Open,
            w: Route::Ring([0, 1, 3]),
        };
        assert!(topology.validate().is_err());
    }

    #[test]
    fn test_broadcast_chain_only_carries_data() {
        let topology = Topology {
            x: Route::Broadcast,
            y: Route::BroadcastChain([0, 1, 2]),
            w: Route::Open,
        };
        assert!(topology.validate().is_err());

        let topology = Topology {
            x: Route::BroadcastChain([0, 1, 1]),
            y: Route::Open,
            w: Route::Open,
        };
        assert!(topology.validate().is_err());
    }

    #[test]
    fn test_seed_needs_ring() {
        let topology = Topology {
            x: Route::Broadcast,
            y: Route::Open,
            w: Route::Chain([2, 1, 0]),
        };
        assert!(Interconnect::new(topology, Some([(0, false); PE_COUNT])).is_err());
    }
}

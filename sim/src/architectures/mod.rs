//! The array architectures, each a fixed composition of three PEs, a
//! topology and a combiner.

// Builtin architectures
mod builtin;

// Extra architectures
mod extra;
pub use extra::ARCH_NAMES as EXTRA_ARCH_NAMES;

use crate::{
    framework::{Scalar, SystolicArray, PE_COUNT},
    stimulus::Stimulus,
};

/// Tap weights of an architecture, PE1 first.
pub type Weights = [Scalar; PE_COUNT];

/// Description of one architecture.
pub struct Arch {
    pub name: &'static str,
    /// One line summary shown by `sasim --list`.
    pub about: &'static str,
    pub default_weights: Weights,
    /// The weights are not configured into the array but travel on the `w`
    /// port. They only shape the default stimulus.
    pub streams_weights: bool,
    build: fn(&Weights) -> anyhow::Result<SystolicArray>,
    stimulus: fn(&Weights) -> Stimulus,
}

impl Arch {
    pub fn build(&self, weights: &Weights) -> anyhow::Result<SystolicArray> {
        (self.build)(weights)
    }

    /// The stimulus of the reference testbench of this architecture.
    pub fn default_stimulus(&self, weights: &Weights) -> Stimulus {
        (self.stimulus)(weights)
    }

    /// Whether weights given to [`Arch::build`] and [`Arch::default_stimulus`]
    /// can reach the result of a run. Streaming architectures only see them
    /// through the default stimulus.
    pub fn uses_weights(&self, default_stimulus: bool) -> bool {
        !self.streams_weights || default_stimulus
    }
}

impl std::fmt::Debug for Arch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arch")
            .field("name", &self.name)
            .field("default_weights", &self.default_weights)
            .field("streams_weights", &self.streams_weights)
            .finish()
    }
}

/// Get all architecture names
pub fn arch_names() -> Vec<&'static str> {
    let mut names: Vec<_> = builtin::ARCHS.iter().map(|a| a.name).collect();
    names.extend(EXTRA_ARCH_NAMES);
    names
}

pub fn find_arch(name: &str) -> Option<&'static Arch> {
    builtin::ARCHS
        .iter()
        .chain(extra::ARCHS.iter())
        .find(|a| a.name == name)
}

/// Build the named architecture. `weights` overrides its default weights.
pub fn create_sim(name: &str, weights: Option<Weights>) -> anyhow::Result<SystolicArray> {
    let Some(arch) = find_arch(name) else {
        anyhow::bail!(
            "unknown architecture `{name}`, expect one of: {}",
            arch_names().join(", ")
        );
    };
    arch.build(&weights.unwrap_or(arch.default_weights))
}

/// Stimulus shared by the architectures that only take a data stream: the
/// ramp `1..=5` followed by enough idle cycles to drain every pipeline.
fn ramp_stimulus(_: &Weights) -> Stimulus {
    Stimulus::new().reset(1).streams(&[1, 2, 3, 4, 5], &[], &[]).idle(8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_resolve() {
        let names = arch_names();
        assert_eq!(names.len(), 7);
        for name in names {
            let arch = find_arch(name).unwrap();
            assert_eq!(arch.name, name);
            let sim = create_sim(name, None).unwrap();
            assert_eq!(sim.name(), name);
        }
    }

    #[test]
    fn test_unknown_arch() {
        let err = create_sim("nope", None).unwrap_err();
        assert!(err.to_string().contains("b1"));
        assert!(find_arch("nope").is_none());
    }

    #[test]
    fn test_streamed_weights_need_default_stimulus() {
        for name in ["r1", "r2"] {
            let arch = find_arch(name).unwrap();
            assert!(!arch.uses_weights(false), "{name}");
            assert!(arch.uses_weights(true), "{name}");
        }
        for name in ["b1", "w2", "b2", "f", "w1"] {
            let arch = find_arch(name).unwrap();
            assert!(arch.uses_weights(false), "{name}");
        }
    }

    #[test]
    fn test_default_stimulus_starts_with_reset() {
        for name in arch_names() {
            let arch = find_arch(name).unwrap();
            let stim = arch.default_stimulus(&arch.default_weights);
            assert!(stim.frames()[0].rst, "{name}");
            assert!(stim.frames().iter().skip(1).all(|f| !f.rst), "{name}");
        }
    }
}

//! This module contains utilities for verifying the correctness of an
//! architecture's implementation.


use crate::{
    architectures::{find_arch, Arch, Weights},
    framework::Scalar,
    stimulus::{run, Stimulus},
    trace::{results, CycleRecord},
};

pub struct ArchTester {
    arch: &'static Arch,
    weights: Weights,
}

impl ArchTester {
    pub fn new(arch: &str) -> Option<Self> {
        let arch = find_arch(arch)?;
        Some(Self {
            arch,
            weights: arch.default_weights,
        })
    }

    pub fn with_weights(mut self, weights: Weights) -> Self {
        self.weights = weights;
        self
    }

    fn simulate(&self, stim: &Stimulus) -> anyhow::Result<Vec<CycleRecord>> {
        let mut sim = self.arch.build(&self.weights)?;
        Ok(run(&mut sim, stim))
    }

    /// External results for the data stream `x` after a single reset,
    /// followed by `flush` idle cycles.
    fn simulate_stream(&self, x: &[Scalar], flush: usize) -> anyhow::Result<Vec<Scalar>> {
        let stim = Stimulus::new().reset(1).streams(x, &[], &[]).idle(flush);
        Ok(results(&self.simulate(&stim)?))
    }
}

/// Ground truth of a FIR filter: `y[k] = sum_j taps[j] * x[k - latency - j]`,
/// with `x` read as zero outside of its bounds.
pub fn fir(x: &[Scalar], taps: &[Scalar], latency: usize, len: usize) -> Vec<Scalar> {
    (0..len)
        .map(|k| {
            taps.iter().enumerate().fold(0 as Scalar, |sum, (j, &t)| {
                let v = k
                    .checked_sub(latency + j)
                    .and_then(|i| x.get(i))
                    .copied()
                    .unwrap_or(0);
                sum.wrapping_add(t.wrapping_mul(v))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIGNALS: [&[Scalar]; 4] = [
        &[1, 2, 3, 4, 5],
        &[1],
        &[7, -3, 0, 0, 12, 5, -8, 1, 1, 0, 9],
        &[Scalar::MAX, 2, Scalar::MIN, -1],
    ];

    #[test]
    fn test_fir_model() {
        assert_eq!(fir(&[1, 2, 3], &[1, 10], 0, 4), vec![1, 12, 23, 30]);
        assert_eq!(fir(&[1], &[5], 2, 4), vec![0, 0, 5, 0]);
    }

    #[test]
    fn test_b1() -> anyhow::Result<()> {
        let t = ArchTester::new("b1").unwrap();
        for x in SIGNALS {
            t.test_taps(x, &[3, 2, 1], 0)?;
        }
        t.with_weights([-1, 4, 2]).test_taps(SIGNALS[2], &[2, 4, -1], 0)
    }

    #[test]
    fn test_w2() -> anyhow::Result<()> {
        let t = ArchTester::new("w2").unwrap();
        for x in SIGNALS {
            t.test_taps(x, &[1, 2, 3], 2)?;
        }
        Ok(())
    }

    #[test]
    fn test_b2() -> anyhow::Result<()> {
        let t = ArchTester::new("b2").unwrap();
        // The mux drops a sum of exactly 0, so only strictly positive data
        // keeps every drained result observable.
        t.test_taps(&[1, 2, 3, 4, 5], &[3, 2, 1], 1)?;
        t.test_taps(&[2, 9, 1, 1, 4, 6, 3], &[3, 2, 1], 1)?;
        t.with_weights([5, 1, 7]).test_taps(&[3, 1, 4, 1, 5], &[7, 1, 5], 1)
    }

    #[test]
    fn test_f() -> anyhow::Result<()> {
        let t = ArchTester::new("f").unwrap();
        for x in SIGNALS {
            t.test_taps(x, &[6], 0)?;
        }
        Ok(())
    }

    #[test]
    fn test_w1_on_every_other_cycle() -> anyhow::Result<()> {
        let t = ArchTester::new("w1").unwrap();
        t.test_taps(&[1, 0, 2, 0, 3, 0, 4, 0, 5], &[3, 0, 2, 0, 1], 0)?;
        t.test_taps(&[-6, 0, 0, 0, 11], &[3, 0, 2, 0, 1], 0)
    }

    #[test]
    fn test_reset_restarts_every_arch() -> anyhow::Result<()> {
        for name in crate::architectures::arch_names() {
            ArchTester::new(name).unwrap().test_reset_restarts()?;
        }
        Ok(())
    }
}

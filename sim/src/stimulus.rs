//! Input sequences for an array and the loop that feeds them.
//!
//! A stimulus file holds one command per line:
//!
//! ```text
//! # comment
//! reset 2      # assert reset for two cycles (count defaults to 1)
//! 1            # x = 1
//! 2 3          # x = 2, w = 3
//! 0 1 1        # x = 0, w = 1, tag set
//! idle 4       # four all-zero cycles
//! ```
//!
//! Numbers are decimal or `0x` hex. The tag column is `0` or `1`.

use anyhow::Context;

use crate::{
    framework::{PortIn, Scalar, SystolicArray},
    trace::CycleRecord,
    utils::parse_literal,
};

/// An ordered list of input frames, one per clock cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stimulus {
    frames: Vec<PortIn>,
}

impl Stimulus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `cycles` frames asserting reset.
    pub fn reset(mut self, cycles: usize) -> Self {
        self.frames
            .extend(std::iter::repeat(PortIn::reset()).take(cycles));
        self
    }

    /// Append `cycles` all-zero frames, used to flush the pipeline.
    pub fn idle(mut self, cycles: usize) -> Self {
        self.frames
            .extend(std::iter::repeat(PortIn::default()).take(cycles));
        self
    }

    /// Append one frame per element of the longest stream. Shorter streams
    /// are padded with zero.
    pub fn streams(mut self, x: &[Scalar], w: &[Scalar], tag: &[bool]) -> Self {
        let len = x.len().max(w.len()).max(tag.len());
        for k in 0..len {
            self.frames.push(PortIn {
                rst: false,
                x: x.get(k).copied().unwrap_or(0),
                y: 0,
                w: w.get(k).copied().unwrap_or(0),
                tag: tag.get(k).copied().unwrap_or(false),
            });
        }
        self
    }

    pub fn push(mut self, frame: PortIn) -> Self {
        self.frames.push(frame);
        self
    }

    pub fn frames(&self) -> &[PortIn] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Parse the line based stimulus format.
    pub fn parse(src: &str) -> anyhow::Result<Self> {
        let mut stim = Self::new();
        for (lineno, line) in src.lines().enumerate() {
            let line = line.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }
            stim = stim
                .parse_line(line)
                .with_context(|| format!("line {}: `{line}`", lineno + 1))?;
        }
        Ok(stim)
    }

    fn parse_line(self, line: &str) -> anyhow::Result<Self> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let count = |tokens: &[&str]| -> anyhow::Result<usize> {
            match tokens {
                [] => Ok(1),
                [n] => n
                    .parse::<usize>()
                    .with_context(|| format!("invalid cycle count `{n}`")),
                _ => anyhow::bail!("expect at most one cycle count"),
            }
        };
        match tokens[0] {
            "reset" => Ok(self.reset(count(&tokens[1..])?)),
            "idle" => Ok(self.idle(count(&tokens[1..])?)),
            _ => {
                anyhow::ensure!(tokens.len() <= 3, "expect `x [w [tag]]`");
                let scalar = |s: &str| {
                    parse_literal(s).with_context(|| format!("invalid number `{s}`"))
                };
                let x = scalar(tokens[0])?;
                let w = tokens.get(1).map(|&s| scalar(s)).transpose()?.unwrap_or(0);
                let tag = match tokens.get(2).copied() {
                    None | Some("0") => false,
                    Some("1") => true,
                    Some(other) => anyhow::bail!("invalid tag `{other}`, expect 0 or 1"),
                };
                Ok(self.push(PortIn {
                    x,
                    w,
                    tag,
                    ..Default::default()
                }))
            }
        }
    }
}

/// Feed every frame of `stimulus` to `sim`, one clock cycle each, and record
/// the ports of every cycle.
pub fn run(sim: &mut SystolicArray, stimulus: &Stimulus) -> Vec<CycleRecord> {
    tracing::debug!("{}: running {} cycles", sim.name(), stimulus.len());
    stimulus
        .frames()
        .iter()
        .map(|input| {
            let output = sim.step(input);
            CycleRecord {
                cycle: sim.cycle_count(),
                phase: sim.phase(),
                input: *input,
                output,
                states: sim.pe_states(),
                combiner_regs: sim.combiner_regs(),
            }
        })
        .collect()
}

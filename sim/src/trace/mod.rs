//! Observers of the external ports. Nothing here feeds back into the array.

pub mod vcd;

use std::io::Write;

use serde::Serialize;

use crate::{
    framework::{Lanes, PeState, Phase, PortIn, PortOut, Scalar, PE_COUNT},
    utils::{BOLD, GRAY, GRNB, YLW},
};

/// Everything observable about one clock cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CycleRecord {
    /// 1-based index of the clock edge.
    pub cycle: u64,
    /// State of the array after the edge.
    pub phase: Phase,
    pub input: PortIn,
    pub output: PortOut,
    pub states: [PeState; PE_COUNT],
    pub combiner_regs: Option<Lanes>,
}

/// External results of every cycle after the last reset, in order.
pub fn results(records: &[CycleRecord]) -> Vec<Scalar> {
    let start = records
        .iter()
        .rposition(|r| r.input.rst)
        .map_or(0, |pos| pos + 1);
    records[start..].iter().map(|r| r.output.y).collect()
}

fn cell(out: &mut impl Write, v: Scalar, width: usize, hot: anstyle::Style) -> std::io::Result<()> {
    let s = if v == 0 { GRAY } else { hot };
    write!(out, "{s}{v:>width$}{s:#}")
}

/// Render the records as a table, one row per cycle.
pub fn print_table(out: &mut impl Write, records: &[CycleRecord]) -> std::io::Result<()> {
    let h = BOLD;
    writeln!(
        out,
        "{h}{:>5} {:>5} {:>6} {:>6} {:>3} | {:>6} {:>6} {:>6} | {:>8}{h:#}",
        "cycle", "phase", "x", "w", "tag", "y1", "y2", "y3", "y_out"
    )?;
    for r in records {
        write!(out, "{:>5}   {} ", r.cycle, r.phase)?;
        cell(out, r.input.x, 6, anstyle::Style::new())?;
        write!(out, " ")?;
        cell(out, r.input.w, 6, anstyle::Style::new())?;
        let t = if r.input.tag { YLW } else { GRAY };
        write!(out, " {t}{:>3}{t:#} |", u8::from(r.input.tag))?;
        for lane in r.output.lanes {
            write!(out, " ")?;
            cell(out, lane, 6, anstyle::Style::new())?;
        }
        write!(out, " | ")?;
        cell(out, r.output.y, 8, GRNB)?;
        writeln!(out)?;
    }
    Ok(())
}

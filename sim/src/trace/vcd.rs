//! Value change dump of the external ports, readable by any waveform viewer.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::Context;

use super::CycleRecord;

/// Simulated time of one clock cycle in nanoseconds.
pub const CYCLE_NS: u64 = 10;

/// Name and bit width of every dumped signal.
const SIGNALS: [(&str, usize); 12] = [
    ("clk", 1),
    ("rst", 1),
    ("x_in", 32),
    ("w_in", 32),
    ("tag_in", 1),
    ("y1", 32),
    ("y2", 32),
    ("y3", 32),
    ("y_out", 32),
    ("x_out", 32),
    ("w_out", 32),
    ("tag_out", 1),
];

const CLK: usize = 0;

/// VCD identifier of signal `idx`: printable ASCII starting from '!'.
fn vcd_id(idx: usize) -> char {
    (b'!' + idx as u8) as char
}

fn format_value(value: u32, width: usize, idx: usize) -> String {
    if width == 1 {
        format!("{}{}", value & 1, vcd_id(idx))
    } else {
        format!("b{:0width$b} {}", value, vcd_id(idx))
    }
}

fn sample(r: &CycleRecord) -> [u32; SIGNALS.len()] {
    let (i, o) = (&r.input, &r.output);
    [
        1,
        i.rst as u32,
        i.x as u32,
        i.w as u32,
        i.tag as u32,
        o.lanes[0] as u32,
        o.lanes[1] as u32,
        o.lanes[2] as u32,
        o.y as u32,
        o.x as u32,
        o.w as u32,
        o.tag as u32,
    ]
}

/// Streams one change block per cycle. Cycle `c` rises the clock at
/// `c * CYCLE_NS` with the post-edge port values, and lowers it half a
/// cycle later.
pub struct VcdWriter<W: Write> {
    out: W,
    prev: [u32; SIGNALS.len()],
}

impl<W: Write> VcdWriter<W> {
    /// Write the header with every signal in scope `module` initialised to 0.
    pub fn new(mut out: W, module: &str) -> std::io::Result<Self> {
        writeln!(out, "$timescale 1ns $end")?;
        writeln!(out, "$scope module {module} $end")?;
        for (idx, (name, width)) in SIGNALS.iter().enumerate() {
            writeln!(out, "$var wire {width} {} {name} $end", vcd_id(idx))?;
        }
        writeln!(out, "$upscope $end")?;
        writeln!(out, "$enddefinitions $end")?;
        writeln!(out, "#0")?;
        writeln!(out, "$dumpvars")?;
        for (idx, (_, width)) in SIGNALS.iter().enumerate() {
            writeln!(out, "{}", format_value(0, *width, idx))?;
        }
        writeln!(out, "$end")?;
        Ok(Self {
            out,
            prev: [0; SIGNALS.len()],
        })
    }

    pub fn record(&mut self, r: &CycleRecord) -> std::io::Result<()> {
        let time = r.cycle * CYCLE_NS;
        writeln!(self.out, "#{time}")?;
        let values = sample(r);
        for (idx, (&v, (_, width))) in values.iter().zip(SIGNALS.iter()).enumerate() {
            if v != self.prev[idx] || idx == CLK {
                writeln!(self.out, "{}", format_value(v, *width, idx))?;
            }
        }
        writeln!(self.out, "#{}", time + CYCLE_NS / 2)?;
        writeln!(self.out, "{}", format_value(0, 1, CLK))?;
        self.prev = values;
        self.prev[CLK] = 0;
        Ok(())
    }

    pub fn record_all(&mut self, records: &[CycleRecord]) -> std::io::Result<()> {
        records.iter().try_for_each(|r| self.record(r))
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(mut self) -> std::io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Dump `records` of array `module` into the file at `path`.
pub fn write_file(path: &Path, module: &str, records: &[CycleRecord]) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("could not create file `{}`", path.display()))?;
    let dump = move || -> std::io::Result<()> {
        let mut vcd = VcdWriter::new(BufWriter::new(file), module)?;
        vcd.record_all(records)?;
        vcd.finish()?;
        Ok(())
    };
    dump().with_context(|| format!("could not write file `{}`", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(1, 1, 0), "1!");
        assert_eq!(format_value(0, 1, 1), "0\"");
        assert_eq!(format_value(5, 4, 2), "b0101 #");
        assert_eq!(format_value(-1i32 as u32, 32, 2), format!("b{} #", "1".repeat(32)));
    }

    #[test]
    fn test_header_declares_every_signal() {
        let vcd = VcdWriter::new(Vec::new(), "top").unwrap();
        let text = String::from_utf8(vcd.finish().unwrap()).unwrap();
        assert!(text.starts_with("$timescale 1ns $end\n$scope module top $end\n"));
        assert_eq!(text.matches("$var wire").count(), SIGNALS.len());
        assert!(text.contains("$var wire 32 ) y_out $end"));
        assert!(text.contains("$enddefinitions $end"));
    }
}

use anyhow::{Context, Result};
use binutils::{clap, verbose};
use clap::{error::ErrorKind, CommandFactory, Parser};
use systolic_sim::{
    arch_names,
    architectures::Weights,
    find_arch,
    framework::{Scalar, PE_COUNT},
    parse_list, run,
    trace::{print_table, results, vcd},
    Stimulus,
};

// Cycle-accurate systolic array simulator written in rust
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about = None,
    styles = binutils::get_styles(),
)]
struct Args {
    /// Architecture to simulate, see `--list`
    #[arg(short, long, default_value = "b1")]
    arch: String,

    /// Tap weights, PE1 first (e.g. `1,2,3`)
    ///
    /// Architectures that stream their weights only take it together with
    /// their default stimulus.
    #[arg(long)]
    weights: Option<String>,

    /// Data stream, one value per cycle (e.g. `1,2,3,4,5`)
    #[arg(long)]
    x: Option<String>,

    /// Weight stream, one value per cycle
    #[arg(long)]
    w: Option<String>,

    /// Tag stream of `0`s and `1`s, one per cycle
    #[arg(long)]
    tag: Option<String>,

    /// Read the input frames from a stimulus file instead
    #[arg(short, long, conflicts_with_all = ["x", "w", "tag"])]
    stimulus: Option<String>,

    /// Reset cycles before the streams given with `--x`/`--w`/`--tag`
    #[arg(long, default_value_t = 1)]
    reset_cycles: usize,

    /// Idle cycles after the streams given with `--x`/`--w`/`--tag`
    #[arg(long, default_value_t = 8)]
    flush: usize,

    /// Write a value change dump of the ports to this file
    #[arg(long)]
    vcd: Option<String>,

    /// Print the per-cycle records as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Write logs as JSON lines to this file instead of stderr
    #[arg(long)]
    log_file: Option<String>,

    /// List the available architectures and exit
    #[arg(short, long)]
    list: bool,

    #[command(flatten)]
    verbose: verbose::Verbosity,
}

fn parse_stream(flag: &str, value: Option<&str>) -> Result<Vec<Scalar>> {
    match value {
        Some(s) => parse_list(s).with_context(|| format!("invalid value list for --{flag}: `{s}`")),
        None => Ok(Vec::new()),
    }
}

fn parse_weights(s: &str) -> Result<Weights> {
    let list = parse_list(s).with_context(|| format!("invalid weights `{s}`"))?;
    Weights::try_from(list.as_slice())
        .ok()
        .with_context(|| format!("expect {PE_COUNT} weights, got {}", list.len()))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_file = match &args.log_file {
        Some(path) => Some(
            std::fs::File::create(path)
                .with_context(|| format!("could not create file `{path}`"))?,
        ),
        None => None,
    };
    let log_level = binutils::verbose_level_to_trace(args.verbose.log_level());
    binutils::logging_setup(log_level, log_file.as_ref());

    if args.list {
        let s = anstyle::Style::new().bold();
        for name in arch_names() {
            if let Some(arch) = find_arch(name) {
                println!("{s}{name:<4}{s:#} {}", arch.about);
            }
        }
        return Ok(());
    }

    let Some(arch) = find_arch(&args.arch) else {
        let mut cmd = Args::command();
        cmd.error(
            ErrorKind::InvalidValue,
            format!(
                "unknown architecture `{}`, expect one of: {}",
                args.arch,
                arch_names().join(", ")
            ),
        )
        .exit();
    };
    let weights = match &args.weights {
        Some(s) => parse_weights(s)?,
        None => arch.default_weights,
    };
    let custom_streams = args.x.is_some() || args.w.is_some() || args.tag.is_some();
    let default_stimulus = args.stimulus.is_none() && !custom_streams;
    if args.weights.is_some() && !arch.uses_weights(default_stimulus) {
        let mut cmd = Args::command();
        cmd.error(
            ErrorKind::ArgumentConflict,
            format!(
                "`--weights` has no effect on `{}` without its default stimulus",
                arch.name
            ),
        )
        .exit();
    }

    let stimulus = if let Some(path) = &args.stimulus {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("could not read file `{path}`"))?;
        Stimulus::parse(&content).with_context(|| format!("could not parse stimulus `{path}`"))?
    } else if custom_streams {
        let x = parse_stream("x", args.x.as_deref())?;
        let w = parse_stream("w", args.w.as_deref())?;
        let tag = parse_stream("tag", args.tag.as_deref())?
            .into_iter()
            .map(|t| match t {
                0 => Ok(false),
                1 => Ok(true),
                _ => anyhow::bail!("invalid tag `{t}`, expect 0 or 1"),
            })
            .collect::<Result<Vec<_>>>()?;
        Stimulus::new()
            .reset(args.reset_cycles)
            .streams(&x, &w, &tag)
            .idle(args.flush)
    } else {
        arch.default_stimulus(&weights)
    };

    let mut sim = arch.build(&weights)?;
    tracing::info!("simulate {} with weights {:?}", arch.name, weights);
    let records = run(&mut sim, &stimulus);

    let mut stdout = std::io::stdout().lock();
    if args.json {
        serde_json::to_writer_pretty(&mut stdout, &records).context("could not write records")?;
        println!();
    } else {
        print_table(&mut stdout, &records).context("could not write records")?;
        drop(stdout);
        println!("y_out = {:?}", results(&records));
    }

    if let Some(path) = &args.vcd {
        vcd::write_file(std::path::Path::new(path), sim.name(), &records)?;
    }
    Ok(())
}

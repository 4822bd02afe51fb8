use anyhow::{bail, Context, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use clap::Parser;
use dasp::signal::{self, Signal};
use emqf_resampler::{defaults, Interpolation, ResamplePlan, ResamplerConfig};
use rand::Rng;
use std::io::{self, BufReader, BufWriter, Read, Write};

/// Resample raw little-endian f32 samples from stdin to stdout
#[derive(Parser, Debug)]
#[command(name = "emqf-resample", version)]
struct Args {
    /// Target rate divided by source rate
    #[arg(long, conflicts_with_all = ["from", "to"])]
    ratio: Option<f64>,

    /// Source sample rate in Hz
    #[arg(long, requires = "to")]
    from: Option<u32>,

    /// Target sample rate in Hz
    #[arg(long, requires = "from")]
    to: Option<u32>,

    /// Interpolation: linear, lagrange or bspline
    #[arg(long, default_value = "bspline")]
    interp: Interpolation,

    /// Anti-aliasing passband edge as a fraction of the target Nyquist
    #[arg(long, default_value_t = defaults::PASSBAND_FRACTION)]
    passband: f64,

    /// Input block length (input-driven mode)
    #[arg(long, default_value_t = 1024)]
    block: usize,

    /// Output block length (switches to output-driven mode)
    #[arg(long)]
    out_block: Option<usize>,

    /// Draw every block length uniformly from 1..=block
    #[arg(long)]
    jitter: bool,

    /// Generate a sine of this frequency (Hz) instead of reading stdin
    #[arg(long)]
    tone: Option<f64>,

    /// Source rate of the generated tone when --from is not given
    #[arg(long, default_value_t = 48_000.0)]
    rate: f64,

    /// Length of the generated tone in seconds
    #[arg(long, default_value_t = 1.0)]
    seconds: f64,
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();
    log::info!("emqf-resample v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(Args::parse()) {
        log::error!("Resampling failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn run(args: Args) -> Result<()> {
    let mut plan = build_plan(&args)?;
    let mut source = match args.tone {
        Some(hz) => {
            let rate = args.from.map(f64::from).unwrap_or(args.rate);
            SampleSource::tone(hz, rate, args.seconds)?
        }
        None => SampleSource::Stdin(BufReader::new(io::stdin().lock())),
    };
    let mut sink = BufWriter::new(io::stdout().lock());
    let mut rng = rand::thread_rng();

    let mut input: Vec<f32> = Vec::new();
    let mut output: Vec<f32> = Vec::new();
    let (mut total_in, mut total_out, mut blocks) = (0usize, 0usize, 0usize);

    loop {
        let (lin, lout) = match args.out_block {
            None => {
                let lin = block_len(args.block, args.jitter, &mut rng)?;
                source.read_block(&mut input, lin)?;
                (input.len(), plan.next_output_len(input.len()))
            }
            Some(out_block) => {
                let lout = block_len(out_block, args.jitter, &mut rng)?;
                let lin = plan.next_input_len(lout);
                source.read_block(&mut input, lin)?;
                if input.len() < lin {
                    // End of stream: flush whatever the remaining input yields
                    (input.len(), plan.next_output_len(input.len()))
                } else {
                    (lin, lout)
                }
            }
        };

        if lin == 0 && lout == 0 {
            break;
        }

        output.resize(lout, 0.0);
        let status = plan.execute(&mut input, &mut output);
        if !status.is_ok() {
            bail!("resampler reported {} after {} blocks", status, blocks);
        }

        for &sample in &output {
            sink.write_f32::<LittleEndian>(sample)
                .context("Failed to write output samples")?;
        }

        total_in += lin;
        total_out += lout;
        blocks += 1;
    }

    sink.flush().context("Failed to flush output")?;
    log::info!(
        "Resampled {} -> {} samples in {} blocks (ratio {}, {} interpolation, filter {})",
        total_in,
        total_out,
        blocks,
        plan.ratio(),
        plan.interpolation(),
        match plan.passband_edge() {
            Some(fc) => format!("fc = {:.4}", fc),
            None => "off".to_string(),
        }
    );
    plan.done();

    Ok(())
}

fn build_plan(args: &Args) -> Result<ResamplePlan<f32>> {
    let config = ResamplerConfig {
        interpolation: args.interp,
        passband_fraction: args.passband,
        ..ResamplerConfig::default()
    };

    let plan = match (args.ratio, args.from, args.to) {
        (Some(ratio), _, _) => ResamplePlan::with_config(ratio, &config)?,
        (None, Some(from), Some(to)) => ResamplePlan::from_rates_with_config(from, to, &config)?,
        _ => bail!("either --ratio or both --from and --to are required"),
    };

    Ok(plan)
}

fn block_len<R: Rng>(block: usize, jitter: bool, rng: &mut R) -> Result<usize> {
    if block == 0 {
        bail!("block length must be at least 1");
    }
    Ok(if jitter { rng.gen_range(1..=block) } else { block })
}

/// Where input samples come from
enum SampleSource<R: Read> {
    Stdin(R),
    Tone(std::vec::IntoIter<f32>),
    Exhausted,
}

impl<R: Read> SampleSource<R> {
    fn tone(hz: f64, rate: f64, seconds: f64) -> Result<Self> {
        if !(rate > 0.0 && seconds >= 0.0) {
            bail!("tone needs a positive rate and a non-negative duration");
        }
        let len = (rate * seconds).round() as usize;
        let samples: Vec<f32> = signal::rate(rate)
            .const_hz(hz)
            .sine()
            .take(len)
            .map(|s| (s * 0.5) as f32)
            .collect();
        log::info!("Generated {} Hz tone: {} samples at {} Hz", hz, len, rate);
        Ok(SampleSource::Tone(samples.into_iter()))
    }

    /// Replace `buf` with up to `len` samples
    fn read_block(&mut self, buf: &mut Vec<f32>, len: usize) -> Result<()> {
        buf.clear();
        while buf.len() < len {
            let next = match self {
                SampleSource::Stdin(reader) => match reader.read_f32::<LittleEndian>() {
                    Ok(sample) => Some(sample),
                    Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => None,
                    Err(e) => return Err(e).context("Failed to read input samples"),
                },
                SampleSource::Tone(samples) => samples.next(),
                SampleSource::Exhausted => None,
            };
            match next {
                Some(sample) => buf.push(sample),
                None => {
                    *self = SampleSource::Exhausted;
                    break;
                }
            }
        }
        Ok(())
    }
}

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use hsolve::{IterationDriver, IterationRecord, ProgressObserver, SolveError, SolverOptions};
use log::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON file holding a serialized `SolverOptions`; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of midpoint grid cells [default: 500].
    #[arg(short = 'n', long)]
    grid_size: Option<usize>,

    /// Kernel weight w in the update denominator [default: 0.5].
    #[arg(short = 'w', long)]
    kernel_weight: Option<f64>,

    /// Relaxation weight alpha in [0, 1]; 1.0 is undamped [default: 1.0].
    #[arg(short = 'a', long)]
    relaxation: Option<f64>,

    /// Number of outer iterations to run [default: 1000].
    #[arg(short = 'm', long)]
    max_iterations: Option<usize>,

    /// Stop early once the RMS residual drops below this value [default: run the full cap].
    #[arg(short = 't', long)]
    tolerance: Option<f64>,

    /// Fail when the tolerance is not met within the iteration cap.
    #[arg(long, default_value_t = false)]
    require_convergence: bool,

    /// Where to write the final (u, h) table. Nothing is written when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Format::Csv)]
    format: Format,

    /// Suppress the per-iteration `<iteration> <residual>` lines.
    #[arg(short, long, default_value_t = false)]
    quiet: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Csv,
    Json,
}

impl Cli {
    fn options(&self) -> hsolve::Result<SolverOptions> {
        let mut options = match &self.config {
            Some(path) => serde_json::from_reader(File::open(path)?)?,
            None => SolverOptions::default(),
        };
        if let Some(grid_size) = self.grid_size {
            options.grid_size = grid_size;
        }
        if let Some(kernel_weight) = self.kernel_weight {
            options.kernel_weight = kernel_weight;
        }
        if let Some(relaxation) = self.relaxation {
            options.relaxation = relaxation;
        }
        if let Some(max_iterations) = self.max_iterations {
            options.max_iterations = max_iterations;
        }
        if self.tolerance.is_some() {
            options.tolerance = self.tolerance;
        }
        if self.require_convergence {
            options.require_convergence = true;
        }
        Ok(options)
    }
}

/// Prints `<iteration> <residual>` per line.
///
/// The first write failure is kept and reporting stops; [`ConsoleProgress::finish`]
/// surfaces it once the run is over.
struct ConsoleProgress<W: Write> {
    out: W,
    failure: Option<io::Error>,
}

impl<W: Write> ConsoleProgress<W> {
    fn new(out: W) -> Self {
        Self { out, failure: None }
    }

    fn finish(mut self) -> io::Result<()> {
        match self.failure.take() {
            Some(err) => Err(err),
            None => self.out.flush(),
        }
    }
}

impl<W: Write> ProgressObserver for ConsoleProgress<W> {
    fn on_iteration(&mut self, record: IterationRecord) {
        if self.failure.is_some() {
            return;
        }
        if let Err(err) = writeln!(self.out, "{} {}", record.iteration, record.residual) {
            self.failure = Some(err);
        }
    }
}

fn run(cli: &Cli) -> hsolve::Result<()> {
    let options = cli.options()?;
    let driver = IterationDriver::new(options)?;

    let solution = if cli.quiet {
        driver.run()?
    } else {
        let mut progress = ConsoleProgress::new(BufWriter::new(io::stdout().lock()));
        let solution = driver.run_with(&mut progress)?;
        progress.finish()?;
        solution
    };

    let summary = solution.summary();
    info!(
        "finished after {} iterations ({}), final residual {:e}",
        summary.iterations, summary.termination, summary.final_residual
    );

    if let Some(path) = &cli.output {
        let writer = BufWriter::new(File::create(path)?);
        match cli.format {
            Format::Csv => solution.write_csv(writer)?,
            Format::Json => solution.write_json(writer)?,
        }
        info!("wrote {} points to {}", solution.len(), path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err @ SolveError::InvalidConfiguration { .. }) => {
            error!("{err}");
            ExitCode::from(2)
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Accepts `limit` writes, then fails every later one.
    struct FlakyWriter {
        lines: Vec<u8>,
        limit: usize,
        writes: usize,
    }

    impl Write for FlakyWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.writes += 1;
            if self.writes > self.limit {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
            }
            self.lines.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn record(iteration: usize) -> IterationRecord {
        IterationRecord {
            iteration,
            residual: 0.5,
        }
    }

    #[test]
    fn console_progress_writes_one_line_per_iteration() {
        let mut progress = ConsoleProgress::new(Vec::new());
        progress.on_iteration(record(0));
        progress.on_iteration(record(1));
        assert_eq!(progress.out, b"0 0.5\n1 0.5\n");
        assert!(progress.finish().is_ok());
    }

    #[test]
    fn console_progress_keeps_the_first_write_failure() {
        let writer = FlakyWriter {
            lines: Vec::new(),
            limit: 0,
            writes: 0,
        };
        let mut progress = ConsoleProgress::new(writer);
        for iteration in 0..5 {
            progress.on_iteration(record(iteration));
        }
        assert_eq!(progress.out.writes, 1);
        assert!(progress.out.lines.is_empty());
        let err = progress.finish().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from(["hsolve", "-n", "40", "-a", "0.5", "-t", "1e-9"]);
        let options = cli.options().unwrap();
        assert_eq!(options.grid_size, 40);
        assert_eq!(options.relaxation, 0.5);
        assert_eq!(options.tolerance, Some(1e-9));
        assert_eq!(options.kernel_weight, 0.5);
        assert_eq!(options.max_iterations, 1000);
    }
}

use std::{
    hint::black_box,
    path::PathBuf,
    time::{Duration, Instant},
};

use brisk_common::prelude::*;
use brisk_logging::{
    log_dynarr_contents, log_dynarr_info, log_error, log_info, log_verbose, log_warning,
    LogCategory, LogLevel, Logger, LoggerSettings,
};
use clap::{Parser, Subcommand, ValueEnum};
use parking_lot::Mutex;

pub const LOG_CAT : LogCategory = LogCategory::new("Main");
const BENCH_CAT : LogCategory = LogCategory::new_with_sub("Main", "Bench");
const THREADS_CAT : LogCategory = LogCategory::new_with_sub("Main", "Threads");

#[derive(Parser)]
#[command(name = "brisk", about = "Exercise the brisk dynamic array", version)]
struct Cli {
    /// Also write the log to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
    /// Highest level that gets logged.
    #[arg(long, global = true, value_enum, default_value_t = LevelArg::Info)]
    level: LevelArg,
    /// Flush the log after every message.
    #[arg(long, global = true)]
    always_flush: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a small array of strings and print it.
    Demo,
    /// Time a mixed workload on `DynArr` and `Vec`.
    Bench {
        #[arg(long, default_value_t = 100)]
        runs: usize,
        #[arg(long, default_value_t = 100_000)]
        ops: usize,
    },
    /// Hammer a single mutex-protected array from several threads.
    Threads {
        #[arg(long, default_value_t = 8)]
        threads: usize,
        #[arg(long, default_value_t = 10_000)]
        iterations: usize,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LevelArg {
    Severe,
    Error,
    Warning,
    Info,
    Verbose,
    Debug,
}

impl From<LevelArg> for LogLevel {
    fn from(level: LevelArg) -> Self {
        match level {
            LevelArg::Severe  => LogLevel::Severe,
            LevelArg::Error   => LogLevel::Error,
            LevelArg::Warning => LogLevel::Warning,
            LevelArg::Info    => LogLevel::Info,
            LevelArg::Verbose => LogLevel::Verbose,
            LevelArg::Debug   => LogLevel::Debug,
        }
    }
}

fn create_logger(cli: &Cli) -> Logger {
    let settings = LoggerSettings::new()
        .with_max_level(cli.level.into())
        .with_always_flush(cli.always_flush)
        .with_log_file(cli.log_file.clone());

    match Logger::with_settings(&settings) {
        Ok(logger) => logger,
        Err(err) => {
            let logger = Logger::with_settings(&settings.with_log_file(None)).unwrap_or_default();
            log_error!(logger, LOG_CAT, "Failed to set up the log file, logging to the console only: {err}");
            logger
        },
    }
}

fn run_demo(logger: &Logger) {
    let mut strings: DynArr<String> = DynArr::new_unallocated();
    for word in ["alpha", "bravo", "charlie", "delta", "echo"] {
        strings.push_with(|| word.to_string());
    }
    log_dynarr_contents(logger, LOG_CAT, "strings", &strings);

    for (idx, string) in strings.iter().enumerate() {
        log_verbose!(logger, LOG_CAT, "strings[{idx}]: {string}");
    }

    strings.insert(2, "between".to_string());
    let removed = strings.remove(0);
    log_info!(logger, LOG_CAT, "Removed '{removed}' from the front");
    if let Err(err) = strings.erase(strings.len()) {
        log_warning!(logger, LOG_CAT, "Erasing past the end is rejected: {err}");
    }
    strings.sort();
    strings.shrink_to_fit();
    log_dynarr_contents(logger, LOG_CAT, "sorted strings", &strings);

    let numbers = dynarr![1u64, 4, 16, 3, 5];
    let total: u64 = numbers.iter().sum();
    log_dynarr_contents(logger, LOG_CAT, "numbers", &numbers);
    log_info!(logger, LOG_CAT, "Sum of numbers: {total}");
}

/// Number of container operations in one round of the mixed workload.
const OPS_PER_ROUND: usize = 12;

fn mixed_dynarr_rounds(ops: usize) {
    let mut arr = dynarr![1, 4, 16, 3, 5];
    for _ in 0..ops {
        arr.reserve_to(50);
        arr.push(47);
        arr.shrink_to_fit();
        arr.resize_default(7);
        arr.push_with(|| 8);
        _ = arr.erase(1);
        arr.clear();
        let mut arr2 = DynArr::new();
        arr2.push(6);
        arr = arr2;
        arr.shrink_to_fit();
        arr.pop();
    }
    black_box(arr);
}

fn mixed_vec_rounds(ops: usize) {
    let mut arr = vec![1, 4, 16, 3, 5];
    for _ in 0..ops {
        arr.reserve(50usize.saturating_sub(arr.len()));
        arr.push(47);
        arr.shrink_to_fit();
        arr.resize(7, 0);
        arr.push(8);
        arr.remove(1);
        arr.clear();
        let mut arr2 = Vec::new();
        arr2.push(6);
        arr = arr2;
        arr.shrink_to_fit();
        arr.pop();
    }
    black_box(arr);
}

fn time_runs(logger: &Logger, name: &str, runs: usize, ops: usize, round: fn(usize)) -> Duration {
    log_info!(logger, BENCH_CAT, "Testing {name}...");
    let progress_step = (runs / 25).max(1);

    let mut elapsed = Duration::ZERO;
    for run in 0..runs {
        if run % progress_step == 0 {
            log_verbose!(logger, BENCH_CAT, "{name}: run {run}/{runs}");
        }

        let start = Instant::now();
        round(ops);
        elapsed += start.elapsed();
    }
    elapsed
}

fn run_bench(logger: &Logger, runs: usize, ops: usize) {
    if runs == 0 || ops == 0 {
        log_warning!(logger, BENCH_CAT, "Nothing to measure with {runs} runs of {ops} operations");
        return;
    }

    let dynarr_time = time_runs(logger, "DynArr", runs, ops, mixed_dynarr_rounds);
    let vec_time = time_runs(logger, "Vec", runs, ops, mixed_vec_rounds);

    log_info!(logger, BENCH_CAT, "Statistics:\n\
        Tests (for each container): {runs}\n\
        Rounds (for each container, {OPS_PER_ROUND} operations each): {ops}\n\
        Total operations performed (on each container): {}\n\
        Vec time: {:.3}secs, DynArr time: {:.3}secs\n\
        Total time elapsed: {:.3}secs",
        runs.saturating_mul(ops).saturating_mul(OPS_PER_ROUND),
        vec_time.as_secs_f64(),
        dynarr_time.as_secs_f64(),
        (vec_time + dynarr_time).as_secs_f64(),
    );
}

fn run_threads(logger: &Logger, threads: usize, iterations: usize) {
    let capacity = threads.saturating_mul(iterations);
    let mut initial = DynArr::new_unallocated();
    if let Err(err) = initial.try_reserve_exact(capacity) {
        log_error!(logger, THREADS_CAT, "Failed to reserve room for {capacity} elements: {err}");
        return;
    }
    let shared = Mutex::new(initial);

    std::thread::scope(|scope| {
        let handles: DynArr<_> = (0..threads).map(|_| {
            let shared = &shared;
            scope.spawn(move || {
                let start = Instant::now();
                for idx in 0..iterations {
                    let mut arr = shared.lock();
                    arr.push(idx);
                    arr.clear();
                }
                start.elapsed()
            })
        }).collect();

        for (idx, handle) in handles.into_iter().enumerate() {
            match handle.join() {
                Ok(elapsed) => log_info!(logger, THREADS_CAT, "Thread {idx}: {}ms", elapsed.as_millis()),
                Err(_) => log_error!(logger, THREADS_CAT, "Thread {idx} panicked"),
            }
        }
    });

    let numbers = shared.into_inner();
    log_dynarr_info(logger, THREADS_CAT, "numbers", &numbers);
    log_info!(logger, THREADS_CAT, "Reserved {:.2} MiB", numbers.capacity_bytes() as f64 / MiB(1) as f64);
}

fn main() {
    let cli = Cli::parse();
    let logger = create_logger(&cli);

    match cli.command {
        Command::Demo => run_demo(&logger),
        Command::Bench { runs, ops } => run_bench(&logger, runs, ops),
        Command::Threads { threads, iterations } => run_threads(&logger, threads, iterations),
    }
}

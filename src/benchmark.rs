// src/benchmark.rs

//! Per-job timing / resource records in the flat TSV layout consumed by
//! downstream summary tooling.
//!
//! The record format and the running-maximum bookkeeping live here. Taking
//! the measurements of a live process is the job of whatever wraps the
//! external tool; it feeds [`ResourceSample`]s in.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::errors::Result;

pub const BENCHMARK_COLUMNS: [&str; 11] = [
    "s",
    "h:m:s",
    "max_rss",
    "max_vms",
    "max_uss",
    "max_pss",
    "io_in",
    "io_out",
    "mean_load",
    "max_gpu_load",
    "max_gpu_mem",
];

/// Resource usage of one job.
///
/// Memory figures are MB, I/O figures are MB, GPU load is percent and GPU
/// memory is MB, one entry per device the job was given.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BenchmarkRecord {
    /// Wall-clock seconds.
    pub running_time: f64,
    pub max_rss: Option<f64>,
    pub max_vms: Option<f64>,
    pub max_uss: Option<f64>,
    pub max_pss: Option<f64>,
    pub rss: Option<f64>,
    pub vms: Option<f64>,
    pub uss: Option<f64>,
    pub pss: Option<f64>,
    pub io_in: Option<f64>,
    pub io_out: Option<f64>,
    /// Divide by `running_time` for the mean load.
    pub cpu_seconds: f64,
    pub max_gpu_load: Option<Vec<f64>>,
    pub max_gpu_mem: Option<Vec<f64>>,
    pub gpu_load: Option<Vec<f64>>,
    pub gpu_mem: Option<Vec<f64>>,
    /// `elapsed` of the previous observation, used to turn CPU percent into
    /// CPU seconds.
    pub last_observed: Option<f64>,
}

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Load and memory of one GPU at sampling time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpuSample {
    /// Percent.
    pub load: f64,
    /// MB.
    pub memory: f64,
}

/// One measurement of a job's process tree, summed over all processes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceSample {
    /// Seconds since the job started.
    pub elapsed: f64,
    /// Summed CPU percent since the previous measurement.
    pub cpu_percent: f64,
    pub rss_bytes: u64,
    pub vms_bytes: u64,
    pub uss_bytes: u64,
    pub pss_bytes: u64,
    /// `None` where the OS does not track I/O.
    pub io: Option<IoCounters>,
    /// One entry per device assigned to the job, in assignment order.
    pub gpus: Vec<GpuSample>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IoCounters {
    pub read_bytes: u64,
    pub write_bytes: u64,
}

fn to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

fn running_max(current: Option<f64>, value: f64) -> Option<f64> {
    Some(current.map_or(value, |c| c.max(value)))
}

pub fn header() -> String {
    BENCHMARK_COLUMNS.join("\t")
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

fn fmt_list(values: Option<&[f64]>) -> String {
    match values {
        None => "-".to_string(),
        Some(vs) => vs
            .iter()
            .map(|v| format!("{v:.2}"))
            .collect::<Vec<_>>()
            .join(","),
    }
}

/// `H:MM:SS`, prefixed with `N day(s), ` past 24 hours. Fractions of a second
/// are dropped.
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let days = total / 86_400;
    let rem = total % 86_400;
    let (hh, rem) = (rem / 3600, rem % 3600);
    let (mm, ss) = (rem / 60, rem % 60);

    let clock = format!("{hh}:{mm:02}:{ss:02}");
    match days {
        0 => clock,
        1 => format!("1 day, {clock}"),
        n => format!("{n} days, {clock}"),
    }
}

impl BenchmarkRecord {
    /// An empty record for a job given `gpu_count` devices. GPU slots start
    /// at `-1` until the first observation.
    pub fn with_gpus(gpu_count: usize) -> Self {
        let slots = (gpu_count > 0).then(|| vec![-1.0; gpu_count]);
        Self {
            max_gpu_load: slots.clone(),
            max_gpu_mem: slots.clone(),
            gpu_load: slots.clone(),
            gpu_mem: slots,
            ..Self::default()
        }
    }

    /// Fold one measurement into the record.
    ///
    /// Memory maxima and current values are updated in MB, I/O is replaced
    /// by the latest totals, CPU seconds accumulate over the time since the
    /// previous observation and GPU slots track per-device maxima.
    pub fn observe(&mut self, sample: &ResourceSample) {
        self.running_time = sample.elapsed;
        if let Some(prev) = self.last_observed {
            let dt = (sample.elapsed - prev).max(0.0);
            self.cpu_seconds += sample.cpu_percent / 100.0 * dt;
        }
        self.last_observed = Some(sample.elapsed);

        let (rss, vms, uss, pss) = (
            to_mb(sample.rss_bytes),
            to_mb(sample.vms_bytes),
            to_mb(sample.uss_bytes),
            to_mb(sample.pss_bytes),
        );
        self.max_rss = running_max(self.max_rss, rss);
        self.max_vms = running_max(self.max_vms, vms);
        self.max_uss = running_max(self.max_uss, uss);
        self.max_pss = running_max(self.max_pss, pss);
        self.rss = Some(rss);
        self.vms = Some(vms);
        self.uss = Some(uss);
        self.pss = Some(pss);

        self.io_in = sample.io.map(|io| to_mb(io.read_bytes));
        self.io_out = sample.io.map(|io| to_mb(io.write_bytes));

        if sample.gpus.is_empty() {
            return;
        }
        let n = sample.gpus.len();
        let slots = |list: &mut Option<Vec<f64>>| {
            let v = list.get_or_insert_with(Vec::new);
            if v.len() < n {
                v.resize(n, -1.0);
            }
        };
        slots(&mut self.max_gpu_load);
        slots(&mut self.max_gpu_mem);
        slots(&mut self.gpu_load);
        slots(&mut self.gpu_mem);

        for (i, gpu) in sample.gpus.iter().enumerate() {
            if let Some(v) = self.max_gpu_load.as_mut() {
                v[i] = v[i].max(gpu.load);
            }
            if let Some(v) = self.max_gpu_mem.as_mut() {
                v[i] = v[i].max(gpu.memory);
            }
            if let Some(v) = self.gpu_load.as_mut() {
                v[i] = gpu.load;
            }
            if let Some(v) = self.gpu_mem.as_mut() {
                v[i] = gpu.memory;
            }
        }
    }

    /// Mean CPU load in percent, `-` when no time has elapsed.
    pub fn mean_load(&self) -> Option<f64> {
        (self.running_time > 0.0).then(|| 100.0 * self.cpu_seconds / self.running_time)
    }

    /// Render as one TSV row. `realtime` switches from the per-job maxima to
    /// the most recent samples.
    pub fn to_tsv(&self, realtime: bool) -> String {
        let (rss, vms, uss, pss, gpu_load, gpu_mem) = if realtime {
            (
                self.rss,
                self.vms,
                self.uss,
                self.pss,
                self.gpu_load.as_deref(),
                self.gpu_mem.as_deref(),
            )
        } else {
            (
                self.max_rss,
                self.max_vms,
                self.max_uss,
                self.max_pss,
                self.max_gpu_load.as_deref(),
                self.max_gpu_mem.as_deref(),
            )
        };

        [
            format!("{:.4}", self.running_time),
            format_duration(self.running_time),
            fmt_opt(rss),
            fmt_opt(vms),
            fmt_opt(uss),
            fmt_opt(pss),
            fmt_opt(self.io_in),
            fmt_opt(self.io_out),
            fmt_opt(self.mean_load()),
            fmt_list(gpu_load),
            fmt_list(gpu_mem),
        ]
        .join("\t")
    }
}

pub fn print_benchmark_records<W: Write>(
    records: &[BenchmarkRecord],
    out: &mut W,
    with_header: bool,
    realtime: bool,
) -> std::io::Result<()> {
    if with_header {
        writeln!(out, "{}", header())?;
    }
    for record in records {
        writeln!(out, "{}", record.to_tsv(realtime))?;
    }
    Ok(())
}

/// Write (or append) records to `path`.
pub fn write_benchmark_records(
    records: &[BenchmarkRecord],
    path: &Path,
    with_header: bool,
    append: bool,
    realtime: bool,
) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)?;
    let mut out = BufWriter::new(file);
    print_benchmark_records(records, &mut out, with_header, realtime)?;
    out.flush()?;
    Ok(())
}

/// Real-time benchmark file: a header on creation, then one row of current
/// values per observation.
#[derive(Debug, Clone)]
pub struct RealtimeLog {
    path: PathBuf,
}

impl RealtimeLog {
    /// Create (or truncate) the file and write the header.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        write_benchmark_records(&[], &path, true, false, true)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &BenchmarkRecord) -> Result<()> {
        write_benchmark_records(std::slice::from_ref(record), &self.path, false, true, true)
    }
}

/// Drives a [`BenchmarkRecord`] from a stream of samples, mirroring each
/// update into an optional [`RealtimeLog`].
#[derive(Debug)]
pub struct BenchmarkTracker {
    record: BenchmarkRecord,
    realtime: Option<RealtimeLog>,
}

impl BenchmarkTracker {
    pub fn new(gpu_count: usize) -> Self {
        Self {
            record: BenchmarkRecord::with_gpus(gpu_count),
            realtime: None,
        }
    }

    pub fn with_realtime_log(mut self, log: RealtimeLog) -> Self {
        self.realtime = Some(log);
        self
    }

    pub fn observe(&mut self, sample: &ResourceSample) -> Result<()> {
        self.record.observe(sample);
        if let Some(ref log) = self.realtime {
            log.append(&self.record)?;
        }
        Ok(())
    }

    pub fn record(&self) -> &BenchmarkRecord {
        &self.record
    }

    /// Final record with the measured wall-clock time.
    pub fn finish(mut self, running_time: f64) -> BenchmarkRecord {
        self.record.running_time = running_time;
        self.record
    }
}

//! Polling loop: one read per interval, one output line per read.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use postscale_config::OutputMode;
use postscale_core::{Measurement, ScaleError, Scaler};
use postscale_traits::Clock;
use serde_json::json;

use crate::error_fmt::reason_name;

/// Result of one read, stopped at the requested stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Raw(Vec<u8>),
    Parsed(Measurement),
    Grams(u16),
}

impl std::fmt::Display for Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Payload::Raw(bytes) => write!(f, "{bytes:?}"),
            Payload::Parsed(m) => write!(f, "{m:?}"),
            Payload::Grams(g) => write!(f, "{g}"),
        }
    }
}

impl Payload {
    fn to_json(&self) -> serde_json::Value {
        match self {
            Payload::Raw(bytes) => json!(bytes),
            Payload::Parsed(m) => json!({
                "always_three": m.always_three,
                "stability": m.stability.raw(),
                "mode": m.mode.raw(),
                "scale_factor": m.scale_factor,
                "weight_minor": m.weight_minor,
                "weight_major": m.weight_major,
            }),
            Payload::Grams(g) => json!(g),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PollParams {
    pub mode: OutputMode,
    pub interval: Duration,
    /// Stop after this many reads; `None` polls until shutdown.
    pub count: Option<u64>,
    pub json: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PollStats {
    pub reads: u64,
    pub errors: u64,
}

/// Perform exactly one read in `mode`.
pub fn read_once<S: Scaler>(scale: &mut S, mode: OutputMode) -> Result<Payload, ScaleError> {
    match mode {
        OutputMode::Raw => scale.read_raw().map(Payload::Raw),
        OutputMode::Parsed => scale.read_measurement().map(Payload::Parsed),
        OutputMode::Grams => scale.read_grams().map(Payload::Grams),
    }
}

/// Render a read outcome as one output line.
pub fn render(mode: OutputMode, outcome: &Result<Payload, ScaleError>, as_json: bool) -> String {
    match (outcome, as_json) {
        (Ok(p), false) => format!("Result: {p}"),
        (Err(e), false) => format!("Error: {e}"),
        (Ok(p), true) => json!({ "mode": mode.as_str(), "result": p.to_json() }).to_string(),
        (Err(e), true) => json!({
            "mode": mode.as_str(),
            "error": e.to_string(),
            "reason": reason_name(e),
        })
        .to_string(),
    }
}

/// Poll `scale` until `count` reads are done or `shutdown` is raised.
///
/// A failed read is printed and polling continues; only output failures
/// end the loop early.
pub fn run<S: Scaler, C: Clock, W: Write>(
    scale: &mut S,
    clock: &C,
    params: PollParams,
    shutdown: &AtomicBool,
    out: &mut W,
) -> std::io::Result<PollStats> {
    let mut stats = PollStats::default();
    tracing::info!(
        mode = %params.mode,
        interval_ms = params.interval.as_millis() as u64,
        count = ?params.count,
        "polling start"
    );
    loop {
        if shutdown.load(Ordering::Relaxed) {
            tracing::info!(reads = stats.reads, "polling interrupted");
            break;
        }
        if done(params.count, stats.reads) {
            break;
        }

        let started = clock.now();
        let outcome = read_once(scale, params.mode);
        stats.reads += 1;
        if let Err(e) = &outcome {
            stats.errors += 1;
            tracing::debug!(error = %e, reason = reason_name(e), "read failed");
        }
        writeln!(out, "{}", render(params.mode, &outcome, params.json))?;
        out.flush()?;

        // no sleep after the final read
        if done(params.count, stats.reads) {
            break;
        }
        clock.pace(started, params.interval);
    }
    tracing::info!(reads = stats.reads, errors = stats.errors, "polling done");
    Ok(stats)
}

fn done(count: Option<u64>, reads: u64) -> bool {
    count.is_some_and(|n| reads >= n)
}

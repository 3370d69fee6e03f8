// Axis layout - Tick placement and value ranges, independent of the drawing backend
use chrono::{DateTime, Utc};

/// Approximate pixel width reserved per `HH:MM` tick label, spacing included.
const TICK_LABEL_SLOT_PX: u32 = 48;

/// Horizontal space taken by the value axis labels and margins.
const Y_AXIS_RESERVED_PX: u32 = 80;

/// Headroom added above (and below, when negative) the data.
const VALUE_PADDING: f64 = 0.05;

/// Format a unix timestamp (seconds) as an `HH:MM` tick label.
pub fn format_tick(ts: i64) -> String {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_default()
}

/// Number of time labels that fit next to each other on a canvas this wide.
pub fn label_capacity(canvas_width: u32) -> usize {
    let usable = canvas_width.saturating_sub(Y_AXIS_RESERVED_PX);
    (usable / TICK_LABEL_SLOT_PX).max(2) as usize
}

/// Time range in unix seconds covering `start..=end`; a single instant is
/// widened by a minute either side so the axis never collapses.
pub fn time_axis_range(start: DateTime<Utc>, end: DateTime<Utc>) -> (i64, i64) {
    let (lo, hi) = (start.timestamp(), end.timestamp());
    if hi > lo { (lo, hi) } else { (lo - 60, lo + 60) }
}

/// Tick positions at wall-clock multiples of `interval_secs` inside
/// `start..=end`. When they would not fit in `max_labels`, every n-th tick is
/// kept so the labels never overlap.
pub fn time_ticks(start: i64, end: i64, interval_secs: i64, max_labels: usize) -> Vec<i64> {
    if interval_secs <= 0 || end < start {
        return Vec::new();
    }

    let mut first = start.div_euclid(interval_secs) * interval_secs;
    if first < start {
        first += interval_secs;
    }
    if first > end {
        return Vec::new();
    }

    let count = ((end - first) / interval_secs + 1) as usize;
    let stride = count.div_ceil(max_labels.max(1)).max(1);

    (0..count)
        .step_by(stride)
        .map(|k| first + k as i64 * interval_secs)
        .collect()
}

/// Value range for the y axis: always includes zero, padded on top, never empty.
pub fn value_axis_range(min: f64, max: f64) -> (f64, f64) {
    let lo = min.min(0.0);
    let mut hi = max.max(lo);
    if hi - lo < f64::EPSILON {
        hi = lo + 1.0;
    }
    let pad = (hi - lo) * VALUE_PADDING;
    let lo = if lo < 0.0 { lo - pad } else { lo };
    (lo, hi + pad)
}

/// Round step (1, 2 or 5 times a power of ten) giving roughly `target` ticks.
pub fn nice_step(span: f64, target: usize) -> f64 {
    let raw = span / target.max(1) as f64;
    if !raw.is_finite() || raw <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    let fraction = raw / magnitude;
    let nice = if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Decimal places needed to tell labels `step` apart. Whole-number steps
/// print without a fraction.
pub fn label_precision(step: f64) -> usize {
    if !step.is_finite() || step <= 0.0 || step >= 1.0 {
        return 0;
    }
    (-step.log10() - 1e-9).ceil() as usize
}

/// Format a value label with `precision` decimals, never as `-0`.
pub fn format_value(value: f64, precision: usize) -> String {
    let label = format!("{:.*}", precision, value);
    match label.strip_prefix('-') {
        Some(rest) if rest.chars().all(|c| c == '0' || c == '.') => rest.to_string(),
        _ => label,
    }
}

/// Y tick positions at multiples of a nice step inside `lo..=hi`.
pub fn value_ticks(lo: f64, hi: f64, target: usize) -> Vec<f64> {
    let step = nice_step(hi - lo, target);
    let mut ticks = Vec::new();
    let mut v = (lo / step).ceil() * step;
    while v <= hi + step * 1e-9 && ticks.len() <= target * 3 {
        // Avoid printing "-0".
        ticks.push(if v.abs() < step * 1e-9 { 0.0 } else { v });
        v += step;
    }
    ticks
}

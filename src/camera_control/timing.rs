use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::info;

/// Per-step durations accumulated over the lifetime of the loop.
#[derive(Debug, Default)]
pub struct LoopTimings {
    order: Vec<String>,
    step_map: HashMap<String, Duration>,
}

impl LoopTimings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_step(&mut self, name: impl Into<String>, duration: Duration) {
        let name = name.into();
        if !self.step_map.contains_key(&name) {
            self.order.push(name.clone());
        }
        *self.step_map.entry(name).or_insert(Duration::ZERO) += duration;
    }

    pub fn record(&mut self, timer: Timer) {
        let (name, duration) = timer.stop();
        self.add_step(name, duration);
    }

    pub fn total_duration(&self) -> Duration {
        self.step_map.values().sum()
    }

    pub fn get_step(&self, name: &str) -> Option<Duration> {
        self.step_map.get(name).copied()
    }

    pub fn steps(&self) -> impl Iterator<Item = (&str, Duration)> {
        self.order
            .iter()
            .map(|name| (name.as_str(), self.step_map[name]))
    }
}

/// Counters and timings for one run of the control loop.
#[derive(Debug, Default)]
pub struct LoopStats {
    pub frames_processed: u64,
    pub frames_skipped: u64,
    pub capture_errors: u64,
    pub writes_applied: u64,
    pub writes_failed: u64,
    pub timings: LoopTimings,
}

impl LoopStats {
    pub fn log_summary(&self) {
        info!(
            frames = self.frames_processed,
            skipped = self.frames_skipped,
            capture_errors = self.capture_errors,
            writes = self.writes_applied,
            failed_writes = self.writes_failed,
            "Control loop finished"
        );

        let total = self.timings.total_duration();
        let frames = self.frames_processed.max(1) as f64;
        for (name, duration) in self.timings.steps() {
            let percentage = if total.as_secs_f64() > 0.0 {
                (duration.as_secs_f64() / total.as_secs_f64()) * 100.0
            } else {
                0.0
            };
            info!(
                "{:<10} {:>10.3}ms/frame ({:>5.1}%)",
                name,
                duration.as_secs_f64() * 1000.0 / frames,
                percentage
            );
        }
    }
}

pub struct Timer {
    start: Instant,
    name: &'static str,
}

impl Timer {
    pub fn start(name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            name,
        }
    }

    pub fn stop(self) -> (&'static str, Duration) {
        (self.name, self.start.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_accumulate_in_first_seen_order() {
        let mut timings = LoopTimings::new();
        timings.add_step("estimate", Duration::from_millis(3));
        timings.add_step("write", Duration::from_millis(1));
        timings.add_step("estimate", Duration::from_millis(2));

        let steps: Vec<_> = timings.steps().collect();
        assert_eq!(
            steps,
            vec![("estimate", Duration::from_millis(5)), ("write", Duration::from_millis(1))]
        );
        assert_eq!(timings.total_duration(), Duration::from_millis(6));
        assert_eq!(timings.get_step("poll"), None);
    }
}

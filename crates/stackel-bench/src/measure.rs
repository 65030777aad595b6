//! Stage timing and RSS instrumentation for benchmark runs.

use std::time::{Duration, Instant};

use sysinfo::System;

/// Timing and memory numbers for one named stage.
#[derive(Debug, Clone)]
pub struct StageMeasurement {
    pub stage: String,
    pub duration: Duration,
    pub rss_before_bytes: Option<u64>,
    pub rss_after_bytes: Option<u64>,
    pub rss_delta_bytes: Option<i64>,
}

/// Resident set size of the current process, when the platform reports one.
pub fn capture_rss_bytes() -> Option<u64> {
    let pid = sysinfo::Pid::from(std::process::id() as usize);
    let mut sys = System::new();
    sys.refresh_processes_specifics(
        sysinfo::ProcessesToUpdate::Some(&[pid]),
        true,
        sysinfo::ProcessRefreshKind::nothing().with_memory(),
    );
    sys.process(pid).map(|process| process.memory())
}

pub fn rss_delta(before: Option<u64>, after: Option<u64>) -> Option<i64> {
    match (before, after) {
        (Some(before), Some(after)) => Some(after as i64 - before as i64),
        _ => None,
    }
}

/// Collects stage measurements in execution order.
#[derive(Debug, Default)]
pub struct MeasurementRecorder {
    stages: Vec<StageMeasurement>,
}

pub struct StageStart {
    name: String,
    started: Instant,
    rss_before: Option<u64>,
}

impl MeasurementRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_stage(&mut self, name: &str) -> StageStart {
        StageStart {
            name: name.to_string(),
            started: Instant::now(),
            rss_before: capture_rss_bytes(),
        }
    }

    pub fn end_stage(&mut self, start: StageStart) {
        let rss_after = capture_rss_bytes();
        self.stages.push(StageMeasurement {
            stage: start.name,
            duration: start.started.elapsed(),
            rss_before_bytes: start.rss_before,
            rss_after_bytes: rss_after,
            rss_delta_bytes: rss_delta(start.rss_before, rss_after),
        });
    }

    pub fn stages(&self) -> &[StageMeasurement] {
        &self.stages
    }
}

#[cfg(test)]
mod tests {
    use super::{MeasurementRecorder, rss_delta};

    #[test]
    fn recorder_keeps_stage_order() {
        let mut recorder = MeasurementRecorder::new();
        let first = recorder.begin_stage("build");
        recorder.end_stage(first);
        let second = recorder.begin_stage("solve");
        recorder.end_stage(second);

        let stages = recorder.stages();
        assert_eq!(stages.len(), 2);
        assert_eq!(stages[0].stage, "build");
        assert_eq!(stages[1].stage, "solve");
    }

    #[test]
    fn rss_delta_needs_both_samples() {
        assert_eq!(rss_delta(Some(1_000), Some(1_500)), Some(500));
        assert_eq!(rss_delta(Some(1_500), Some(1_000)), Some(-500));
        assert_eq!(rss_delta(None, Some(1_000)), None);
        assert_eq!(rss_delta(Some(1_000), None), None);
    }
}

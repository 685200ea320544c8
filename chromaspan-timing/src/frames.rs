use std::collections::VecDeque;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameTimeStats {
    pub average_ms: f64,
    pub jitter_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub effective_fps: f64,
}

/// Rolling window of frame durations.
#[derive(Debug, Clone)]
pub struct FrameTimes {
    samples: VecDeque<Duration>,
    max_samples: usize,
}

impl FrameTimes {
    pub fn new(max_samples: usize) -> Self {
        let max_samples = max_samples.max(1);
        Self {
            samples: VecDeque::with_capacity(max_samples),
            max_samples,
        }
    }

    pub fn record(&mut self, d: Duration) {
        if self.samples.len() >= self.max_samples {
            self.samples.pop_front();
        }
        self.samples.push_back(d);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn stats(&self) -> FrameTimeStats {
        if self.samples.is_empty() {
            return FrameTimeStats::default();
        }
        let times: Vec<f64> = self
            .samples
            .iter()
            .map(|d| d.as_secs_f64() * 1e3)
            .collect();
        let n = times.len() as f64;
        let avg = times.iter().sum::<f64>() / n;
        let var = times.iter().map(|x| (x - avg).powi(2)).sum::<f64>() / n;
        let min = times.iter().copied().fold(f64::INFINITY, f64::min);
        let max = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        FrameTimeStats {
            average_ms: avg,
            jitter_ms: var.sqrt(),
            min_ms: min,
            max_ms: max,
            effective_fps: if avg > 0.0 { 1e3 / avg } else { 0.0 },
        }
    }
}

impl Default for FrameTimes {
    fn default() -> Self {
        Self::new(240)
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Frame sampler: polls the live frame source on a timer and runs detection
// on every sampled frame.
//
// Scheduling is explicit: `tick()` performs exactly one sampling step and
// reports how long to wait before the next one. Hosts with their own timer
// call `tick()` directly; async hosts use `run()`, which sleeps between ticks
// on the Tokio timer. Either way the next tick only starts after the previous
// result was delivered, so at most one detection is ever in flight and results
// arrive in sampling order.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use receiptlens_bridge::traits::FrameSource;
use receiptlens_core::config::ScannerConfig;
use receiptlens_core::{DetectionResult, ResourceProfile};
use tracing::{debug, info, instrument, warn};

use crate::detector::DocumentDetector;

/// Callback receiving one detection outcome per processed tick.
pub type ResultCallback = Box<dyn FnMut(Option<DetectionResult>) + Send>;

/// What a single `tick()` did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// The sampler is not running; nothing happened and nothing should be
    /// rescheduled.
    Stopped,
    /// Throttled by the resource profile; no frame was read.
    Skipped { next_in: Duration },
    /// The source had no usable frame; "none" was delivered.
    NoFrame { next_in: Duration },
    /// A frame was analyzed and its result delivered.
    Delivered { detected: bool, next_in: Duration },
}

impl TickOutcome {
    /// Delay before the next tick, or `None` when the loop should end.
    pub fn next_delay(&self) -> Option<Duration> {
        match self {
            Self::Stopped => None,
            Self::Skipped { next_in }
            | Self::NoFrame { next_in }
            | Self::Delivered { next_in, .. } => Some(*next_in),
        }
    }
}

/// Cloneable stop switch for a sampler that is owned elsewhere (for example,
/// moved into a spawned task).
#[derive(Debug, Clone)]
pub struct SamplerHandle {
    running: Arc<AtomicBool>,
}

impl SamplerHandle {
    /// Stop sampling. A tick already in progress still delivers its result.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Timer-driven detection loop over an exclusively owned frame source.
pub struct FrameSampler<S: FrameSource> {
    source: S,
    detector: DocumentDetector,
    profile: ResourceProfile,
    /// Monotonic count of ticks taken while running.
    frame_counter: u64,
    running: Arc<AtomicBool>,
    on_result: Option<ResultCallback>,
}

impl<S: FrameSource> FrameSampler<S> {
    /// Create a stopped sampler. Call [`start_detection`](Self::start_detection)
    /// to begin.
    ///
    /// `config` is taken as given; run [`ScannerConfig::validate`] on settings
    /// that did not come through `ScannerConfig::from_json_str`.
    pub fn new(source: S, config: &ScannerConfig) -> Self {
        Self {
            source,
            detector: DocumentDetector::new(config.detector, &config.profile),
            profile: config.profile,
            frame_counter: 0,
            running: Arc::new(AtomicBool::new(false)),
            on_result: None,
        }
    }

    /// Register the result callback and mark the sampler running.
    ///
    /// Restarting a running sampler only replaces the callback.
    pub fn start_detection<F>(&mut self, on_result: F)
    where
        F: FnMut(Option<DetectionResult>) + Send + 'static,
    {
        self.on_result = Some(Box::new(on_result));
        if self.running.swap(true, Ordering::SeqCst) {
            debug!("Frame sampler already running; callback replaced");
            return;
        }
        info!(
            interval_ms = self.profile.tick_interval_ms,
            max_frame_skip = self.profile.max_frame_skip,
            downscale = self.profile.downscale_factor,
            "Frame sampler started"
        );
    }

    /// Stop sampling. Pending ticks become no-ops.
    pub fn stop_detection(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            info!(frames = self.frame_counter, "Frame sampler stopped");
        }
    }

    /// Alias for [`stop_detection`](Self::stop_detection), for hosts that
    /// drive the scheduler themselves.
    pub fn cancel(&self) {
        self.stop_detection();
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn handle(&self) -> SamplerHandle {
        SamplerHandle {
            running: Arc::clone(&self.running),
        }
    }

    /// Number of ticks taken while running.
    pub fn frame_count(&self) -> u64 {
        self.frame_counter
    }

    pub fn profile(&self) -> &ResourceProfile {
        &self.profile
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Release the frame source, e.g. to hand it to still capture.
    pub fn into_source(self) -> S {
        self.source
    }

    fn interval(&self) -> Duration {
        Duration::from_millis(self.profile.tick_interval_ms)
    }

    /// Whether tick number `counter` is throttled away by the profile.
    fn should_skip(&self, counter: u64) -> bool {
        let skip = u64::from(self.profile.max_frame_skip);
        skip > 0 && counter % (skip + 1) != 0
    }

    fn deliver(&mut self, result: Option<DetectionResult>) {
        if let Some(callback) = self.on_result.as_mut() {
            callback(result);
        }
    }

    /// Run one sampling step.
    #[instrument(skip(self), fields(frame = self.frame_counter + 1))]
    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_running() {
            return TickOutcome::Stopped;
        }

        self.frame_counter += 1;
        let next_in = self.interval();

        if self.should_skip(self.frame_counter) {
            return TickOutcome::Skipped { next_in };
        }

        let (w, h) = self.source.dimensions();
        if w == 0 || h == 0 {
            debug!("Frame source has no picture yet");
            self.deliver(None);
            return TickOutcome::NoFrame { next_in };
        }

        let frame = match self.source.snapshot() {
            Ok(frame) => frame,
            Err(err) => {
                warn!(error = %err, "Frame snapshot failed");
                self.deliver(None);
                return TickOutcome::NoFrame { next_in };
            }
        };

        let result = self.detector.detect(&frame);
        let detected = result.is_some();
        self.deliver(result);
        TickOutcome::Delivered { detected, next_in }
    }

    /// Drive `tick()` on the Tokio timer until stopped.
    pub async fn run(&mut self) {
        while let Some(delay) = self.tick().next_delay() {
            tokio::time::sleep(delay).await;
        }
        debug!(frames = self.frame_counter, "Frame sampler loop exited");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{gray_frame, receipt_frame};
    use receiptlens_bridge::memory::StaticFrameSource;
    use std::sync::Mutex;

    type Collected = Arc<Mutex<Vec<Option<DetectionResult>>>>;

    fn collecting(sampler: &mut FrameSampler<StaticFrameSource>) -> Collected {
        let results: Collected = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&results);
        sampler.start_detection(move |r| sink.lock().expect("lock").push(r));
        results
    }

    #[test]
    fn tick_before_start_does_nothing() {
        let mut sampler =
            FrameSampler::new(StaticFrameSource::new(receipt_frame()), &ScannerConfig::default());
        assert_eq!(sampler.tick(), TickOutcome::Stopped);
        assert_eq!(sampler.frame_count(), 0);
        assert_eq!(sampler.source().snapshot_count(), 0);
    }

    #[test]
    fn standard_profile_processes_every_tick() {
        let mut sampler =
            FrameSampler::new(StaticFrameSource::new(receipt_frame()), &ScannerConfig::default());
        let results = collecting(&mut sampler);

        for _ in 0..4 {
            let outcome = sampler.tick();
            assert_eq!(
                outcome,
                TickOutcome::Delivered {
                    detected: true,
                    next_in: Duration::from_millis(100)
                }
            );
        }
        assert_eq!(results.lock().expect("lock").len(), 4);
        assert_eq!(sampler.source().snapshot_count(), 4);
    }

    #[test]
    fn constrained_profile_skips_two_of_three_ticks() {
        let config = ScannerConfig::for_device(true);
        let mut sampler = FrameSampler::new(StaticFrameSource::new(receipt_frame()), &config);
        let results = collecting(&mut sampler);

        let outcomes: Vec<_> = (0..6).map(|_| sampler.tick()).collect();
        let processed: Vec<bool> = outcomes
            .iter()
            .map(|o| matches!(o, TickOutcome::Delivered { .. }))
            .collect();
        assert_eq!(processed, [false, false, true, false, false, true]);
        assert!(outcomes
            .iter()
            .all(|o| o.next_delay() == Some(Duration::from_millis(150))));
        assert_eq!(results.lock().expect("lock").len(), 2);
        assert_eq!(sampler.source().snapshot_count(), 2);
    }

    #[test]
    fn empty_source_delivers_none_without_snapshot() {
        let mut sampler = FrameSampler::new(StaticFrameSource::empty(), &ScannerConfig::default());
        let results = collecting(&mut sampler);

        assert!(matches!(sampler.tick(), TickOutcome::NoFrame { .. }));
        assert_eq!(*results.lock().expect("lock"), vec![None]);
        assert_eq!(sampler.source().snapshot_count(), 0);
    }

    #[test]
    fn results_arrive_in_sampling_order() {
        let mut sampler = FrameSampler::new(StaticFrameSource::empty(), &ScannerConfig::default());
        let results = collecting(&mut sampler);

        sampler.tick();
        sampler.source_mut().set_frame(receipt_frame());
        sampler.tick();
        sampler.source_mut().set_frame(gray_frame(320, 240));
        sampler.tick();

        let seen: Vec<bool> = results
            .lock()
            .expect("lock")
            .iter()
            .map(Option::is_some)
            .collect();
        assert_eq!(seen, [false, true, false]);
    }

    #[test]
    fn ticks_after_stop_are_no_ops() {
        let mut sampler =
            FrameSampler::new(StaticFrameSource::new(receipt_frame()), &ScannerConfig::default());
        let results = collecting(&mut sampler);
        sampler.tick();

        sampler.handle().stop();
        assert!(!sampler.is_running());
        assert_eq!(sampler.tick(), TickOutcome::Stopped);
        assert_eq!(sampler.tick(), TickOutcome::Stopped);
        assert_eq!(results.lock().expect("lock").len(), 1);
        assert_eq!(sampler.frame_count(), 1);
    }

    #[test]
    fn restart_replaces_callback_only() {
        let mut sampler =
            FrameSampler::new(StaticFrameSource::new(receipt_frame()), &ScannerConfig::default());
        let first = collecting(&mut sampler);
        sampler.tick();
        let second = collecting(&mut sampler);
        sampler.tick();

        assert_eq!(first.lock().expect("lock").len(), 1);
        assert_eq!(second.lock().expect("lock").len(), 1);
        assert_eq!(sampler.frame_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn run_loop_sleeps_between_ticks_until_stopped() {
        let mut sampler =
            FrameSampler::new(StaticFrameSource::new(receipt_frame()), &ScannerConfig::default());
        let handle = sampler.handle();
        let results: Collected = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&results);
        sampler.start_detection(move |r| {
            let mut seen = sink.lock().expect("lock");
            seen.push(r);
            if seen.len() == 3 {
                handle.stop();
            }
        });

        let started = tokio::time::Instant::now();
        sampler.run().await;

        assert_eq!(results.lock().expect("lock").len(), 3);
        assert_eq!(started.elapsed(), Duration::from_millis(300));
    }
}

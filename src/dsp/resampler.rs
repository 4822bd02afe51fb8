use super::clock::{SampleClock, RATIO_LIMIT};
use super::emqf::AllpassFilterBank;
use super::interpolate::Interpolation;
use crate::types::{ResampleError, ResamplerConfig, Sample, Status};
use dasp::ring_buffer::Fixed;
use std::collections::VecDeque;

/// Streaming arbitrary-ratio resampler
///
/// Downsampling plans run the input through an EMQF anti-aliasing lowpass
/// first; every plan then evaluates a polynomial kernel at the fractional
/// input positions of its outputs. Blocks may have any length on either side.
/// Use [`next_output_len`](Self::next_output_len) when the input length is
/// fixed and [`next_input_len`](Self::next_input_len) when the output length
/// is fixed.
pub struct ResamplePlan<S: Sample = f64> {
    interpolation: Interpolation,
    /// Consumed/produced counters and position arithmetic
    clock: SampleClock,
    /// Last K (filtered) inputs before the next block
    history: Fixed<Vec<S>>,
    /// Outputs computed by an earlier call that did not fit
    holdover: VecDeque<S>,
    holdover_capacity: usize,
    /// Anti-aliasing filter, present only when downsampling
    bank: Option<AllpassFilterBank<S>>,
    /// Kernel input scratch
    window: Vec<S>,
}

impl<S: Sample> ResamplePlan<S> {
    /// Create a plan for `ratio = target rate / source rate`
    pub fn new(interpolation: Interpolation, ratio: f64) -> Result<Self, ResampleError> {
        Self::with_config(ratio, &ResamplerConfig::with_interpolation(interpolation))
    }

    /// Create a plan with an explicit configuration
    ///
    /// `ratio` must lie in `[1 / RATIO_LIMIT, RATIO_LIMIT]`.
    pub fn with_config(ratio: f64, config: &ResamplerConfig) -> Result<Self, ResampleError> {
        if !(ratio >= 1.0 / RATIO_LIMIT && ratio <= RATIO_LIMIT) {
            return Err(ResampleError::InvalidRatio(ratio));
        }
        Self::build(SampleClock::new(ratio), config)
    }

    /// Create a plan converting between two integer sample rates
    ///
    /// The ratio is tracked as an exact fraction.
    pub fn from_rates(
        source_rate: u32,
        target_rate: u32,
        interpolation: Interpolation,
    ) -> Result<Self, ResampleError> {
        Self::from_rates_with_config(
            source_rate,
            target_rate,
            &ResamplerConfig::with_interpolation(interpolation),
        )
    }

    /// Create a plan between two integer sample rates with an explicit configuration
    pub fn from_rates_with_config(
        source_rate: u32,
        target_rate: u32,
        config: &ResamplerConfig,
    ) -> Result<Self, ResampleError> {
        if source_rate == 0 || target_rate == 0 {
            return Err(ResampleError::InvalidSampleRates {
                from: source_rate,
                to: target_rate,
            });
        }
        let clock = SampleClock::from_rates(source_rate as u64, target_rate as u64);
        Self::build(clock, config)
    }

    fn build(clock: SampleClock, config: &ResamplerConfig) -> Result<Self, ResampleError> {
        config.validate()?;

        let ratio = clock.ratio();
        let support = config.interpolation.support();

        let bank = if ratio < config.downsampling_threshold {
            let fc = config.passband_fraction * ratio;
            Some(AllpassFilterBank::with_prototype(fc, config.prototype)?)
        } else {
            None
        };

        let holdover_capacity = config
            .holdover_capacity
            .unwrap_or_else(|| (ratio.ceil() as usize).saturating_add(support));

        log::debug!(
            "Resample plan: ratio {} ({}), {} interpolation, anti-aliasing {}",
            ratio,
            match clock.fraction() {
                Some((num, den)) => format!("{}/{}", num, den),
                None => "inexact".to_string(),
            },
            config.interpolation,
            match &bank {
                Some(bank) => format!("fc = {:.4}, order {}", bank.passband_edge(), bank.order()),
                None => "off".to_string(),
            }
        );

        Ok(Self {
            interpolation: config.interpolation,
            clock,
            history: Fixed::from(vec![S::zero(); support]),
            holdover: VecDeque::with_capacity(holdover_capacity.min(4096)),
            holdover_capacity,
            bank,
            window: vec![S::zero(); support],
        })
    }

    /// Resample one block
    ///
    /// `input` is overwritten with its lowpass filtered version when the plan
    /// downsamples. On [`Status::Overflow`] the output is filled and the
    /// surplus discarded; on [`Status::Underflow`] the unfilled tail of
    /// `output` is zeroed. Both reset the plan.
    pub fn execute(&mut self, input: &mut [S], output: &mut [S]) -> Status {
        if let Some(bank) = self.bank.as_mut() {
            bank.filter_in_place(input);
        }

        // Samples left over from the previous call go out first
        let held = self.holdover.len().min(output.len());
        for (slot, sample) in output.iter_mut().zip(self.holdover.drain(..held)) {
            *slot = sample;
        }

        let producible = self.clock.outputs_for(input.len() as u64);
        let room = (output.len() - held) as u64;
        let direct = producible.min(room);
        let first = self.clock.produced();

        for (j, slot) in output[held..held + direct as usize].iter_mut().enumerate() {
            *slot = self.compute(first + j as u64, input);
        }

        let surplus = producible - direct;
        if surplus > 0 {
            if self.holdover.len() as u64 + surplus > self.holdover_capacity as u64 {
                log::warn!(
                    "Resampler overflow: {} samples beyond output and holdover, resetting stream",
                    self.holdover.len() as u64 + surplus - self.holdover_capacity as u64
                );
                self.reset();
                return Status::Overflow;
            }
            for m in first + direct..first + producible {
                let y = self.compute(m, input);
                self.holdover.push_back(y);
            }
        }

        if direct < room {
            output[held + direct as usize..].fill(S::zero());
            log::warn!(
                "Resampler underflow: {} of {} output samples missing, resetting stream",
                room - direct,
                output.len()
            );
            self.reset();
            return Status::Underflow;
        }

        self.clock.advance(input.len() as u64, producible);
        self.remember(input);
        Status::Ok
    }

    /// Resample a block into a freshly sized buffer
    pub fn process(&mut self, input: &mut [S]) -> Vec<S> {
        let mut output = vec![S::zero(); self.next_output_len(input.len())];
        let status = self.execute(input, &mut output);
        debug_assert_eq!(status, Status::Ok);
        output
    }

    /// Output length the next call produces from `lin` input samples
    pub fn next_output_len(&self, lin: usize) -> usize {
        let computable = usize::try_from(self.clock.outputs_for(lin as u64)).unwrap_or(usize::MAX);
        self.holdover.len().saturating_add(computable)
    }

    /// Input length the next call needs to produce `lout` output samples
    pub fn next_input_len(&self, lout: usize) -> usize {
        match lout.checked_sub(self.holdover.len()) {
            Some(missing) if missing > 0 => {
                usize::try_from(self.clock.inputs_for(missing as u64)).unwrap_or(usize::MAX)
            }
            _ => 0,
        }
    }

    /// Move the stream forward without filtering or interpolating
    ///
    /// For callers that negotiate lengths with `next_*_len` and move the data
    /// some other way. `lin` and `lout` must be the lengths actually realized,
    /// otherwise the stream position drifts. The history is shifted by zeros.
    pub fn advance_by(&mut self, lin: usize, lout: usize) {
        let delivered = self.holdover.len().min(lout);
        self.holdover.drain(..delivered);
        self.clock.advance(lin as u64, (lout - delivered) as u64);

        for _ in 0..lin.min(self.history.len()) {
            self.history.push(S::zero());
        }
    }

    /// Return to the freshly created state, keeping allocations
    pub fn reset(&mut self) {
        self.clock.reset();
        for sample in self.history.iter_mut() {
            *sample = S::zero();
        }
        self.holdover.clear();
        if let Some(bank) = self.bank.as_mut() {
            bank.reset();
        }
    }

    /// Release the plan together with its filter bank
    pub fn done(self) {
        log::debug!(
            "Resample plan released after {} inputs / {} outputs in the current period",
            self.clock.consumed(),
            self.clock.produced()
        );
        if let Some(bank) = self.bank {
            bank.done();
        }
    }

    /// Interpolate output `m` of the current period
    fn compute(&mut self, m: u64, input: &[S]) -> S {
        let support = self.window.len() as i128;
        let start = self.clock.consumed() as i128;
        let end = start + input.len() as i128;

        let (newest, mut x) = self.clock.locate(m);
        let mut newest = newest as i128;
        if newest >= end {
            // Only reachable through rounding with an inexact ratio
            newest = end - 1;
            x = 1.0;
        }

        let oldest = newest - support + 1;
        for (j, slot) in self.window.iter_mut().enumerate() {
            let index = oldest + j as i128;
            *slot = if index >= start {
                input[(index - start) as usize]
            } else if index >= start - support {
                *self.history.get((index - start + support) as usize)
            } else {
                S::zero()
            };
        }

        self.interpolation.interpolate(x, &self.window)
    }

    /// Keep the newest K inputs for the next call
    fn remember(&mut self, input: &[S]) {
        let keep = input.len().saturating_sub(self.history.len());
        for &sample in &input[keep..] {
            self.history.push(sample);
        }
    }

    /// Get the resampling ratio
    pub fn ratio(&self) -> f64 {
        self.clock.ratio()
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Input time of the next computed output relative to the next input
    pub fn phase(&self) -> f64 {
        self.clock.phase()
    }

    /// Whether the anti-aliasing filter is engaged
    pub fn is_filtered(&self) -> bool {
        self.bank.is_some()
    }

    pub fn passband_edge(&self) -> Option<f64> {
        self.bank.as_ref().map(|bank| bank.passband_edge())
    }

    /// Kernel delay in input samples
    pub fn latency(&self) -> usize {
        self.interpolation.delay()
    }

    /// Inputs consumed in the current period
    pub fn consumed(&self) -> u64 {
        self.clock.consumed()
    }

    /// Outputs computed in the current period
    pub fn produced(&self) -> u64 {
        self.clock.produced()
    }

    /// Inputs consumed since creation or the last reset
    pub fn total_consumed(&self) -> u64 {
        self.clock.total_consumed()
    }

    /// Outputs computed since creation or the last reset
    pub fn total_produced(&self) -> u64 {
        self.clock.total_produced()
    }

    /// Computed outputs waiting for the next call
    pub fn held(&self) -> usize {
        self.holdover.len()
    }

    pub fn holdover_capacity(&self) -> usize {
        self.holdover_capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize) -> Vec<f64> {
        (0..len).map(|i| i as f64).collect()
    }

    #[test]
    fn test_rejects_invalid_ratio() {
        for ratio in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(ResamplePlan::<f64>::new(Interpolation::Linear, ratio).is_err());
        }
        assert_eq!(
            ResamplePlan::<f64>::from_rates(0, 48_000, Interpolation::Linear).err(),
            Some(ResampleError::InvalidSampleRates { from: 0, to: 48_000 })
        );
        assert_eq!(
            ResamplePlan::<f64>::from_rates(44_100, 0, Interpolation::Linear).err(),
            Some(ResampleError::InvalidSampleRates { from: 44_100, to: 0 })
        );
    }

    #[test]
    fn test_ratio_limits() {
        for ratio in [1e-300, 1e-10, 1e10, 1e20, f64::MIN_POSITIVE] {
            assert_eq!(
                ResamplePlan::<f64>::new(Interpolation::Linear, ratio).err(),
                Some(ResampleError::InvalidRatio(ratio))
            );
        }

        // Length queries stay total at both ends of the accepted range
        for ratio in [1.0 / RATIO_LIMIT, RATIO_LIMIT] {
            let plan = ResamplePlan::<f64>::new(Interpolation::Linear, ratio).unwrap();
            assert!(plan.next_output_len(3) > 0);
            assert!(plan.next_input_len(2) > 0);
            let _ = plan.next_output_len(usize::MAX);
            let _ = plan.next_input_len(usize::MAX);
        }
    }

    #[test]
    fn test_totals_keep_running() {
        let mut plan = ResamplePlan::<f64>::from_rates(48_000, 44_100, Interpolation::Linear).unwrap();
        for _ in 0..10 {
            let mut input = ramp(480);
            let _ = plan.process(&mut input);
        }
        assert_eq!(plan.total_consumed(), 4800);
        assert_eq!(plan.total_produced(), 4799 * 147 / 160 + 1);
        assert!(plan.consumed() <= 160);

        plan.reset();
        assert_eq!(plan.total_consumed(), 0);
        assert_eq!(plan.total_produced(), 0);
    }

    #[test]
    fn test_filter_only_when_downsampling() {
        let up = ResamplePlan::<f64>::new(Interpolation::BSpline, 2.0).unwrap();
        assert!(!up.is_filtered());

        let slight = ResamplePlan::<f64>::new(Interpolation::BSpline, 0.96).unwrap();
        assert!(!slight.is_filtered());

        let down = ResamplePlan::<f64>::new(Interpolation::BSpline, 0.5).unwrap();
        assert!(down.is_filtered());
        assert!((down.passband_edge().unwrap() - 0.46).abs() < 1e-12);
    }

    #[test]
    fn test_unit_ratio_linear_passes_through() {
        let mut plan = ResamplePlan::<f64>::new(Interpolation::Linear, 1.0).unwrap();
        let mut input = ramp(32);
        let expected = input.clone();
        assert_eq!(plan.process(&mut input), expected);
    }

    #[test]
    fn test_upsample_linear_ramp() {
        let mut plan = ResamplePlan::<f64>::new(Interpolation::Linear, 2.0).unwrap();
        let mut input = ramp(5);
        let output = plan.process(&mut input);
        assert_eq!(output, vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0]);
    }

    #[test]
    fn test_kernel_delay() {
        let mut plan = ResamplePlan::<f64>::new(Interpolation::Lagrange, 1.0).unwrap();
        let mut input = ramp(10);
        let output = plan.process(&mut input);

        assert_eq!(plan.latency(), 2);
        for (n, y) in output.iter().enumerate().skip(4) {
            assert!((y - (n as f64 - 2.0)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_output_driven_uses_holdover() {
        let mut plan = ResamplePlan::<f64>::new(Interpolation::Linear, 3.0).unwrap();

        let lin = plan.next_input_len(4);
        assert_eq!(lin, 2);
        let mut input = ramp(lin);
        let mut output = vec![0.0; 4];
        assert_eq!(plan.execute(&mut input, &mut output), Status::Ok);
        assert_eq!(plan.held(), 0);

        // The next input makes three outputs available; one is held
        let lin = plan.next_input_len(2);
        assert_eq!(lin, 1);
        let mut input = vec![2.0];
        let mut output = vec![0.0; 2];
        assert_eq!(plan.execute(&mut input, &mut output), Status::Ok);
        assert_eq!(plan.held(), 1);

        assert_eq!(plan.next_input_len(1), 0);
        let mut output = vec![0.0; 1];
        assert_eq!(plan.execute(&mut [], &mut output), Status::Ok);
        assert!((output[0] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_overflow_resets() {
        let mut plan = ResamplePlan::<f64>::new(Interpolation::Linear, 1.0).unwrap();
        let mut input = ramp(100);
        let mut output = vec![0.0; 10];
        assert_eq!(plan.execute(&mut input, &mut output), Status::Overflow);
        assert_eq!(output, ramp(10));
        assert_eq!(plan.consumed(), 0);
        assert_eq!(plan.produced(), 0);
    }

    #[test]
    fn test_underflow_zero_fills() {
        let mut plan = ResamplePlan::<f64>::new(Interpolation::Linear, 1.0).unwrap();
        let mut input = vec![1.0; 5];
        let mut output = vec![9.0; 10];
        assert_eq!(plan.execute(&mut input, &mut output), Status::Underflow);
        assert_eq!(&output[..5], &[1.0; 5]);
        assert_eq!(&output[5..], &[0.0; 5]);
    }

    #[test]
    fn test_advance_by_matches_execute_counts() {
        let mut moved = ResamplePlan::<f64>::new(Interpolation::BSpline, 0.7).unwrap();
        let mut executed = ResamplePlan::<f64>::new(Interpolation::BSpline, 0.7).unwrap();

        for lin in [3, 17, 1, 64, 0, 9] {
            let lout = moved.next_output_len(lin);
            assert_eq!(lout, executed.next_output_len(lin));
            moved.advance_by(lin, lout);

            let mut input = vec![0.25; lin];
            let mut output = vec![0.0; lout];
            assert_eq!(executed.execute(&mut input, &mut output), Status::Ok);
            assert_eq!(moved.phase(), executed.phase());
        }
    }

    #[test]
    fn test_reset_matches_fresh_plan() {
        let mut plan = ResamplePlan::<f64>::new(Interpolation::Lagrange, 0.6).unwrap();
        let mut noise: Vec<f64> = (0..57).map(|i| ((i * 37) % 11) as f64 - 5.0).collect();
        let _ = plan.process(&mut noise);
        plan.reset();

        let mut fresh = ResamplePlan::<f64>::new(Interpolation::Lagrange, 0.6).unwrap();
        let mut a = ramp(40);
        let mut b = ramp(40);
        assert_eq!(plan.process(&mut a), fresh.process(&mut b));
    }
}

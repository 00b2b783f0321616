//! Carrier-modulated pulse synthesis.
//!
//! This module converts IR symbols into the pulse representation consumed by waveform
//! engines: each [`Pulse`] sets some GPIO bits, clears others and then holds for a number
//! of microseconds.
//!
//! ## Modulation
//!
//! A symbol's *mark* becomes `round(mark / carrier_period)` full carrier cycles, each cycle
//! being a high pulse followed by a low pulse whose lengths come from the duty cycle. The
//! *space* is one low pulse covering the whole gap.
//!
//! Edges are placed at `round(k * period)` and `round(k * period + high_time)` measured
//! from the start of the mark, so per-cycle rounding never accumulates: a mark of `n`
//! cycles always lasts `round(n * period)` µs. At the default 38 kHz / 50 % carrier a
//! period is ~26.3 µs, rendered as alternating 13 and 14 µs halves, so a 400 µs mark is
//! 15 cycles and a 1200 µs mark is 46 cycles.
//!
//! Every rendered symbol lasts its nominal mark plus space within half a carrier period.
//! Carriers that cannot meet this are rejected by [`PulseEncoder::new`].
//!
//! Symbol bursts are computed once per encoder and then copied for every occurrence of the
//! symbol in a code, so encoding is deterministic.

use alloc::vec::Vec;
use heapless::Vec as BurstVec;
use libm::{fabs, round};

use crate::consts::{CARRIER_DUTY_CYCLE, CARRIER_FREQUENCY_HZ, MAX_SYMBOL_PULSES};
use crate::encoding::Symbol;
use crate::error::Error;

/// One hardware-level edge event.
///
/// Bits set in `on_mask` are driven high and bits set in `off_mask` driven low, then the
/// output holds for `duration_us`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pulse {
    /// GPIO bits to switch on.
    pub on_mask: u32,
    /// GPIO bits to switch off.
    pub off_mask: u32,
    /// Hold time in microseconds.
    pub duration_us: u32,
}

impl Pulse {
    /// A pulse driving `mask` high.
    pub const fn high(mask: u32, duration_us: u32) -> Self {
        Self {
            on_mask: mask,
            off_mask: 0,
            duration_us,
        }
    }

    /// A pulse driving `mask` low.
    pub const fn low(mask: u32, duration_us: u32) -> Self {
        Self {
            on_mask: 0,
            off_mask: mask,
            duration_us,
        }
    }
}

/// The pulses of a single symbol. Never split across chunks.
pub type Burst = BurstVec<Pulse, MAX_SYMBOL_PULSES>;

/// Square wave modulated onto the mark phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Carrier {
    frequency_hz: u32,
    duty_cycle: f64,
}

impl Default for Carrier {
    fn default() -> Self {
        Self {
            frequency_hz: CARRIER_FREQUENCY_HZ,
            duty_cycle: CARRIER_DUTY_CYCLE,
        }
    }
}

impl Carrier {
    /// Creates a carrier.
    ///
    /// # Errors
    /// [`Error::InvalidCarrier`] if the frequency is zero or above 500 kHz, or if the duty
    /// cycle is not strictly between 0 and 1.
    pub fn new(frequency_hz: u32, duty_cycle: f64) -> Result<Self, Error> {
        if frequency_hz == 0 || frequency_hz > 500_000 {
            return Err(Error::InvalidCarrier);
        }
        if !(duty_cycle > 0.0 && duty_cycle < 1.0) {
            return Err(Error::InvalidCarrier);
        }
        Ok(Self {
            frequency_hz,
            duty_cycle,
        })
    }

    /// Carrier frequency in Hz.
    pub fn frequency_hz(&self) -> u32 {
        self.frequency_hz
    }

    /// Fraction of a period spent high.
    pub fn duty_cycle(&self) -> f64 {
        self.duty_cycle
    }

    /// Length of one carrier period in microseconds.
    pub fn period_us(&self) -> f64 {
        1_000_000.0 / f64::from(self.frequency_hz)
    }

    /// Nominal high time of one period, rounded to whole microseconds.
    pub fn on_us(&self) -> u32 {
        round(self.period_us() * self.duty_cycle) as u32
    }

    /// Nominal low time of one period, rounded to whole microseconds.
    pub fn off_us(&self) -> u32 {
        round(self.period_us() * (1.0 - self.duty_cycle)) as u32
    }

    /// Number of full carrier cycles that fit a mark of `mark_us`.
    pub fn cycles(&self, mark_us: u32) -> usize {
        round(f64::from(mark_us) / self.period_us()) as usize
    }
}

/// Turns symbols into carrier-modulated pulses for one output pin.
#[derive(Debug, Clone)]
pub struct PulseEncoder {
    carrier: Carrier,
    mask: u32,
    bursts: [Burst; 4],
}

impl PulseEncoder {
    /// Creates an encoder driving GPIO `pin` with `carrier`.
    ///
    /// # Errors
    /// - [`Error::InvalidConfig`] if `pin` is not a valid GPIO bit (0..=31)
    /// - [`Error::InvalidCarrier`] if a carrier half-period rounds to zero, or if a symbol
    ///   cannot be rendered within half a period of its nominal duration
    /// - [`Error::SymbolTooLong`] if a symbol expands beyond a [`Burst`]
    pub fn new(pin: u8, carrier: Carrier) -> Result<Self, Error> {
        if pin > 31 {
            return Err(Error::InvalidConfig("GPIO pin must be within 0..=31"));
        }
        let mask = 1u32 << pin;
        let bursts = [
            Self::render(Symbol::Zero, &carrier, mask)?,
            Self::render(Symbol::One, &carrier, mask)?,
            Self::render(Symbol::Star, &carrier, mask)?,
            Self::render(Symbol::Hash, &carrier, mask)?,
        ];
        Ok(Self {
            carrier,
            mask,
            bursts,
        })
    }

    fn render(symbol: Symbol, carrier: &Carrier, mask: u32) -> Result<Burst, Error> {
        let timing = symbol.timing();
        let cycles = carrier.cycles(timing.mark_us);
        let pulses = cycles * 2 + 1;
        if pulses > MAX_SYMBOL_PULSES {
            return Err(Error::SymbolTooLong {
                pulses,
                capacity: MAX_SYMBOL_PULSES,
            });
        }

        let period = carrier.period_us();
        let high = period * carrier.duty_cycle();
        let edge = |t: f64| round(t) as u32;

        let mut burst = Burst::new();
        for k in 0..cycles {
            let start = k as f64 * period;
            let (rise, fall, next) = (edge(start), edge(start + high), edge(start + period));
            if fall == rise || next == fall {
                warn!(
                    "Carrier {} Hz leaves an empty half-cycle at cycle {}",
                    carrier.frequency_hz(),
                    k
                );
                return Err(Error::InvalidCarrier);
            }
            let _ = burst.push(Pulse::high(mask, fall - rise));
            let _ = burst.push(Pulse::low(mask, next - fall));
        }
        let _ = burst.push(Pulse::low(mask, timing.space_us));

        let actual = total_duration_us(&burst) as f64;
        let nominal = f64::from(timing.total_us());
        if fabs(actual - nominal) > period / 2.0 {
            warn!(
                "Carrier {} Hz renders {:?} as {} us instead of {} us",
                carrier.frequency_hz(),
                symbol,
                actual,
                nominal
            );
            return Err(Error::InvalidCarrier);
        }
        Ok(burst)
    }

    /// The carrier in use.
    pub fn carrier(&self) -> &Carrier {
        &self.carrier
    }

    /// GPIO bitmask the pulses drive.
    pub fn mask(&self) -> u32 {
        self.mask
    }

    /// The pulses of one symbol.
    pub fn burst(&self, symbol: Symbol) -> &Burst {
        &self.bursts[symbol.index()]
    }

    /// Encodes a code string into one burst per symbol.
    ///
    /// # Errors
    /// [`Error::UnknownSymbol`] for characters outside the alphabet.
    pub fn encode(&self, code: &str) -> Result<Vec<&Burst>, Error> {
        code.chars()
            .map(|c| Symbol::from_char(c).map(|symbol| self.burst(symbol)))
            .collect()
    }

    /// Encodes a code string into a flat pulse sequence.
    pub fn encode_pulses(&self, code: &str) -> Result<Vec<Pulse>, Error> {
        let bursts = self.encode(code)?;
        let mut pulses = Vec::with_capacity(bursts.iter().map(|b| b.len()).sum());
        for burst in bursts {
            pulses.extend_from_slice(burst);
        }
        Ok(pulses)
    }
}

/// Sum of the pulse durations in microseconds.
pub fn total_duration_us(pulses: &[Pulse]) -> u64 {
    pulses.iter().map(|p| u64::from(p.duration_us)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FAN_HIGH, LIGHT_POWER};
    use crate::encoding::code_duration_us;

    fn encoder() -> PulseEncoder {
        PulseEncoder::new(18, Carrier::default()).unwrap()
    }

    #[test]
    fn test_default_carrier_timings() {
        let carrier = Carrier::default();
        assert_eq!(carrier.frequency_hz(), 38_000);
        assert_eq!(carrier.on_us(), 13);
        assert_eq!(carrier.off_us(), 13);
        assert_eq!(carrier.cycles(400), 15);
        assert_eq!(carrier.cycles(1200), 46);
    }

    #[test]
    fn test_invalid_carrier() {
        assert_eq!(Carrier::new(0, 0.5), Err(Error::InvalidCarrier));
        assert_eq!(Carrier::new(38_000, 0.0), Err(Error::InvalidCarrier));
        assert_eq!(Carrier::new(38_000, 1.0), Err(Error::InvalidCarrier));
        assert_eq!(Carrier::new(38_000, f64::NAN), Err(Error::InvalidCarrier));
        assert!(Carrier::new(36_000, 0.33).is_ok());
    }

    #[test]
    fn test_invalid_pin() {
        assert!(matches!(
            PulseEncoder::new(32, Carrier::default()),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_burst_shape() {
        let encoder = encoder();
        let mask = 1 << 18;
        let burst = encoder.burst(Symbol::Zero);
        assert_eq!(burst.len(), 31);
        for pair in burst[..30].chunks(2) {
            assert_eq!(pair[0].on_mask, mask);
            assert!((13..=14).contains(&pair[0].duration_us));
            assert_eq!(pair[1].off_mask, mask);
            assert!((13..=14).contains(&pair[1].duration_us));
        }
        assert_eq!(burst[0], Pulse::high(mask, 13));
        assert_eq!(burst[1], Pulse::low(mask, 13));
        assert_eq!(burst[30], Pulse::low(mask, 1200));
        // 15 cycles of 26.3 us
        assert_eq!(total_duration_us(&burst[..30]), 395);
    }

    #[test]
    fn test_burst_sizes() {
        let encoder = encoder();
        assert_eq!(encoder.burst(Symbol::One).len(), 93);
        assert_eq!(encoder.burst(Symbol::Star).len(), 31);
        assert_eq!(encoder.burst(Symbol::Hash).len(), 93);
    }

    #[test]
    fn test_symbol_duration_within_half_cycle() {
        let encoder = encoder();
        let half_period = encoder.carrier().period_us() / 2.0;
        for symbol in Symbol::ALL {
            let actual = total_duration_us(encoder.burst(symbol)) as f64;
            let nominal = f64::from(symbol.timing().total_us());
            assert!(
                (actual - nominal).abs() <= half_period,
                "{symbol:?}: {actual} vs {nominal}"
            );
        }
    }

    #[test]
    fn test_symbol_duration_across_carriers() {
        for frequency_hz in [30_000, 33_000, 36_000, 37_900, 40_000, 45_000, 56_000] {
            for duty_cycle in [0.25, 1.0 / 3.0, 0.5, 0.6, 0.75] {
                let carrier = Carrier::new(frequency_hz, duty_cycle).unwrap();
                let encoder = PulseEncoder::new(18, carrier).unwrap();
                let half_period = carrier.period_us() / 2.0;
                for symbol in Symbol::ALL {
                    let actual = total_duration_us(encoder.burst(symbol)) as f64;
                    let nominal = f64::from(symbol.timing().total_us());
                    assert!(
                        (actual - nominal).abs() <= half_period,
                        "{frequency_hz} Hz / {duty_cycle}: {symbol:?} {actual} vs {nominal}"
                    );
                    assert!(encoder.burst(symbol).iter().all(|p| p.duration_us > 0));
                }
            }
        }
    }

    #[test]
    fn test_40khz_mark_does_not_drift() {
        let encoder = PulseEncoder::new(18, Carrier::new(40_000, 0.5).unwrap()).unwrap();
        // 48 cycles of 25 us plus the space, exact
        assert_eq!(total_duration_us(encoder.burst(Symbol::One)), 1_600);
        assert_eq!(total_duration_us(encoder.burst(Symbol::Hash)), 8_200);
        assert_eq!(total_duration_us(encoder.burst(Symbol::Zero)), 1_600);
    }

    #[test]
    fn test_degenerate_duty_cycle_is_rejected() {
        assert_eq!(
            PulseEncoder::new(18, Carrier::new(38_000, 0.01).unwrap()).err(),
            Some(Error::InvalidCarrier)
        );
    }

    #[test]
    fn test_code_duration_within_tolerance() {
        let encoder = encoder();
        let half_period = encoder.carrier().period_us() / 2.0;
        for code in [LIGHT_POWER, FAN_HIGH] {
            let pulses = encoder.encode_pulses(code).unwrap();
            let actual = total_duration_us(&pulses) as f64;
            let nominal = code_duration_us(code).unwrap() as f64;
            assert!((actual - nominal).abs() <= half_period * code.len() as f64);
        }
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let encoder = encoder();
        assert_eq!(
            encoder.encode_pulses(LIGHT_POWER).unwrap(),
            encoder.encode_pulses(LIGHT_POWER).unwrap()
        );
        assert_eq!(encoder.encode("01").unwrap().len(), 2);
    }

    #[test]
    fn test_encode_rejects_unknown_symbol() {
        assert_eq!(encoder().encode_pulses("01a"), Err(Error::UnknownSymbol('a')));
    }

    #[test]
    fn test_56khz_carrier_fits_bursts() {
        let encoder = PulseEncoder::new(4, Carrier::new(56_000, 0.5).unwrap()).unwrap();
        assert_eq!(encoder.mask(), 1 << 4);
        assert!(encoder.burst(Symbol::Hash).len() <= MAX_SYMBOL_PULSES);
    }

    #[test]
    fn test_fast_carrier_is_rejected() {
        assert!(matches!(
            PulseEncoder::new(18, Carrier::new(400_000, 0.5).unwrap()),
            Err(Error::InvalidCarrier) | Err(Error::SymbolTooLong { .. })
        ));
    }
}

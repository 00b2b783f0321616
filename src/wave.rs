//! Waveform chunking.
//!
//! Waveform engines accept a bounded number of pulses per waveform, while a single IR
//! code can need several times that. A [`TransmissionPlan`] splits the pulse stream into
//! [`WaveChunk`]s that each fit the hardware, played one after another.
//!
//! Chunks are filled one symbol burst at a time. Before a burst is appended the chunk is
//! checked for room; if the burst would overflow it, the chunk is sealed and a new one is
//! opened, so a symbol is never split across two chunks. Playing every chunk in order
//! reproduces the unchunked pulse sequence exactly.

use alloc::vec::Vec;

use crate::error::Error;
use crate::pulse::{Pulse, total_duration_us};

/// A hardware-sized group of pulses played as one waveform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveChunk {
    pulses: Vec<Pulse>,
    duration_us: u64,
    capacity: usize,
}

impl WaveChunk {
    /// Creates an empty chunk holding at most `capacity` pulses.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pulses: Vec::new(),
            duration_us: 0,
            capacity,
        }
    }

    /// Whether `burst` can be appended without exceeding the capacity.
    pub fn fits(&self, burst: &[Pulse]) -> bool {
        self.pulses.len() + burst.len() <= self.capacity
    }

    /// Appends a whole burst.
    ///
    /// # Errors
    /// [`Error::ChunkOverflow`] if the burst does not fit; the chunk is left unchanged.
    pub fn append(&mut self, burst: &[Pulse]) -> Result<(), Error> {
        if !self.fits(burst) {
            return Err(Error::ChunkOverflow {
                pulses: self.pulses.len() + burst.len(),
                capacity: self.capacity,
            });
        }
        self.pulses.extend_from_slice(burst);
        self.duration_us += total_duration_us(burst);
        Ok(())
    }

    /// The pulses of the chunk, in playback order.
    pub fn pulses(&self) -> &[Pulse] {
        &self.pulses
    }

    /// Number of pulses in the chunk.
    pub fn len(&self) -> usize {
        self.pulses.len()
    }

    /// Whether the chunk holds no pulses.
    pub fn is_empty(&self) -> bool {
        self.pulses.is_empty()
    }

    /// Maximum number of pulses.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Playback time of one pass over the chunk, in microseconds.
    pub fn duration_us(&self) -> u64 {
        self.duration_us
    }
}

/// The ordered chunks derived from one IR code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransmissionPlan {
    chunks: Vec<WaveChunk>,
}

impl TransmissionPlan {
    /// Packs symbol bursts into chunks of at most `capacity` pulses.
    ///
    /// An empty burst sequence yields an empty plan.
    ///
    /// # Errors
    /// - [`Error::InvalidConfig`] if `capacity` is zero
    /// - [`Error::ChunkOverflow`] if a single burst is larger than `capacity`
    pub fn build<'a, I>(bursts: I, capacity: usize) -> Result<Self, Error>
    where
        I: IntoIterator<Item = &'a [Pulse]>,
    {
        if capacity == 0 {
            return Err(Error::InvalidConfig("chunk capacity must not be zero"));
        }

        let mut chunks = Vec::new();
        let mut current = WaveChunk::with_capacity(capacity);
        for burst in bursts {
            if !current.fits(burst) && !current.is_empty() {
                chunks.push(core::mem::replace(
                    &mut current,
                    WaveChunk::with_capacity(capacity),
                ));
            }
            current.append(burst)?;
        }
        if !current.is_empty() {
            chunks.push(current);
        }
        Ok(Self { chunks })
    }

    /// The chunks, in playback order.
    pub fn chunks(&self) -> &[WaveChunk] {
        &self.chunks
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the plan has nothing to play.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Total pulses across all chunks.
    pub fn pulse_count(&self) -> usize {
        self.chunks.iter().map(WaveChunk::len).sum()
    }

    /// Total playback time of one pass over every chunk, in microseconds.
    pub fn duration_us(&self) -> u64 {
        self.chunks.iter().map(WaveChunk::duration_us).sum()
    }

    /// Every pulse of the plan, in playback order.
    pub fn pulses(&self) -> impl Iterator<Item = &Pulse> + '_ {
        self.chunks.iter().flat_map(|chunk| chunk.pulses().iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{DISCO, LIGHT_POWER};
    use crate::consts::{CHUNK_SAFETY_MARGIN, MAX_PULSES_PER_WAVE};
    use crate::pulse::{Carrier, PulseEncoder};

    fn numbered(count: u32) -> Vec<Pulse> {
        (0..count).map(|i| Pulse::low(1, i + 1)).collect()
    }

    #[test]
    fn test_chunks_never_exceed_capacity_and_preserve_order() {
        let pulses = numbered(103);
        for capacity in [1, 2, 7, 10, 50, 103, 500] {
            let plan = TransmissionPlan::build(pulses.chunks(1), capacity).unwrap();
            assert!(plan.chunks().iter().all(|c| c.len() <= capacity));
            assert!(plan.chunks().iter().all(|c| !c.is_empty()));
            let replayed: Vec<Pulse> = plan.pulses().copied().collect();
            assert_eq!(replayed, pulses);
            assert_eq!(plan.pulse_count(), 103);
        }
    }

    #[test]
    fn test_bursts_are_not_split() {
        let pulses = numbered(9);
        let plan = TransmissionPlan::build(pulses.chunks(3), 7).unwrap();
        let sizes: Vec<usize> = plan.chunks().iter().map(WaveChunk::len).collect();
        assert_eq!(sizes, [6, 3]);
    }

    #[test]
    fn test_chunk_durations_sum() {
        let pulses = numbered(10);
        let plan = TransmissionPlan::build(pulses.chunks(2), 4).unwrap();
        assert_eq!(plan.len(), 3);
        assert_eq!(plan.chunks()[0].duration_us(), 1 + 2 + 3 + 4);
        assert_eq!(plan.duration_us(), (1..=10).sum::<u64>());
    }

    #[test]
    fn test_oversized_burst_is_rejected() {
        let pulses = numbered(5);
        assert_eq!(
            TransmissionPlan::build([&pulses[..]], 4),
            Err(Error::ChunkOverflow {
                pulses: 5,
                capacity: 4
            })
        );
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        assert!(matches!(
            TransmissionPlan::build(core::iter::empty(), 0),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_empty_input_gives_empty_plan() {
        let plan = TransmissionPlan::build(core::iter::empty(), 10).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.duration_us(), 0);
    }

    #[test]
    fn test_append_leaves_chunk_unchanged_on_overflow() {
        let mut chunk = WaveChunk::with_capacity(3);
        chunk.append(&numbered(2)).unwrap();
        assert!(chunk.append(&numbered(2)).is_err());
        assert_eq!(chunk.len(), 2);
        assert_eq!(chunk.duration_us(), 3);
        assert_eq!(chunk.capacity(), 3);
    }

    #[test]
    fn test_catalog_codes_fit_hardware_chunks() {
        let encoder = PulseEncoder::new(18, Carrier::default()).unwrap();
        let capacity = MAX_PULSES_PER_WAVE - CHUNK_SAFETY_MARGIN;

        let bursts = encoder.encode(LIGHT_POWER).unwrap();
        let plan = TransmissionPlan::build(bursts.iter().map(|b| &b[..]), capacity).unwrap();
        assert_eq!(plan.len(), 1);

        let disco = DISCO.repeat(10);
        let bursts = encoder.encode(&disco).unwrap();
        let plan = TransmissionPlan::build(bursts.iter().map(|b| &b[..]), capacity).unwrap();
        assert!(plan.len() > 1);
        let expected = encoder.encode_pulses(&disco).unwrap();
        assert!(plan.pulses().eq(expected.iter()));
    }
}

//! In-memory FIFO simulator with fault injection.
//!
//! [`SimFifo`] implements [`StreamDevice`] without hardware: a bounded
//! transmit FIFO, a queue of receive packets, and the coprocessor function
//! applied when a transmit packet is committed. The harness state machine
//! and its timeout logic run against it unchanged.
//!
//! The coprocessor model matches the hardware function exactly: for each
//! committed packet it sums the input words (wrapping) and responds with
//! `output_words` words `sum + k`. If the hardware function ever changes,
//! this model and `harness::vectors::reference_outputs` change together.
//!
//! # Fault injection
//!
//! Builder-style knobs force each failure path the harness must handle:
//!
//! - [`hold_rx_data`](SimFifo::hold_rx_data): occupancy is never signalled,
//!   exercising the receive timeout
//! - [`sticky_status`](SimFifo::sticky_status): status bits survive
//!   `clear_interrupts`, exercising the reset check
//! - [`suppress_rx_done`](SimFifo::suppress_rx_done): receive-complete is
//!   withheld after a full drain, exercising the framing check
//! - [`corrupt_word`](SimFifo::corrupt_word): XORs one produced output
//!   word, exercising the mismatch verdict

use std::collections::VecDeque;

use super::registers::isr;
use super::{DeviceConfig, DeviceError, StreamDevice, WORD_BYTES};

/// One response packet waiting on the receive side.
#[derive(Debug)]
struct RxPacket {
    words: Vec<u32>,
    /// Next word to pop.
    cursor: usize,
}

impl RxPacket {
    fn drained(&self) -> bool {
        self.cursor == self.words.len()
    }
}

/// Simulated AXI-Stream FIFO with a sum-and-spread coprocessor behind it.
#[derive(Debug)]
pub struct SimFifo {
    config: DeviceConfig,
    /// Words pushed but not yet committed.
    tx_fifo: VecDeque<u32>,
    /// Response packets, oldest first. Front is the packet being drained.
    rx_packets: VecDeque<RxPacket>,
    /// Pending status flags (ISR model).
    status: u32,
    /// Words per response packet.
    output_words: usize,
    /// Output words produced so far, across all packets.
    produced: u64,

    // Fault knobs.
    hold_rx_data: bool,
    sticky_status: u32,
    suppress_rx_done: bool,
    corrupt: Option<(u64, u32)>,

    // Counters for assertions in tests.
    rx_polls: u64,
    tx_pushes: u64,
    commits: u64,
}

impl SimFifo {
    /// Create a simulator bound to a device configuration.
    ///
    /// Like the hardware after power-on, the simulator starts with the
    /// reset-complete flags pending; the harness must clear them before
    /// its reset check passes.
    pub fn initialize(config: &DeviceConfig) -> Result<Self, DeviceError> {
        if config.tx_fifo_depth == 0 || config.rx_fifo_depth == 0 {
            return Err(DeviceError::Init("zero fifo depth".to_string()));
        }

        Ok(Self {
            config: *config,
            tx_fifo: VecDeque::new(),
            rx_packets: VecDeque::new(),
            status: isr::RESET_PENDING,
            output_words: 4,
            produced: 0,
            hold_rx_data: false,
            sticky_status: 0,
            suppress_rx_done: false,
            corrupt: None,
            rx_polls: 0,
            tx_pushes: 0,
            commits: 0,
        })
    }

    /// Set the number of words in each response packet.
    pub fn with_output_words(mut self, output_words: usize) -> Self {
        self.output_words = output_words;
        self
    }

    /// Never signal receive occupancy, even when packets are pending.
    pub fn hold_rx_data(mut self) -> Self {
        self.hold_rx_data = true;
        self
    }

    /// Make `bits` survive `clear_interrupts`, as a stuck error flag would.
    pub fn sticky_status(mut self, bits: u32) -> Self {
        self.sticky_status = bits;
        self.status |= bits;
        self
    }

    /// Withhold receive-complete after a packet is fully drained.
    pub fn suppress_rx_done(mut self) -> Self {
        self.suppress_rx_done = true;
        self
    }

    /// XOR `mask` into the `index`-th output word produced, counting
    /// across all packets.
    pub fn corrupt_word(mut self, index: u64, mask: u32) -> Self {
        self.corrupt = Some((index, mask));
        self
    }

    /// Configuration this simulator was created with.
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Number of `rx_has_data` queries so far.
    pub fn rx_poll_count(&self) -> u64 {
        self.rx_polls
    }

    /// Number of words pushed into the transmit side so far.
    pub fn tx_push_count(&self) -> u64 {
        self.tx_pushes
    }

    /// Number of transmit packets committed so far.
    pub fn commit_count(&self) -> u64 {
        self.commits
    }

    /// Run the coprocessor function over one committed input packet.
    fn respond(&mut self, inputs: &[u32]) {
        let sum = inputs.iter().fold(0u32, |acc, &w| acc.wrapping_add(w));

        let mut words = Vec::with_capacity(self.output_words);
        for k in 0..self.output_words as u32 {
            let mut word = sum.wrapping_add(k);
            if let Some((index, mask)) = self.corrupt {
                if self.produced == index {
                    word ^= mask;
                }
            }
            self.produced += 1;
            words.push(word);
        }

        log::debug!(
            "sim coprocessor: {} input words, sum 0x{:08X}, {} output words",
            inputs.len(),
            sum,
            words.len()
        );

        self.rx_packets.push_back(RxPacket { words, cursor: 0 });
    }
}

impl StreamDevice for SimFifo {
    fn status(&mut self) -> u32 {
        self.status
    }

    fn clear_interrupts(&mut self, mask: u32) {
        self.status &= !mask;
        self.status |= self.sticky_status;
    }

    fn tx_has_vacancy(&mut self) -> bool {
        (self.tx_fifo.len() as u32) < self.config.tx_fifo_depth
    }

    fn tx_push_word(&mut self, word: u32) {
        self.tx_pushes += 1;
        self.tx_fifo.push_back(word);
    }

    fn tx_commit(&mut self, byte_length: u32) {
        self.commits += 1;
        let words = (byte_length / WORD_BYTES) as usize;
        let inputs: Vec<u32> = self.tx_fifo.drain(..words.min(self.tx_fifo.len())).collect();

        self.respond(&inputs);
        self.status |= isr::TC;
    }

    fn tx_is_done(&mut self) -> bool {
        if self.status & isr::TC != 0 {
            self.status &= !isr::TC;
            true
        } else {
            false
        }
    }

    fn rx_has_data(&mut self) -> bool {
        self.rx_polls += 1;
        if self.hold_rx_data {
            return false;
        }
        !self.rx_packets.is_empty()
    }

    fn rx_packet_byte_length(&mut self) -> u32 {
        self.rx_packets
            .front()
            .map(|p| p.words.len() as u32 * WORD_BYTES)
            .unwrap_or(0)
    }

    fn rx_pop_word(&mut self) -> u32 {
        match self.rx_packets.front_mut() {
            Some(packet) if !packet.drained() => {
                let word = packet.words[packet.cursor];
                packet.cursor += 1;
                word
            }
            // Popping an empty receive FIFO reads as zero.
            _ => 0,
        }
    }

    fn rx_is_done(&mut self) -> bool {
        if self.suppress_rx_done {
            return false;
        }
        match self.rx_packets.front() {
            Some(packet) if packet.drained() => {
                self.rx_packets.pop_front();
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim() -> SimFifo {
        SimFifo::initialize(DeviceConfig::lookup(0).unwrap()).unwrap()
    }

    #[test]
    fn test_reset_flags_pending_until_cleared() {
        let mut fifo = sim();
        assert_ne!(fifo.status(), 0);

        fifo.clear_interrupts(isr::ALL);
        assert_eq!(fifo.status(), 0);
    }

    #[test]
    fn test_commit_produces_sum_plus_k() {
        let mut fifo = sim();
        for w in [1, 2, 3, 4] {
            assert!(fifo.tx_has_vacancy());
            fifo.tx_push_word(w);
        }
        fifo.tx_commit(16);

        assert!(fifo.tx_is_done());
        // The flag is consumed by the first query.
        assert!(!fifo.tx_is_done());

        assert!(fifo.rx_has_data());
        assert_eq!(fifo.rx_packet_byte_length(), 16);
        let words: Vec<u32> = (0..4).map(|_| fifo.rx_pop_word()).collect();
        assert_eq!(words, vec![0x0A, 0x0B, 0x0C, 0x0D]);
        assert!(fifo.rx_is_done());
        assert!(!fifo.rx_has_data());
    }

    #[test]
    fn test_tx_backpressure_at_depth() {
        let config = DeviceConfig {
            device_id: 1,
            base_address: 0x43C0_0000,
            tx_fifo_depth: 2,
            rx_fifo_depth: 2,
        };
        let mut fifo = SimFifo::initialize(&config).unwrap();

        assert_eq!(fifo.config().tx_fifo_depth, 2);

        fifo.tx_push_word(1);
        fifo.tx_push_word(2);
        assert!(!fifo.tx_has_vacancy());

        fifo.tx_commit(8);
        assert!(fifo.tx_has_vacancy());
    }

    #[test]
    fn test_hold_rx_data_hides_pending_packet() {
        let mut fifo = sim().hold_rx_data();
        fifo.tx_push_word(5);
        fifo.tx_commit(4);

        assert!(!fifo.rx_has_data());
        assert_eq!(fifo.rx_poll_count(), 1);
    }

    #[test]
    fn test_sticky_status_survives_clear() {
        let mut fifo = sim().sticky_status(0x4);
        fifo.clear_interrupts(isr::ALL);
        assert_eq!(fifo.status(), 0x4);
    }

    #[test]
    fn test_suppress_rx_done() {
        let mut fifo = sim().with_output_words(1).suppress_rx_done();
        fifo.tx_push_word(9);
        fifo.tx_commit(4);

        assert_eq!(fifo.rx_pop_word(), 9);
        assert!(!fifo.rx_is_done());
    }

    #[test]
    fn test_corrupt_word_flips_selected_output() {
        // Corrupt the first word of the second packet (global index 4).
        let mut fifo = sim().corrupt_word(4, 0x1);

        fifo.tx_push_word(1);
        fifo.tx_push_word(1);
        fifo.tx_commit(8);
        for _ in 0..4 {
            fifo.rx_pop_word();
        }
        assert!(fifo.rx_is_done());

        fifo.tx_push_word(2);
        fifo.tx_push_word(2);
        fifo.tx_commit(8);
        assert_eq!(fifo.rx_pop_word(), 4 ^ 0x1);
        assert_eq!(fifo.rx_pop_word(), 5);
    }

    #[test]
    fn test_empty_rx_pop_reads_zero() {
        let mut fifo = sim();
        assert_eq!(fifo.rx_pop_word(), 0);
        assert_eq!(fifo.rx_packet_byte_length(), 0);
    }

    #[test]
    fn test_zero_depth_rejected() {
        let config = DeviceConfig {
            device_id: 1,
            base_address: 0x43C0_0000,
            tx_fifo_depth: 0,
            rx_fifo_depth: 0,
        };
        assert!(matches!(
            SimFifo::initialize(&config),
            Err(DeviceError::Init(_))
        ));
    }
}

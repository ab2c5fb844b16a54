//! The streaming test runner.
//!
//! [`StreamHarness`] drives the full self-check against a [`StreamDevice`]:
//!
//! ```text
//!   INIT → RESET_CHECK → {TRANSMIT_i → RECEIVE_i}×N → COMPARE → PASS/FAIL
//! ```
//!
//! The harness owns the device handle, the vector set and the result buffer
//! for the duration of a run. Every failure is terminal: a bad reset value,
//! a poll timeout or a framing error aborts the run without touching the
//! remaining test cases, and nothing is retried. Mismatched data is not an
//! error in this sense; all test cases run to completion first, then the
//! comparison yields a single pass/fail verdict.
//!
//! Exactly one response packet is expected per test case. Multi-packet
//! responses would need an outer drain loop accumulating until an
//! end-marker, which this harness does not have.

pub mod poll;
pub mod vectors;

pub use poll::{PollBudget, PollExpired};
pub use vectors::{TestVector, VectorSet};

use std::fmt;

use thiserror::Error;

use crate::device::{DeviceError, StreamDevice, WORD_BYTES};
use crate::device::registers::{isr, STATUS_IDLE};

/// Which protocol wait a timeout occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for transmit vacancy or transmit completion.
    Transmit,
    /// Waiting for receive occupancy.
    Receive,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Transmit => write!(f, "transmit"),
            Phase::Receive => write!(f, "receive"),
        }
    }
}

/// Fatal harness failures. Each aborts the run where it occurs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HarnessError {
    /// No device configuration for the requested id.
    #[error("no device configuration found for id {device_id}")]
    Config { device_id: u16 },

    /// Driver-level initialization failed.
    #[error(transparent)]
    Init(#[from] DeviceError),

    /// Status register not at the idle value after clearing interrupts.
    #[error("status reads 0x{status:08X} after interrupt clear, expected 0x{expected:08X}")]
    ResetState { status: u32, expected: u32 },

    /// A bounded poll expired before the device responded.
    #[error("timeout in {phase} phase on test case {vector}")]
    Timeout { phase: Phase, vector: usize },

    /// The receive packet was malformed (partial or oversized).
    #[error("framing error on test case {vector}: {reason}")]
    Framing { vector: usize, reason: String },
}

/// Overall outcome of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
}

/// First mismatching word found during comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MismatchInfo {
    /// Index into the flat result buffer.
    pub index: usize,
    /// Test case the word belongs to.
    pub vector: usize,
    pub expected: u32,
    pub actual: u32,
}

/// Report from a run that completed all test cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub verdict: Verdict,
    /// Words compared across all test cases.
    pub words_compared: usize,
    /// Number of mismatching words.
    pub mismatches: usize,
    /// Detail for the first mismatch, if any.
    pub first_mismatch: Option<MismatchInfo>,
}

impl RunReport {
    /// True when every compared word matched.
    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Pass
    }

    /// One-line human-readable summary.
    pub fn summary(&self) -> String {
        match (&self.verdict, &self.first_mismatch) {
            (Verdict::Pass, _) => {
                format!("PASS: {} words compared, all matched", self.words_compared)
            }
            (Verdict::Fail, Some(m)) => format!(
                "FAIL: {}/{} words mismatched, first at index {} (test case {}): expected 0x{:08X}, got 0x{:08X}",
                self.mismatches, self.words_compared, m.index, m.vector, m.expected, m.actual
            ),
            (Verdict::Fail, None) => {
                format!("FAIL: {}/{} words mismatched", self.mismatches, self.words_compared)
            }
        }
    }
}

/// Self-checking test runner over a streaming device.
///
/// Owns the device handle and the buffers for the lifetime of the run;
/// construct one per run.
pub struct StreamHarness<D: StreamDevice> {
    device: D,
    vectors: VectorSet,
    results: Vec<u32>,
    budget: PollBudget,
}

impl<D: StreamDevice> StreamHarness<D> {
    /// Create a harness over an initialized device and a vector set.
    pub fn new(device: D, vectors: VectorSet) -> Self {
        let results = vec![0u32; vectors.result_len()];
        Self {
            device,
            vectors,
            results,
            budget: PollBudget::default(),
        }
    }

    /// Override the per-wait poll budget.
    pub fn with_poll_budget(mut self, iterations: u32) -> Self {
        self.budget = PollBudget::new(iterations);
        self
    }

    /// The result buffer, valid after a run that returned a report.
    pub fn results(&self) -> &[u32] {
        &self.results
    }

    /// The owned device.
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Release the device handle.
    pub fn into_device(self) -> D {
        self.device
    }

    /// Run all test cases and produce a verdict.
    ///
    /// Errors abort the run at the failing phase; a returned report means
    /// every test case completed its transfer and was compared.
    pub fn run(&mut self) -> Result<RunReport, HarnessError> {
        self.check_reset()?;

        for index in 0..self.vectors.len() {
            self.transmit_vector(index)?;
            self.receive_vector(index)?;
        }

        Ok(self.compare())
    }

    /// Clear pending flags and require the idle status value.
    fn check_reset(&mut self) -> Result<(), HarnessError> {
        self.device.clear_interrupts(isr::ALL);
        let status = self.device.status();
        if status != STATUS_IDLE {
            log::error!(
                "reset check failed: status 0x{:08X}, expected 0x{:08X}",
                status,
                STATUS_IDLE
            );
            return Err(HarnessError::ResetState {
                status,
                expected: STATUS_IDLE,
            });
        }
        Ok(())
    }

    /// Push one vector's input words and commit them as a packet.
    fn transmit_vector(&mut self, index: usize) -> Result<(), HarnessError> {
        log::info!("transmitting data for test case {}", index);

        let budget = self.budget;
        let Self {
            device, vectors, ..
        } = self;

        for &word in &vectors.vector(index).inputs {
            budget
                .wait(|| device.tx_has_vacancy())
                .map_err(|_| HarnessError::Timeout {
                    phase: Phase::Transmit,
                    vector: index,
                })?;
            device.tx_push_word(word);
        }

        // Writing the byte length frames the pushed words as one packet.
        device.tx_commit(vectors.input_words() as u32 * WORD_BYTES);

        budget
            .wait(|| device.tx_is_done())
            .map_err(|_| HarnessError::Timeout {
                phase: Phase::Transmit,
                vector: index,
            })
    }

    /// Await one response packet and drain it into the result buffer.
    fn receive_vector(&mut self, index: usize) -> Result<(), HarnessError> {
        log::info!("receiving data for test case {}", index);

        let budget = self.budget;
        let Self {
            device,
            vectors,
            results,
            ..
        } = self;

        budget
            .wait(|| device.rx_has_data())
            .map_err(|_| HarnessError::Timeout {
                phase: Phase::Receive,
                vector: index,
            })?;

        let byte_length = device.rx_packet_byte_length();
        if byte_length % WORD_BYTES != 0 {
            return Err(HarnessError::Framing {
                vector: index,
                reason: format!("declared length {} bytes is not word aligned", byte_length),
            });
        }

        let words = (byte_length / WORD_BYTES) as usize;
        let slot_words = vectors.output_words();
        if words > slot_words {
            return Err(HarnessError::Framing {
                vector: index,
                reason: format!(
                    "declared length of {} words exceeds the {}-word result slot",
                    words, slot_words
                ),
            });
        }

        let base = index * slot_words;
        for offset in 0..words {
            results[base + offset] = device.rx_pop_word();
        }

        // One packet per test case: the drain must land exactly on the
        // packet boundary.
        if !device.rx_is_done() {
            return Err(HarnessError::Framing {
                vector: index,
                reason: "receive-done not asserted after draining declared length".to_string(),
            });
        }

        Ok(())
    }

    /// Element-wise comparison of the full result buffer.
    fn compare(&self) -> RunReport {
        log::info!("comparing data");

        let expected = self.vectors.expected_buffer();
        let output_words = self.vectors.output_words();

        let mut mismatches = 0;
        let mut first_mismatch = None;

        for (index, (&want, &got)) in expected.iter().zip(self.results.iter()).enumerate() {
            if want != got {
                mismatches += 1;
                if first_mismatch.is_none() {
                    first_mismatch = Some(MismatchInfo {
                        index,
                        vector: index / output_words,
                        expected: want,
                        actual: got,
                    });
                }
            }
        }

        RunReport {
            verdict: if mismatches == 0 {
                Verdict::Pass
            } else {
                Verdict::Fail
            },
            words_compared: expected.len(),
            mismatches,
            first_mismatch,
        }
    }
}

//! Test vectors and the software reference model.
//!
//! Expected outputs are computed, never hand-authored: for each vector the
//! reference model sums the input words (wrapping u32 arithmetic, matching
//! the 32-bit hardware data path) and expects `sum + k` for output index
//! `k`. This closed form stands in for the coprocessor's real function and
//! must be kept in exact numeric correspondence with it.

/// Input words per vector in the compiled-in canonical set.
pub const INPUT_WORDS: usize = 4;
/// Output words per vector in the compiled-in canonical set.
pub const OUTPUT_WORDS: usize = 4;
/// Number of vectors in the compiled-in canonical set.
pub const TEST_VECTORS: usize = 2;

/// Software model of the coprocessor function.
///
/// Returns `output_words` words, each `wrapping_sum(inputs) + k`.
pub fn reference_outputs(inputs: &[u32], output_words: usize) -> Vec<u32> {
    let sum = inputs.iter().fold(0u32, |acc, &w| acc.wrapping_add(w));
    (0..output_words as u32).map(|k| sum.wrapping_add(k)).collect()
}

/// One input vector and its derived expected outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestVector {
    /// Input words, pushed in order.
    pub inputs: Vec<u32>,
    /// Expected output words, compared in order.
    pub expected: Vec<u32>,
}

impl TestVector {
    /// Build a vector, deriving expectations from the reference model.
    pub fn new(inputs: Vec<u32>, output_words: usize) -> Self {
        let expected = reference_outputs(&inputs, output_words);
        Self { inputs, expected }
    }
}

/// An ordered, fixed-geometry set of test vectors.
///
/// All vectors share the same input/output word counts, so the flat
/// expected and result buffers use `vector_index * words + offset`
/// addressing.
#[derive(Debug, Clone)]
pub struct VectorSet {
    vectors: Vec<TestVector>,
    input_words: usize,
    output_words: usize,
}

impl VectorSet {
    /// Create an empty set with the given geometry.
    pub fn new(input_words: usize, output_words: usize) -> Self {
        assert!(input_words > 0 && output_words > 0, "degenerate geometry");
        Self {
            vectors: Vec::new(),
            input_words,
            output_words,
        }
    }

    /// The two compiled-in canonical vectors.
    pub fn canonical() -> Self {
        let mut set = Self::new(INPUT_WORDS, OUTPUT_WORDS);
        set.push(vec![0x01, 0x02, 0x03, 0x04]);
        set.push(vec![0x02, 0x03, 0x04, 0x05]);
        set
    }

    /// Append a vector. Panics if `inputs` does not match the geometry.
    pub fn push(&mut self, inputs: Vec<u32>) {
        assert_eq!(inputs.len(), self.input_words, "input word count mismatch");
        self.vectors.push(TestVector::new(inputs, self.output_words));
    }

    /// Number of vectors.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// True when the set holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Input words per vector.
    pub fn input_words(&self) -> usize {
        self.input_words
    }

    /// Output words per vector.
    pub fn output_words(&self) -> usize {
        self.output_words
    }

    /// Vector by index.
    pub fn vector(&self, index: usize) -> &TestVector {
        &self.vectors[index]
    }

    /// Iterate over the vectors in order.
    pub fn iter(&self) -> impl Iterator<Item = &TestVector> {
        self.vectors.iter()
    }

    /// Total result-buffer length for this set.
    pub fn result_len(&self) -> usize {
        self.vectors.len() * self.output_words
    }

    /// Flat expected buffer across all vectors.
    pub fn expected_buffer(&self) -> Vec<u32> {
        let mut buffer = Vec::with_capacity(self.result_len());
        for vector in self.iter() {
            buffer.extend_from_slice(&vector.expected);
        }
        buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_matches_hand_computed_values() {
        assert_eq!(
            reference_outputs(&[0x01, 0x02, 0x03, 0x04], 4),
            vec![0x0A, 0x0B, 0x0C, 0x0D]
        );
        assert_eq!(
            reference_outputs(&[0x02, 0x03, 0x04, 0x05], 4),
            vec![0x0E, 0x0F, 0x10, 0x11]
        );
    }

    #[test]
    fn test_reference_wraps_at_word_width() {
        let outputs = reference_outputs(&[u32::MAX, 2], 2);
        assert_eq!(outputs, vec![1, 2]);

        let outputs = reference_outputs(&[u32::MAX], 2);
        assert_eq!(outputs, vec![u32::MAX, 0]);
    }

    #[test]
    fn test_canonical_set_geometry() {
        let set = VectorSet::canonical();
        assert_eq!(set.len(), TEST_VECTORS);
        assert_eq!(set.input_words(), INPUT_WORDS);
        assert_eq!(set.output_words(), OUTPUT_WORDS);
        assert_eq!(set.result_len(), TEST_VECTORS * OUTPUT_WORDS);
    }

    #[test]
    fn test_expected_buffer_addressing() {
        let set = VectorSet::canonical();
        let buffer = set.expected_buffer();

        // Vector i occupies [i * OUTPUT_WORDS, (i + 1) * OUTPUT_WORDS).
        assert_eq!(&buffer[0..4], &[0x0A, 0x0B, 0x0C, 0x0D]);
        assert_eq!(&buffer[4..8], &[0x0E, 0x0F, 0x10, 0x11]);
    }

    #[test]
    fn test_iter_preserves_order() {
        let set = VectorSet::canonical();
        let sums: Vec<u32> = set.iter().map(|v| v.expected[0]).collect();
        assert_eq!(sums, vec![0x0A, 0x0E]);
    }

    #[test]
    fn test_single_word_single_vector() {
        let mut set = VectorSet::new(1, 1);
        set.push(vec![7]);
        assert_eq!(set.expected_buffer(), vec![7]);
    }

    #[test]
    #[should_panic(expected = "input word count mismatch")]
    fn test_geometry_enforced_on_push() {
        let mut set = VectorSet::new(4, 4);
        set.push(vec![1, 2]);
    }
}

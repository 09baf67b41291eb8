use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

/// Fixed-size ring of the most recent output samples, for display only.
///
/// Written by the audio context and read from anywhere. Reads are best-effort: a
/// reader racing the writer may see a mix of old and new samples.
#[derive(Debug)]
pub struct SampleScope {
    samples: Box<[AtomicU32]>,
    write_index: AtomicUsize,
}

impl SampleScope {
    pub fn new(len: usize) -> Self {
        let len = len.max(1);
        Self {
            samples: (0..len).map(|_| AtomicU32::new(0.0f32.to_bits())).collect(),
            write_index: AtomicUsize::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Overwrites the oldest sample.
    pub fn push(&self, sample: f32) {
        let index = self.write_index.load(Ordering::Relaxed);
        self.samples[index].store(sample.to_bits(), Ordering::Relaxed);
        self.write_index
            .store((index + 1) % self.samples.len(), Ordering::Release);
    }

    /// Copies the ring into `out`, oldest sample first. Copies at most `len()` samples
    /// and returns how many were written.
    pub fn copy_recent(&self, out: &mut [f32]) -> usize {
        let len = self.samples.len();
        let count = out.len().min(len);
        let head = self.write_index.load(Ordering::Acquire);
        let start = (head + len - count) % len;
        for (i, slot) in out.iter_mut().take(count).enumerate() {
            let bits = self.samples[(start + i) % len].load(Ordering::Relaxed);
            *slot = f32::from_bits(bits);
        }
        count
    }

    pub fn recent(&self) -> Vec<f32> {
        let mut out = vec![0.0; self.samples.len()];
        self.copy_recent(&mut out);
        out
    }
}

//! Shared data generators and constants for all benchmarks
#![allow(dead_code)]

use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

/// Filter capacities exercised by the size sweeps
pub const SIZES: &[u64] = &[1_000, 10_000, 100_000, 1_000_000];

/// False positive rates exercised by the rate sweeps
pub const RATES: &[f64] = &[0.1, 0.01, 0.001, 0.0001];

/// Generate random alphanumeric string of specified length
#[inline]
pub fn random_string(len: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Generate batch of random strings with specified length
pub fn generate_strings(count: usize, len: usize) -> Vec<String> {
    (0..count).map(|_| random_string(len)).collect()
}

/// Generate random u64 values
pub fn generate_u64s(count: usize) -> Vec<u64> {
    let mut rng = thread_rng();
    (0..count).map(|_| rng.gen()).collect()
}

/// Format a capacity for benchmark ids ("10K", "1M")
pub fn format_size(size: u64) -> String {
    if size >= 1_000_000 {
        format!("{}M", size / 1_000_000)
    } else if size >= 1_000 {
        format!("{}K", size / 1_000)
    } else {
        size.to_string()
    }
}

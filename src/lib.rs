pub mod deadline;
pub mod pipeline;
pub mod progress;
pub mod range;
pub mod worker;
pub mod writer;

/// Capacity of the bounded result stream between range workers and the writer.
/// Once full, workers block until the writer drains a value (backpressure).
pub const RESULT_CAPACITY: usize = 100;

/// Trial-division primality test.
///
/// Returns false for n <= 1. Otherwise divides by every i in 2..=floor(sqrt(n)),
/// with the bound computed through an f64 square root so that results match
/// the reference output exactly at perfect-square boundaries.
pub fn is_prime(n: i64) -> bool {
    if n <= 1 {
        return false;
    }
    let limit = (n as f64).sqrt() as i64;
    let mut i = 2;
    while i <= limit {
        if n % i == 0 {
            return false;
        }
        i += 1;
    }
    true
}

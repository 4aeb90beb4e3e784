use std::num::NonZeroUsize;

/// Number of workers to fork for a host with `available_processors` logical CPUs.
///
/// One CPU is left to the primary and the OS; at least one worker always runs.
pub fn worker_count(available_processors: usize) -> usize {
    available_processors.saturating_sub(1).max(1)
}

/// Logical CPUs usable by this process, 1 if that cannot be determined.
pub fn available_processors() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_count_reserves_one_cpu() {
        assert_eq!(worker_count(1), 1);
        assert_eq!(worker_count(2), 1);
        assert_eq!(worker_count(4), 3);
        assert_eq!(worker_count(8), 7);
    }

    #[test]
    fn test_worker_count_never_zero() {
        assert_eq!(worker_count(0), 1);
        for n in 0..64 {
            assert!(worker_count(n) >= 1);
            assert_eq!(worker_count(n), std::cmp::max(1, n.saturating_sub(1)));
        }
    }

    #[test]
    fn test_available_processors_is_positive() {
        assert!(available_processors() >= 1);
    }
}

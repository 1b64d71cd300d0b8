/// Percentage of a routine that is done, rounded to the nearest whole number.
/// A zero `total` reads as 0%.
pub fn progress_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total);
    (completed as f64 / total as f64 * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(0, 4), 0);
        assert_eq!(progress_percent(2, 8), 25);
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 67);
        assert_eq!(progress_percent(5, 5), 100);
    }

    #[test]
    fn test_progress_percent_edges() {
        assert_eq!(progress_percent(0, 0), 0);
        assert_eq!(progress_percent(9, 3), 100);
    }
}

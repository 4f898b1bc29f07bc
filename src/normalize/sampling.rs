use std::fmt;

/// Granularity requested for hourly-resolution data.
///
/// The provider only reports hourly records; coarser granularities are
/// approximated by keeping every n-th record by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
pub enum Interval {
    Hourly,
    #[value(name = "6h")]
    SixHours,
    #[value(name = "12h")]
    TwelveHours,
    #[default]
    Daily,
}

impl Interval {
    pub const ALL: [Interval; 4] = [
        Interval::Daily,
        Interval::TwelveHours,
        Interval::SixHours,
        Interval::Hourly,
    ];

    /// Positional stride: keep indices 0, stride, 2*stride, ...
    pub fn stride(&self) -> usize {
        match self {
            Interval::Hourly => 1,
            Interval::SixHours => 4,
            Interval::TwelveHours => 12,
            Interval::Daily => 24,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Interval::Hourly => "Hourly",
            Interval::SixHours => "6 Hours",
            Interval::TwelveHours => "12 Hours",
            Interval::Daily => "Daily",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Keeps every `interval.stride()`-th record, starting at index 0.
///
/// Purely positional: record timestamps are never inspected. A sequence shorter
/// than the stride yields just its first element.
pub fn sample<T>(records: Vec<T>, interval: Interval) -> Vec<T> {
    records.into_iter().step_by(interval.stride()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn daily_over_two_days_keeps_two_records() {
        let hours: Vec<usize> = (0..48).collect();
        assert_eq!(sample(hours, Interval::Daily), vec![0, 24]);
    }

    #[rstest]
    #[case(Interval::Hourly, 10)]
    #[case(Interval::SixHours, 3)]
    #[case(Interval::TwelveHours, 1)]
    #[case(Interval::Daily, 1)]
    fn stride_counts(#[case] interval: Interval, #[case] expected: usize) {
        let hours: Vec<usize> = (0..10).collect();
        let sampled = sample(hours, interval);
        assert_eq!(sampled.len(), expected);
        assert_eq!(sampled[0], 0);
    }

    #[rstest]
    #[case(Interval::Hourly)]
    #[case(Interval::SixHours)]
    #[case(Interval::TwelveHours)]
    #[case(Interval::Daily)]
    fn empty_input_stays_empty(#[case] interval: Interval) {
        assert!(sample(Vec::<u8>::new(), interval).is_empty());
    }

    #[test]
    fn short_input_keeps_first_element() {
        assert_eq!(sample(vec!['a', 'b', 'c'], Interval::TwelveHours), vec!['a']);
    }
}

use crate::continuity::gap::{Gap, GapsByChannel};

/// Merges gaps from every channel into disjoint, time-ordered intervals.
pub fn merge_gaps(gaps: &GapsByChannel) -> Vec<Gap> {
    merge_gap_list(gaps.values().flatten().copied())
}

/// Merges any collection of gaps; overlapping or touching gaps become one.
///
/// Gaps are swept in order of end time (then start time). A gap that starts
/// before the running interval must end at or after it, so it replaces the
/// running interval and absorbs any already emitted interval it reaches.
pub fn merge_gap_list<I>(gaps: I) -> Vec<Gap>
where
    I: IntoIterator<Item = Gap>,
{
    let mut sorted: Vec<Gap> = gaps.into_iter().collect();
    sorted.sort_by(|a, b| a.end.cmp(&b.end).then(a.start.cmp(&b.start)));

    let mut merged: Vec<Gap> = Vec::with_capacity(sorted.len());
    let mut sorted = sorted.into_iter();
    let Some(mut current) = sorted.next() else {
        return merged;
    };
    for gap in sorted {
        if current.contains_time(gap.start) {
            current.end = current.end.max(gap.end);
        } else if gap.start < current.start {
            current = gap;
            while let Some(last) = merged.last().copied() {
                if last.end < current.start {
                    break;
                }
                current.start = current.start.min(last.start);
                merged.pop();
            }
        } else {
            merged.push(current);
            current = gap;
        }
    }
    merged.push(current);
    merged
}

/// Whether `current` gaps show that data arrived since `previous` was taken.
///
/// No new data when every current gap still sits inside a previous gap, so a
/// gap that only shrank returns false. An empty `current` means everything
/// that was missing is now present.
pub fn is_new_data_available(previous: &[Gap], current: &[Gap]) -> bool {
    if current.is_empty() {
        return !previous.is_empty();
    }
    current.iter().any(|gap| gap_is_new_data(previous, gap))
}

/// Whether `gap` is not explained by any of the `previous` gaps.
pub fn gap_is_new_data(previous: &[Gap], gap: &Gap) -> bool {
    !previous.iter().any(|prior| prior.contains(gap))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeseries::Channel;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn secs(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(n)
    }

    fn gap(start: i64, end: i64) -> Gap {
        Gap::new(secs(start), secs(end))
    }

    #[test]
    fn overlapping_gaps_from_two_channels_merge() {
        let gaps = GapsByChannel::from([
            (Channel::Other("A".into()), vec![gap(1, 4)]),
            (Channel::Other("B".into()), vec![gap(0, 1)]),
        ]);
        assert_eq!(merge_gaps(&gaps), vec![gap(0, 4)]);
    }

    #[test]
    fn disjoint_gaps_stay_separate_and_sorted() {
        let gaps = GapsByChannel::from([
            (Channel::H, vec![gap(5, 7)]),
            (Channel::Z, vec![gap(0, 1)]),
        ]);
        assert_eq!(merge_gaps(&gaps), vec![gap(0, 1), gap(5, 7)]);
    }

    #[test]
    fn empty_input_merges_to_nothing() {
        assert!(merge_gaps(&GapsByChannel::new()).is_empty());
        assert!(merge_gap_list(Vec::new()).is_empty());
    }

    #[test]
    fn wide_gap_absorbs_earlier_emitted_intervals() {
        let merged = merge_gap_list(vec![gap(0, 1), gap(3, 4), gap(6, 7), gap(1, 9)]);
        assert_eq!(merged, vec![gap(0, 9)]);

        let merged = merge_gap_list(vec![gap(0, 1), gap(5, 6), gap(4, 8), gap(10, 12)]);
        assert_eq!(merged, vec![gap(0, 1), gap(4, 8), gap(10, 12)]);
    }

    #[test]
    fn merged_intervals_are_disjoint_and_ordered() {
        let merged = merge_gap_list(vec![
            gap(20, 25),
            gap(2, 3),
            gap(0, 30),
            gap(40, 41),
            gap(41, 45),
            gap(43, 44),
        ]);
        assert_eq!(merged, vec![gap(0, 30), gap(40, 45)]);
    }

    #[test]
    fn unchanged_or_shrunk_gaps_mean_no_new_data() {
        let previous = vec![gap(0, 1), gap(5, 7)];
        assert!(!is_new_data_available(&previous, &previous));
        assert!(!is_new_data_available(&previous, &[gap(5, 7)]));
        assert!(!is_new_data_available(&previous, &[gap(5, 6)]));
    }

    #[test]
    fn filled_or_moved_gaps_mean_new_data() {
        let previous = vec![gap(0, 10)];
        assert!(is_new_data_available(&previous, &[]));
        assert!(is_new_data_available(&previous, &[gap(8, 12)]));
        assert!(is_new_data_available(&previous, &[gap(2, 3), gap(20, 21)]));
        assert!(!is_new_data_available(&[], &[]));
    }

    #[test]
    fn single_gap_check() {
        let previous = vec![gap(0, 10)];
        assert!(!gap_is_new_data(&previous, &gap(0, 10)));
        assert!(gap_is_new_data(&previous, &gap(9, 11)));
    }
}

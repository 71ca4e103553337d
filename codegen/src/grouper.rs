//! Groups activation records by step.

use std::collections::BTreeMap;

use stepgen_dsl::activation::ActivationRecord;

/// A record together with its position in the input sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexedRecord<'a> {
    pub index: usize,
    pub record: &'a ActivationRecord,
}

/// Activation records grouped by step number.
///
/// Steps iterate in ascending numeric order. Within a step, records keep
/// the relative order they had in the input.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct GroupedSteps<'a> {
    steps: BTreeMap<u32, Vec<IndexedRecord<'a>>>,
}

impl<'a> GroupedSteps<'a> {
    /// Returns the records of the step, if the step has any.
    pub fn get(&self, step_no: u32) -> Option<&[IndexedRecord<'a>]> {
        self.steps.get(&step_no).map(Vec::as_slice)
    }

    /// Iterates over the steps in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[IndexedRecord<'a>])> {
        self.steps
            .iter()
            .map(|(step_no, records)| (*step_no, records.as_slice()))
    }

    /// The step numbers in ascending order.
    pub fn step_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.steps.keys().copied()
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of records across all steps.
    pub fn record_count(&self) -> usize {
        self.steps.values().map(Vec::len).sum()
    }
}

/// Partitions the records by step number.
pub fn group_by_step(records: &[ActivationRecord]) -> GroupedSteps<'_> {
    let mut steps: BTreeMap<u32, Vec<IndexedRecord>> = BTreeMap::new();
    for (index, record) in records.iter().enumerate() {
        steps
            .entry(record.step_no)
            .or_default()
            .push(IndexedRecord { index, record });
    }
    GroupedSteps { steps }
}

#[cfg(test)]
mod test {
    use stepgen_dsl::activation::ActivationRecord;

    use super::group_by_step;

    fn record(step_no: u32, tag_name: &str) -> ActivationRecord {
        ActivationRecord::new(1, step_no, tag_name, 0, 0)
    }

    #[test]
    fn group_by_step_when_empty_then_no_steps() {
        let records: Vec<ActivationRecord> = vec![];

        let grouped = group_by_step(&records);

        assert!(grouped.is_empty());
        assert_eq!(grouped.record_count(), 0);
    }

    #[test]
    fn group_by_step_when_unordered_steps_then_ascending() {
        let records = vec![record(3, "C"), record(1, "A"), record(2, "B")];

        let grouped = group_by_step(&records);

        assert_eq!(grouped.step_numbers().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn group_by_step_when_step_10_and_9_then_numeric_order() {
        let records = vec![record(10, "A"), record(9, "B")];

        let grouped = group_by_step(&records);

        assert_eq!(grouped.step_numbers().collect::<Vec<_>>(), vec![9, 10]);
    }

    #[test]
    fn group_by_step_when_interleaved_then_keeps_input_order_within_step() {
        let records = vec![
            record(2, "Z"),
            record(1, "M"),
            record(2, "A"),
            record(1, "B"),
            record(2, "K"),
        ];

        let grouped = group_by_step(&records);

        let step_two: Vec<&str> = grouped
            .get(2)
            .unwrap()
            .iter()
            .map(|r| r.record.tag_name.as_str())
            .collect();
        assert_eq!(step_two, vec!["Z", "A", "K"]);
        let step_one: Vec<&str> = grouped
            .get(1)
            .unwrap()
            .iter()
            .map(|r| r.record.tag_name.as_str())
            .collect();
        assert_eq!(step_one, vec!["M", "B"]);
        assert_eq!(grouped.get(1).unwrap()[1].index, 3);
        assert_eq!(grouped.record_count(), 5);
    }

    #[test]
    fn group_by_step_when_duplicate_records_then_both_kept() {
        let records = vec![record(1, "A"), record(1, "A")];

        let grouped = group_by_step(&records);

        assert_eq!(grouped.get(1).unwrap().len(), 2);
    }
}

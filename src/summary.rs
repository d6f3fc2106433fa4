//! Filtering, totals and ordering shared by the sequential and parallel paths.

use serde::Serialize;

use crate::error::{Result, SummaryError, TotalKind};
use crate::period::Period;
use crate::record::Record;

/// Keep only the records dated inside `period`, preserving input order.
/// Errors pass through so the caller still sees them.
pub fn filter_by_period<I>(records: I, period: Period) -> impl Iterator<Item = Result<Record>>
where
    I: IntoIterator<Item = Result<Record>>,
{
    records.into_iter().filter(move |item| match item {
        Ok(record) => period.contains(record.date),
        Err(_) => true,
    })
}

/// Sum positive amounts as income and the rest as expenditure
pub fn calculate_totals(records: &[Record]) -> Result<(i64, i64)> {
    records
        .iter()
        .try_fold((0i64, 0i64), |(income, expenditure), record| -> Result<(i64, i64)> {
            if record.is_income() {
                Ok((add_total(income, record.amount, TotalKind::Income)?, expenditure))
            } else {
                Ok((
                    income,
                    add_total(expenditure, record.amount, TotalKind::Expenditure)?,
                ))
            }
        })
}

fn add_total(total: i64, amount: i64, kind: TotalKind) -> Result<i64> {
    total
        .checked_add(amount)
        .ok_or(SummaryError::TotalOverflow { kind })
}

/// Newest first. The sort is stable, so same-day records keep their input order.
pub fn sort_by_date_desc(records: &mut [Record]) {
    records.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Aggregation result for one slice of the input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialSummary {
    pub total_income: i64,
    pub total_expenditure: i64,
    /// Matching records in input order, not yet globally sorted
    pub records: Vec<Record>,
    /// Records parsed before the period filter was applied
    pub records_scanned: u64,
}

impl PartialSummary {
    /// Run parse results through the period filter and totals
    ///
    /// Stops at the first parse error.
    pub fn collect<I>(records: I, period: Period) -> Result<Self>
    where
        I: IntoIterator<Item = Result<Record>>,
    {
        let mut scanned = 0u64;
        let counted = records.into_iter().inspect(|item| {
            if item.is_ok() {
                scanned += 1;
            }
        });
        let records = filter_by_period(counted, period).collect::<Result<Vec<_>>>()?;
        let (total_income, total_expenditure) = calculate_totals(&records)?;

        Ok(Self {
            total_income,
            total_expenditure,
            records,
            records_scanned: scanned,
        })
    }

    /// Fold another partial into this one. Records are appended after ours.
    ///
    /// Leaves `self` untouched when either total would overflow.
    pub fn merge(&mut self, other: PartialSummary) -> Result<()> {
        let total_income = add_total(self.total_income, other.total_income, TotalKind::Income)?;
        let total_expenditure = add_total(
            self.total_expenditure,
            other.total_expenditure,
            TotalKind::Expenditure,
        )?;
        self.total_income = total_income;
        self.total_expenditure = total_expenditure;
        self.records.extend(other.records);
        self.records_scanned += other.records_scanned;
        Ok(())
    }
}

/// Final output for one period
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub period: String,
    pub total_income: i64,
    pub total_expenditure: i64,
    #[serde(rename = "transactions")]
    pub records: Vec<Record>,
}

impl Summary {
    /// Finalize a (merged) partial: apply the global date ordering
    pub fn from_partial(period: Period, partial: PartialSummary) -> Self {
        let mut records = partial.records;
        sort_by_date_desc(&mut records);

        Self {
            period: period.to_string(),
            total_income: partial.total_income,
            total_expenditure: partial.total_expenditure,
            records,
        }
    }

    /// Render as 2-space indented JSON
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Render as single-line JSON
    pub fn to_json_compact(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecordField;
    use crate::record::parse_date;

    fn rec(date: &str, amount: i64) -> Record {
        Record::new(parse_date(date).unwrap(), amount, format!("{}:{}", date, amount))
    }

    #[test]
    fn test_filter_by_period() {
        let period = Period::parse("202306").unwrap();
        let filtered = filter_by_period(
            vec![
                Ok(rec("2023/05/15", 1)),
                Ok(rec("2023/06/20", 2)),
                Ok(rec("2023/06/25", 3)),
                Ok(rec("2022/06/10", 4)),
            ],
            period,
        )
        .collect::<Result<Vec<_>>>()
        .unwrap();
        let amounts: Vec<i64> = filtered.iter().map(|r| r.amount).collect();
        assert_eq!(amounts, vec![2, 3]);
    }

    #[test]
    fn test_calculate_totals() {
        let records = vec![
            rec("2023/06/01", 100),
            rec("2023/06/02", 200),
            rec("2023/06/03", -50),
        ];
        assert_eq!(calculate_totals(&records).unwrap(), (300, -50));
        assert_eq!(calculate_totals(&[]).unwrap(), (0, 0));
    }

    #[test]
    fn test_calculate_totals_overflow() {
        let income = vec![rec("2023/10/01", i64::MAX), rec("2023/10/02", 1)];
        assert!(matches!(
            calculate_totals(&income),
            Err(SummaryError::TotalOverflow {
                kind: TotalKind::Income
            })
        ));

        let expenditure = vec![rec("2023/10/01", i64::MIN), rec("2023/10/02", -1)];
        assert!(matches!(
            calculate_totals(&expenditure),
            Err(SummaryError::TotalOverflow {
                kind: TotalKind::Expenditure
            })
        ));
    }

    #[test]
    fn test_merge_overflow_leaves_partial_unchanged() {
        let period = Period::parse("202310").unwrap();
        let mut left =
            PartialSummary::collect(vec![Ok(rec("2023/10/01", i64::MAX - 5))], period).unwrap();
        let right = PartialSummary::collect(vec![Ok(rec("2023/10/02", 10))], period).unwrap();

        let err = left.merge(right).unwrap_err();
        assert!(matches!(
            err,
            SummaryError::TotalOverflow {
                kind: TotalKind::Income
            }
        ));
        assert_eq!(left.total_income, i64::MAX - 5);
        assert_eq!(left.records.len(), 1);
    }

    #[test]
    fn test_sort_by_date_desc() {
        let mut records = vec![
            rec("2023/10/01", 1),
            rec("2023/09/15", 2),
            rec("2023/10/05", 3),
        ];
        sort_by_date_desc(&mut records);
        let dates: Vec<String> = records
            .iter()
            .map(|r| r.date.format("%Y/%m/%d").to_string())
            .collect();
        assert_eq!(dates, vec!["2023/10/05", "2023/10/01", "2023/09/15"]);
    }

    #[test]
    fn test_sort_is_stable_for_same_day() {
        let mut records = vec![
            rec("2023/10/01", 1),
            rec("2023/10/02", 2),
            rec("2023/10/01", 3),
        ];
        sort_by_date_desc(&mut records);
        let amounts: Vec<i64> = records.iter().map(|r| r.amount).collect();
        assert_eq!(amounts, vec![2, 1, 3]);
    }

    #[test]
    fn test_collect_stops_at_first_error() {
        let period = Period::parse("202310").unwrap();
        let input = vec![
            Ok(rec("2023/10/01", 1)),
            Err(SummaryError::record(2, RecordField::Amount, "bad")),
            Ok(rec("2023/10/02", 2)),
        ];
        let err = PartialSummary::collect(input, period).unwrap_err();
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn test_merge_is_additive() {
        let period = Period::parse("202310").unwrap();
        let mut left = PartialSummary::collect(
            vec![Ok(rec("2023/10/01", 10)), Ok(rec("2023/09/01", 99))],
            period,
        )
        .unwrap();
        let right = PartialSummary::collect(vec![Ok(rec("2023/10/03", -4))], period).unwrap();

        left.merge(right).unwrap();
        assert_eq!(left.total_income, 10);
        assert_eq!(left.total_expenditure, -4);
        assert_eq!(left.records.len(), 2);
        assert_eq!(left.records_scanned, 3);
    }

    #[test]
    fn test_summary_json_shape() {
        let period = Period::parse("202310").unwrap();
        let partial = PartialSummary::collect(
            vec![Ok(rec("2023/10/01", 100)), Ok(rec("2023/10/05", -20))],
            period,
        )
        .unwrap();
        let summary = Summary::from_partial(period, partial);

        let value: serde_json::Value =
            serde_json::from_str(&summary.to_json_pretty().unwrap()).unwrap();
        assert_eq!(value["period"], "2023/10");
        assert_eq!(value["total_income"], 100);
        assert_eq!(value["total_expenditure"], -20);
        assert_eq!(value["transactions"][0]["date"], "2023/10/05");
        assert_eq!(value["transactions"][1]["amount"], 100);
    }

    #[test]
    fn test_empty_summary_has_empty_transaction_list() {
        let period = Period::parse("202001").unwrap();
        let summary = Summary::from_partial(period, PartialSummary::default());
        assert_eq!(
            summary.to_json_compact().unwrap(),
            r#"{"period":"2020/01","total_income":0,"total_expenditure":0,"transactions":[]}"#
        );
    }
}

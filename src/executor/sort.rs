//! Sort operator implementation.
//!
//! This operator materializes every row of its input in `init()`, sorts
//! them and then returns them in order.
//!
//! Supports:
//! - Multi-key sorting (ORDER BY a ASC, b DESC)
//! - NULL placement per key (NULLS FIRST / NULLS LAST)
//!
//! NULL and MISSING keys are ordered together. The sort is stable.

use crate::ast::{NullOrder, SortOption, SortOrder};
use crate::data::ExprValue;
use crate::error::{QueryError, QueryResult};
use crate::executor::{not_initialized, PhysicalOperator};
use crate::expression::Expression;
use std::cmp::Ordering;
use std::vec;

pub struct SortOperator {
    input: Box<dyn PhysicalOperator>,
    sort_list: Vec<(SortOption, Expression)>,
    sorted: Option<vec::IntoIter<ExprValue>>,
}

impl SortOperator {
    pub fn new(input: Box<dyn PhysicalOperator>, sort_list: Vec<(SortOption, Expression)>) -> Self {
        Self {
            input,
            sort_list,
            sorted: None,
        }
    }

    /// Compare two key values according to sort order and null handling
    fn compare_values(
        v1: &ExprValue,
        v2: &ExprValue,
        option: &SortOption,
    ) -> QueryResult<Ordering> {
        let ordering = match (v1.is_null_or_missing(), v2.is_null_or_missing()) {
            (true, true) => Ordering::Equal,
            (true, false) => match option.null_order() {
                NullOrder::First => Ordering::Less,
                NullOrder::Last => Ordering::Greater,
            },
            (false, true) => match option.null_order() {
                NullOrder::First => Ordering::Greater,
                NullOrder::Last => Ordering::Less,
            },
            (false, false) => {
                let cmp = v1.compare(v2)?;
                match option.order {
                    SortOrder::Asc => cmp,
                    SortOrder::Desc => cmp.reverse(),
                }
            }
        };
        Ok(ordering)
    }

    fn compare_keys(&self, k1: &[ExprValue], k2: &[ExprValue]) -> QueryResult<Ordering> {
        for ((option, _), (v1, v2)) in self.sort_list.iter().zip(k1.iter().zip(k2)) {
            let cmp = Self::compare_values(v1, v2, option)?;
            if cmp != Ordering::Equal {
                return Ok(cmp);
            }
        }
        Ok(Ordering::Equal)
    }

    fn sort_rows(&mut self) -> QueryResult<Vec<ExprValue>> {
        let mut keyed: Vec<(Vec<ExprValue>, ExprValue)> = Vec::new();
        while let Some(row) = self.input.next()? {
            let key = self
                .sort_list
                .iter()
                .map(|(_, expr)| expr.value_of(&row))
                .collect::<QueryResult<Vec<_>>>()?;
            keyed.push((key, row));
        }

        // sort_by cannot fail, so keep the first comparison error aside
        let mut error: Option<QueryError> = None;
        keyed.sort_by(|(k1, _), (k2, _)| match self.compare_keys(k1, k2) {
            Ok(ordering) => ordering,
            Err(err) => {
                error.get_or_insert(err);
                Ordering::Equal
            }
        });
        if let Some(err) = error {
            return Err(err);
        }
        Ok(keyed.into_iter().map(|(_, row)| row).collect())
    }
}

impl PhysicalOperator for SortOperator {
    fn init(&mut self) -> QueryResult<()> {
        self.input.init()?;
        let rows = self.sort_rows()?;
        self.sorted = Some(rows.into_iter());
        Ok(())
    }

    fn next(&mut self) -> QueryResult<Option<ExprValue>> {
        match &mut self.sorted {
            Some(rows) => Ok(rows.next()),
            None => Err(not_initialized()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ExprType;
    use crate::executor::collect_rows;
    use crate::executor::testing::{int_rows, MockOperator};
    use crate::expression::Dsl;

    fn sort(rows: Vec<ExprValue>, option: SortOption) -> anyhow::Result<Vec<ExprValue>> {
        let mut operator = SortOperator::new(
            MockOperator::boxed(rows),
            vec![(option, Dsl::reference("id", ExprType::Integer))],
        );
        Ok(collect_rows(&mut operator)?)
    }

    #[test]
    fn test_sort_ascending_nulls_first() -> anyhow::Result<()> {
        let mut rows = int_rows("id", &[Some(3), None, Some(1)]);
        rows.push(ExprValue::tuple([("id", ExprValue::Null)]));
        let result = sort(rows, SortOption::ASC)?;

        // MISSING and NULL keep their input order
        let mut expected = int_rows("id", &[None]);
        expected.push(ExprValue::tuple([("id", ExprValue::Null)]));
        expected.extend(int_rows("id", &[Some(1), Some(3)]));
        assert_eq!(result, expected);
        Ok(())
    }

    #[test]
    fn test_sort_descending_nulls_last() -> anyhow::Result<()> {
        let rows = int_rows("id", &[Some(1), None, Some(3), Some(2)]);
        assert_eq!(
            sort(rows, SortOption::DESC)?,
            int_rows("id", &[Some(3), Some(2), Some(1), None])
        );
        Ok(())
    }

    #[test]
    fn test_explicit_null_order() -> anyhow::Result<()> {
        let rows = int_rows("id", &[Some(2), None, Some(1)]);
        let option = SortOption::with_null_order(SortOrder::Asc, NullOrder::Last);
        assert_eq!(sort(rows, option)?, int_rows("id", &[Some(1), Some(2), None]));
        Ok(())
    }

    #[test]
    fn test_multi_key_sort() -> anyhow::Result<()> {
        let row = |a: &str, b: i32| {
            ExprValue::tuple([("a", ExprValue::from(a)), ("b", ExprValue::from(b))])
        };
        let rows = vec![row("x", 1), row("y", 2), row("x", 3)];
        let mut operator = SortOperator::new(
            MockOperator::boxed(rows),
            vec![
                (SortOption::ASC, Dsl::reference("a", ExprType::String)),
                (SortOption::DESC, Dsl::reference("b", ExprType::Integer)),
            ],
        );
        assert_eq!(
            collect_rows(&mut operator)?,
            vec![row("x", 3), row("x", 1), row("y", 2)]
        );
        Ok(())
    }

    #[test]
    fn test_incomparable_keys_fail() {
        let rows = vec![
            ExprValue::tuple([("id", ExprValue::from(1))]),
            ExprValue::tuple([("id", ExprValue::from("one"))]),
        ];
        assert!(sort(rows, SortOption::ASC).is_err());
    }
}

use crate::data::ExprValue;
use crate::error::{QueryError, QueryResult};
use crate::expression::window::{CurrentRowWindowFrame, WindowState};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RankingKind {
    RowNumber,
    Rank,
    DenseRank,
}

impl RankingKind {
    pub fn name(&self) -> &'static str {
        match self {
            RankingKind::RowNumber => "row_number",
            RankingKind::Rank => "rank",
            RankingKind::DenseRank => "dense_rank",
        }
    }
}

/// ROW_NUMBER, RANK or DENSE_RANK
#[derive(Debug, Clone, PartialEq)]
pub struct RankingFunction {
    kind: RankingKind,
}

impl RankingFunction {
    pub fn new(kind: RankingKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> RankingKind {
        self.kind
    }

    pub(super) fn evaluate(
        &self,
        frame: &CurrentRowWindowFrame,
        state: &mut WindowState,
    ) -> QueryResult<ExprValue> {
        let WindowState::Ranking { rank, total } = state else {
            return Err(QueryError::evaluation(format!(
                "invalid state for window function {}",
                self
            )));
        };

        if frame.is_new_partition()? {
            *rank = 1;
            *total = 1;
            return Ok(ExprValue::Integer(*rank));
        }

        match self.kind {
            RankingKind::RowNumber => *rank += 1,
            // Ties share a rank; the next distinct key skips ahead.
            RankingKind::Rank => {
                *total += 1;
                if frame.is_sort_key_changed()? {
                    *rank = *total;
                }
            }
            RankingKind::DenseRank => {
                if frame.is_sort_key_changed()? {
                    *rank += 1;
                }
            }
        }
        Ok(ExprValue::Integer(*rank))
    }
}

impl fmt::Display for RankingFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}()", self.kind.name())
    }
}

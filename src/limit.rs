//! Row-limit execution strategy.
//!
//! Each row limit mode maps to a concrete query rewrite, a numeric cap
//! enforced by the reader, and a retry flag. The wrapped-subquery forms can
//! fail on databases or statements incompatible with subquery wrapping
//! (trailing semicolons, DDL), so those plans fall back once to the original
//! unrewritten text with the same cap.

/// How many rows an execution must yield.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowLimitMode {
    AllRows,
    /// Schema probe: column metadata only, zero data rows.
    SchemaOnly,
    SingleRow,
    SpecifiedLimit(u64),
}

/// Declarative strategy derived from a row limit mode. Modeling the mapping
/// as a value struct keeps it unit-testable without touching execution, and
/// the exhaustive match makes an unmapped mode unrepresentable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionPlan {
    /// Command text to try first.
    pub command_text: String,
    /// Maximum number of rows the reader will produce.
    pub cap: u64,
    /// Whether a failure of the rewritten form retries the original text.
    pub retry: bool,
}

impl ExecutionPlan {
    pub fn for_query(text: &str, mode: RowLimitMode) -> ExecutionPlan {
        match mode {
            RowLimitMode::AllRows => ExecutionPlan {
                command_text: text.to_string(),
                cap: u64::MAX,
                retry: false,
            },
            RowLimitMode::SchemaOnly => ExecutionPlan {
                command_text: format!("select * from ({text}) tmp where 1=0"),
                cap: 0,
                retry: true,
            },
            RowLimitMode::SingleRow => ExecutionPlan {
                command_text: format!("select * from ({text}) tmp limit 1"),
                cap: 1,
                retry: true,
            },
            RowLimitMode::SpecifiedLimit(n) => {
                let cap = n.max(1);
                ExecutionPlan {
                    command_text: format!("select * from ({text}) tmp limit {cap}"),
                    cap,
                    retry: true,
                }
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_rows_keeps_the_text_and_never_retries() {
        let plan = ExecutionPlan::for_query("select * from t", RowLimitMode::AllRows);
        assert_eq!(plan.command_text, "select * from t");
        assert_eq!(plan.cap, u64::MAX);
        assert!(!plan.retry);
    }

    #[test]
    fn mode_mapping_produces_expected_rewrites() {
        let cases: Vec<(RowLimitMode, &str, u64)> = vec![
            (
                RowLimitMode::SchemaOnly,
                "select * from (select * from t) tmp where 1=0",
                0,
            ),
            (
                RowLimitMode::SingleRow,
                "select * from (select * from t) tmp limit 1",
                1,
            ),
            (
                RowLimitMode::SpecifiedLimit(50),
                "select * from (select * from t) tmp limit 50",
                50,
            ),
        ];

        for (mode, text, cap) in cases {
            let plan = ExecutionPlan::for_query("select * from t", mode);
            assert_eq!(plan.command_text, text, "for {mode:?}");
            assert_eq!(plan.cap, cap, "for {mode:?}");
            assert!(plan.retry, "for {mode:?}");
        }
    }

    #[test]
    fn specified_limit_is_clamped_to_at_least_one() {
        let plan = ExecutionPlan::for_query("select 1", RowLimitMode::SpecifiedLimit(0));
        assert_eq!(plan.cap, 1);
        assert_eq!(plan.command_text, "select * from (select 1) tmp limit 1");
    }
}

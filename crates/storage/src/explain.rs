use mongodb::bson::{Bson, Document};

use crate::errors::DBError;

/// Execution statistics of a find, as reported by `explain` at `executionStats` verbosity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionStats {
    pub execution_time_millis: i64,
    pub total_docs_examined: i64,
    pub total_docs_returned: i64,
    pub total_keys_examined: i64,
    // Innermost stage of the winning plan, `IXSCAN` or `COLLSCAN` for simple finds
    pub winning_stage: Option<String>,
}

impl ExecutionStats {
    pub fn from_explain(explain: &Document) -> Result<Self, DBError> {
        let stats = explain.get_document("executionStats").map_err(|_| {
            DBError::Other("explain output has no executionStats section".to_string())
        })?;

        let winning_stage = explain
            .get_document("queryPlanner")
            .and_then(|planner| planner.get_document("winningPlan"))
            .ok()
            .and_then(innermost_stage);

        Ok(ExecutionStats {
            execution_time_millis: number(stats, "executionTimeMillis").unwrap_or_default(),
            total_docs_examined: number(stats, "totalDocsExamined").unwrap_or_default(),
            total_docs_returned: number(stats, "nReturned")
                .or_else(|| number(stats, "totalDocsReturned"))
                .unwrap_or_default(),
            total_keys_examined: number(stats, "totalKeysExamined").unwrap_or_default(),
            winning_stage,
        })
    }

    pub fn used_index(&self) -> bool {
        self.winning_stage.as_deref() == Some("IXSCAN")
    }
}

fn number(doc: &Document, key: &str) -> Option<i64> {
    match doc.get(key)? {
        Bson::Int32(v) => Some(*v as i64),
        Bson::Int64(v) => Some(*v),
        Bson::Double(v) => Some(*v as i64),
        _ => None,
    }
}

// Newer servers nest the classic plan under `queryPlan`.
fn innermost_stage(plan: &Document) -> Option<String> {
    let plan = plan.get_document("queryPlan").unwrap_or(plan);
    match plan.get_document("inputStage") {
        Ok(input) => innermost_stage(input),
        Err(_) => plan.get_str("stage").ok().map(str::to_string),
    }
}

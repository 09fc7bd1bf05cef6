//! The structured diff the facade computes on every call, grounded on
//! `driver_combo.go`'s `Compare.String()` but widened to the full column
//! metadata this protocol actually carries (type, length, flag, charset,
//! decimal) instead of a `TODO compare column defination`.
use engine::{EngineError, EngineResult, ResultSet};

pub struct CallOutcome {
    pub result: EngineResult<Option<ResultSet>>,
    pub status: u16,
    pub last_insert_id: u64,
    pub affected_rows: u64,
    pub warning_count: u16,
}

/// Checks covering just the call's result (result-set shape/contents plus
/// error equality) -- the part of the diff available wherever only
/// `EngineResult<Option<ResultSet>>` pairs exist, e.g. prepared-statement
/// execute, which has no session-level status/counters to compare.
pub fn diff_results(
    a: &EngineResult<Option<ResultSet>>,
    b: &EngineResult<Option<ResultSet>>,
) -> Vec<String> {
    let mut lines = Vec::new();
    match (a, b) {
        (Ok(Some(_)), Ok(None)) => lines.push("expected non-empty result, got empty".to_string()),
        (Ok(None), Ok(Some(_))) => lines.push("expected empty result, got non-empty".to_string()),
        (Ok(Some(rs_a)), Ok(Some(rs_b))) => lines.extend(diff_result_sets(rs_a, rs_b)),
        _ => {}
    }
    match (a, b) {
        (Ok(_), Err(e)) => lines.push(format!("expected no error, got {}", e)),
        (Err(e), Ok(_)) => lines.push(format!("expected error {}, got none", e)),
        (Err(ea), Err(eb)) if !errors_equal(ea, eb) => {
            lines.push(format!("expected err {}, got {}", ea, eb))
        }
        _ => {}
    }
    lines
}

/// Runs every check in spec order, collecting every mismatch found rather
/// than stopping at the first one, so the log line shows the whole picture.
pub fn diff(sql: &str, a: &CallOutcome, b: &CallOutcome) -> Option<String> {
    let mut lines = diff_results(&a.result, &b.result);

    if matches!(a.result, Ok(None)) && matches!(b.result, Ok(None)) {
        if a.affected_rows != b.affected_rows {
            lines.push(format!(
                "expected affected_rows {}, got {}",
                a.affected_rows, b.affected_rows
            ));
        }
        if a.last_insert_id != b.last_insert_id {
            lines.push(format!(
                "expected last_insert_id {}, got {}",
                a.last_insert_id, b.last_insert_id
            ));
        }
    }

    if a.status != b.status {
        lines.push(format!("expected status {}, got {}", a.status, b.status));
    }
    if a.warning_count != b.warning_count {
        lines.push(format!(
            "expected warning_count {}, got {}",
            a.warning_count, b.warning_count
        ));
    }

    if lines.is_empty() {
        None
    } else {
        Some(format!("diff for {}:\n{}", sql, lines.join("\n")))
    }
}

fn diff_result_sets(a: &ResultSet, b: &ResultSet) -> Vec<String> {
    let mut lines = Vec::new();
    if a.columns.len() != b.columns.len() {
        lines.push(format!(
            "expected {} columns, got {}",
            a.columns.len(),
            b.columns.len()
        ));
        return lines;
    }
    for (i, (ca, cb)) in a.columns.iter().zip(b.columns.iter()).enumerate() {
        if ca.column_type() != cb.column_type() {
            lines.push(format!(
                "column {} expected type {}, got {}",
                i,
                ca.column_type(),
                cb.column_type()
            ));
        }
        if ca.column_length() != cb.column_length() {
            lines.push(format!(
                "column {} expected length {}, got {}",
                i,
                ca.column_length(),
                cb.column_length()
            ));
        }
        if ca.flag() != cb.flag() {
            lines.push(format!("column {} expected flag {}, got {}", i, ca.flag(), cb.flag()));
        }
        if ca.charset() != cb.charset() {
            lines.push(format!(
                "column {} expected charset {}, got {}",
                i,
                ca.charset(),
                cb.charset()
            ));
        }
        if ca.decimal() != cb.decimal() {
            lines.push(format!(
                "column {} expected decimal {}, got {}",
                i,
                ca.decimal(),
                cb.decimal()
            ));
        }
    }
    if a.rows.len() != b.rows.len() {
        lines.push(format!("expected {} rows, got {}", a.rows.len(), b.rows.len()));
        return lines;
    }
    if a.rows != b.rows {
        lines.push("row values differ".to_string());
    }
    lines
}

/// Same checks as `diff`, formatted for a prepared-statement execute call
/// that has no session-level state to weigh in.
pub fn diff_statement(label: &str, a: &EngineResult<Option<ResultSet>>, b: &EngineResult<Option<ResultSet>>) -> Option<String> {
    let lines = diff_results(a, b);
    if lines.is_empty() {
        None
    } else {
        Some(format!("diff for {}:\n{}", label, lines.join("\n")))
    }
}

/// Errors are compared by message text; there is no richer "causal root" to
/// unwrap here since `EngineError` is already a flat code/message/sqlstate.
fn errors_equal(a: &EngineError, b: &EngineError) -> bool {
    a.message == b.message
}

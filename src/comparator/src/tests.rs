use crate::diff;
use crate::ComparatorEngine;
use engine::{Engine, EngineSession};
use engine_memory::MemoryEngine;
use protocol::constants::MYSQL_TYPE_TINY;
use protocol::{ColumnInfo, Value};

fn open_comparator(prefer_b: bool) -> Box<dyn EngineSession> {
    let engine = ComparatorEngine::new(Box::new(MemoryEngine::new()), Box::new(MemoryEngine::new()), prefer_b);
    engine.open_session(0, 33, "test").unwrap()
}

#[test]
fn test_identical_engines_produce_no_diff() {
    let mut session = open_comparator(false);
    session.execute("CREATE TABLE test (val TINYINT)").unwrap();
    session.execute("INSERT INTO test VALUES (1)").unwrap();
    let rs = session.execute("SELECT val FROM test").unwrap().unwrap();
    assert_eq!(rs.rows, vec![vec![Value::SignedInt(1)]]);
}

#[test]
fn test_diff_flags_row_count_mismatch() {
    let col = ColumnInfo::new("", "t", "", "val", "", 4, MYSQL_TYPE_TINY, 0, 0);
    let rs_a = engine::ResultSet::new(vec![col.clone()], vec![vec![Value::SignedInt(1)]]);
    let rs_b = engine::ResultSet::new(vec![col], vec![]);
    let a: engine::EngineResult<Option<engine::ResultSet>> = Ok(Some(rs_a));
    let b: engine::EngineResult<Option<engine::ResultSet>> = Ok(Some(rs_b));
    let lines = diff::diff_results(&a, &b);
    assert!(lines.iter().any(|l| l.contains("rows")));
}

#[test]
fn test_diff_flags_column_type_mismatch() {
    let col_a = ColumnInfo::new("", "t", "", "val", "", 4, MYSQL_TYPE_TINY, 0, 0);
    let col_b = ColumnInfo::new("", "t", "", "val", "", 4, protocol::constants::MYSQL_TYPE_LONG, 0, 0);
    let rs_a = engine::ResultSet::new(vec![col_a], vec![]);
    let rs_b = engine::ResultSet::new(vec![col_b], vec![]);
    let a: engine::EngineResult<Option<engine::ResultSet>> = Ok(Some(rs_a));
    let b: engine::EngineResult<Option<engine::ResultSet>> = Ok(Some(rs_b));
    let lines = diff::diff_results(&a, &b);
    assert!(lines.iter().any(|l| l.contains("type")));
}

#[test]
fn test_diff_empty_when_everything_matches() {
    let col = ColumnInfo::new("", "t", "", "val", "", 4, MYSQL_TYPE_TINY, 0, 0);
    let rs_a = engine::ResultSet::new(vec![col.clone()], vec![vec![Value::SignedInt(1)]]);
    let rs_b = engine::ResultSet::new(vec![col], vec![vec![Value::SignedInt(1)]]);
    let a: engine::EngineResult<Option<engine::ResultSet>> = Ok(Some(rs_a));
    let b: engine::EngineResult<Option<engine::ResultSet>> = Ok(Some(rs_b));
    assert!(diff::diff_results(&a, &b).is_empty());
}

use crate::MemoryEngine;
use engine::{Engine, EngineSession};
use protocol::Value;
use std::error::Error;

fn open() -> Box<dyn EngineSession> {
    let engine = MemoryEngine::new();
    engine.open_session(0, 33, "test").unwrap()
}

#[test]
fn test_crud_round_trip() -> Result<(), Box<dyn Error>> {
    let mut session = open();
    session.execute("CREATE TABLE test (val TINYINT)")?;
    assert_eq!(session.affected_rows(), 0);

    session.execute("INSERT INTO test VALUES (1)")?;
    assert_eq!(session.affected_rows(), 1);
    assert_eq!(session.last_insert_id(), 0);

    let rs = session.execute("SELECT val FROM test")?.unwrap();
    assert_eq!(rs.rows, vec![vec![Value::SignedInt(1)]]);

    session.execute("UPDATE test SET val = 0 WHERE val = 1")?;
    assert_eq!(session.affected_rows(), 1);

    let rs = session.execute("SELECT val FROM test")?.unwrap();
    assert_eq!(rs.rows, vec![vec![Value::SignedInt(0)]]);

    session.execute("DELETE FROM test WHERE val = 0")?;
    assert_eq!(session.affected_rows(), 1);

    session.execute("DELETE FROM test")?;
    assert_eq!(session.affected_rows(), 0);
    Ok(())
}

#[test]
fn test_prepared_binary_arithmetic() -> Result<(), Box<dyn Error>> {
    let mut session = open();
    let mut meta = session.prepare("SELECT ?+?")?;
    assert_eq!(meta.columns.len(), 1);
    assert_eq!(meta.columns[0].column_type(), protocol::constants::MYSQL_TYPE_LONGLONG);
    assert!(meta.columns[0].is_unsigned());

    // The binary wire encoder writes the same raw 8 bytes for a LONGLONG
    // cell regardless of Value's sign variant; the column's `unsigned` flag
    // is what makes a client decode this as 5u64 rather than 5i64.
    let rs = meta
        .statement
        .execute(&[Value::SignedInt(2), Value::SignedInt(3)])?
        .unwrap();
    assert_eq!(rs.rows, vec![vec![Value::SignedInt(5)]]);
    Ok(())
}

#[test]
fn test_prepared_long_data_echo() -> Result<(), Box<dyn Error>> {
    let mut session = open();
    let mut meta = session.prepare("SELECT ?")?;
    let rs = meta
        .statement
        .execute(&[Value::Bytes(b"abcdef".to_vec())])?
        .unwrap();
    assert_eq!(rs.rows[0][0], Value::Bytes(b"abcdef".to_vec()));
    Ok(())
}

#[test]
fn test_field_list() -> Result<(), Box<dyn Error>> {
    let mut session = open();
    session.execute("CREATE TABLE widgets (id INT, name VARCHAR(20))")?;
    let columns = session.field_list("widgets", "%")?;
    assert_eq!(columns.len(), 2);
    assert_eq!(columns[0].name(), "id");
    assert_eq!(columns[1].name(), "name");
    Ok(())
}

#[test]
fn test_unknown_table_is_an_engine_error() {
    let mut session = open();
    assert!(session.execute("SELECT * FROM nope").is_err());
}

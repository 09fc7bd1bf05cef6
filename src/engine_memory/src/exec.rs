use crate::sql::{eval, SelectColumns, Statement};
use crate::table::{Catalog, ColumnDef};
use engine::{EngineError, EngineResult, ResultSet};
use protocol::Value;

pub struct ExecOutcome {
    pub result_set: Option<ResultSet>,
    pub affected_rows: u64,
    pub last_insert_id: u64,
}

impl ExecOutcome {
    fn ok(affected_rows: u64) -> Self {
        ExecOutcome {
            result_set: None,
            affected_rows,
            last_insert_id: 0,
        }
    }

    fn rows(result_set: ResultSet) -> Self {
        ExecOutcome {
            result_set: Some(result_set),
            affected_rows: 0,
            last_insert_id: 0,
        }
    }
}

/// Runs one parsed statement against the shared catalog. Shared by direct
/// `COM_QUERY` execution and prepared-statement execution; `params` is the
/// bound parameter list (empty outside prepared statements).
pub fn execute(
    stmt: &Statement,
    catalog: &Catalog,
    db: &str,
    params: &[Value],
) -> EngineResult<ExecOutcome> {
    match stmt {
        Statement::Use { db: new_db } => {
            catalog.ensure_database(new_db);
            Ok(ExecOutcome::ok(0))
        }
        Statement::CreateTable { name, columns } => {
            catalog.create_table(db, name, columns.clone());
            Ok(ExecOutcome::ok(0))
        }
        Statement::Insert { table, values } => {
            let row = values
                .iter()
                .map(|e| eval(e, params, None))
                .collect::<EngineResult<Vec<Value>>>()?;
            let inserted = catalog
                .with_table(db, table, |t| {
                    t.rows.push(row);
                })
                .ok_or_else(|| EngineError::unknown(format!("unknown table: {}", table)))?;
            let _ = inserted;
            Ok(ExecOutcome::ok(1))
        }
        Statement::Select { columns, from, filter } => match from {
            None => {
                let exprs = match columns {
                    SelectColumns::Exprs(exprs) => exprs,
                    _ => return Err(EngineError::unknown("unsupported select shape")),
                };
                let row = exprs
                    .iter()
                    .map(|e| eval(e, params, None))
                    .collect::<EngineResult<Vec<Value>>>()?;
                let col_infos = exprs
                    .iter()
                    .enumerate()
                    .map(|(i, e)| crate::statement::expr_column_info(i, e))
                    .collect();
                Ok(ExecOutcome::rows(ResultSet::new(col_infos, vec![row])))
            }
            Some(table) => {
                let cols = catalog
                    .table_columns(db, table)
                    .ok_or_else(|| EngineError::unknown(format!("unknown table: {}", table)))?;
                let selected_cols = select_column_defs(columns, &cols, table)?;
                let rows = catalog
                    .with_table(db, table, |t| {
                        t.rows
                            .iter()
                            .filter(|row| matches_filter(filter, &cols, row, params).unwrap_or(false))
                            .map(|row| project(columns, &cols, row))
                            .collect::<Vec<Vec<Value>>>()
                    })
                    .ok_or_else(|| EngineError::unknown(format!("unknown table: {}", table)))?;
                Ok(ExecOutcome::rows(ResultSet::new(selected_cols, rows)))
            }
        },
        Statement::Update {
            table,
            assignments,
            filter,
        } => {
            let cols = catalog
                .table_columns(db, table)
                .ok_or_else(|| EngineError::unknown(format!("unknown table: {}", table)))?;
            let mut affected = 0u64;
            let mut err = None;
            catalog.with_table(db, table, |t| {
                for row in t.rows.iter_mut() {
                    match matches_filter(filter, &cols, row, params) {
                        Ok(true) => {}
                        Ok(false) => continue,
                        Err(e) => {
                            err = Some(e);
                            return;
                        }
                    }
                    for (col_name, expr) in assignments {
                        let idx = match cols.iter().position(|c| c.name.eq_ignore_ascii_case(col_name)) {
                            Some(i) => i,
                            None => {
                                err = Some(EngineError::unknown(format!("unknown column: {}", col_name)));
                                return;
                            }
                        };
                        match eval(expr, params, Some((&cols, row))) {
                            Ok(v) => row[idx] = v,
                            Err(e) => {
                                err = Some(e);
                                return;
                            }
                        }
                    }
                    affected += 1;
                }
            });
            if let Some(e) = err {
                return Err(e);
            }
            Ok(ExecOutcome::ok(affected))
        }
        Statement::Delete { table, filter } => {
            let cols = catalog
                .table_columns(db, table)
                .ok_or_else(|| EngineError::unknown(format!("unknown table: {}", table)))?;
            let mut affected = 0u64;
            catalog.with_table(db, table, |t| {
                let before = t.rows.len();
                t.rows
                    .retain(|row| !matches_filter(filter, &cols, row, params).unwrap_or(false));
                affected = (before - t.rows.len()) as u64;
            });
            Ok(ExecOutcome::ok(affected))
        }
    }
}

fn select_column_defs(
    columns: &SelectColumns,
    table_cols: &[ColumnDef],
    table: &str,
) -> EngineResult<Vec<protocol::ColumnInfo>> {
    match columns {
        SelectColumns::All => Ok(table_cols.iter().map(|c| c.to_column_info(table)).collect()),
        SelectColumns::Named(names) => names
            .iter()
            .map(|n| {
                table_cols
                    .iter()
                    .find(|c| c.name.eq_ignore_ascii_case(n))
                    .map(|c| c.to_column_info(table))
                    .ok_or_else(|| EngineError::unknown(format!("unknown column: {}", n)))
            })
            .collect(),
        SelectColumns::Exprs(_) => Err(EngineError::unknown("SELECT expr list requires no table")),
    }
}

fn project(columns: &SelectColumns, table_cols: &[ColumnDef], row: &[Value]) -> Vec<Value> {
    match columns {
        SelectColumns::All => row.to_vec(),
        SelectColumns::Named(names) => names
            .iter()
            .map(|n| {
                let idx = table_cols
                    .iter()
                    .position(|c| c.name.eq_ignore_ascii_case(n))
                    .unwrap_or(0);
                row[idx].clone()
            })
            .collect(),
        SelectColumns::Exprs(_) => row.to_vec(),
    }
}

fn matches_filter(
    filter: &Option<crate::sql::Filter>,
    cols: &[ColumnDef],
    row: &[Value],
    params: &[Value],
) -> EngineResult<bool> {
    let filter = match filter {
        Some(f) => f,
        None => return Ok(true),
    };
    let idx = cols
        .iter()
        .position(|c| c.name.eq_ignore_ascii_case(&filter.column))
        .ok_or_else(|| EngineError::unknown(format!("unknown column: {}", filter.column)))?;
    let target = eval(&filter.value, params, Some((cols, row)))?;
    Ok(values_equal(&row[idx], &target))
}

fn values_equal(a: &Value, b: &Value) -> bool {
    use Value::*;
    match (a, b) {
        (Null, Null) => true,
        (SignedInt(x), SignedInt(y)) => x == y,
        (UnsignedInt(x), UnsignedInt(y)) => x == y,
        (SignedInt(x), UnsignedInt(y)) | (UnsignedInt(y), SignedInt(x)) => *x >= 0 && *x as u64 == *y,
        (Double(x), Double(y)) => x == y,
        (Text(x), Text(y)) => x == y,
        (Bytes(x), Bytes(y)) => x == y,
        (Text(x), Bytes(y)) | (Bytes(y), Text(x)) => x.as_bytes() == y.as_slice(),
        (Decimal(x), Decimal(y)) => x == y,
        (Date(x), Date(y)) => x == y,
        (DateTime(x, xm), DateTime(y, ym)) => x == y && xm == ym,
        (Time(x), Time(y)) => x == y,
        (Year(x), Year(y)) => x == y,
        _ => false,
    }
}

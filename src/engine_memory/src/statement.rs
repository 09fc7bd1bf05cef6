use crate::sql::{self, Expr, SelectColumns, Statement};
use crate::table::Catalog;
use crate::SessionState;
use engine::{EngineError, EngineResult, EngineStatement, ResultSet};
use protocol::constants::*;
use protocol::{ColumnInfo, Value};
use std::sync::{Arc, Mutex};

pub struct MemoryStatement {
    id: u32,
    num_params: u16,
    parsed: Statement,
    catalog: Arc<Catalog>,
    state: Arc<Mutex<SessionState>>,
    db: String,
}

impl MemoryStatement {
    pub fn new(
        id: u32,
        mut parsed: Statement,
        catalog: Arc<Catalog>,
        state: Arc<Mutex<SessionState>>,
        db: String,
    ) -> Self {
        let num_params = sql::number_placeholders(&mut parsed) as u16;
        MemoryStatement {
            id,
            num_params,
            parsed,
            catalog,
            state,
            db,
        }
    }

    pub fn result_columns(&self) -> EngineResult<Vec<ColumnInfo>> {
        match &self.parsed {
            Statement::Select { columns, from, .. } => match (columns, from) {
                (SelectColumns::All, Some(table)) => {
                    let cols = self.catalog.table_columns(&self.db, table).ok_or_else(|| {
                        EngineError::unknown(format!("unknown table: {}", table))
                    })?;
                    Ok(cols.iter().map(|c| c.to_column_info(table)).collect())
                }
                (SelectColumns::Named(names), Some(table)) => {
                    let cols = self.catalog.table_columns(&self.db, table).ok_or_else(|| {
                        EngineError::unknown(format!("unknown table: {}", table))
                    })?;
                    names
                        .iter()
                        .map(|n| {
                            cols.iter()
                                .find(|c| c.name.eq_ignore_ascii_case(n))
                                .map(|c| c.to_column_info(table))
                                .ok_or_else(|| EngineError::unknown(format!("unknown column: {}", n)))
                        })
                        .collect()
                }
                (SelectColumns::Exprs(exprs), None) => {
                    Ok(exprs.iter().enumerate().map(|(i, e)| expr_column_info(i, e)).collect())
                }
                _ => Err(EngineError::unknown("unsupported select shape")),
            },
            _ => Ok(Vec::new()),
        }
    }

    pub fn param_columns(&self) -> Vec<ColumnInfo> {
        (0..self.num_params)
            .map(|i| {
                ColumnInfo::new("", "", "", format!("param{}", i), "", 0, MYSQL_TYPE_VAR_STRING, 0, 0)
            })
            .collect()
    }
}

pub(crate) fn expr_column_info(index: usize, expr: &Expr) -> ColumnInfo {
    let name = format!("col{}", index);
    match expr {
        Expr::Add(_, _) => ColumnInfo::new(
            "",
            "",
            "",
            &name,
            "",
            20,
            MYSQL_TYPE_LONGLONG,
            COLUMN_FLAG_UNSIGNED,
            0,
        ),
        Expr::Placeholder(_) => {
            ColumnInfo::new("", "", "", &name, "", 255, MYSQL_TYPE_VAR_STRING, 0, 0)
        }
        Expr::IntLiteral(_) => ColumnInfo::new("", "", "", &name, "", 20, MYSQL_TYPE_LONGLONG, 0, 0),
        Expr::FloatLiteral(_) => ColumnInfo::new("", "", "", &name, "", 22, MYSQL_TYPE_DOUBLE, 0, 0),
        Expr::StringLiteral(_) | Expr::NullLiteral | Expr::Column(_) => {
            ColumnInfo::new("", "", "", &name, "", 255, MYSQL_TYPE_VAR_STRING, 0, 0)
        }
    }
}

impl EngineStatement for MemoryStatement {
    fn id(&self) -> u32 {
        self.id
    }

    fn num_params(&self) -> u16 {
        self.num_params
    }

    fn execute(&mut self, args: &[Value]) -> EngineResult<Option<ResultSet>> {
        let result = crate::exec::execute(&self.parsed, &self.catalog, &self.db, args)?;
        let mut state = self.state.lock().unwrap();
        state.affected_rows = result.affected_rows;
        state.last_insert_id = result.last_insert_id;
        Ok(result.result_set)
    }

    fn reset(&mut self) {
        // Long-data buffers are owned by the server's prepared-statement
        // manager, not this engine; there is nothing for RESET to clear here.
    }

    fn close(self: Box<Self>) {}
}

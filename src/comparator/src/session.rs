use crate::diff::{self, CallOutcome};
use crate::statement::ComparatorStatement;
use engine::{EngineResult, EngineSession, PreparedMeta, ResultSet};
use protocol::ColumnInfo;

/// Issues every call to both of two engines and logs a diff when they
/// disagree, returning whichever side's answer `prefer_b` selects. Grounded
/// on `original_source/server/driver_combo.go`'s `ComboContext`.
pub struct ComparatorSession {
    a: Box<dyn EngineSession>,
    b: Box<dyn EngineSession>,
    prefer_b: bool,
}

impl ComparatorSession {
    pub fn new(a: Box<dyn EngineSession>, b: Box<dyn EngineSession>, prefer_b: bool) -> Self {
        ComparatorSession { a, b, prefer_b }
    }
}

impl EngineSession for ComparatorSession {
    fn status(&self) -> u16 {
        if self.prefer_b {
            self.b.status()
        } else {
            self.a.status()
        }
    }

    fn last_insert_id(&self) -> u64 {
        if self.prefer_b {
            self.b.last_insert_id()
        } else {
            self.a.last_insert_id()
        }
    }

    fn affected_rows(&self) -> u64 {
        if self.prefer_b {
            self.b.affected_rows()
        } else {
            self.a.affected_rows()
        }
    }

    fn warning_count(&self) -> u16 {
        if self.prefer_b {
            self.b.warning_count()
        } else {
            self.a.warning_count()
        }
    }

    fn current_db(&self) -> String {
        if self.prefer_b {
            self.b.current_db()
        } else {
            self.a.current_db()
        }
    }

    fn execute(&mut self, sql: &str) -> EngineResult<Option<ResultSet>> {
        let result_a = self.a.execute(sql);
        let outcome_a = CallOutcome {
            status: self.a.status(),
            last_insert_id: self.a.last_insert_id(),
            affected_rows: self.a.affected_rows(),
            warning_count: self.a.warning_count(),
            result: result_a,
        };
        let result_b = self.b.execute(sql);
        let outcome_b = CallOutcome {
            status: self.b.status(),
            last_insert_id: self.b.last_insert_id(),
            affected_rows: self.b.affected_rows(),
            warning_count: self.b.warning_count(),
            result: result_b,
        };

        if let Some(msg) = diff::diff(sql, &outcome_a, &outcome_b) {
            log::warn!("{}", msg);
        }

        if self.prefer_b {
            outcome_b.result
        } else {
            outcome_a.result
        }
    }

    fn prepare(&mut self, sql: &str) -> EngineResult<PreparedMeta> {
        let meta_a = self.a.prepare(sql);
        let meta_b = self.b.prepare(sql);
        match (meta_a, meta_b) {
            (Ok(meta_a), Ok(meta_b)) => {
                let (params, columns) = if self.prefer_b {
                    (meta_b.params.clone(), meta_b.columns.clone())
                } else {
                    (meta_a.params.clone(), meta_a.columns.clone())
                };
                let statement = ComparatorStatement::new(
                    sql.to_string(),
                    meta_a.statement,
                    meta_b.statement,
                    self.prefer_b,
                );
                Ok(PreparedMeta {
                    statement: Box::new(statement),
                    params,
                    columns,
                })
            }
            // One side failing while the other succeeds would otherwise
            // leave the survivor's statement orphaned with no partner to
            // pair with on EXECUTE; surface the failure instead.
            (Err(e), _) | (_, Err(e)) => Err(e),
        }
    }

    fn field_list(&mut self, table: &str, wildcard: &str) -> EngineResult<Vec<ColumnInfo>> {
        if self.prefer_b {
            self.b.field_list(table, wildcard)
        } else {
            self.a.field_list(table, wildcard)
        }
    }

    fn close(self: Box<Self>) {
        self.a.close();
        self.b.close();
    }
}

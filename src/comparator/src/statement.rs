use crate::diff;
use engine::{EngineResult, EngineStatement, ResultSet};
use protocol::Value;

/// Wraps a paired prepared statement on each side. This IS the "local map
/// keyed by the chosen side's id" spec 4.9 asks for: the id the dispatcher
/// sees is whichever side is preferred, and the pairing travels with the
/// handle itself rather than through a side table.
pub struct ComparatorStatement {
    sql: String,
    a: Box<dyn EngineStatement>,
    b: Box<dyn EngineStatement>,
    prefer_b: bool,
}

impl ComparatorStatement {
    pub fn new(sql: String, a: Box<dyn EngineStatement>, b: Box<dyn EngineStatement>, prefer_b: bool) -> Self {
        ComparatorStatement { sql, a, b, prefer_b }
    }
}

impl EngineStatement for ComparatorStatement {
    fn id(&self) -> u32 {
        if self.prefer_b {
            self.b.id()
        } else {
            self.a.id()
        }
    }

    fn num_params(&self) -> u16 {
        if self.prefer_b {
            self.b.num_params()
        } else {
            self.a.num_params()
        }
    }

    fn execute(&mut self, args: &[Value]) -> EngineResult<Option<ResultSet>> {
        let result_a = self.a.execute(args);
        let result_b = self.b.execute(args);
        if let Some(msg) = diff::diff_statement(&self.sql, &result_a, &result_b) {
            log::warn!("{}", msg);
        }
        if self.prefer_b {
            result_b
        } else {
            result_a
        }
    }

    fn reset(&mut self) {
        self.a.reset();
        self.b.reset();
    }

    fn close(self: Box<Self>) {
        self.a.close();
        self.b.close();
    }
}

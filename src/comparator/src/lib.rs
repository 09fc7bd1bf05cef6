//! The comparator facade (spec 4.9): runs every call against two engines and
//! logs a diff when they disagree, returning one side's answer as the
//! answer of record. Grounded on `original_source/server/driver_combo.go`'s
//! `ComboDriver`/`ComboContext`.
mod diff;
mod session;
mod statement;
#[cfg(test)]
mod tests;

pub use session::ComparatorSession;
pub use statement::ComparatorStatement;

use engine::{Engine, EngineResult, EngineSession};

pub struct ComparatorEngine {
    a: Box<dyn Engine>,
    b: Box<dyn Engine>,
    prefer_b: bool,
}

impl ComparatorEngine {
    pub fn new(a: Box<dyn Engine>, b: Box<dyn Engine>, prefer_b: bool) -> Self {
        ComparatorEngine { a, b, prefer_b }
    }
}

impl Engine for ComparatorEngine {
    fn open_session(
        &self,
        capabilities: u32,
        collation: u8,
        dbname: &str,
    ) -> EngineResult<Box<dyn EngineSession>> {
        let session_a = self.a.open_session(capabilities, collation, dbname)?;
        let session_b = self.b.open_session(capabilities, collation, dbname)?;
        Ok(Box::new(ComparatorSession::new(session_a, session_b, self.prefer_b)))
    }
}

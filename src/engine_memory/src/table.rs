use protocol::constants::*;
use protocol::{ColumnInfo, Value};
use std::collections::HashMap;
use std::sync::Mutex;

/// A single column's static shape, fixed at `CREATE TABLE` time. The engine
/// reports the concrete MySQL type straight from here; the core never infers it.
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub name: String,
    pub mysql_type: u8,
    pub unsigned: bool,
}

impl ColumnDef {
    pub fn to_column_info(&self, table: &str) -> ColumnInfo {
        let mut flag = 0;
        if self.unsigned {
            flag |= COLUMN_FLAG_UNSIGNED;
        }
        let length = match self.mysql_type {
            MYSQL_TYPE_TINY => 4,
            MYSQL_TYPE_SHORT => 6,
            MYSQL_TYPE_LONG => 11,
            MYSQL_TYPE_LONGLONG => 20,
            MYSQL_TYPE_FLOAT => 12,
            MYSQL_TYPE_DOUBLE => 22,
            MYSQL_TYPE_NEWDECIMAL => 30,
            MYSQL_TYPE_DATE => 10,
            MYSQL_TYPE_DATETIME | MYSQL_TYPE_TIMESTAMP => 19,
            MYSQL_TYPE_TIME => 10,
            MYSQL_TYPE_YEAR => 4,
            _ => 255,
        };
        ColumnInfo::new(
            "",
            table,
            table,
            &self.name,
            &self.name,
            length,
            self.mysql_type,
            flag,
            0,
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct Table {
    pub columns: Vec<ColumnDef>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }
}

/// Tables keyed by (db, table) name, shared across every session opened
/// against one `MemoryEngine` so that CRUD round-trips are visible across
/// connections, matching real MySQL's server-wide database state.
#[derive(Default)]
pub struct Catalog {
    databases: Mutex<HashMap<String, HashMap<String, Table>>>,
}

impl Catalog {
    pub fn new() -> Self {
        Catalog {
            databases: Mutex::new(HashMap::new()),
        }
    }

    pub fn create_table(&self, db: &str, name: &str, columns: Vec<ColumnDef>) {
        let mut dbs = self.databases.lock().unwrap();
        dbs.entry(db.to_string())
            .or_insert_with(HashMap::new)
            .insert(
                name.to_string(),
                Table {
                    columns,
                    rows: Vec::new(),
                },
            );
    }

    pub fn with_table<R>(&self, db: &str, name: &str, f: impl FnOnce(&mut Table) -> R) -> Option<R> {
        let mut dbs = self.databases.lock().unwrap();
        dbs.get_mut(db)
            .and_then(|tables| tables.get_mut(name))
            .map(f)
    }

    pub fn table_columns(&self, db: &str, name: &str) -> Option<Vec<ColumnDef>> {
        let dbs = self.databases.lock().unwrap();
        dbs.get(db)
            .and_then(|tables| tables.get(name))
            .map(|t| t.columns.clone())
    }

    pub fn ensure_database(&self, db: &str) {
        let mut dbs = self.databases.lock().unwrap();
        dbs.entry(db.to_string()).or_insert_with(HashMap::new);
    }
}

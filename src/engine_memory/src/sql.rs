//! A deliberately small hand-rolled interpreter: just enough statement shapes
//! to exercise the protocol layer end to end. Not a SQL parser in any general
//! sense — there is no grammar beyond the literal forms below.
use crate::table::ColumnDef;
use engine::EngineError;
use protocol::constants::*;
use protocol::Value;
use rust_decimal::Decimal;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub enum Expr {
    Placeholder(usize),
    IntLiteral(i64),
    FloatLiteral(f64),
    StringLiteral(String),
    NullLiteral,
    Column(String),
    Add(Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone)]
pub struct Filter {
    pub column: String,
    pub value: Expr,
}

#[derive(Debug, Clone)]
pub enum SelectColumns {
    All,
    Named(Vec<String>),
    Exprs(Vec<Expr>),
}

#[derive(Debug, Clone)]
pub enum Statement {
    CreateTable {
        name: String,
        columns: Vec<ColumnDef>,
    },
    Insert {
        table: String,
        values: Vec<Expr>,
    },
    Select {
        columns: SelectColumns,
        from: Option<String>,
        filter: Option<Filter>,
    },
    Update {
        table: String,
        assignments: Vec<(String, Expr)>,
        filter: Option<Filter>,
    },
    Delete {
        table: String,
        filter: Option<Filter>,
    },
    Use {
        db: String,
    },
}

fn parse_err(msg: impl Into<String>) -> EngineError {
    EngineError::with_code(msg.into(), MYSQL_ER_PARSE_ERROR.code, MYSQL_ER_PARSE_ERROR.sql_state)
}

/// Splits `sql` into tokens: identifiers/keywords/numbers as bare words,
/// single-quoted strings as one token (quotes stripped), and `( ) , = + ?`
/// as their own single-character tokens.
fn tokenize(sql: &str) -> Result<Vec<String>, EngineError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = sql.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c == '\'' {
            let mut s = String::new();
            i += 1;
            while i < chars.len() && chars[i] != '\'' {
                s.push(chars[i]);
                i += 1;
            }
            if i >= chars.len() {
                return Err(parse_err("unterminated string literal"));
            }
            i += 1;
            tokens.push(format!("'{}'", s));
        } else if "(),=+?;".contains(c) {
            tokens.push(c.to_string());
            i += 1;
        } else {
            let mut s = String::new();
            while i < chars.len() && !chars[i].is_whitespace() && !"(),=+?;".contains(chars[i]) {
                s.push(chars[i]);
                i += 1;
            }
            tokens.push(s);
        }
    }
    Ok(tokens)
}

struct Tokens<'a> {
    tokens: &'a [String],
    pos: usize,
}

impl<'a> Tokens<'a> {
    fn peek(&self) -> Option<&str> {
        self.tokens.get(self.pos).map(|s| s.as_str())
    }

    fn next(&mut self) -> Option<&str> {
        let t = self.tokens.get(self.pos).map(|s| s.as_str());
        self.pos += 1;
        t
    }

    fn expect(&mut self, word: &str) -> Result<(), EngineError> {
        match self.next() {
            Some(t) if t.eq_ignore_ascii_case(word) => Ok(()),
            other => Err(parse_err(format!("expected '{}', got {:?}", word, other))),
        }
    }

    fn expect_ident(&mut self) -> Result<String, EngineError> {
        self.next()
            .map(|s| s.to_string())
            .ok_or_else(|| parse_err("expected identifier"))
    }
}

pub fn parse(sql: &str) -> Result<Statement, EngineError> {
    let tokens = tokenize(sql)?;
    let tokens: Vec<String> = tokens
        .into_iter()
        .filter(|t| t != ";")
        .collect();
    let mut t = Tokens {
        tokens: &tokens,
        pos: 0,
    };
    let keyword = t
        .peek()
        .ok_or_else(|| parse_err("empty statement"))?
        .to_ascii_uppercase();
    match keyword.as_str() {
        "CREATE" => parse_create_table(&mut t),
        "INSERT" => parse_insert(&mut t),
        "SELECT" => parse_select(&mut t),
        "UPDATE" => parse_update(&mut t),
        "DELETE" => parse_delete(&mut t),
        "USE" => parse_use(&mut t),
        other => Err(parse_err(format!("unsupported statement: {}", other))),
    }
}

fn parse_create_table(t: &mut Tokens) -> Result<Statement, EngineError> {
    t.expect("create")?;
    t.expect("table")?;
    let name = t.expect_ident()?;
    t.expect("(")?;
    let mut columns = Vec::new();
    loop {
        let col_name = t.expect_ident()?;
        let type_word = t.expect_ident()?;
        // Skip an optional (precision[,scale]) suffix, e.g. DECIMAL(10,2), VARCHAR(255).
        if t.peek() == Some("(") {
            t.next();
            while t.peek() != Some(")") {
                if t.next().is_none() {
                    return Err(parse_err("unterminated type parameters"));
                }
            }
            t.next();
        }
        let (mysql_type, unsigned) = sql_type_to_mysql(&type_word)?;
        columns.push(ColumnDef {
            name: col_name,
            mysql_type,
            unsigned,
        });
        match t.next() {
            Some(",") => continue,
            Some(")") => break,
            other => return Err(parse_err(format!("expected ',' or ')', got {:?}", other))),
        }
    }
    Ok(Statement::CreateTable { name, columns })
}

fn sql_type_to_mysql(word: &str) -> Result<(u8, bool), EngineError> {
    let upper = word.to_ascii_uppercase();
    let unsigned = upper.contains("UNSIGNED");
    let base = upper.split_whitespace().next().unwrap_or(&upper);
    let mysql_type = match base {
        "TINYINT" | "BOOL" | "BOOLEAN" => MYSQL_TYPE_TINY,
        "SMALLINT" => MYSQL_TYPE_SHORT,
        "MEDIUMINT" => MYSQL_TYPE_INT24,
        "INT" | "INTEGER" => MYSQL_TYPE_LONG,
        "BIGINT" => MYSQL_TYPE_LONGLONG,
        "FLOAT" => MYSQL_TYPE_FLOAT,
        "DOUBLE" => MYSQL_TYPE_DOUBLE,
        "DECIMAL" | "NUMERIC" => MYSQL_TYPE_NEWDECIMAL,
        "VARCHAR" | "TEXT" | "CHAR" => MYSQL_TYPE_VAR_STRING,
        "BLOB" => MYSQL_TYPE_BLOB,
        "DATE" => MYSQL_TYPE_DATE,
        "DATETIME" => MYSQL_TYPE_DATETIME,
        "TIMESTAMP" => MYSQL_TYPE_TIMESTAMP,
        "TIME" => MYSQL_TYPE_TIME,
        "YEAR" => MYSQL_TYPE_YEAR,
        other => return Err(parse_err(format!("unsupported column type: {}", other))),
    };
    Ok((mysql_type, unsigned))
}

fn parse_insert(t: &mut Tokens) -> Result<Statement, EngineError> {
    t.expect("insert")?;
    t.expect("into")?;
    let table = t.expect_ident()?;
    t.expect("values")?;
    t.expect("(")?;
    let mut values = Vec::new();
    loop {
        values.push(parse_expr(t)?);
        match t.next() {
            Some(",") => continue,
            Some(")") => break,
            other => return Err(parse_err(format!("expected ',' or ')', got {:?}", other))),
        }
    }
    Ok(Statement::Insert { table, values })
}

fn parse_select(t: &mut Tokens) -> Result<Statement, EngineError> {
    t.expect("select")?;
    // Peek: a bare column list of identifiers followed by FROM, or a list
    // of value expressions (literals/placeholders/+) with no FROM at all.
    let save = t.pos;
    if t.peek() == Some("*") {
        t.next();
        t.expect("from")?;
        let table = t.expect_ident()?;
        let filter = parse_optional_where(t)?;
        return Ok(Statement::Select {
            columns: SelectColumns::All,
            from: Some(table),
            filter,
        });
    }
    // Try a plain identifier list terminated by FROM.
    let mut names = Vec::new();
    let mut ok = true;
    loop {
        match t.peek() {
            Some(tok) if is_ident(tok) => {
                names.push(tok.to_string());
                t.next();
                match t.peek() {
                    Some(",") => {
                        t.next();
                        continue;
                    }
                    _ => break,
                }
            }
            _ => {
                ok = false;
                break;
            }
        }
    }
    if ok && t.peek().map(|s| s.eq_ignore_ascii_case("from")).unwrap_or(false) {
        t.next();
        let table = t.expect_ident()?;
        let filter = parse_optional_where(t)?;
        return Ok(Statement::Select {
            columns: SelectColumns::Named(names),
            from: Some(table),
            filter,
        });
    }

    t.pos = save;
    let mut exprs = Vec::new();
    loop {
        exprs.push(parse_expr(t)?);
        match t.peek() {
            Some(",") => {
                t.next();
                continue;
            }
            _ => break,
        }
    }
    Ok(Statement::Select {
        columns: SelectColumns::Exprs(exprs),
        from: None,
        filter: None,
    })
}

fn is_ident(tok: &str) -> bool {
    tok.chars().next().map(|c| c.is_alphabetic() || c == '_').unwrap_or(false)
}

fn parse_optional_where(t: &mut Tokens) -> Result<Option<Filter>, EngineError> {
    if t.peek().map(|s| s.eq_ignore_ascii_case("where")).unwrap_or(false) {
        t.next();
        let column = t.expect_ident()?;
        t.expect("=")?;
        let value = parse_expr(t)?;
        Ok(Some(Filter { column, value }))
    } else {
        Ok(None)
    }
}

fn parse_update(t: &mut Tokens) -> Result<Statement, EngineError> {
    t.expect("update")?;
    let table = t.expect_ident()?;
    t.expect("set")?;
    let mut assignments = Vec::new();
    loop {
        let col = t.expect_ident()?;
        t.expect("=")?;
        let value = parse_expr(t)?;
        assignments.push((col, value));
        match t.peek() {
            Some(",") => {
                t.next();
                continue;
            }
            _ => break,
        }
    }
    let filter = parse_optional_where(t)?;
    Ok(Statement::Update {
        table,
        assignments,
        filter,
    })
}

fn parse_delete(t: &mut Tokens) -> Result<Statement, EngineError> {
    t.expect("delete")?;
    t.expect("from")?;
    let table = t.expect_ident()?;
    let filter = parse_optional_where(t)?;
    Ok(Statement::Delete { table, filter })
}

fn parse_use(t: &mut Tokens) -> Result<Statement, EngineError> {
    t.expect("use")?;
    let db = t.expect_ident()?;
    Ok(Statement::Use { db })
}

fn parse_expr(t: &mut Tokens) -> Result<Expr, EngineError> {
    let lhs = parse_atom(t)?;
    if t.peek() == Some("+") {
        t.next();
        let rhs = parse_expr(t)?;
        Ok(Expr::Add(Box::new(lhs), Box::new(rhs)))
    } else {
        Ok(lhs)
    }
}

fn parse_atom(t: &mut Tokens) -> Result<Expr, EngineError> {
    let tok = t.next().ok_or_else(|| parse_err("expected value"))?;
    if tok == "?" {
        return Ok(Expr::Placeholder(0)); // index assigned by caller in order
    }
    if let Some(stripped) = tok.strip_prefix('\'') {
        let s = stripped.strip_suffix('\'').unwrap_or(stripped);
        return Ok(Expr::StringLiteral(s.to_string()));
    }
    if tok.eq_ignore_ascii_case("null") {
        return Ok(Expr::NullLiteral);
    }
    if let Ok(i) = tok.parse::<i64>() {
        return Ok(Expr::IntLiteral(i));
    }
    if let Ok(f) = tok.parse::<f64>() {
        return Ok(Expr::FloatLiteral(f));
    }
    Ok(Expr::Column(tok.to_string()))
}

/// Fixes up placeholder indices in left-to-right order (the tokenizer above
/// can't number them as it parses since `?` carries no identity of its own).
pub fn number_placeholders(stmt: &mut Statement) -> usize {
    let mut counter = 0usize;
    match stmt {
        Statement::Insert { values, .. } => {
            for e in values.iter_mut() {
                number_expr(e, &mut counter);
            }
        }
        Statement::Select { columns, filter, .. } => {
            if let SelectColumns::Exprs(exprs) = columns {
                for e in exprs.iter_mut() {
                    number_expr(e, &mut counter);
                }
            }
            if let Some(f) = filter {
                number_expr(&mut f.value, &mut counter);
            }
        }
        Statement::Update {
            assignments, filter, ..
        } => {
            for (_, e) in assignments.iter_mut() {
                number_expr(e, &mut counter);
            }
            if let Some(f) = filter {
                number_expr(&mut f.value, &mut counter);
            }
        }
        Statement::Delete { filter, .. } => {
            if let Some(f) = filter {
                number_expr(&mut f.value, &mut counter);
            }
        }
        Statement::CreateTable { .. } | Statement::Use { .. } => {}
    }
    counter
}

fn number_expr(e: &mut Expr, counter: &mut usize) {
    match e {
        Expr::Placeholder(idx) => {
            *idx = *counter;
            *counter += 1;
        }
        Expr::Add(l, r) => {
            number_expr(l, counter);
            number_expr(r, counter);
        }
        _ => {}
    }
}

/// Evaluates a literal/placeholder expression tree against bound parameter
/// values and (for UPDATE/WHERE) the current row's columns.
pub fn eval(expr: &Expr, params: &[Value], row: Option<(&[ColumnDef], &[Value])>) -> Result<Value, EngineError> {
    match expr {
        Expr::Placeholder(i) => params
            .get(*i)
            .cloned()
            .ok_or_else(|| EngineError::unknown(format!("missing bound parameter {}", i))),
        Expr::IntLiteral(i) => Ok(Value::SignedInt(*i)),
        Expr::FloatLiteral(f) => Ok(Value::Double(*f)),
        Expr::StringLiteral(s) => Ok(Value::Text(s.clone())),
        Expr::NullLiteral => Ok(Value::Null),
        Expr::Column(name) => {
            let (columns, values) = row.ok_or_else(|| parse_err(format!("unknown column: {}", name)))?;
            let idx = columns
                .iter()
                .position(|c| c.name.eq_ignore_ascii_case(name))
                .ok_or_else(|| parse_err(format!("unknown column: {}", name)))?;
            Ok(values[idx].clone())
        }
        Expr::Add(l, r) => {
            let lv = eval(l, params, row)?;
            let rv = eval(r, params, row)?;
            add_values(&lv, &rv)
        }
    }
}

fn add_values(a: &Value, b: &Value) -> Result<Value, EngineError> {
    match (as_i64_or_u64(a), as_i64_or_u64(b)) {
        (Some((av, a_unsigned)), Some((bv, b_unsigned))) => {
            let sum = av.wrapping_add(bv);
            Ok(if a_unsigned || b_unsigned {
                Value::UnsignedInt(sum as u64)
            } else {
                Value::SignedInt(sum)
            })
        }
        _ => match (as_f64(a), as_f64(b)) {
            (Some(av), Some(bv)) => Ok(Value::Double(av + bv)),
            _ => Err(EngineError::unknown("cannot add non-numeric values")),
        },
    }
}

fn as_i64_or_u64(v: &Value) -> Option<(i64, bool)> {
    match v {
        Value::SignedInt(i) => Some((*i, false)),
        Value::UnsignedInt(u) => Some((*u as i64, true)),
        _ => None,
    }
}

fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::SignedInt(i) => Some(*i as f64),
        Value::UnsignedInt(u) => Some(*u as f64),
        Value::Double(d) => Some(*d),
        Value::Decimal(d) => Decimal::to_string(d).parse().ok(),
        _ => None,
    }
}

pub fn decimal_from_str(s: &str) -> Result<Decimal, EngineError> {
    Decimal::from_str(s).map_err(|_| parse_err(format!("bad decimal literal: {}", s)))
}

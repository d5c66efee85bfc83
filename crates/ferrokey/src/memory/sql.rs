//! Lexer and parser for the statement shapes issued by the generators and
//! dialects.
//!
//! This is not a general SQL front end: anything outside those shapes is
//! rejected with a syntax error.

use crate::jdbc::{SqlError, SqlValue};

const SYNTAX_ERROR: &str = "42000";

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Token {
    Word(String),
    Number(i128),
    Str(String),
    Param,
    LParen,
    RParen,
    Comma,
    Dot,
    Eq,
    Semicolon,
    Star,
    Eof,
}

pub(crate) struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self {
            src: source.as_bytes(),
            pos: 0,
        }
    }

    pub(crate) fn tokenize(source: &str) -> Result<Vec<Token>, SqlError> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token()?;
            let is_eof = token == Token::Eof;
            tokens.push(token);
            if is_eof {
                return Ok(tokens);
            }
        }
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.get(self.pos + offset).copied()
    }

    fn next_token(&mut self) -> Result<Token, SqlError> {
        while self.peek_at(0).is_some_and(|c| c.is_ascii_whitespace()) {
            self.pos += 1;
        }
        let Some(ch) = self.peek_at(0) else {
            return Ok(Token::Eof);
        };
        let token = match ch {
            b'\'' => self.lex_string()?,
            b'"' => {
                let start = self.pos + 1;
                let end = self.src[start..]
                    .iter()
                    .position(|c| *c == b'"')
                    .map(|i| start + i)
                    .ok_or_else(|| syntax("unterminated quoted identifier"))?;
                self.pos = end + 1;
                Token::Word(self.text(start, end))
            }
            b'0'..=b'9' => self.lex_number(false)?,
            b'-' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.pos += 1;
                self.lex_number(true)?
            }
            b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'@' => {
                let start = self.pos;
                while self
                    .peek_at(0)
                    .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_' || c == b'@')
                {
                    self.pos += 1;
                }
                Token::Word(self.text(start, self.pos))
            }
            _ => {
                self.pos += 1;
                match ch {
                    b'?' => Token::Param,
                    b'(' => Token::LParen,
                    b')' => Token::RParen,
                    b',' => Token::Comma,
                    b'.' => Token::Dot,
                    b'=' => Token::Eq,
                    b';' => Token::Semicolon,
                    b'*' => Token::Star,
                    other => {
                        return Err(syntax(format!(
                            "unexpected character '{}'",
                            char::from(other)
                        )));
                    }
                }
            }
        };
        Ok(token)
    }

    fn lex_string(&mut self) -> Result<Token, SqlError> {
        self.pos += 1;
        let mut value = Vec::new();
        loop {
            match self.peek_at(0) {
                None => return Err(syntax("unterminated string literal")),
                Some(b'\'') if self.peek_at(1) == Some(b'\'') => {
                    value.push(b'\'');
                    self.pos += 2;
                }
                Some(b'\'') => {
                    self.pos += 1;
                    return Ok(Token::Str(String::from_utf8_lossy(&value).into_owned()));
                }
                Some(c) => {
                    value.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    fn lex_number(&mut self, negative: bool) -> Result<Token, SqlError> {
        let start = self.pos;
        while self.peek_at(0).is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        let digits = self.text(start, self.pos);
        let value: i128 = digits
            .parse()
            .map_err(|_| syntax(format!("numeric literal out of range: {digits}")))?;
        Ok(Token::Number(if negative { -value } else { value }))
    }

    fn text(&self, start: usize, end: usize) -> String {
        String::from_utf8_lossy(&self.src[start..end]).into_owned()
    }
}

fn syntax(message: impl Into<String>) -> SqlError {
    SqlError::with_state(message, SYNTAX_ERROR)
}

/// A value position in a statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Expr {
    /// Zero-based positional parameter.
    Param(usize),
    Literal(SqlValue),
    Default,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ColumnDef {
    pub(crate) name: String,
    pub(crate) identity: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Projection {
    Columns(Vec<String>),
    Max(String),
    NextValue(String),
    Identity,
    Guid,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Select {
    pub(crate) projection: Projection,
    pub(crate) from: Option<String>,
    pub(crate) filter: Vec<(String, Expr)>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Returning {
    Column(String),
    Select(Select),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Statement {
    CreateTable {
        table: String,
        columns: Vec<ColumnDef>,
    },
    DropTable {
        table: String,
        if_exists: bool,
    },
    CreateSequence {
        name: String,
        start: i128,
        increment: i128,
    },
    DropSequence {
        name: String,
        if_exists: bool,
    },
    Insert {
        table: String,
        columns: Option<Vec<String>>,
        values: Vec<Expr>,
        returning: Option<Returning>,
    },
    Select(Select),
    Update {
        table: String,
        assignments: Vec<(String, Expr)>,
        filter: Vec<(String, Expr)>,
    },
}

/// Parses a single statement; identifiers come back lower-cased.
pub(crate) fn parse(sql: &str) -> Result<Statement, SqlError> {
    let mut parser = Parser {
        tokens: Lexer::tokenize(sql)?,
        pos: 0,
        params: 0,
    };
    let statement = parser.statement()?;
    parser.eat(&Token::Semicolon);
    if parser.peek() != &Token::Eof {
        return Err(syntax(format!(
            "unexpected {:?} after statement",
            parser.peek()
        )));
    }
    Ok(statement)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    params: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn peek_at(&self, offset: usize) -> &Token {
        self.tokens.get(self.pos + offset).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token != Token::Eof {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == token {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token) -> Result<(), SqlError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(syntax(format!("expected {token:?}, found {:?}", self.peek())))
        }
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Token::Word(w) if w.eq_ignore_ascii_case(keyword))
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.is_keyword(keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), SqlError> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(syntax(format!(
                "expected '{keyword}', found {:?}",
                self.peek()
            )))
        }
    }

    fn identifier(&mut self) -> Result<String, SqlError> {
        match self.advance() {
            Token::Word(w) => Ok(w.to_ascii_lowercase()),
            other => Err(syntax(format!("expected identifier, found {other:?}"))),
        }
    }

    /// `name ( . name )*`, kept qualified.
    fn object_name(&mut self) -> Result<String, SqlError> {
        let mut name = self.identifier()?;
        while self.eat(&Token::Dot) {
            name.push('.');
            name.push_str(&self.identifier()?);
        }
        Ok(name)
    }

    /// `[qualifier .] column`, reduced to the column.
    fn column_ref(&mut self) -> Result<String, SqlError> {
        let mut name = self.identifier()?;
        while self.eat(&Token::Dot) {
            name = self.identifier()?;
        }
        Ok(name)
    }

    fn number(&mut self) -> Result<i128, SqlError> {
        match self.advance() {
            Token::Number(n) => Ok(n),
            other => Err(syntax(format!("expected number, found {other:?}"))),
        }
    }

    /// Skips a parenthesized group, including nested parentheses.
    fn skip_group(&mut self) -> Result<(), SqlError> {
        self.expect(&Token::LParen)?;
        let mut depth = 1usize;
        while depth > 0 {
            match self.advance() {
                Token::LParen => depth += 1,
                Token::RParen => depth -= 1,
                Token::Eof => return Err(syntax("unbalanced parentheses")),
                _ => {}
            }
        }
        Ok(())
    }

    fn statement(&mut self) -> Result<Statement, SqlError> {
        if self.eat_keyword("create") {
            if self.eat_keyword("table") {
                self.create_table()
            } else if self.eat_keyword("sequence") {
                self.create_sequence()
            } else {
                Err(syntax("expected 'table' or 'sequence' after 'create'"))
            }
        } else if self.eat_keyword("drop") {
            let is_table = if self.eat_keyword("table") {
                true
            } else if self.eat_keyword("sequence") {
                false
            } else {
                return Err(syntax("expected 'table' or 'sequence' after 'drop'"));
            };
            let if_exists = self.eat_keyword("if");
            if if_exists {
                self.expect_keyword("exists")?;
            }
            let name = self.object_name()?;
            Ok(if is_table {
                Statement::DropTable {
                    table: name,
                    if_exists,
                }
            } else {
                Statement::DropSequence { name, if_exists }
            })
        } else if self.eat_keyword("insert") {
            self.insert()
        } else if self.eat_keyword("select") || self.eat_keyword("call") {
            Ok(Statement::Select(self.select()?))
        } else if self.eat_keyword("update") {
            self.update()
        } else {
            Err(syntax(format!("unsupported statement at {:?}", self.peek())))
        }
    }

    fn create_table(&mut self) -> Result<Statement, SqlError> {
        let table = self.object_name()?;
        self.expect(&Token::LParen)?;
        let mut columns = Vec::new();
        loop {
            if self.is_keyword("primary") || self.is_keyword("unique") {
                self.advance();
                self.eat_keyword("key");
                self.skip_group()?;
            } else {
                let name = self.identifier()?;
                let mut identity = false;
                let mut depth = 0usize;
                loop {
                    match self.peek() {
                        Token::Comma | Token::RParen if depth == 0 => break,
                        Token::Eof => return Err(syntax("unterminated column list")),
                        Token::LParen => depth += 1,
                        Token::RParen => depth -= 1,
                        Token::Word(w)
                            if w.eq_ignore_ascii_case("identity")
                                || w.eq_ignore_ascii_case("auto_increment") =>
                        {
                            identity = true;
                        }
                        _ => {}
                    }
                    self.advance();
                }
                columns.push(ColumnDef { name, identity });
            }
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RParen)?;
        // table options such as `engine=InnoDB`
        while !matches!(self.peek(), Token::Eof | Token::Semicolon) {
            self.advance();
        }
        Ok(Statement::CreateTable { table, columns })
    }

    fn create_sequence(&mut self) -> Result<Statement, SqlError> {
        let name = self.object_name()?;
        let (mut start, mut increment) = (1, 1);
        while !matches!(self.peek(), Token::Eof | Token::Semicolon) {
            if self.eat_keyword("start") {
                self.eat_keyword("with");
                start = self.number()?;
            } else if self.eat_keyword("increment") {
                self.eat_keyword("by");
                increment = self.number()?;
            } else {
                // options the engine does not model, such as `cache 20`
                self.advance();
            }
        }
        Ok(Statement::CreateSequence {
            name,
            start,
            increment,
        })
    }

    fn expr(&mut self) -> Result<Expr, SqlError> {
        match self.advance() {
            Token::Param => {
                let index = self.params;
                self.params += 1;
                Ok(Expr::Param(index))
            }
            Token::Number(n) => Ok(Expr::Literal(match i64::try_from(n) {
                Ok(v) => SqlValue::BigInt(v),
                Err(_) => SqlValue::Numeric(n.into()),
            })),
            Token::Str(s) => Ok(Expr::Literal(SqlValue::Text(s))),
            Token::Word(w) if w.eq_ignore_ascii_case("default") => Ok(Expr::Default),
            Token::Word(w) if w.eq_ignore_ascii_case("null") => Ok(Expr::Literal(SqlValue::Null)),
            other => Err(syntax(format!("expected a value, found {other:?}"))),
        }
    }

    fn expr_list(&mut self) -> Result<Vec<Expr>, SqlError> {
        self.expect(&Token::LParen)?;
        let mut values = Vec::new();
        if !self.eat(&Token::RParen) {
            loop {
                values.push(self.expr()?);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
            self.expect(&Token::RParen)?;
        }
        Ok(values)
    }

    fn insert(&mut self) -> Result<Statement, SqlError> {
        self.expect_keyword("into")?;
        let table = self.object_name()?;
        let (columns, values) = if self.eat_keyword("default") {
            self.expect_keyword("values")?;
            (Some(Vec::new()), Vec::new())
        } else {
            let columns = if self.eat(&Token::LParen) {
                let mut columns = Vec::new();
                if !self.eat(&Token::RParen) {
                    loop {
                        columns.push(self.column_ref()?);
                        if !self.eat(&Token::Comma) {
                            break;
                        }
                    }
                    self.expect(&Token::RParen)?;
                }
                Some(columns)
            } else {
                None
            };
            self.expect_keyword("values")?;
            (columns, self.expr_list()?)
        };

        let returning = if self.eat_keyword("returning") {
            Some(Returning::Column(self.column_ref()?))
        } else {
            self.eat(&Token::Semicolon);
            if self.eat_keyword("select") || self.eat_keyword("call") {
                Some(Returning::Select(self.select()?))
            } else {
                None
            }
        };
        Ok(Statement::Insert {
            table,
            columns,
            values,
            returning,
        })
    }

    fn select(&mut self) -> Result<Select, SqlError> {
        let projection = self.projection()?;
        let mut from = None;
        let mut filter = Vec::new();
        if self.eat_keyword("from") {
            from = Some(self.object_name()?);
            if self.eat_keyword("with") {
                self.skip_group()?;
            }
            // optional alias
            if let Token::Word(w) = self.peek() {
                if !["where", "for", "with"]
                    .iter()
                    .any(|k| w.eq_ignore_ascii_case(k))
                {
                    self.advance();
                }
            }
            if self.eat_keyword("with") {
                self.skip_group()?;
            }
            if self.eat_keyword("where") {
                filter = self.conditions()?;
            }
            if self.eat_keyword("for") {
                self.expect_keyword("update")?;
            }
        }
        if from.is_none() && matches!(projection, Projection::Columns(_) | Projection::Max(_)) {
            return Err(syntax("select of columns needs a 'from' clause"));
        }
        Ok(Select {
            projection,
            from,
            filter,
        })
    }

    fn projection(&mut self) -> Result<Projection, SqlError> {
        if self.is_keyword("next") && matches!(self.peek_at(1), Token::Word(w) if w.eq_ignore_ascii_case("value"))
        {
            self.advance();
            self.advance();
            self.expect_keyword("for")?;
            return Ok(Projection::NextValue(self.object_name()?));
        }
        if self.eat(&Token::Star) {
            return Ok(Projection::Columns(vec!["*".to_owned()]));
        }
        if let (Token::Word(function), Token::LParen) = (self.peek(), self.peek_at(1)) {
            let function = function.to_ascii_lowercase();
            self.advance();
            self.advance();
            let projection = match function.as_str() {
                "nextval" => match self.advance() {
                    Token::Str(name) => Projection::NextValue(name.to_ascii_lowercase()),
                    other => return Err(syntax(format!("expected sequence name, found {other:?}"))),
                },
                "max" => Projection::Max(self.column_ref()?),
                "identity" | "lastval" | "last_insert_id" | "scope_identity" => {
                    Projection::Identity
                }
                "uuid" | "newid" | "random_uuid" | "gen_random_uuid" => Projection::Guid,
                other => return Err(syntax(format!("unsupported function {other}()"))),
            };
            self.expect(&Token::RParen)?;
            self.skip_alias()?;
            return Ok(projection);
        }
        let mut columns = Vec::new();
        loop {
            columns.push(self.column_ref()?);
            self.skip_alias()?;
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        Ok(Projection::Columns(columns))
    }

    fn skip_alias(&mut self) -> Result<(), SqlError> {
        if self.eat_keyword("as") {
            self.identifier()?;
        }
        Ok(())
    }

    fn conditions(&mut self) -> Result<Vec<(String, Expr)>, SqlError> {
        let mut conditions = Vec::new();
        loop {
            let column = self.column_ref()?;
            self.expect(&Token::Eq)?;
            conditions.push((column, self.expr()?));
            if !self.eat_keyword("and") {
                return Ok(conditions);
            }
        }
    }

    fn update(&mut self) -> Result<Statement, SqlError> {
        let table = self.object_name()?;
        self.expect_keyword("set")?;
        let mut assignments = Vec::new();
        loop {
            let column = self.column_ref()?;
            self.expect(&Token::Eq)?;
            assignments.push((column, self.expr()?));
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        let filter = if self.eat_keyword("where") {
            self.conditions()?
        } else {
            Vec::new()
        };
        Ok(Statement::Update {
            table,
            assignments,
            filter,
        })
    }
}

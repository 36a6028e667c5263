//! Parser for the declarative module subset.
//!
//! A referenced application module may contain imports (ignored),
//! comments, and top-level assignments whose right-hand sides are
//! component constructor calls, literals, lists, and references to
//! earlier bindings. Anything outside the subset is a parse error.

/// A module parse failure, located by source line.
#[derive(Debug, Clone)]
pub struct ModuleParseError {
    pub line: usize,
    pub message: String,
}

impl ModuleParseError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        ModuleParseError {
            line,
            message: message.into(),
        }
    }
}

/// A top-level module statement.
#[derive(Debug, Clone)]
pub enum Statement {
    /// `name = expr`
    Assign {
        name: String,
        expr: Expr,
        line: usize,
    },
    /// `target.attr = expr` (in practice: `app.layout = ...`)
    AttrAssign {
        target: String,
        attr: String,
        expr: Expr,
        line: usize,
    },
}

impl Statement {
    pub fn line(&self) -> usize {
        match self {
            Statement::Assign { line, .. } => *line,
            Statement::AttrAssign { line, .. } => *line,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Expr {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    None,
    /// Reference to an earlier top-level binding.
    Name(String),
    List(Vec<Expr>),
    /// A constructor call: `html.Div(...)`, or unqualified `Dash(...)`.
    Call {
        module: Option<String>,
        name: String,
        args: Vec<Expr>,
        kwargs: Vec<(String, Expr)>,
    },
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse module source into top-level statements.
pub fn parse_module(source: &str) -> Result<Vec<Statement>, ModuleParseError> {
    let mut statements = Vec::new();

    for (line, text) in logical_lines(source) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            continue;
        }
        // Imports are accepted and ignored; the evaluator resolves
        // component modules by name.
        if trimmed.starts_with("import ") || trimmed.starts_with("from ") {
            continue;
        }
        statements.push(parse_statement(trimmed, line)?);
    }

    Ok(statements)
}

// ---------------------------------------------------------------------------
// Logical lines
// ---------------------------------------------------------------------------

/// Split source into logical statements: a physical line joins the next
/// while parens/brackets are open or a string is unterminated. Comments
/// are stripped. Each entry carries its starting 1-based line number.
fn logical_lines(source: &str) -> Vec<(usize, String)> {
    let chars: Vec<char> = source.chars().collect();
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut start_line = 1usize;
    let mut line_no = 1usize;
    let mut depth = 0u32;
    let mut string: Option<char> = None;
    let mut triple = false;
    let mut escape = false;
    let mut comment = false;

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];

        if c == '\n' {
            line_no += 1;
            comment = false;
            if depth == 0 && string.is_none() {
                if current.trim().is_empty() {
                    current.clear();
                } else {
                    lines.push((start_line, std::mem::take(&mut current)));
                }
                start_line = line_no;
            } else {
                current.push('\n');
            }
            i += 1;
            continue;
        }

        if comment {
            i += 1;
            continue;
        }

        if let Some(quote) = string {
            current.push(c);
            if escape {
                escape = false;
            } else if c == '\\' {
                escape = true;
            } else if c == quote {
                if triple {
                    if chars.get(i + 1) == Some(&quote) && chars.get(i + 2) == Some(&quote) {
                        current.push(quote);
                        current.push(quote);
                        i += 2;
                        string = None;
                        triple = false;
                    }
                } else {
                    string = None;
                }
            }
            i += 1;
            continue;
        }

        match c {
            '#' => comment = true,
            '\'' | '"' => {
                current.push(c);
                if chars.get(i + 1) == Some(&c) && chars.get(i + 2) == Some(&c) {
                    current.push(c);
                    current.push(c);
                    i += 2;
                    triple = true;
                }
                string = Some(c);
            }
            '(' | '[' => {
                depth += 1;
                current.push(c);
            }
            ')' | ']' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            _ => current.push(c),
        }
        i += 1;
    }

    if !current.trim().is_empty() {
        lines.push((start_line, current));
    }

    lines
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Int(i64),
    Float(f64),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Eq,
}

fn tokenize(text: &str, line: usize) -> Result<Vec<Token>, ModuleParseError> {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < len {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\n' | '\r' => {
                i += 1;
            }

            '\'' | '"' => {
                let quote = c;
                let triple = chars.get(i + 1) == Some(&quote) && chars.get(i + 2) == Some(&quote);
                i += if triple { 3 } else { 1 };
                let mut s = String::new();
                loop {
                    if i >= len {
                        return Err(ModuleParseError::new(line, "unterminated string literal"));
                    }
                    let c = chars[i];
                    if c == '\\' {
                        let next = chars.get(i + 1).copied().ok_or_else(|| {
                            ModuleParseError::new(line, "unterminated string literal")
                        })?;
                        s.push(match next {
                            'n' => '\n',
                            't' => '\t',
                            'r' => '\r',
                            other => other,
                        });
                        i += 2;
                        continue;
                    }
                    if c == quote {
                        if !triple {
                            i += 1;
                            break;
                        }
                        if chars.get(i + 1) == Some(&quote) && chars.get(i + 2) == Some(&quote) {
                            i += 3;
                            break;
                        }
                    }
                    s.push(c);
                    i += 1;
                }
                tokens.push(Token::Str(s));
            }

            '0'..='9' => {
                let start = i;
                let mut is_float = false;
                while i < len && (chars[i].is_ascii_digit() || chars[i] == '.' || chars[i] == '_') {
                    if chars[i] == '.' {
                        is_float = true;
                    }
                    i += 1;
                }
                let text: String = chars[start..i].iter().filter(|c| **c != '_').collect();
                tokens.push(parse_number(&text, is_float, line)?);
            }

            '-' if chars.get(i + 1).is_some_and(|c| c.is_ascii_digit()) => {
                let start = i;
                i += 1;
                let mut is_float = false;
                while i < len && (chars[i].is_ascii_digit() || chars[i] == '.' || chars[i] == '_') {
                    if chars[i] == '.' {
                        is_float = true;
                    }
                    i += 1;
                }
                let text: String = chars[start..i].iter().filter(|c| **c != '_').collect();
                tokens.push(parse_number(&text, is_float, line)?);
            }

            'a'..='z' | 'A'..='Z' | '_' => {
                let start = i;
                while i < len && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }

            '(' => {
                i += 1;
                tokens.push(Token::LParen);
            }
            ')' => {
                i += 1;
                tokens.push(Token::RParen);
            }
            '[' => {
                i += 1;
                tokens.push(Token::LBracket);
            }
            ']' => {
                i += 1;
                tokens.push(Token::RBracket);
            }
            ',' => {
                i += 1;
                tokens.push(Token::Comma);
            }
            '.' => {
                i += 1;
                tokens.push(Token::Dot);
            }
            '=' => {
                if chars.get(i + 1) == Some(&'=') {
                    return Err(ModuleParseError::new(line, "unsupported operator '=='"));
                }
                i += 1;
                tokens.push(Token::Eq);
            }

            other => {
                return Err(ModuleParseError::new(
                    line,
                    format!("unexpected character '{}'", other),
                ));
            }
        }
    }

    Ok(tokens)
}

fn parse_number(text: &str, is_float: bool, line: usize) -> Result<Token, ModuleParseError> {
    if is_float {
        text.parse::<f64>()
            .map(Token::Float)
            .map_err(|_| ModuleParseError::new(line, format!("invalid number '{}'", text)))
    } else {
        text.parse::<i64>()
            .map(Token::Int)
            .map_err(|_| ModuleParseError::new(line, format!("invalid number '{}'", text)))
    }
}

// ---------------------------------------------------------------------------
// Statement parser
// ---------------------------------------------------------------------------

fn parse_statement(text: &str, line: usize) -> Result<Statement, ModuleParseError> {
    let tokens = tokenize(text, line)?;
    let mut parser = StatementParser {
        tokens,
        pos: 0,
        line,
    };
    parser.parse()
}

struct StatementParser {
    tokens: Vec<Token>,
    pos: usize,
    line: usize,
}

impl StatementParser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn error(&self, message: impl Into<String>) -> ModuleParseError {
        ModuleParseError::new(self.line, message)
    }

    fn expect_ident(&mut self) -> Result<String, ModuleParseError> {
        match self.advance() {
            Some(Token::Ident(name)) => Ok(name),
            _ => Err(self.error("expected identifier")),
        }
    }

    fn expect(&mut self, token: Token, what: &str) -> Result<(), ModuleParseError> {
        match self.advance() {
            Some(t) if t == token => Ok(()),
            _ => Err(self.error(format!("expected {}", what))),
        }
    }

    fn parse(&mut self) -> Result<Statement, ModuleParseError> {
        let target = self.expect_ident().map_err(|_| {
            self.error("unsupported statement (only top-level assignments are recognized)")
        })?;

        let statement = match self.peek() {
            Some(Token::Eq) => {
                self.advance();
                let expr = self.parse_expr()?;
                Statement::Assign {
                    name: target,
                    expr,
                    line: self.line,
                }
            }
            Some(Token::Dot) => {
                self.advance();
                let attr = self.expect_ident()?;
                self.expect(Token::Eq, "'='")?;
                let expr = self.parse_expr()?;
                Statement::AttrAssign {
                    target,
                    attr,
                    expr,
                    line: self.line,
                }
            }
            _ => {
                return Err(
                    self.error("unsupported statement (only top-level assignments are recognized)")
                );
            }
        };

        if self.pos < self.tokens.len() {
            return Err(self.error("unexpected tokens after assignment"));
        }
        Ok(statement)
    }

    fn parse_expr(&mut self) -> Result<Expr, ModuleParseError> {
        match self.advance() {
            Some(Token::Str(s)) => Ok(Expr::Str(s)),
            Some(Token::Int(n)) => Ok(Expr::Int(n)),
            Some(Token::Float(n)) => Ok(Expr::Float(n)),
            Some(Token::LBracket) => self.parse_list(),
            Some(Token::Ident(name)) => match name.as_str() {
                "True" => Ok(Expr::Bool(true)),
                "False" => Ok(Expr::Bool(false)),
                "None" => Ok(Expr::None),
                _ => self.parse_name_or_call(name),
            },
            _ => Err(self.error("expected expression")),
        }
    }

    fn parse_list(&mut self) -> Result<Expr, ModuleParseError> {
        let mut items = Vec::new();
        loop {
            match self.peek() {
                Some(Token::RBracket) => {
                    self.advance();
                    break;
                }
                Some(_) => {
                    items.push(self.parse_expr()?);
                    match self.peek() {
                        Some(Token::Comma) => {
                            self.advance();
                        }
                        Some(Token::RBracket) => {}
                        _ => return Err(self.error("expected ',' or ']' in list")),
                    }
                }
                None => return Err(self.error("unterminated list")),
            }
        }
        Ok(Expr::List(items))
    }

    /// `name`, `name(...)`, or `module.Name(...)`.
    fn parse_name_or_call(&mut self, first: String) -> Result<Expr, ModuleParseError> {
        let (module, name) = match self.peek() {
            Some(Token::Dot) => {
                self.advance();
                let attr = self.expect_ident()?;
                (Some(first), attr)
            }
            _ => (None, first),
        };

        if self.peek() != Some(&Token::LParen) {
            if let Some(module) = module {
                return Err(self.error(format!(
                    "attribute access '{}.{}' is only valid in a constructor call",
                    module, name
                )));
            }
            return Ok(Expr::Name(name));
        }
        self.advance();

        let mut args = Vec::new();
        let mut kwargs: Vec<(String, Expr)> = Vec::new();
        loop {
            match self.peek() {
                Some(Token::RParen) => {
                    self.advance();
                    break;
                }
                Some(_) => {
                    if let Some(Token::Ident(key)) = self.peek()
                        && self.tokens.get(self.pos + 1) == Some(&Token::Eq)
                    {
                        let key = key.clone();
                        self.advance();
                        self.advance();
                        let value = self.parse_expr()?;
                        if kwargs.iter().any(|(k, _)| *k == key) {
                            return Err(self.error(format!("duplicate keyword argument '{}'", key)));
                        }
                        kwargs.push((key, value));
                    } else {
                        if !kwargs.is_empty() {
                            return Err(
                                self.error("positional argument follows keyword argument")
                            );
                        }
                        args.push(self.parse_expr()?);
                    }
                    match self.peek() {
                        Some(Token::Comma) => {
                            self.advance();
                        }
                        Some(Token::RParen) => {}
                        _ => return Err(self.error("expected ',' or ')' in argument list")),
                    }
                }
                None => return Err(self.error("unterminated argument list")),
            }
        }

        Ok(Expr::Call {
            module,
            name,
            args,
            kwargs,
        })
    }
}

/// The expression_parser module compiles a free-text search query into a `ParsedExpression`.
///
/// The grammar, loosely:
///
/// ```text
/// expression := term*
/// term       := ["-"] literal | "OR" | "AND"
/// literal    := word | "quoted words" | field ":" value | field ":>" value | field ":<" value
/// ```
///
/// Consecutive literals are ANDed. `OR` joins the literal before it and the literal after it into
/// the same group. `AND` is only there for readability. A lone `-` negates the next literal, as does
/// a leading `-` on an unquoted word.
///
/// Parsing happens in two steps. `tokenize` splits the input into a flat token stream, respecting
/// quotes, and classifies each token. `parse_expression` then folds the stream into OR-groups in a
/// single pass. Neither step can fail: an unterminated quote is closed at the end of input, a field
/// prefix with nothing after it is dropped, and a field name that is not a column turns the term
/// into a plain text literal.
use crate::column::Column;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Comparator {
    /// Substring match on text columns, equality on numeric columns.
    #[default]
    Contains,
    Greater,
    Less,
}

impl Comparator {
    /// The separator that introduces a value with this comparator in a field-scoped term.
    pub fn suffix(&self) -> &'static str {
        match self {
            Comparator::Contains => ":",
            Comparator::Greater => ":>",
            Comparator::Less => ":<",
        }
    }

    fn from_leading(s: &str) -> (Comparator, &str) {
        if let Some(rest) = s.strip_prefix('>') {
            (Comparator::Greater, rest)
        } else if let Some(rest) = s.strip_prefix('<') {
            (Comparator::Less, rest)
        } else {
            (Comparator::Contains, s)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Word { text: String, quoted: bool },
    /// `field:`, `field:>` or `field:<`, with the value following as the next token.
    FieldPrefix { field: String, comparator: Comparator },
    Or,
    And,
    Minus,
}

impl Token {
    fn classify(word: String) -> Token {
        match word.as_str() {
            "OR" => return Token::Or,
            "AND" => return Token::And,
            "-" => return Token::Minus,
            _ => {}
        }
        for comparator in [Comparator::Greater, Comparator::Less, Comparator::Contains] {
            if let Some(field) = word.strip_suffix(comparator.suffix()) {
                return Token::FieldPrefix { field: field.to_string(), comparator };
            }
        }
        Token::Word { text: word, quoted: false }
    }

    /// The token as it appeared in the input, minus any quotes.
    fn raw(&self) -> String {
        match self {
            Token::Word { text, .. } => text.clone(),
            Token::FieldPrefix { field, comparator } => format!("{}{}", field, comparator.suffix()),
            Token::Or => "OR".to_string(),
            Token::And => "AND".to_string(),
            Token::Minus => "-".to_string(),
        }
    }
}

/// Splits `expression` on whitespace outside of quotes. A quote always ends the current word, so
/// `a"b c"d` is three tokens. Empty quotes produce an empty quoted word.
pub fn tokenize(expression: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    let mut chars = expression.chars();

    while let Some(c) = chars.next() {
        if c == '"' {
            if !word.is_empty() {
                tokens.push(Token::classify(std::mem::take(&mut word)));
            }
            // Runs to the closing quote, or to the end of input when there is none.
            let quoted: String = chars.by_ref().take_while(|&c| c != '"').collect();
            tokens.push(Token::Word { text: quoted, quoted: true });
        } else if c.is_whitespace() {
            if !word.is_empty() {
                tokens.push(Token::classify(std::mem::take(&mut word)));
            }
        } else {
            word.push(c);
        }
    }
    if !word.is_empty() {
        tokens.push(Token::classify(word));
    }
    tokens
}

/// One matchable term. `field` is None for terms matched against the caller's default columns, in
/// which case `comparator` is always `Contains`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub field: Option<Column>,
    pub comparator: Comparator,
    pub negated: bool,
    pub value: String,
}

impl Literal {
    pub fn text(value: impl Into<String>) -> Self {
        Literal {
            field: None,
            comparator: Comparator::Contains,
            negated: false,
            value: value.into(),
        }
    }

    pub fn scoped(field: Column, comparator: Comparator, value: impl Into<String>) -> Self {
        Literal {
            field: Some(field),
            comparator,
            negated: false,
            value: value.into(),
        }
    }

    pub fn negate(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    /// Reads an unquoted word such as `rock`, `-rock`, `year:>2000` or `-genre:rock`.
    fn from_word(word: &str) -> Literal {
        let (negated, word) = match word.strip_prefix('-') {
            Some(rest) if !rest.is_empty() => (true, rest),
            _ => (false, word),
        };
        let mut literal = match word.find(':') {
            Some(i) if i > 0 => match Column::from_exact_name(&word[..i]) {
                Some(column) => {
                    let (comparator, value) = Comparator::from_leading(&word[i + 1..]);
                    Literal::scoped(column, comparator, value)
                }
                None => Literal::text(word),
            },
            _ => Literal::text(word),
        };
        literal.negated = negated;
        literal
    }

    /// Reads the value that followed a `field:` prefix. A quoted value is taken verbatim.
    fn from_prefixed(field: &str, comparator: Comparator, value: &Token) -> Literal {
        let (negated, field) = match field.strip_prefix('-') {
            Some(rest) if !rest.is_empty() => (true, rest),
            _ => (false, field),
        };
        let raw = value.raw();
        let mut literal = match Column::from_exact_name(field) {
            Some(column) => match value {
                Token::Word { quoted: true, .. } => Literal::scoped(column, comparator, raw),
                _ if comparator == Comparator::Contains => {
                    let (comparator, rest) = Comparator::from_leading(&raw);
                    Literal::scoped(column, comparator, rest)
                }
                _ => Literal::scoped(column, comparator, raw),
            },
            None => Literal::text(format!("{}{}{}", field, comparator.suffix(), raw)),
        };
        literal.negated = negated;
        literal
    }
}

/// Whether `value` would read back differently if written without quotes.
fn needs_quotes(value: &str) -> bool {
    value.is_empty()
        || value.contains(|c: char| c.is_whitespace() || c == ':')
        || value.starts_with(['-', '>', '<'])
        || value == "OR"
        || value == "AND"
}

fn write_value(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    if needs_quotes(value) {
        write!(f, "\"{}\"", value)
    } else {
        write!(f, "{}", value)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "-")?;
        }
        if let Some(field) = self.field {
            write!(f, "{}{}", field, self.comparator.suffix())?;
        }
        write_value(f, &self.value)
    }
}

/// Literals of which at least one has to match.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrGroup(pub Vec<Literal>);

impl OrGroup {
    pub fn literals(&self) -> &[Literal] {
        &self.0
    }
}

impl fmt::Display for OrGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, literal) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " OR ")?;
            }
            write!(f, "{}", literal)?;
        }
        Ok(())
    }
}

/// OR-groups of which all have to match. An empty expression matches everything.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedExpression(pub Vec<OrGroup>);

impl ParsedExpression {
    pub fn groups(&self) -> &[OrGroup] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The normalized query text. Parsing it again gives back an equal expression.
impl fmt::Display for ParsedExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, group) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", group)?;
        }
        Ok(())
    }
}

pub fn parse_expression(expression: &str) -> ParsedExpression {
    let mut groups: Vec<OrGroup> = Vec::new();
    let mut current: Vec<Literal> = Vec::new();
    let mut prefix: Option<(String, Comparator)> = None;
    let mut or_next = false;
    let mut negate_next = false;

    for token in tokenize(expression) {
        let literal = match (prefix.take(), token) {
            // Whatever follows a field prefix is its value, keywords included.
            (Some((field, comparator)), token) => Literal::from_prefixed(&field, comparator, &token),
            (None, Token::Word { text, quoted: true }) => Literal::text(text),
            (None, Token::Word { text, quoted: false }) => Literal::from_word(&text),
            (None, Token::FieldPrefix { field, comparator }) => {
                prefix = Some((field, comparator));
                continue;
            }
            (None, Token::Or) => {
                or_next = true;
                continue;
            }
            (None, Token::Minus) => {
                negate_next = true;
                continue;
            }
            (None, Token::And) => {
                or_next = false;
                continue;
            }
        };

        if !or_next && !current.is_empty() {
            groups.push(OrGroup(std::mem::take(&mut current)));
        }
        or_next = false;
        current.push(if std::mem::take(&mut negate_next) { literal.negate() } else { literal });
    }
    if !current.is_empty() {
        groups.push(OrGroup(current));
    }

    let parsed = ParsedExpression(groups);
    tracing::debug!("Parsed search expression raw={} as expression={:?}", expression, parsed);
    parsed
}

use std::ops::Range;

use chrono::{NaiveTime, Timelike};
use winnow::ascii::digit1;
use winnow::combinator::{
    alt, cut_err, eof, fail, not, opt, preceded, separated_pair, terminated,
};
use winnow::error::{AddContext, ErrMode, FromExternalError, ParserError};
use winnow::prelude::*;
use winnow::stream::{LocatingSlice, Location, Stream};
use winnow::token::{any, rest, take_while};

use crate::types::{Attribute, Condition, Operator, Pattern, Value, ValueGrammar};

use super::error::{ParseError, ParseErrorKind};

type Input<'i> = LocatingSlice<&'i str>;
type PResult<O> = ModalResult<O, GrammarError>;

// -- Errors -----------------------------------------------------------------

/// Error threaded through the grammar: the typed kind once a parser has
/// named one, and the byte span it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
struct GrammarError {
    kind: Option<ParseErrorKind>,
    span: Range<usize>,
}

impl GrammarError {
    fn new(kind: ParseErrorKind, span: Range<usize>) -> Self {
        Self {
            kind: Some(kind),
            span,
        }
    }

    fn into_parse_error(self) -> ParseError {
        ParseError::new(
            self.kind.unwrap_or(ParseErrorKind::TrailingInput),
            self.span,
        )
    }
}

impl<'i> ParserError<Input<'i>> for GrammarError {
    type Inner = Self;

    /// Spans the next character, or nothing at the end of input.
    fn from_input(input: &Input<'i>) -> Self {
        let start = offset(input);
        let width = input.chars().next().map_or(0, char::len_utf8);
        Self {
            kind: None,
            span: start..start + width,
        }
    }

    fn into_inner(self) -> Result<Self::Inner, Self> {
        Ok(self)
    }
}

/// `.context(kind)` names a failure that no inner parser has named yet.
impl<'i> AddContext<Input<'i>, ParseErrorKind> for GrammarError {
    fn add_context(
        mut self,
        _input: &Input<'i>,
        _token_start: &<Input<'i> as Stream>::Checkpoint,
        context: ParseErrorKind,
    ) -> Self {
        if self.kind.is_none() {
            self.kind = Some(context);
        }
        self
    }
}

impl<'i> FromExternalError<Input<'i>, GrammarError> for GrammarError {
    fn from_external_error(_input: &Input<'i>, err: GrammarError) -> Self {
        err
    }
}

fn cut(kind: ParseErrorKind, span: Range<usize>) -> ErrMode<GrammarError> {
    ErrMode::Cut(GrammarError::new(kind, span))
}

fn offset(input: &Input<'_>) -> usize {
    Location::current_token_start(input)
}

// -- Lexical primitives -----------------------------------------------------

fn ws<'i>(input: &mut Input<'i>) -> PResult<&'i str> {
    take_while(0.., |c: char| c.is_whitespace()).parse_next(input)
}

fn word<'i>(input: &mut Input<'i>) -> PResult<&'i str> {
    take_while(1.., |c: char| !c.is_whitespace()).parse_next(input)
}

/// The rest of the input without trailing whitespace.
fn rest_of_line<'i>(input: &mut Input<'i>) -> PResult<&'i str> {
    rest.map(str::trim_end).parse_next(input)
}

fn attribute_name<'i>(input: &mut Input<'i>) -> PResult<&'i str> {
    take_while(1.., |c: char| c.is_ascii_lowercase() || c == '-').parse_next(input)
}

fn git_branch<'i>(input: &mut Input<'i>) -> PResult<&'i str> {
    take_while(1.., |c: char| {
        !matches!(c, '~' | '^' | ':' | ' ' | '[' | ']' | '\\')
    })
    .parse_next(input)
}

fn login<'i>(input: &mut Input<'i>) -> PResult<&'i str> {
    take_while(1.., |c: char| {
        c.is_ascii_alphanumeric() || matches!(c, '-' | '[' | ']')
    })
    .parse_next(input)
}

fn team<'i>(input: &mut Input<'i>) -> PResult<&'i str> {
    ('@', login, opt(('/', login))).take().parse_next(input)
}

fn login_or_team<'i>(input: &mut Input<'i>) -> PResult<&'i str> {
    alt((team, login)).parse_next(input)
}

/// A `"..."` or `'...'` string. Decodes exactly the escapes
/// [`Value`]'s `Display` writes.
fn quoted(input: &mut Input<'_>) -> PResult<String> {
    let start = offset(input);
    let quote = alt(('"', '\'')).parse_next(input)?;
    let mut s = String::new();
    loop {
        let Some(ch) = opt(any).parse_next(input)? else {
            return Err(cut(ParseErrorKind::UnterminatedQuote, start..offset(input)));
        };
        match ch {
            c if c == quote => return Ok(s),
            '\\' => {
                let Some(esc) = opt(any).parse_next(input)? else {
                    return Err(cut(ParseErrorKind::UnterminatedQuote, start..offset(input)));
                };
                match esc {
                    '"' | '\'' | '\\' => s.push(esc),
                    'n' => s.push('\n'),
                    't' => s.push('\t'),
                    'r' => s.push('\r'),
                    '0' => s.push('\0'),
                    other => {
                        s.push('\\');
                        s.push(other);
                    }
                }
            }
            c => s.push(c),
        }
    }
}

// -- Operators --------------------------------------------------------------

fn prefix(input: &mut Input<'_>) -> PResult<bool> {
    alt(('-'.value(true), '¬'.value(true), '+'.value(false))).parse_next(input)
}

fn equality_operator(input: &mut Input<'_>) -> PResult<Operator> {
    alt((
        "==".value(Operator::Eq),
        "!=".value(Operator::Ne),
        "≠".value(Operator::Ne),
        '='.value(Operator::Eq),
        ':'.value(Operator::Eq),
    ))
    .parse_next(input)
}

fn range_operator(input: &mut Input<'_>) -> PResult<Operator> {
    alt((
        ">=".value(Operator::Ge),
        "≥".value(Operator::Ge),
        "<=".value(Operator::Le),
        "≤".value(Operator::Le),
        '>'.value(Operator::Gt),
        '<'.value(Operator::Lt),
    ))
    .parse_next(input)
}

fn operator(input: &mut Input<'_>) -> PResult<Operator> {
    alt((
        "~=".value(Operator::Regex),
        equality_operator,
        range_operator,
    ))
    .parse_next(input)
}

// -- Values -----------------------------------------------------------------

fn regex_value<'i>(attribute: Attribute) -> impl Parser<Input<'i>, Value, ErrMode<GrammarError>> {
    rest_of_line
        .verify(|raw: &str| !raw.is_empty())
        .context(ParseErrorKind::ExpectedValue { attribute })
        .with_span()
        .try_map(|(raw, span): (&str, Range<usize>)| {
            Pattern::new(raw).map(Value::Pattern).map_err(|e| {
                GrammarError::new(
                    ParseErrorKind::InvalidRegex {
                        message: e.to_string(),
                    },
                    span.start..span.start + raw.len(),
                )
            })
        })
}

fn text_value<'i>(attribute: Attribute) -> impl Parser<Input<'i>, Value, ErrMode<GrammarError>> {
    alt((
        quoted.map(Value::Text),
        rest_of_line
            .verify(|raw: &str| !raw.is_empty())
            .map(|raw: &str| Value::Text(raw.to_owned())),
    ))
    .context(ParseErrorKind::ExpectedValue { attribute })
}

fn token_value<'i>(
    attribute: Attribute,
    token: fn(&mut Input<'i>) -> PResult<&'i str>,
) -> impl Parser<Input<'i>, Value, ErrMode<GrammarError>> {
    token
        .map(|s: &str| Value::Text(s.to_owned()))
        .context(ParseErrorKind::ExpectedValue { attribute })
}

/// A whole whitespace-delimited token of ASCII digits, so `4x` is one
/// malformed literal rather than `4` followed by stray input.
fn integer_value<'i>(attribute: Attribute) -> impl Parser<Input<'i>, Value, ErrMode<GrammarError>> {
    word.context(ParseErrorKind::ExpectedValue { attribute })
        .with_span()
        .try_map(|(text, span): (&str, Range<usize>)| {
            text.bytes()
                .all(|b| b.is_ascii_digit())
                .then(|| text.parse::<i64>().ok())
                .flatten()
                .map(Value::Int)
                .ok_or_else(|| GrammarError::new(ParseErrorKind::InvalidInteger, span))
        })
}

type Spanned<'i> = (&'i str, Range<usize>);

fn time_value<'i>(attribute: Attribute) -> impl Parser<Input<'i>, Value, ErrMode<GrammarError>> {
    preceded(
        not(eof).context(ParseErrorKind::ExpectedValue { attribute }),
        separated_pair(digit1.with_span(), ':', digit1.with_span())
            .context(ParseErrorKind::MalformedTime),
    )
    .try_map(|(hour, minute)| clock(hour, minute))
}

fn clock(
    (hour, hour_span): Spanned<'_>,
    (minute, minute_span): Spanned<'_>,
) -> Result<Value, GrammarError> {
    let whole_span = hour_span.start..minute_span.end;
    let malformed = || GrammarError::new(ParseErrorKind::MalformedTime, whole_span.clone());
    let hour: u32 = hour.parse().map_err(|_| malformed())?;
    let minute: u32 = minute.parse().map_err(|_| malformed())?;
    if hour >= 24 {
        return Err(GrammarError::new(
            ParseErrorKind::HourOutOfRange { hour },
            hour_span,
        ));
    }
    if minute >= 60 {
        return Err(GrammarError::new(
            ParseErrorKind::MinuteOutOfRange { minute },
            minute_span,
        ));
    }
    NaiveTime::from_hms_opt(hour, minute, 0)
        .map(Value::Time)
        .ok_or_else(malformed)
}

fn value<'i>(
    attribute: Attribute,
    grammar: ValueGrammar,
    op: Operator,
) -> impl Parser<Input<'i>, Value, ErrMode<GrammarError>> {
    move |input: &mut Input<'i>| {
        if op == Operator::Regex {
            return regex_value(attribute).parse_next(input);
        }
        match grammar {
            ValueGrammar::Text => text_value(attribute).parse_next(input),
            ValueGrammar::Branch => token_value(attribute, git_branch).parse_next(input),
            ValueGrammar::Milestone => token_value(attribute, word).parse_next(input),
            ValueGrammar::LoginOrTeam => token_value(attribute, login_or_team).parse_next(input),
            ValueGrammar::Integer => integer_value(attribute).parse_next(input),
            ValueGrammar::Time => time_value(attribute).parse_next(input),
            ValueGrammar::Boolean => fail::<_, Value, _>
                .context(ParseErrorKind::ExpectedOperator { attribute })
                .parse_next(input),
        }
    }
}

// -- Expression -------------------------------------------------------------

fn known_attribute(input: &mut Input<'_>) -> PResult<Attribute> {
    attribute_name
        .context(ParseErrorKind::ExpectedAttribute)
        .with_span()
        .try_map(|(name, span): (&str, Range<usize>)| {
            Attribute::from_name(name).ok_or_else(|| {
                GrammarError::new(
                    ParseErrorKind::UnknownAttribute {
                        name: name.to_owned(),
                    },
                    span,
                )
            })
        })
        .parse_next(input)
}

fn end_of_input(input: &mut Input<'_>) -> PResult<()> {
    ws.parse_next(input)?;
    if opt(eof).parse_next(input)?.is_some() {
        return Ok(());
    }
    let span = rest.span().parse_next(input)?;
    Err(cut(ParseErrorKind::TrailingInput, span))
}

/// `prefix? '#'? attribute (operator value)?`
fn expression(input: &mut Input<'_>) -> PResult<Condition> {
    let (sign, sign_span) = preceded(ws, opt(prefix).with_span()).parse_next(input)?;
    let (hash, hash_span) = preceded(ws, opt('#').with_span()).parse_next(input)?;
    let attribute = preceded(ws, cut_err(known_attribute)).parse_next(input)?;

    if sign.is_some() && !attribute.accepts_prefix() {
        return Err(cut(
            ParseErrorKind::PrefixNotAllowed { attribute },
            sign_span,
        ));
    }
    let quantified = hash.is_some();
    if quantified && !attribute.is_quantifiable() {
        return Err(cut(
            ParseErrorKind::QuantifierNotAllowed { attribute },
            hash_span,
        ));
    }
    let negated = sign.unwrap_or(false);
    ws.parse_next(input)?;

    if attribute.grammar() == ValueGrammar::Boolean {
        if let Some((operator, span)) = opt(operator.with_span()).parse_next(input)? {
            return Err(cut(
                ParseErrorKind::IncompatibleOperator {
                    attribute,
                    operator,
                },
                span,
            ));
        }
        return Ok(Condition::new(
            negated,
            false,
            attribute,
            Operator::Eq,
            Value::Bool(true),
        ));
    }

    let (op, op_span) = cut_err(operator.with_span())
        .context(ParseErrorKind::ExpectedOperator { attribute })
        .parse_next(input)?;
    let grammar = if quantified {
        ValueGrammar::Integer
    } else {
        attribute.grammar()
    };
    if !grammar.accepts(op) {
        return Err(cut(
            ParseErrorKind::IncompatibleOperator {
                attribute,
                operator: op,
            },
            op_span,
        ));
    }

    let value = preceded(ws, cut_err(value(attribute, grammar, op))).parse_next(input)?;
    Ok(Condition::new(negated, quantified, attribute, op, value))
}

pub(super) fn condition(source: &str) -> Result<Condition, ParseError> {
    if source.trim().is_empty() {
        return Err(ParseError::new(ParseErrorKind::Empty, 0..source.len()));
    }
    terminated(expression, end_of_input)
        .parse(LocatingSlice::new(source))
        .map_err(|err| err.into_inner().into_parse_error())
}

// -- Built conditions -------------------------------------------------------

fn whole<'i>(
    mut token: impl Parser<Input<'i>, &'i str, ErrMode<GrammarError>>,
    text: &'i str,
) -> bool {
    token.parse(LocatingSlice::new(text)).is_ok()
}

/// Checks a condition assembled outside the parser against the same rules
/// the parser enforces, so its rendering parses back to an equal node.
pub(crate) fn check(
    attribute: Attribute,
    quantified: bool,
    operator: Operator,
    value: &Value,
) -> Result<(), ParseErrorKind> {
    if quantified && !attribute.is_quantifiable() {
        return Err(ParseErrorKind::QuantifierNotAllowed { attribute });
    }
    let grammar = if quantified {
        ValueGrammar::Integer
    } else {
        attribute.grammar()
    };
    if !grammar.accepts(operator) {
        return Err(ParseErrorKind::IncompatibleOperator {
            attribute,
            operator,
        });
    }

    let valid = match (operator, grammar, value) {
        (Operator::Regex, _, v) => matches!(v, Value::Pattern(_)),
        (_, ValueGrammar::Text, Value::Text(_)) => true,
        (_, ValueGrammar::Branch, Value::Text(s)) => whole(git_branch, s),
        (_, ValueGrammar::Milestone, Value::Text(s)) => whole(word, s),
        (_, ValueGrammar::LoginOrTeam, Value::Text(s)) => whole(login_or_team, s),
        (_, ValueGrammar::Integer, Value::Int(n)) => *n >= 0,
        (_, ValueGrammar::Time, Value::Time(t)) => t.second() == 0 && t.nanosecond() == 0,
        _ => false,
    };
    if valid {
        return Ok(());
    }
    Err(match grammar {
        ValueGrammar::Integer => ParseErrorKind::InvalidInteger,
        ValueGrammar::Time => ParseErrorKind::MalformedTime,
        _ => ParseErrorKind::ExpectedValue { attribute },
    })
}

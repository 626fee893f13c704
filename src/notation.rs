use std::str::FromStr;

use derive_more::Display;
use nom::{
    IResult, Parser,
    branch::alt,
    character::complete::{char, digit1},
    combinator::{all_consuming, cut, map, opt},
    error::ErrorKind,
    sequence::preceded,
};
use serde::{Deserialize, Serialize};

use crate::dice::{DiceMode, DiceSpec};

/// What the parser was looking for when it gave up.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expected {
    #[display("a number")]
    Number,
    #[display("a number greater than zero")]
    NonZero,
    #[display("a smaller number")]
    Smaller,
    #[display("'d' or 'u'")]
    Mode,
    #[display("end of input")]
    End,
}

/// A notation string that does not match `[count] ('d'|'u') faces [offset]`.
///
/// The message is meant to be shown to the user as-is, next to the input
/// that produced it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[error("unexpected {} at position {position}: expected {expected}", describe_found(.found))]
pub struct ParseError {
    /// 0-based character index into the input.
    pub position: usize,
    /// Character at `position`, or `None` at end of input.
    pub found: Option<char>,
    pub expected: Expected,
}

fn describe_found(found: &Option<char>) -> String {
    match found {
        Some(c) => format!("{c:?}"),
        None => "end of input".to_string(),
    }
}

/// Parses a full dice notation string such as `d6`, `3d6+7` or `1u20-3`.
pub fn parse_dice(input: &str) -> Result<DiceSpec, ParseError> {
    let res = all_consuming(dice_spec).parse(input);

    match res {
        Ok((_, spec)) => {
            log::debug!("Parsed {input:?} as {spec}");
            Ok(spec)
        }
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => {
            let err = e.locate(input);
            log::debug!("Failed to parse {input:?}: {err}");
            Err(err)
        }
        Err(nom::Err::Incomplete(_)) => unreachable!("complete parsers never ask for more input"),
    }
}

impl FromStr for DiceSpec {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_dice(s)
    }
}

/// nom error carrying the unparsed remainder, turned into a [`ParseError`]
/// once the full input is known again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NotationError<'a> {
    remaining: &'a str,
    expected: Expected,
}

impl<'a> NotationError<'a> {
    fn new(remaining: &'a str, expected: Expected) -> Self {
        Self {
            remaining,
            expected,
        }
    }

    fn locate(self, input: &str) -> ParseError {
        // `remaining` is always a suffix of `input`
        let consumed = input.len().saturating_sub(self.remaining.len());
        ParseError {
            position: input[..consumed].chars().count(),
            found: self.remaining.chars().next(),
            expected: self.expected,
        }
    }
}

impl<'a> nom::error::ParseError<&'a str> for NotationError<'a> {
    fn from_error_kind(input: &'a str, kind: ErrorKind) -> Self {
        let expected = match kind {
            ErrorKind::Eof => Expected::End,
            ErrorKind::Char => Expected::Mode,
            _ => Expected::Number,
        };
        Self::new(input, expected)
    }

    fn append(_: &'a str, _: ErrorKind, other: Self) -> Self {
        other
    }
}

type PResult<'a, T> = IResult<&'a str, T, NotationError<'a>>;

fn dice_spec(input: &str) -> PResult<'_, DiceSpec> {
    let (input, (num_dice, mode, die, offset)) =
        (opt(positive), dice_mode, positive, opt(signed)).parse(input)?;

    Ok((
        input,
        DiceSpec {
            num_dice: num_dice.unwrap_or(1),
            mode,
            die,
            offset: offset.unwrap_or(0),
        },
    ))
}

fn dice_mode(input: &str) -> PResult<'_, DiceMode> {
    alt((
        map(char('d'), |_| DiceMode::Standard),
        map(char('u'), |_| DiceMode::Unique),
    ))
    .parse(input)
}

/// Unsigned digits. Once digits are present, overflow is a hard failure so
/// that an enclosing `opt` does not turn it into a misleading error later on.
fn digits<T: FromStr>(input: &str) -> PResult<'_, T> {
    let (rest, digits) = digit1(input)?;
    let value = digits
        .parse::<T>()
        .map_err(|_| nom::Err::Failure(NotationError::new(input, Expected::Smaller)))?;
    Ok((rest, value))
}

fn positive(input: &str) -> PResult<'_, u32> {
    let (rest, value) = digits::<u32>(input)?;
    if value == 0 {
        return Err(nom::Err::Failure(NotationError::new(
            input,
            Expected::NonZero,
        )));
    }
    Ok((rest, value))
}

fn signed(input: &str) -> PResult<'_, i32> {
    alt((
        preceded(char('+'), cut(digits::<i32>)),
        map(preceded(char('-'), cut(digits::<i32>)), |n: i32| -n),
        digits::<i32>,
    ))
    .parse(input)
}

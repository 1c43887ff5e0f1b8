use crate::error::TimelineError;
use crate::subtitle::{SubtitleEntry, Timestamp};

use std::time::Duration;

use anyhow::Context;
use log::{debug, warn};
use nom::bytes::complete::{tag, take_while, take_while1, take_while_m_n};
use nom::character::complete::{digit1, line_ending, multispace0, multispace1, space0, space1};
use nom::combinator::{map_res, opt};
use nom::error::{convert_error, ErrorKind, VerboseError};
use nom::multi::many_till;
use nom::sequence::terminated;
use nom::{branch::alt, error_position, Err, IResult};

/// Reads SRT data into entries, in file order.
///
/// Entries are not sorted or validated here: timing problems are reported
/// by the assembler, which knows which entry they belong to.
pub struct Parser;
impl Parser {
    pub fn new() -> Self {
        Self {}
    }

    pub fn parse(&mut self, input: &str) -> Result<Vec<SubtitleEntry>, anyhow::Error> {
        match srt_file(input) {
            Ok((_, entries)) => {
                debug!("Parsed {} subtitle entries", entries.len());
                Ok(entries)
            }
            Err(Err::Error(err)) | Err(Err::Failure(err)) => {
                let conv = convert_error(input, err);
                Err(TimelineError::Parse(conv)).context("Failed to parse SRT data")
            }
            Err(Err::Incomplete(_)) => {
                unreachable!("Incomplete data received by non-streaming parser.")
            }
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses a single `HH:MM:SS,mmm` timestamp, allowing surrounding whitespace.
pub fn parse_timestamp(input: &str) -> Result<Timestamp, TimelineError> {
    let trimmed = input.trim();
    match terminated(timestamp, end_of_file)(trimmed) {
        Ok((_, duration)) => Ok(Timestamp::from_duration(duration)),
        Err(Err::Error(err)) | Err(Err::Failure(err)) => {
            Err(TimelineError::Parse(convert_error(trimmed, err)))
        }
        Err(Err::Incomplete(_)) => Err(TimelineError::Parse(format!(
            "Incomplete timestamp: '{}'",
            trimmed
        ))),
    }
}

fn optional_bom(input: &str) -> IResult<&str, Option<&str>, VerboseError<&str>> {
    opt(tag("\u{FEFF}"))(input)
}

fn srt_file(input: &str) -> IResult<&str, Vec<SubtitleEntry>, VerboseError<&str>> {
    let (input, _) = optional_bom(input)?;
    let (input, entries) = all_subtitles(input)?;
    let (input, _) = end_of_file(input)?;
    Ok((input, entries))
}

/// Malformed blocks are skipped up to the next blank line. Parsing only
/// fails when not a single cue could be read.
fn all_subtitles(input: &str) -> IResult<&str, Vec<SubtitleEntry>, VerboseError<&str>> {
    let mut parsed = Vec::new();
    let mut first_error = None;
    let (mut input, _) = multispace0(input)?;
    while !input.is_empty() {
        match subtitle(input) {
            Ok((rem_input, entry)) => {
                parsed.push(entry);
                input = rem_input;
            }
            Err(err) => {
                warn!(
                    "Skipping malformed subtitle block starting with '{}'",
                    input.lines().next().unwrap_or_default().trim()
                );
                first_error.get_or_insert(err);
                input = skip_block(input);
            }
        }
        let (rem_input, _) = multispace0(input)?;
        input = rem_input;
    }
    match first_error {
        Some(err) if parsed.is_empty() => Err(err),
        _ => Ok((input, parsed)),
    }
}

/// Everything after the next blank line, or nothing if there is none.
fn skip_block(input: &str) -> &str {
    let mut rest = input;
    while let Some(pos) = rest.find('\n') {
        let line = &rest[..pos];
        rest = &rest[pos + 1..];
        if line.trim().is_empty() {
            return rest;
        }
    }
    ""
}

fn subtitle(input: &str) -> IResult<&str, SubtitleEntry, VerboseError<&str>> {
    let (input, _) = multispace0(input)?;
    let (input, index) = terminated(seq_num, multispace1)(input)?;
    let (input, (start, end)) = show_hide(input)?;
    // Some files carry position hints (`X1:40 X2:600 ...`) after the end time.
    let (input, _) = take_while(|c: char| c != '\n' && c != '\r')(input)?;
    let (input, _) = alt((line_ending, end_of_file))(input)?;
    let (input, lines) = sub_text(input)?;

    Ok((
        input,
        SubtitleEntry {
            index,
            start: Timestamp::from_duration(start),
            end: Timestamp::from_duration(end),
            text: lines.join("\n"),
        },
    ))
}

fn end_of_file(input: &str) -> IResult<&str, &str, VerboseError<&str>> {
    if input.is_empty() {
        Ok((input, input))
    } else {
        std::result::Result::Err(Err::Error(error_position!(input, ErrorKind::Eof)))
    }
}

fn sub_text(input: &str) -> IResult<&str, Vec<String>, VerboseError<&str>> {
    let line = terminated(
        take_while1(|c: char| c != '\n' && c != '\r'),
        alt((line_ending, end_of_file)),
    );

    let (input, (lines, _)) = many_till(line, alt((line_ending, end_of_file)))(input)?;

    Ok((
        input,
        lines.into_iter().map(|l| l.trim_end().to_string()).collect(),
    ))
}

fn show_hide(input: &str) -> IResult<&str, (Duration, Duration), VerboseError<&str>> {
    let (input, start) = timestamp(input)?;
    let (input, _) = space1(input)?;
    let (input, _) = tag("-->")(input)?;
    let (input, _) = space1(input)?;
    let (input, end) = timestamp(input)?;
    let (input, _) = space0(input)?;

    Ok((input, (start, end)))
}

fn timestamp(input: &str) -> IResult<&str, Duration, VerboseError<&str>> {
    const MILLIS_MIN: usize = 0;
    const MILLIS_MAX: usize = 3;
    let take_millis = || {
        map_res(
            take_while_m_n(MILLIS_MIN, MILLIS_MAX, |c: char| c.is_ascii_digit()),
            move |s: &str| {
                // `,2` is read as 200 ms: the field is right-padded to three digits.
                format!("{:0<3}", s).parse::<u64>()
            },
        )
    };

    const HMS_MIN: usize = 1;
    const HMS_MAX: usize = 2;
    let take_hms = || {
        map_res(
            take_while_m_n(HMS_MIN, HMS_MAX, |c: char| c.is_ascii_digit()),
            |s: &str| s.parse::<u64>(),
        )
    };

    let (input, hours) = map_res(digit1, |s: &str| s.parse::<u64>())(input)?;
    let (input, _) = tag(":")(input)?;
    let (input, minutes) = take_hms()(input)?;
    let (input, _) = tag(":")(input)?;
    let (input, seconds) = take_hms()(input)?;
    let (input, _) = alt((tag(","), tag(".")))(input)?;
    let (input, millis) = take_millis()(input)?;

    Ok((
        input,
        Duration::from_millis(
            millis + seconds * 1000 + minutes * 60 * 1000 + hours * 60 * 60 * 1000,
        ),
    ))
}

fn seq_num(input: &str) -> IResult<&str, usize, VerboseError<&str>> {
    map_res(digit1, |s: &str| s.parse())(input)
}

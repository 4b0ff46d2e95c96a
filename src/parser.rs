use chrono::NaiveDateTime;
use itertools::Itertools;
use log::{debug, warn};

use crate::{
    error::Error,
    transaction::{Label, TransactionRecord},
};

/// Lines per transaction in `chia wallet get_transactions` output.
pub const BLOCK_LEN: usize = 6;
/// A block with fewer lines than this ends the report.
const MIN_BLOCK_LEN: usize = 5;

const SEPARATOR: &str = ": ";
const CONFIRMED: &str = "Confirmed";
const WALLET_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const KOINLY_DATE_FORMAT: &str = "%m/%d/%y %H:%M";
const FIXED_POINT_DIGITS: usize = 10;

/// How to treat lines that do not look like the wallet's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// A line missing its `: ` separator yields the whole line as its value,
    /// and values that cannot be normalized are passed through unchanged.
    #[default]
    Lenient,
    /// The same situations are reported as errors.
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Options {
    pub mode: ParseMode,
    /// Rewrite `YYYY-MM-DD HH:MM:SS` dates as `MM/DD/YY HH:MM`.
    pub normalize_date: bool,
}

/// Value of a `key: value` line: everything after the last separator.
fn value_of(offset: usize, line: &str, mode: ParseMode) -> Result<&str, Error> {
    match line.rsplit_once(SEPARATOR) {
        Some((_, value)) => Ok(value),
        None if mode == ParseMode::Strict => Err(Error::MissingSeparator {
            offset,
            line: line.to_string(),
        }),
        None => {
            warn!("no `{}` in line `{}`, using the whole line", SEPARATOR, line);
            Ok(line)
        }
    }
}

/// A single line of a block, interpreted according to its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedLine<'a> {
    Id { tx_id: &'a str },
    Status { confirmed: bool },
    Amount { label: Label, amount: &'a str },
    Address(&'a str),
    CreatedAt(&'a str),
    Separator,
}

impl<'a> ParsedLine<'a> {
    pub fn parse(offset: usize, line: &'a str, mode: ParseMode) -> Result<Self, Error> {
        Ok(match offset {
            0 => ParsedLine::Id {
                tx_id: line.split_whitespace().last().unwrap_or_default(),
            },
            1 => ParsedLine::Status {
                confirmed: value_of(offset, line, mode)? == CONFIRMED,
            },
            // The kind word sits in the key (`Amount received: 1 XCH`),
            // so the label looks at the whole line.
            2 => ParsedLine::Amount {
                label: Label::classify(line),
                amount: value_of(offset, line, mode)?
                    .split_whitespace()
                    .next()
                    .unwrap_or_default(),
            },
            3 => ParsedLine::Address(value_of(offset, line, mode)?),
            4 => ParsedLine::CreatedAt(value_of(offset, line, mode)?),
            _ => ParsedLine::Separator,
        })
    }
}

/// Five or six consecutive lines of the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock<'a> {
    lines: Vec<&'a str>,
}

/// Fields of a confirmed block, before sign and address adjustments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<'a> {
    pub tx_id: &'a str,
    pub label: Label,
    pub amount: &'a str,
    pub address: &'a str,
    pub date: &'a str,
}

impl<'a> RawBlock<'a> {
    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }

    /// Returns `None` for blocks that are not confirmed yet.
    pub fn entry(&self, mode: ParseMode) -> Result<Option<Entry<'a>>, Error> {
        if let ParsedLine::Status { confirmed: false } = ParsedLine::parse(1, self.lines[1], mode)? {
            debug!("skipping unconfirmed transaction `{}`", self.lines[0]);
            return Ok(None);
        }

        let parse = |offset: usize| ParsedLine::parse(offset, self.lines[offset], mode);
        match (parse(0)?, parse(2)?, parse(3)?, parse(4)?) {
            (
                ParsedLine::Id { tx_id },
                ParsedLine::Amount { label, amount },
                ParsedLine::Address(address),
                ParsedLine::CreatedAt(date),
            ) => Ok(Some(Entry {
                tx_id,
                label,
                amount,
                address,
                date,
            })),
            other => unreachable!("offsets 0, 2, 3 and 4 parsed as {:?}", other),
        }
    }
}

impl Entry<'_> {
    pub fn into_record(self, options: Options) -> Result<TransactionRecord, Error> {
        let label = self.label;

        let mut amount = self.amount.to_string();
        if label == Label::Transfer && amount != "0" {
            amount.insert(0, '-');
        }
        if amount.to_lowercase().contains("e-") {
            amount = match fixed_point(&amount) {
                Some(fixed) => fixed,
                None if options.mode == ParseMode::Strict => {
                    return Err(Error::InvalidAmount(amount))
                }
                None => {
                    warn!("cannot expand amount `{}`, keeping it as is", amount);
                    amount
                }
            };
        }

        let date = if options.normalize_date {
            match koinly_date(self.date) {
                Some(date) => date,
                None if options.mode == ParseMode::Strict => {
                    return Err(Error::InvalidDate(self.date.to_string()))
                }
                None => {
                    warn!("cannot reformat date `{}`, keeping it as is", self.date);
                    self.date.to_string()
                }
            }
        } else {
            self.date.to_string()
        };

        // Mined coins come from the wallet's own address; everything else
        // keeps the address as the recipient.
        let (to_address, from_address) = match label {
            Label::Mining => (String::new(), self.address.to_string()),
            Label::BlockReward | Label::Transfer | Label::Unknown => {
                (self.address.to_string(), String::new())
            }
        };

        Ok(TransactionRecord::new(
            date,
            amount,
            label,
            self.tx_id.to_string(),
            to_address,
            from_address,
        ))
    }
}

/// Render a scientific-notation amount with exactly ten fractional digits.
/// Rounding applies to the parsed `f64`, not to the decimal text, so
/// `5e-11` becomes `0.0000000001`.
pub fn fixed_point(amount: &str) -> Option<String> {
    amount
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(|value| format!("{:.*}", FIXED_POINT_DIGITS, value))
}

pub fn koinly_date(date: &str) -> Option<String> {
    NaiveDateTime::parse_from_str(date, WALLET_DATE_FORMAT)
        .ok()
        .map(|date| date.format(KOINLY_DATE_FORMAT).to_string())
}

/// Iterator over the blocks of a report. Ends at the first block
/// shorter than five lines, even if more text follows.
/// A trailing `\r` is dropped from every line.
#[derive(Debug, Clone)]
pub struct Blocks<'a> {
    lines: std::str::Split<'a, char>,
    done: bool,
}

pub fn blocks(text: &str) -> Blocks<'_> {
    Blocks {
        lines: text.split('\n'),
        done: false,
    }
}

impl<'a> Iterator for Blocks<'a> {
    type Item = RawBlock<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let lines = self
            .lines
            .by_ref()
            .take(BLOCK_LEN)
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect_vec();
        if lines.len() < MIN_BLOCK_LEN {
            if lines.iter().any(|line| !line.is_empty()) {
                debug!("stopping at a truncated block of {} lines", lines.len());
            }
            self.done = true;
            return None;
        }
        Some(RawBlock { lines })
    }
}

/// Parse a whole report into records, in input order.
pub fn parse(
    text: &str,
    options: Options,
) -> impl Iterator<Item = Result<TransactionRecord, Error>> + '_ {
    blocks(text).filter_map(move |block| match block.entry(options.mode) {
        Ok(Some(entry)) => Some(entry.into_record(options)),
        Ok(None) => None,
        Err(error) => Some(Err(error)),
    })
}

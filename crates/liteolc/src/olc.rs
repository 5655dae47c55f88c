//! Open Location Code ("Plus Code") validation and decoding.
//!
//! Only full codes decode; short codes are structurally valid but carry no
//! absolute position and are rejected by [`decode`].

use thiserror::Error;

use crate::geo::LatLng;

pub const SEPARATOR: char = '+';
pub const PADDING: char = '0';

const SEPARATOR_POSITION: usize = 8;
const PAIR_CODE_LENGTH: usize = 10;
const MAX_DIGIT_COUNT: usize = 15;
const GRID_ROWS: usize = 5;
const GRID_COLUMNS: usize = 4;
const LATITUDE_MAX: f64 = 90.0;
const LONGITUDE_MAX: f64 = 180.0;

const ALPHABET: &[u8; 20] = b"23456789CFGHJMPQRVWX";

// Largest first-digit values that keep a code inside +/-90 and +/-180.
const FIRST_LATITUDE_DIGIT_MAX: usize = 8;
const FIRST_LONGITUDE_DIGIT_MAX: usize = 17;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OlcError {
  #[error("empty code")]
  Empty,
  #[error("missing, duplicated or misplaced '+' separator")]
  Separator,
  #[error("invalid '0' padding")]
  Padding,
  #[error("invalid character {0:?}")]
  Character(char),
  #[error("a single digit after the separator is not allowed")]
  DanglingDigit,
  #[error("not a full code")]
  NotFull,
}

/// The latitude/longitude rectangle a full code denotes, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CodeArea {
  pub south: f64,
  pub west: f64,
  pub north: f64,
  pub east: f64,
  pub code_length: usize,
}

impl CodeArea {
  pub fn center(&self) -> LatLng {
    return LatLng {
      lat: (self.south + (self.north - self.south) / 2.0).min(LATITUDE_MAX),
      lng: (self.west + (self.east - self.west) / 2.0).min(LONGITUDE_MAX),
    };
  }
}

struct Parsed {
  separator: usize,
  digits: Vec<usize>,
}

impl Parsed {
  fn is_full(&self) -> bool {
    return self.separator == SEPARATOR_POSITION
      && self.digits.first().is_some_and(|&d| d <= FIRST_LATITUDE_DIGIT_MAX)
      && self.digits.get(1).is_some_and(|&d| d <= FIRST_LONGITUDE_DIGIT_MAX);
  }
}

#[inline]
fn digit_value(c: char) -> Option<usize> {
  return ALPHABET.iter().position(|&b| b as char == c);
}

fn parse(code: &str) -> Result<Parsed, OlcError> {
  if code.is_empty() {
    return Err(OlcError::Empty);
  }
  let code = code.to_ascii_uppercase();

  let Some(separator) = code.find(SEPARATOR) else {
    return Err(OlcError::Separator);
  };
  if code[separator + 1..].contains(SEPARATOR) || separator > SEPARATOR_POSITION || separator % 2 != 0 {
    return Err(OlcError::Separator);
  }
  if code.len() - separator - 1 == 1 {
    return Err(OlcError::DanglingDigit);
  }

  // Padding is a single even-length run ending at the separator, and a
  // padded code carries nothing after the separator.
  if let Some(pad) = code.find(PADDING) {
    if pad == 0 || pad >= separator {
      return Err(OlcError::Padding);
    }
    let run = &code.as_bytes()[pad..separator];
    if run.iter().any(|&b| b != PADDING as u8)
      || run.len() % 2 != 0
      || run.len() > SEPARATOR_POSITION - 2
      || separator != code.len() - 1
    {
      return Err(OlcError::Padding);
    }
  }

  let mut digits = Vec::with_capacity(code.len() - 1);
  for (i, c) in code.chars().enumerate() {
    if i == separator || (c == PADDING && i < separator) {
      continue;
    }
    let Some(value) = digit_value(c) else {
      return Err(OlcError::Character(c));
    };
    digits.push(value);
  }
  return Ok(Parsed { separator, digits });
}

pub fn is_valid(code: &str) -> bool {
  return parse(code).is_ok();
}

pub fn is_short(code: &str) -> bool {
  return parse(code).is_ok_and(|p| p.separator < SEPARATOR_POSITION);
}

pub fn is_full(code: &str) -> bool {
  return parse(code).is_ok_and(|p| p.is_full());
}

/// Decodes a full code into the rectangle it denotes.
///
/// The first ten digits are latitude/longitude pairs at base-20 resolution;
/// digits eleven through fifteen refine the cell on a 4x5 grid. Digits past
/// fifteen carry no further precision and are ignored.
pub fn decode(code: &str) -> Result<CodeArea, OlcError> {
  let parsed = parse(code)?;
  if !parsed.is_full() {
    return Err(OlcError::NotFull);
  }

  let mut digits = parsed.digits;
  digits.truncate(MAX_DIGIT_COUNT);

  let mut south = -LATITUDE_MAX;
  let mut west = -LONGITUDE_MAX;
  let mut lat_resolution = 400.0;
  let mut lng_resolution = 400.0;

  let pairs = digits.len().min(PAIR_CODE_LENGTH);
  let mut i = 0;
  while i + 1 < pairs {
    lat_resolution /= 20.0;
    lng_resolution /= 20.0;
    south += digits[i] as f64 * lat_resolution;
    west += digits[i + 1] as f64 * lng_resolution;
    i += 2;
  }
  for &digit in &digits[pairs..] {
    lat_resolution /= GRID_ROWS as f64;
    lng_resolution /= GRID_COLUMNS as f64;
    south += (digit / GRID_COLUMNS) as f64 * lat_resolution;
    west += (digit % GRID_COLUMNS) as f64 * lng_resolution;
  }

  return Ok(CodeArea {
    south,
    west,
    north: south + lat_resolution,
    east: west + lng_resolution,
    code_length: digits.len(),
  });
}

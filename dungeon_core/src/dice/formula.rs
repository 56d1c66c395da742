//! Damage and restore formulas such as `2d6+3` or `1d8 + 2 + 1d4`

use super::DiceRoller;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Upper bound on dice in a single term
const MAX_DICE: u32 = 1000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormulaError {
    #[error("formula is empty")]
    Empty,
    #[error("unexpected term '{0}'")]
    BadTerm(String),
    #[error("dice need at least one side")]
    ZeroSides,
    #[error("too many dice in one term: {0}")]
    TooManyDice(u32),
}

/// One signed term of a formula
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormulaTerm {
    Dice { count: u32, sides: u32, negative: bool },
    Flat(i64),
}

/// A sum of dice and flat terms
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DiceFormula {
    terms: Vec<FormulaTerm>,
}

/// Result of rolling a formula
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormulaRoll {
    pub total: i64,
    /// Signed subtotal of each term, in formula order
    pub terms: Vec<i64>,
    /// Every die face rolled
    pub faces: Vec<u32>,
}

impl DiceFormula {
    pub fn flat(value: i64) -> Self {
        let mut formula = Self::default();
        formula.push_flat(value);
        formula
    }

    pub fn dice(count: u32, sides: u32) -> Self {
        let mut formula = Self::default();
        formula.push_dice(count, sides);
        formula
    }

    /// Append `count`d`sides`; zero dice are skipped
    pub fn push_dice(&mut self, count: u32, sides: u32) {
        if count > 0 && sides > 0 {
            self.terms.push(FormulaTerm::Dice {
                count,
                sides,
                negative: false,
            });
        }
    }

    /// Append a flat modifier; zero is skipped
    pub fn push_flat(&mut self, value: i64) {
        if value != 0 {
            self.terms.push(FormulaTerm::Flat(value));
        }
    }

    pub fn terms(&self) -> &[FormulaTerm] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Roll every term and sum them
    pub fn roll(&self, roller: &mut impl DiceRoller) -> FormulaRoll {
        let mut result = FormulaRoll::default();
        for term in &self.terms {
            let subtotal = match *term {
                FormulaTerm::Dice {
                    count,
                    sides,
                    negative,
                } => {
                    let mut sum = 0i64;
                    for _ in 0..count {
                        let face = roller.roll_die(sides);
                        result.faces.push(face);
                        sum = sum.saturating_add(i64::from(face));
                    }
                    if negative {
                        -sum
                    } else {
                        sum
                    }
                }
                FormulaTerm::Flat(value) => value,
            };
            result.terms.push(subtotal);
            result.total = result.total.saturating_add(subtotal);
        }
        result
    }
}

fn parse_term(negative: bool, token: &str) -> Result<Option<FormulaTerm>, FormulaError> {
    let bad = || FormulaError::BadTerm(token.to_string());
    let lower = token.to_ascii_lowercase();

    if let Some((count, sides)) = lower.split_once('d') {
        let count = if count.is_empty() {
            1
        } else {
            count.parse::<u32>().map_err(|_| bad())?
        };
        let sides = sides.parse::<u32>().map_err(|_| bad())?;
        if sides == 0 {
            return Err(FormulaError::ZeroSides);
        }
        if count > MAX_DICE {
            return Err(FormulaError::TooManyDice(count));
        }
        if count == 0 {
            return Ok(None);
        }
        return Ok(Some(FormulaTerm::Dice {
            count,
            sides,
            negative,
        }));
    }

    let value = lower.parse::<i64>().map_err(|_| bad())?;
    Ok(Some(FormulaTerm::Flat(if negative { -value } else { value })))
}

impl FromStr for DiceFormula {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Err(FormulaError::Empty);
        }

        let mut chunks: Vec<(bool, String)> = Vec::new();
        let mut current = String::new();
        let mut negative = false;
        for c in compact.chars() {
            match c {
                '+' | '-' => {
                    if !current.is_empty() {
                        chunks.push((negative, std::mem::take(&mut current)));
                    } else if !chunks.is_empty() || negative {
                        return Err(FormulaError::BadTerm(compact));
                    }
                    negative = c == '-';
                }
                _ => current.push(c),
            }
        }
        if current.is_empty() {
            return Err(FormulaError::BadTerm(compact));
        }
        chunks.push((negative, current));

        let mut terms = Vec::with_capacity(chunks.len());
        for (negative, token) in &chunks {
            if let Some(term) = parse_term(*negative, token)? {
                terms.push(term);
            }
        }
        Ok(DiceFormula { terms })
    }
}

impl TryFrom<String> for DiceFormula {
    type Error = FormulaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DiceFormula> for String {
    fn from(formula: DiceFormula) -> Self {
        formula.to_string()
    }
}

impl fmt::Display for DiceFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return f.write_str("0");
        }
        for (i, term) in self.terms.iter().enumerate() {
            let (negative, body) = match *term {
                FormulaTerm::Dice {
                    count,
                    sides,
                    negative,
                } => (negative, format!("{}d{}", count, sides)),
                FormulaTerm::Flat(value) => (value < 0, value.unsigned_abs().to_string()),
            };
            match (i, negative) {
                (0, true) => write!(f, "-{}", body)?,
                (0, false) => f.write_str(&body)?,
                (_, true) => write!(f, " - {}", body)?,
                (_, false) => write!(f, " + {}", body)?,
            }
        }
        Ok(())
    }
}

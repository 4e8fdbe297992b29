//! Arithmetic formulas over playfield dimensions
//!
//! Level files may write `spacing`/`startX` as e.g. `"(gameWidth - (80 * 6)) / 2"`.
//! Grammar: `+ - * /`, unary minus, parentheses, numbers, and the identifiers
//! `gameWidth` / `gameHeight`.

use crate::error::FormulaError;

/// Deepest nesting of parentheses and unary signs
const MAX_DEPTH: usize = 64;

/// Values formulas may reference
#[derive(Debug, Clone, Copy)]
pub struct FormulaVars {
    pub game_width: f32,
    pub game_height: f32,
}

/// Evaluate a formula string
pub fn evaluate(src: &str, vars: FormulaVars) -> Result<f32, FormulaError> {
    let mut parser = Parser {
        chars: src.char_indices().collect(),
        pos: 0,
        depth: 0,
        vars,
    };
    parser.skip_ws();
    if parser.peek().is_none() {
        return Err(FormulaError::Empty);
    }
    let value = parser.expr()?;
    parser.skip_ws();
    if let Some((pos, _)) = parser.chars.get(parser.pos) {
        return Err(FormulaError::TrailingInput { pos: *pos });
    }
    if !value.is_finite() {
        return Err(FormulaError::NotFinite { value });
    }
    Ok(value)
}

struct Parser {
    chars: Vec<(usize, char)>,
    pos: usize,
    depth: usize,
    vars: FormulaVars,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|&(_, c)| c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn expr(&mut self) -> Result<f32, FormulaError> {
        let mut value = self.term()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some('+') => {
                    self.pos += 1;
                    value += self.term()?;
                }
                Some('-') => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> Result<f32, FormulaError> {
        let mut value = self.factor()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some('*') => {
                    self.pos += 1;
                    value *= self.factor()?;
                }
                Some('/') => {
                    self.pos += 1;
                    value /= self.factor()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn factor(&mut self) -> Result<f32, FormulaError> {
        self.skip_ws();
        let Some(&(at, c)) = self.chars.get(self.pos) else {
            return Err(FormulaError::UnexpectedEnd);
        };
        if self.depth >= MAX_DEPTH {
            return Err(FormulaError::TooDeep { pos: at });
        }
        self.depth += 1;
        let value = self.primary(at, c);
        self.depth -= 1;
        value
    }

    fn primary(&mut self, at: usize, c: char) -> Result<f32, FormulaError> {
        match c {
            '-' => {
                self.pos += 1;
                Ok(-self.factor()?)
            }
            '+' => {
                self.pos += 1;
                self.factor()
            }
            '(' => {
                self.pos += 1;
                let value = self.expr()?;
                self.skip_ws();
                match self.chars.get(self.pos) {
                    Some(&(_, ')')) => {
                        self.pos += 1;
                        Ok(value)
                    }
                    Some(&(pos, found)) => Err(FormulaError::UnexpectedChar { pos, found }),
                    None => Err(FormulaError::UnexpectedEnd),
                }
            }
            c if c.is_ascii_digit() || c == '.' => self.number(),
            c if c.is_ascii_alphabetic() || c == '_' => self.identifier(),
            found => Err(FormulaError::UnexpectedChar { pos: at, found }),
        }
    }

    fn number(&mut self) -> Result<f32, FormulaError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '.') {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().map(|&(_, c)| c).collect();
        text.parse::<f32>().map_err(|_| FormulaError::UnexpectedChar {
            pos: self.chars[start].0,
            found: self.chars[start].1,
        })
    }

    fn identifier(&mut self) -> Result<f32, FormulaError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.pos += 1;
        }
        let name: String = self.chars[start..self.pos].iter().map(|&(_, c)| c).collect();
        match name.as_str() {
            "gameWidth" => Ok(self.vars.game_width),
            "gameHeight" => Ok(self.vars.game_height),
            _ => Err(FormulaError::UnknownIdentifier { name }),
        }
    }
}

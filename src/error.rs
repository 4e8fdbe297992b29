use core::fmt;

/// Failure evaluating a spacing/position formula from a level file
#[derive(Clone, Debug, PartialEq)]
pub enum FormulaError {
    Empty,
    UnexpectedChar { pos: usize, found: char },
    UnexpectedEnd,
    UnknownIdentifier { name: String },
    TrailingInput { pos: usize },
    NotFinite { value: f32 },
    TooDeep { pos: usize },
}

impl fmt::Display for FormulaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty formula"),
            Self::UnexpectedChar { pos, found } => {
                write!(f, "unexpected character '{found}' at {pos}")
            }
            Self::UnexpectedEnd => write!(f, "formula ended unexpectedly"),
            Self::UnknownIdentifier { name } => write!(f, "unknown identifier '{name}'"),
            Self::TrailingInput { pos } => write!(f, "unexpected trailing input at {pos}"),
            Self::NotFinite { value } => write!(f, "formula evaluated to {value}"),
            Self::TooDeep { pos } => write!(f, "formula nested too deeply at {pos}"),
        }
    }
}

impl std::error::Error for FormulaError {}

/// Failure resolving or loading level data
#[derive(Debug)]
pub enum LevelError {
    UnknownLevel { key: String },
    EmptyCatalog,
    Parse(serde_json::Error),
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownLevel { key } => write!(f, "no level config for key '{key}'"),
            Self::EmptyCatalog => write!(f, "level catalog is empty"),
            Self::Parse(err) => write!(f, "invalid level data: {err}"),
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for LevelError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrendDirection {
    Up,
    Down,
}

impl TrendDirection {
    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }

    pub fn parse(value: &str) -> Result<Self, EngineError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            _ => Err(EngineError::InvalidDirection(value.to_string())),
        }
    }
}

/// Shape classification assigned to a segment. `Unclassified` is the safe
/// default whenever no rule matches or the input is too short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaType {
    R,
    V,
    Unclassified,
}

impl SchemaType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::R => "r",
            Self::V => "v",
            Self::Unclassified => "unclassified",
        }
    }

    pub fn parse(value: &str) -> Result<Self, EngineError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "r" => Ok(Self::R),
            "v" => Ok(Self::V),
            "unclassified" => Ok(Self::Unclassified),
            _ => Err(EngineError::InvalidSchema(value.to_string())),
        }
    }
}

/// Qualitative review band over `points_in_region`. A review aid, not the
/// classifier itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReviewTier {
    Low,
    Optimal,
    High,
}

impl ReviewTier {
    pub fn of(points_in_region: usize) -> Self {
        match points_in_region {
            0..=5 => Self::Low,
            6..=21 => Self::Optimal,
            _ => Self::High,
        }
    }
}

#[derive(Debug)]
pub enum EngineError {
    InvalidHeader(String),
    NoValidRows,
    InvalidDatetime(String),
    InvalidFilename(String),
    InvalidDirection(String),
    InvalidSchema(String),
    InvalidConfig(String),
    Io(std::io::Error),
    Csv(csv::Error),
    Polars(polars::error::PolarsError),
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidHeader(v) => write!(f, "invalid header, missing column: {v}"),
            Self::NoValidRows => write!(f, "no valid rows survived parsing"),
            Self::InvalidDatetime(v) => write!(f, "invalid datetime: {v}"),
            Self::InvalidFilename(v) => write!(f, "invalid series filename: {v}"),
            Self::InvalidDirection(v) => write!(f, "invalid trend direction: {v}"),
            Self::InvalidSchema(v) => write!(f, "invalid schema type: {v}"),
            Self::InvalidConfig(v) => write!(f, "invalid config: {v}"),
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::Csv(e) => write!(f, "csv error: {e}"),
            Self::Polars(e) => write!(f, "polars error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<std::io::Error> for EngineError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<csv::Error> for EngineError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<polars::error::PolarsError> for EngineError {
    fn from(value: polars::error::PolarsError) -> Self {
        Self::Polars(value)
    }
}

#[cfg(test)]
mod tests {
    use super::ReviewTier;

    #[test]
    fn review_tier_band_edges() {
        assert_eq!(ReviewTier::of(0), ReviewTier::Low);
        assert_eq!(ReviewTier::of(5), ReviewTier::Low);
        assert_eq!(ReviewTier::of(6), ReviewTier::Optimal);
        assert_eq!(ReviewTier::of(21), ReviewTier::Optimal);
        assert_eq!(ReviewTier::of(22), ReviewTier::High);
    }
}

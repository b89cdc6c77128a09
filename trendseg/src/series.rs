use chrono::NaiveDate;

use crate::bar::Bar;
use crate::constant::EngineError;

/// An immutable, ordered bar sequence for one symbol/date identity.
#[derive(Debug, Clone)]
pub struct Series {
    symbol: String,
    date: NaiveDate,
    bars: Vec<Bar>,
}

impl Series {
    /// Builds a series from normalized bars. The symbol is uppercased; a
    /// series with zero bars is never created.
    pub fn new(
        symbol: impl Into<String>,
        date: NaiveDate,
        bars: Vec<Bar>,
    ) -> Result<Self, EngineError> {
        if bars.is_empty() {
            return Err(EngineError::NoValidRows);
        }
        Ok(Self {
            symbol: symbol.into().trim().to_uppercase(),
            date,
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn total_points(&self) -> usize {
        self.bars.len()
    }

    /// Composite identity, also the prefix of every derived segment id.
    pub fn identity(&self) -> String {
        format!("{}_{}", self.symbol, self.date.format("%Y-%m-%d"))
    }
}

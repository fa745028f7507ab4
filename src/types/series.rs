use serde::{Deserialize, Serialize};
use crate::types::timestamp::Timestamp;

/// One sample of a per-asset series (price or volume).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub time: Timestamp,
    pub value: f64,
}

impl TimeSeriesPoint {
    pub fn new(time: Timestamp, value: f64) -> Self {
        TimeSeriesPoint { time, value }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Buy,
    Sell,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub address: String,
    #[serde(rename = "type")]
    pub direction: Direction,
    pub amount: f64,
    pub value_usd: f64,
    pub wallet: String,
    pub timestamp: Timestamp,
}

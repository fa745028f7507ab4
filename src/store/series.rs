use std::collections::VecDeque;
use crate::store::retention::RetentionPolicy;
use crate::types::series::{TimeSeriesPoint, Transaction};
use crate::types::timestamp::Timestamp;

/// Append-only series kept in non-decreasing time order.
#[derive(Debug, Default)]
pub struct Series {
    points: VecDeque<TimeSeriesPoint>,
}

impl Series {
    /// Late points land at their ordered position, after any equal timestamps.
    pub fn insert(&mut self, point: TimeSeriesPoint, policy: &RetentionPolicy, now: Timestamp) {
        let at = self.points.partition_point(|p| p.time <= point.time);
        if at == self.points.len() {
            self.points.push_back(point);
        } else {
            self.points.insert(at, point);
        }

        while self.points.len() > policy.max_points {
            self.points.pop_front();
        }
        while let Some(front) = self.points.front() {
            if policy.is_expired(front.time, now) {
                self.points.pop_front();
            } else {
                break;
            }
        }
    }

    /// The most recent `limit` points, oldest first.
    pub fn latest(&self, limit: usize) -> Vec<TimeSeriesPoint> {
        let skip = self.points.len().saturating_sub(limit);
        self.points.iter().skip(skip).copied().collect()
    }
}

/// Transactions ordered by timestamp; read back most-recent-first.
#[derive(Debug, Default)]
pub struct TransactionLog {
    entries: VecDeque<Transaction>,
}

impl TransactionLog {
    pub fn insert(&mut self, tx: Transaction, policy: &RetentionPolicy, now: Timestamp) {
        let at = self.entries.partition_point(|t| t.timestamp <= tx.timestamp);
        if at == self.entries.len() {
            self.entries.push_back(tx);
        } else {
            self.entries.insert(at, tx);
        }

        while self.entries.len() > policy.max_transactions {
            self.entries.pop_front();
        }
        while let Some(front) = self.entries.front() {
            if policy.is_expired(front.timestamp, now) {
                self.entries.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn most_recent(&self, limit: usize) -> Vec<Transaction> {
        self.entries.iter().rev().take(limit).cloned().collect()
    }
}

#[derive(Debug, Default)]
pub struct AssetHistory {
    pub price: Series,
    pub volume: Series,
    pub transactions: TransactionLog,
}

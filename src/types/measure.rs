use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

/// One of the three summed quantities of a planned measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Measure {
    Length,
    Capacity,
    Cost,
}

impl Measure {
    /// Order used when listing all three quantities in popups.
    pub const DISPLAY_ORDER: [Measure; 3] = [Measure::Cost, Measure::Capacity, Measure::Length];

    pub fn label(self) -> &'static str {
        match self {
            Measure::Length => "Leitungslänge",
            Measure::Capacity => "Übertragungskapazität",
            Measure::Cost => "Kosten",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Measure::Length => "km",
            Measure::Capacity => "MVA",
            Measure::Cost => "Mio.€",
        }
    }
}

/// Length, capacity and cost of a record, or their sums over a group.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Measures {
    pub length: f64,
    pub capacity: f64,
    pub cost: f64,
}

impl Measures {
    pub fn new(length: f64, capacity: f64, cost: f64) -> Self {
        Self { length, capacity, cost }
    }

    pub fn get(&self, measure: Measure) -> f64 {
        match measure {
            Measure::Length => self.length,
            Measure::Capacity => self.capacity,
            Measure::Cost => self.cost,
        }
    }
}

impl AddAssign for Measures {
    fn add_assign(&mut self, other: Self) {
        self.length += other.length;
        self.capacity += other.capacity;
        self.cost += other.cost;
    }
}

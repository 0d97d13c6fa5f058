use std::{collections::BTreeMap, ops::Add, time::Duration};

pub struct Statistics {
    reports: BTreeMap<&'static str, Report>,
}

impl Statistics {
    pub fn new() -> Self {
        Self {
            reports: BTreeMap::new(),
        }
    }

    pub fn add(&mut self, operation: &'static str, latency: Duration) {
        let report = Report::new(latency);
        let merged = match self.reports.get(operation) {
            Some(previous) => *previous + report,
            None => report,
        };
        debug!("{}: {:?}", operation, latency);
        self.reports.insert(operation, merged);
    }

    pub fn display(&self) {
        println!("\n - - - - - - - - - - - - - - - -");
        println!(
            "{:<20}{:>8}{:>14}{:>14}{:>14}",
            "operation", "count", "min", "avg", "max"
        );
        for (operation, report) in &self.reports {
            println!(
                "{:<20}{:>8}{:>14}{:>14}{:>14}",
                operation,
                report.count,
                format!("{:?}", report.min),
                format!("{:?}", report.avg()),
                format!("{:?}", report.max)
            );
        }
    }
}

#[derive(Clone, Copy)]
pub struct Report {
    count: u32,
    total: Duration,
    min: Duration,
    max: Duration,
}

impl Report {
    pub fn new(latency: Duration) -> Self {
        Self {
            count: 1,
            total: latency,
            min: latency,
            max: latency,
        }
    }

    pub fn avg(&self) -> Duration {
        self.total / self.count.max(1)
    }
}

impl Add for Report {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            count: self.count + rhs.count,
            total: self.total + rhs.total,
            min: self.min.min(rhs.min),
            max: self.max.max(rhs.max),
        }
    }
}

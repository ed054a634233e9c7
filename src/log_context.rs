use std::fmt;

/// Handed to every component that logs during a cycle, so all lines
/// of one cycle can be grepped together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LogContext {
    pub cycle: u64,
}

impl LogContext {
    pub fn new(cycle: u64) -> Self {
        Self { cycle }
    }

    pub fn next(self) -> Self {
        Self {
            cycle: self.cycle + 1,
        }
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cycle {}", self.cycle)
    }
}

use menu::{OrderUpdate, ordering::OrderViolation};

#[derive(Debug, Default)]
pub struct Report {
    pub items: usize,
    pub violations: Vec<OrderViolation>,
    pub changed: Vec<OrderUpdate>,
    pub applied: usize,
}

impl Report {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty() && self.changed.is_empty()
    }
}

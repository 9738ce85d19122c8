use std::collections::HashMap;

use super::types::Vendor;

/// Per-week slot counter for priority vendors. Build a fresh one every week.
#[derive(Debug, Clone, Default)]
pub struct CapacityGuard {
    limits: HashMap<String, u32>,
    used: HashMap<String, u32>,
}

impl CapacityGuard {
    pub fn new<'a>(priority_vendors: impl IntoIterator<Item = &'a Vendor>) -> Self {
        let limits = priority_vendors
            .into_iter()
            .map(|v| (v.name.clone(), v.max_slots_per_week))
            .collect();
        Self {
            limits,
            used: HashMap::new(),
        }
    }

    /// Whether `vendor` is capacity-limited at all
    pub fn tracks(&self, vendor: &str) -> bool {
        self.limits.contains_key(vendor)
    }

    pub fn has_capacity(&self, vendor: &str) -> bool {
        match self.limits.get(vendor) {
            Some(&limit) => self.used(vendor) < limit,
            None => false,
        }
    }

    /// Takes one slot if the vendor stays within its weekly limit; counter untouched otherwise
    pub fn try_reserve(&mut self, vendor: &str) -> bool {
        if !self.has_capacity(vendor) {
            return false;
        }
        *self.used.entry(vendor.to_string()).or_insert(0) += 1;
        true
    }

    pub fn used(&self, vendor: &str) -> u32 {
        self.used.get(vendor).copied().unwrap_or(0)
    }

    pub fn remaining(&self, vendor: &str) -> u32 {
        self.limits
            .get(vendor)
            .map(|limit| limit.saturating_sub(self.used(vendor)))
            .unwrap_or(0)
    }
}

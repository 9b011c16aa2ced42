// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::collections::HashMap;
use std::sync::Arc;

use kedi_edi::InsuranceType;

use crate::Provider;

/// Runtime table of authority adapters, keyed by insurance program.
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<InsuranceType, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, insurance: InsuranceType, provider: Arc<dyn Provider>) {
        self.providers.insert(insurance, provider);
    }

    pub fn get(&self, insurance: InsuranceType) -> Option<Arc<dyn Provider>> {
        self.providers.get(&insurance).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = (InsuranceType, &Arc<dyn Provider>)> {
        self.providers.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Labels the endpoint is allowed to report

use std::collections::HashSet;

/// Labels retained in /detect responses; everything else is dropped
pub const ALLOWED_LABELS: [&str; 16] = [
    "person",
    "car",
    "bus",
    "truck",
    "bicycle",
    "motorcycle",
    "dog",
    "cat",
    "cow",
    "sheep",
    "horse",
    "fire hydrant",
    "backpack",
    "handbag",
    "stop sign",
    "traffic light",
];

/// Read-only set of permitted labels
///
/// Built once before the server starts and shared through the router
/// state. Matching is exact and case-sensitive.
#[derive(Debug, Clone)]
pub struct AllowList {
    labels: HashSet<&'static str>,
}

impl Default for AllowList {
    fn default() -> Self {
        Self::new()
    }
}

impl AllowList {
    pub fn new() -> Self {
        Self {
            labels: ALLOWED_LABELS.iter().copied().collect(),
        }
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

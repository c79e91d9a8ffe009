//! Text backend request and response types
//!
//! These types are backend-agnostic and used across all implementations.

use serde::{Deserialize, Serialize};

use crate::models::{CustomerSegment, RetailMetrics};

/// Data a backend reasons over
#[derive(Debug, Clone, Copy)]
pub struct BusinessContext<'a> {
    pub metrics: &'a RetailMetrics,
    pub segments: &'a [CustomerSegment],
}

impl<'a> BusinessContext<'a> {
    pub fn new(metrics: &'a RetailMetrics, segments: &'a [CustomerSegment]) -> Self {
        Self { metrics, segments }
    }

    /// Find a segment by exact name
    pub fn segment(&self, name: &str) -> Option<&'a CustomerSegment> {
        self.segments.iter().find(|s| s.segment_name == name)
    }
}

/// A strategic recommendation produced by a backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategicRecommendation {
    pub title: String,
    pub description: String,
    /// Expected effect, in prose
    pub impact: String,
}

/// Wrapper a model may return instead of a bare array
#[derive(Debug, Deserialize)]
pub(crate) struct RecommendationList {
    pub recommendations: Vec<StrategicRecommendation>,
}

//! Insight Engine - rule-based findings over the current snapshot
//!
//! Rules are independent threshold checks evaluated in registration order;
//! every rule whose predicate holds contributes one finding. An optional text
//! backend can add strategic recommendations on top.
//!
//! ## Built-in rules
//!
//! - **Strong sales** - sales value above 150,000 (growth)
//! - **Low penetration** - customer penetration below 15% (risk)
//! - **Loyalty program** - fewer than 1,000 loyal customers (opportunity)
//! - **Churn risk** - At-Risk segment churn above 25% (risk)
//! - **Cross-category** - basket penetration above 25% (opportunity)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shelfscope_core::insights::InsightEngine;
//!
//! let engine = InsightEngine::new();
//! let created = engine.generate(repo.as_ref(), ai.as_ref()).await?;
//! ```

pub mod engine;
pub mod rules;

pub use engine::{InsightEngine, InsightRule, AUGMENTED_CONFIDENCE};
pub use rules::{
    ChurnRiskRule, CrossCategoryRule, LowPenetrationRule, LoyaltyProgramRule, StrongSalesRule,
};

//! Header rule subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound headers + target URL + method
//!     → engine.rs (generic strip)
//!     → rule_set.rs (lookup by target host)
//!     → matcher.rs (exact / suffix host match)
//!     → engine.rs (remove → rewrite → set-if-absent)
//!     → Outbound headers
//!
//! Rule Compilation (at startup):
//!     RuleSetConfig[] (file or defaults.rs)
//!     → Parse header names and values
//!     → Sort by priority
//!     → Freeze as immutable RuleTable
//! ```

pub mod defaults;
pub mod engine;
pub mod matcher;
pub mod rule_set;

pub use engine::HeaderRuleEngine;
pub use matcher::HostMatcher;
pub use rule_set::{RuleSet, RuleTable};

//! Transparency module for the Guardian keyboard monitor.
//!
//! This module tracks and exposes what the monitor has done, so its
//! activity can be audited without retaining anything that was typed.

pub mod log;

// Re-export commonly used types
pub use log::{
    create_shared_log, create_shared_log_with_persistence, SharedTransparencyLog, TransparencyLog,
    TransparencyStats,
};

//! Deterministic bit-flip fault injection for byte buffers.
//!
//! Unintended bit flips in memory are rare but real, and code that parses
//! checksummed formats or binary protocols should survive them. This crate
//! flips bits on purpose: an [`Injector`] applies chosen or randomly drawn
//! single-bit corruptions to a caller-owned buffer, records each one, and
//! can later undo all of them to recover the exact original bytes.
//!
//! # Example
//!
//! ```rust
//! use glitch_core::{Fault, Injector};
//!
//! let mut buf = vec![0_u8; 12];
//! let reference = buf.clone();
//!
//! let mut injector = Injector::new();
//! injector.attack(&mut buf, Fault::new(0)).unwrap();
//! assert_ne!(buf, reference);
//! injector.restore(&mut buf).unwrap();
//! assert_eq!(buf, reference);
//! ```

pub mod config;
pub mod engine;
pub mod fault;
pub mod target;

pub use config::GlitchConfig;
pub use engine::{Injector, InjectorError};
pub use fault::Fault;
pub use target::{FileTarget, Target, TargetError};

//! Statistics accumulation and export
//!
//! Folds timing samples into running statistics and converts the observable
//! state to and from its JSON record form.

pub mod accumulator;
pub mod codec;
pub mod flags;
pub mod nanos;
pub mod timer;

//! Type definitions for the FinMentor engine
//!
//! Raw financial input as accepted from callers, and the two persona
//! taxonomies the engine reports.

mod input;
mod persona;

pub use input::*;
pub use persona::*;

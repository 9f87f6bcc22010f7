pub mod crossover;

pub use crossover::{annotate, detect, diff_sign, events};

pub mod data_structures;

pub use data_structures::{validate_reads, FastqRead, Histogram, ReadValidationError};

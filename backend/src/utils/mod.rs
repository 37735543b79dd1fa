//! Collection of general utility functions.

pub mod generate_random_string;

//! Admin dashboard figures.

pub mod summary;

//! Property-based checks comparing the chain against exhaustive
//! agglomeration and against itself under different schedules.

mod oracle;
mod strategies;
mod tests;
mod types;

pub mod api;
pub mod stats;
pub mod update;

#[cfg(test)]
pub(crate) mod fake;

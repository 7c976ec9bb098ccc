//! End-to-end runs of the discovery and scan pipeline against local fakes.

#[cfg(test)]
mod support;

#[cfg(test)]
mod pipeline;

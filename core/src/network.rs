pub mod mdns;
pub mod tcp;

//! Public library API for reading and writing Apple property lists.

/// Value model, binary codec, XML codec, and format dispatch.
pub mod plist;

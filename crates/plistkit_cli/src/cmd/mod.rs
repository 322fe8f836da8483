/// Format conversion command.
pub mod convert;
/// File-level information command.
pub mod info;
/// Value tree printing command.
pub mod show;

pub(crate) mod util;

#[cfg(test)]
mod test_support;

pub(crate) mod checksum;
pub(crate) mod format;

pub(crate) mod boundary;
pub(crate) mod field;
pub(crate) mod random;

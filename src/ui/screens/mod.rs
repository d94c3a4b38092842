pub(crate) mod expenses;
pub(crate) mod summary;

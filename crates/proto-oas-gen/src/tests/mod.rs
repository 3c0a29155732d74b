pub(crate) mod common;
mod library;

pub(crate) mod anchor;
pub(crate) mod boundary;
pub mod cursor;
pub mod normalize;
pub mod reference;
pub mod similarity;

pub mod listfile;
pub mod probe;

pub mod assemble;
pub mod audio;
pub mod node;
pub mod overlay;
pub mod syntax;

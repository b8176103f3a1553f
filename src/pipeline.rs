pub mod compose;
pub mod workspace;

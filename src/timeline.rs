pub mod accumulate;
pub mod window;

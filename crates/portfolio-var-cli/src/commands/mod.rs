pub mod demo;
pub mod var;

pub mod collapse;
pub mod list_ops;
pub mod shape;
pub mod symbols;
pub mod value;
pub mod value_path;

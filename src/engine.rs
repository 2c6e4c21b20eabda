//! Rule parsing, resolution and the validation engine

pub mod executor;
pub mod parser;
pub mod resolver;

pub use executor::{Mode, Validator};
pub use parser::{Bounds, Invocation, parse_expression};
pub use resolver::Resolver;

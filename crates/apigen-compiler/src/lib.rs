pub mod ast;
pub mod error;
pub mod file;
pub mod identifier;
pub mod printer;
pub mod tsc;

pub use error::CompilerError;
pub use file::{GeneratedFile, ImportItem, OutputFile, relative_module};
pub use identifier::{Identifier, IdentifierRegistry, Namespace};

pub mod document;
pub mod modfile;
pub mod side;

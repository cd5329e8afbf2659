pub mod check;
pub mod pipeline;
pub mod publish;
pub mod sanitize;
pub mod side;
pub mod strip;
pub mod unknown;
pub mod urls;

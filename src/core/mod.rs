pub mod config;
pub mod error;
pub mod kind;
pub mod oracle;
pub mod reflect;
pub mod shape;
pub mod types;
pub mod userfn;

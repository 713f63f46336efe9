pub mod context;
pub mod error;
pub mod existential;
pub mod infer;
pub mod mono;
pub mod ty;

pub use context::{Context, Entry};
pub use error::TypeError;
pub use existential::{Existential, RowDomain, TypeDomain, VariantDomain};
pub use infer::Infer;
pub use mono::{Monotype, Row, Variant};
pub use ty::{Kind, Type};

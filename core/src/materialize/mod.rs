#![deny(missing_docs)]

//! # Materializers
//!
//! Turn bindings and reflected types into document [`Parameter`]s and
//! [`Response`]s.
//!
//! [`Parameter`]: crate::model::Parameter
//! [`Response`]: crate::model::Response

pub mod parameters;
pub mod responses;

pub use parameters::{MaterializedParameters, ParameterMaterializer};
pub use responses::ResponseMaterializer;

use crate::adapter::FrameworkAdapter;
use crate::descriptor::TypeCatalog;
use crate::settings::GeneratorSettings;
use crate::wrappers::WrapperRegistry;

/// Read-only collaborators shared by the materializers.
#[derive(Clone, Copy)]
pub struct MaterializeContext<'a> {
    /// Generation settings.
    pub settings: &'a GeneratorSettings,
    /// Named types.
    pub catalog: &'a TypeCatalog,
    /// Framework conventions.
    pub adapter: &'a dyn FrameworkAdapter,
    /// Return type wrappers.
    pub wrappers: &'a WrapperRegistry,
}

pub mod builder;
pub mod model;
pub mod normalize;
pub mod validate;

pub use builder::ProfileBuilder;
pub use model::{
    Counter, FieldInput, LoginCheck, PluginOptions, Profile, ProfileDraft, ProfileId,
};
pub use validate::{Field, FieldError, NameIndex, Rule, ValidationErrors, Validator};

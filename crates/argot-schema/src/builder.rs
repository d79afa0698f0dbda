use crate::{ArgumentDef, ArgumentSchema, SchemaError};

/// Fluent collector for argument definitions.
///
/// `build()` runs the full schema validation, so a builder that returns
/// `Ok` yields a schema the engine can trust without re-checking.
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    defs: Vec<ArgumentDef>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn argument(mut self, def: ArgumentDef) -> Self {
        self.defs.push(def);
        self
    }

    pub fn arguments(mut self, defs: impl IntoIterator<Item = ArgumentDef>) -> Self {
        self.defs.extend(defs);
        self
    }

    pub fn build(self) -> Result<ArgumentSchema, SchemaError> {
        ArgumentSchema::new(self.defs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Arity, ValueKind};

    #[test]
    fn builder_collects_in_declaration_order() {
        let schema = SchemaBuilder::new()
            .argument(ArgumentDef::positional("input", 0).required())
            .argument(ArgumentDef::named("max-lines").short('l').kind(ValueKind::Int))
            .argument(ArgumentDef::switch("verbose").short('v'))
            .build()
            .unwrap();

        assert_eq!(schema.len(), 3);
        assert_eq!(schema.ident(0), "input");
        assert_eq!(schema.ident(1), "max-lines");
        assert_eq!(schema.def(2).arity, Arity::Switch);
        assert_eq!(schema.find("verbose"), Some(2));
    }

    #[test]
    fn builder_surfaces_schema_errors() {
        let err = SchemaBuilder::new()
            .argument(ArgumentDef::positional("opt", 0))
            .argument(ArgumentDef::positional("req", 1).required())
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::RequiredPositionalAfterOptional { .. }
        ));
    }
}

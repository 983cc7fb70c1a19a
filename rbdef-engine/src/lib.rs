pub mod args;
pub mod class;
pub mod error;
pub mod foo;
pub mod signature;
pub mod value;

use std::{collections::BTreeMap, sync::Arc};

use crate::{
    class::ClassDef,
    error::{Error, Result},
};

pub use crate::foo::Foo;
pub use crate::value::Value;

/// Classes by name.
#[derive(Debug, Default)]
pub struct Registry {
    pub classes: BTreeMap<String, Arc<ClassDef>>,
}

impl Registry {
    /// A registry holding the classes this crate ships with.
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        registry.insert(Foo::class());
        registry
    }

    pub fn register(&mut self, class: ClassDef) -> Arc<ClassDef> {
        let class = Arc::new(class);
        self.insert(Arc::clone(&class));
        class
    }

    fn insert(&mut self, class: Arc<ClassDef>) {
        tracing::debug!("registering class {}", class.name());
        self.classes.insert(class.name().to_string(), class);
    }

    pub fn get(&self, name: &str) -> Result<Arc<ClassDef>> {
        self.classes
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UninitializedConstant(name.to_string()))
    }
}

//! Dependency injection seam.
//!
//! The linker never resolves dependencies itself. It asks an [`Injector`]
//! for what it needs by [`Token`] and propagates the injector's failure.
//! [`StaticInjector`] is a minimal provider map for hosts without a
//! container of their own.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::error::{LinkerError, Result};

// =============================================================================
// Token
// =============================================================================

/// Key identifying a dependency by type.
#[derive(Clone, Copy)]
pub struct Token {
    id: TypeId,
    name: &'static str,
}

impl Token {
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Last path segment of the type name.
    pub fn short_name(&self) -> &'static str {
        crate::types::short_type_name(self.name)
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Token {}

impl std::hash::Hash for Token {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({})", self.short_name())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

// =============================================================================
// Injector
// =============================================================================

/// Resolves dependencies by token.
pub trait Injector {
    /// Resolve `token`, failing with [`LinkerError::MissingDependency`] when
    /// nothing provides it.
    fn get(&self, token: &Token) -> Result<Rc<dyn Any>>;
}

/// Typed resolution on top of [`Injector::get`].
pub trait InjectorExt {
    /// Resolve `T` by its own token and downcast.
    ///
    /// A provider of the wrong type counts as missing.
    fn get_as<T: 'static>(&self) -> Result<Rc<T>>;
}

impl<I: Injector + ?Sized> InjectorExt for I {
    fn get_as<T: 'static>(&self) -> Result<Rc<T>> {
        let token = Token::of::<T>();
        let value = self.get(&token)?;
        value
            .downcast::<T>()
            .map_err(|_| LinkerError::MissingDependency {
                token: token.short_name().to_string(),
            })
    }
}

// =============================================================================
// Static Injector
// =============================================================================

/// Fixed set of providers with an optional parent to fall back to.
#[derive(Default)]
pub struct StaticInjector {
    providers: HashMap<Token, Rc<dyn Any>>,
    parent: Option<Rc<dyn Injector>>,
}

impl StaticInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a child that falls back to `parent` for unknown tokens.
    pub fn with_parent(parent: Rc<dyn Injector>) -> Self {
        Self {
            providers: HashMap::new(),
            parent: Some(parent),
        }
    }

    /// Provide `value` under the token of its own type.
    pub fn provide<T: 'static>(mut self, value: T) -> Self {
        self.providers.insert(Token::of::<T>(), Rc::new(value));
        self
    }

    /// Provide an already shared value under an explicit token.
    pub fn provide_shared(mut self, token: Token, value: Rc<dyn Any>) -> Self {
        self.providers.insert(token, value);
        self
    }

    pub fn into_rc(self) -> Rc<dyn Injector> {
        Rc::new(self)
    }
}

impl Injector for StaticInjector {
    fn get(&self, token: &Token) -> Result<Rc<dyn Any>> {
        if let Some(value) = self.providers.get(token) {
            return Ok(value.clone());
        }
        match &self.parent {
            Some(parent) => parent.get(token),
            None => Err(LinkerError::MissingDependency {
                token: token.short_name().to_string(),
            }),
        }
    }
}

impl fmt::Debug for StaticInjector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticInjector")
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

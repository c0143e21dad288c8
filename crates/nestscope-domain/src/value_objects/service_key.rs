//! Service keys and type descriptors
//!
//! A [`ServiceKey`] is the identity of a contract in the container: a base
//! name, whether it is an interface (trait object) or a class (concrete
//! type), and its generic arguments. Generic arguments may be left open,
//! which is how open-generic registrations such as `Options<_>` are
//! expressed without any runtime reflection.
//!
//! ```text
//! ServiceKey { name: "Options", kind: Interface, args: [Closed(Settings)] }  → Options<Settings>
//! ServiceKey { name: "Options", kind: Interface, args: [Open] }              → Options<_>
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Whether a key names a trait object contract or a concrete type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyKind {
    /// Abstract contract, usually a `dyn Trait`
    Interface,
    /// Concrete type
    Class,
}

/// A single generic argument of a [`ServiceKey`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GenericArg {
    /// Unbound type parameter
    Open,
    /// Bound to a concrete key
    Closed(ServiceKey),
}

impl GenericArg {
    /// True when this argument, or anything nested inside it, is unbound
    pub fn is_open(&self) -> bool {
        match self {
            Self::Open => true,
            Self::Closed(key) => key.contains_open_params(),
        }
    }
}

/// Identity of a contract registered in the container
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceKey {
    name: Arc<str>,
    kind: KeyKind,
    args: Arc<[GenericArg]>,
}

impl ServiceKey {
    /// Non-generic interface key
    pub fn interface(name: impl Into<Arc<str>>) -> Self {
        Self::new(name, KeyKind::Interface, Vec::new())
    }

    /// Non-generic class key
    pub fn class(name: impl Into<Arc<str>>) -> Self {
        Self::new(name, KeyKind::Class, Vec::new())
    }

    /// Generic interface with every parameter left open
    pub fn open_interface(name: impl Into<Arc<str>>, arity: usize) -> Self {
        Self::new(name, KeyKind::Interface, vec![GenericArg::Open; arity])
    }

    /// Generic class with every parameter left open
    pub fn open_class(name: impl Into<Arc<str>>, arity: usize) -> Self {
        Self::new(name, KeyKind::Class, vec![GenericArg::Open; arity])
    }

    fn new(name: impl Into<Arc<str>>, kind: KeyKind, args: Vec<GenericArg>) -> Self {
        Self {
            name: name.into(),
            kind,
            args: args.into(),
        }
    }

    /// Replace the generic arguments with the given closed keys
    pub fn with_args<I>(self, args: I) -> Self
    where
        I: IntoIterator<Item = ServiceKey>,
    {
        let args: Vec<GenericArg> = args.into_iter().map(GenericArg::Closed).collect();
        Self {
            name: self.name,
            kind: self.kind,
            args: args.into(),
        }
    }

    /// Close this key's definition over `args`, checking the arity
    pub fn make_closed(&self, args: &[ServiceKey]) -> Result<Self> {
        if args.len() != self.args.len() {
            return Err(Error::invalid_argument(format!(
                "{} expects {} type argument(s), got {}",
                self.definition(),
                self.args.len(),
                args.len()
            )));
        }
        Ok(self.clone().with_args(args.iter().cloned()))
    }

    /// Base name without generic arguments
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Interface or class
    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    /// True for trait object contracts
    pub fn is_interface(&self) -> bool {
        self.kind == KeyKind::Interface
    }

    /// True for concrete types
    pub fn is_class(&self) -> bool {
        self.kind == KeyKind::Class
    }

    /// True when the key has generic arguments, bound or not
    pub fn is_generic(&self) -> bool {
        !self.args.is_empty()
    }

    /// Number of generic arguments
    pub fn arity(&self) -> usize {
        self.args.len()
    }

    /// Generic arguments in declaration order
    pub fn generic_args(&self) -> &[GenericArg] {
        &self.args
    }

    /// Closed generic argument at `index`, if any
    pub fn type_arg(&self, index: usize) -> Option<&ServiceKey> {
        match self.args.get(index) {
            Some(GenericArg::Closed(key)) => Some(key),
            _ => None,
        }
    }

    /// True when any argument, at any depth, is unbound
    pub fn contains_open_params(&self) -> bool {
        self.args.iter().any(GenericArg::is_open)
    }

    /// Generic key with at least one unbound parameter
    pub fn is_open_generic(&self) -> bool {
        self.is_generic() && self.contains_open_params()
    }

    /// Generic key whose parameters are all bound
    pub fn is_closed_generic(&self) -> bool {
        self.is_generic() && !self.contains_open_params()
    }

    /// The generic definition: same name and kind, every argument open
    pub fn definition(&self) -> Self {
        Self::new(
            self.name.clone(),
            self.kind,
            vec![GenericArg::Open; self.args.len()],
        )
    }

    /// Same generic definition as `other`
    pub fn same_definition(&self, other: &ServiceKey) -> bool {
        self.name == other.name && self.kind == other.kind && self.args.len() == other.args.len()
    }

    /// See [`TypeInfo::is_closed_type_of`]; the key stands for itself only
    pub fn is_closed_type_of(&self, open_generic: &ServiceKey) -> bool {
        TypeInfo::new(self.clone()).is_closed_type_of(open_generic)
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if self.args.is_empty() {
            return Ok(());
        }
        f.write_str("<")?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match arg {
                GenericArg::Open => f.write_str("_")?,
                GenericArg::Closed(key) => write!(f, "{key}")?,
            }
        }
        f.write_str(">")
    }
}

/// Description of a type: its own key plus the interfaces it implements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    key: ServiceKey,
    interfaces: Vec<ServiceKey>,
}

impl TypeInfo {
    /// Type implementing no declared interfaces
    pub fn new(key: ServiceKey) -> Self {
        Self {
            key,
            interfaces: Vec::new(),
        }
    }

    /// Descriptor for a [`Contract`] type
    pub fn of<T: ?Sized + Contract>() -> Self {
        Self::new(T::key())
    }

    /// Declare an implemented interface
    pub fn implementing(mut self, interface: ServiceKey) -> Self {
        if interface != self.key && !self.interfaces.contains(&interface) {
            self.interfaces.push(interface);
        }
        self
    }

    /// The type's own key
    pub fn key(&self) -> &ServiceKey {
        &self.key
    }

    /// Declared interfaces
    pub fn interfaces(&self) -> &[ServiceKey] {
        &self.interfaces
    }

    /// Returns true when:
    /// - `open_generic` is an interface and this type (or, when it is an
    ///   interface itself, the type as its own interface) implements a
    ///   closed instantiation of it
    /// - `open_generic` is a class and this type is a closed instantiation of it
    ///
    /// `open_generic` is compared through its definition, so passing a
    /// closed key behaves like passing its open form.
    pub fn is_closed_type_of(&self, open_generic: &ServiceKey) -> bool {
        if !open_generic.is_generic() {
            return false;
        }
        if open_generic.is_interface() {
            let own = self.key.is_interface().then_some(&self.key);
            self.interfaces
                .iter()
                .chain(own)
                .any(|t| is_closed_instance_of(t, open_generic))
        } else {
            is_closed_instance_of(&self.key, open_generic)
        }
    }

    /// Whether a value of this type can be registered under `contract`
    pub fn satisfies(&self, contract: &ServiceKey) -> bool {
        let mut candidates = std::iter::once(&self.key).chain(self.interfaces.iter());
        if contract.is_open_generic() {
            candidates.any(|t| t.same_definition(contract))
        } else {
            candidates.any(|t| t == contract)
        }
    }
}

fn is_closed_instance_of(candidate: &ServiceKey, open_generic: &ServiceKey) -> bool {
    candidate.is_closed_generic() && candidate.same_definition(open_generic)
}

/// Maps a Rust type, usually `dyn Trait`, to its [`ServiceKey`]
///
/// Implement it with the [`contract!`](crate::contract) macro or by hand
/// for generic contracts.
pub trait Contract: Send + Sync + 'static {
    /// Key under which the type is registered and resolved
    fn key() -> ServiceKey;
}

/// Implement [`Contract`] for a type using its Rust type name as the key
///
/// ```
/// use nestscope_domain::{Contract, contract};
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
/// contract!(interface dyn Greeter);
///
/// assert!(<dyn Greeter as Contract>::key().is_interface());
/// ```
#[macro_export]
macro_rules! contract {
    (interface $t:ty) => {
        impl $crate::Contract for $t {
            fn key() -> $crate::ServiceKey {
                $crate::ServiceKey::interface(::std::any::type_name::<$t>())
            }
        }
    };
    (class $t:ty) => {
        impl $crate::Contract for $t {
            fn key() -> $crate::ServiceKey {
                $crate::ServiceKey::class(::std::any::type_name::<$t>())
            }
        }
    };
}

//! Type descriptors and the supertype graph used to resolve generators.
//!
//! A [`TypeDescriptor`] is the structural key a caller hands to the repository:
//! a base [`TypeToken`], ordered parameter descriptors for generic shapes and a
//! [`Variance`] marker. The [`TypeHierarchy`] records which tokens are
//! supertypes (or implemented interfaces) of which, and walks that graph
//! transitively when the repository collects candidate generators.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

/// Name of a runtime type known to the repository
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeToken(Cow<'static, str>);

impl TypeToken {
    /// The universal top type; every token has it as an ancestor
    pub const ANY: TypeToken = TypeToken(Cow::Borrowed("Any"));

    /// Create a token from a static name
    pub const fn new(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Create a token named after a Rust type
    pub fn of<T: ?Sized>() -> Self {
        Self(Cow::Borrowed(std::any::type_name::<T>()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn is_any(&self) -> bool {
        *self == Self::ANY
    }
}

impl From<&'static str> for TypeToken {
    fn from(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }
}

impl From<String> for TypeToken {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl fmt::Display for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

static ANY_TOKEN: TypeToken = TypeToken::ANY;

/// How a requested position relates to its base type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variance {
    /// Exactly the base type
    Exact,
    /// The base type or any subtype (`? extends T`)
    UpperBounded,
    /// The base type or any supertype (`? super T`)
    LowerBounded,
    /// Wildcard; the base is [`TypeToken::ANY`]
    Unknown,
}

/// Structural key used to resolve a generator
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    base: TypeToken,
    variance: Variance,
    params: Vec<TypeDescriptor>,
}

impl TypeDescriptor {
    pub fn exact(base: impl Into<TypeToken>) -> Self {
        Self {
            base: base.into(),
            variance: Variance::Exact,
            params: Vec::new(),
        }
    }

    pub fn upper_bounded(base: impl Into<TypeToken>) -> Self {
        Self {
            base: base.into(),
            variance: Variance::UpperBounded,
            params: Vec::new(),
        }
    }

    pub fn lower_bounded(base: impl Into<TypeToken>) -> Self {
        Self {
            base: base.into(),
            variance: Variance::LowerBounded,
            params: Vec::new(),
        }
    }

    pub fn wildcard() -> Self {
        Self {
            base: TypeToken::ANY,
            variance: Variance::Unknown,
            params: Vec::new(),
        }
    }

    /// Append a parameter descriptor
    pub fn with_param(mut self, param: impl Into<TypeDescriptor>) -> Self {
        self.params.push(param.into());
        self
    }

    /// Replace all parameter descriptors
    pub fn with_params<I>(mut self, params: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<TypeDescriptor>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn base(&self) -> &TypeToken {
        &self.base
    }

    pub fn variance(&self) -> Variance {
        self.variance
    }

    pub fn params(&self) -> &[TypeDescriptor] {
        &self.params
    }

    pub fn is_wildcard(&self) -> bool {
        self.variance == Variance::Unknown
    }

    /// The token candidates are looked up under.
    ///
    /// Both bounded variances resolve like their bound; a wildcard resolves
    /// like the top type.
    pub fn lookup_token(&self) -> &TypeToken {
        match self.variance {
            Variance::Unknown => &ANY_TOKEN,
            _ => &self.base,
        }
    }
}

impl From<&'static str> for TypeDescriptor {
    fn from(base: &'static str) -> Self {
        Self::exact(base)
    }
}

impl From<TypeToken> for TypeDescriptor {
    fn from(base: TypeToken) -> Self {
        Self::exact(base)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.variance {
            Variance::Exact => write!(f, "{}", self.base)?,
            Variance::UpperBounded => write!(f, "? extends {}", self.base)?,
            Variance::LowerBounded => write!(f, "? super {}", self.base)?,
            Variance::Unknown => return f.write_str("?"),
        }
        if !self.params.is_empty() {
            f.write_str("<")?;
            for (i, param) in self.params.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", param)?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

/// Directed graph of subtype → direct supertypes
#[derive(Debug, Clone, Default)]
pub struct TypeHierarchy {
    supertypes: HashMap<TypeToken, Vec<TypeToken>>,
}

impl TypeHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `supertype` as a direct supertype or interface of `subtype`
    pub fn declare(
        &mut self,
        subtype: impl Into<TypeToken>,
        supertype: impl Into<TypeToken>,
    ) -> &mut Self {
        let supertype = supertype.into();
        let entry = self.supertypes.entry(subtype.into()).or_default();
        if !entry.contains(&supertype) {
            entry.push(supertype);
        }
        self
    }

    /// Direct supertypes of a token, in declaration order
    pub fn direct_supertypes(&self, token: &TypeToken) -> &[TypeToken] {
        self.supertypes
            .get(token)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The token itself followed by all transitive supertypes, breadth first,
    /// ending with [`TypeToken::ANY`]. Cycles are tolerated.
    pub fn ancestry(&self, token: &TypeToken) -> Vec<TypeToken> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        let mut queue = VecDeque::from([token.clone()]);

        while let Some(next) = queue.pop_front() {
            if next.is_any() || !seen.insert(next.clone()) {
                continue;
            }
            for parent in self.direct_supertypes(&next) {
                queue.push_back(parent.clone());
            }
            order.push(next);
        }

        order.push(TypeToken::ANY);
        order
    }

    /// Whether `ancestor` appears in the ancestry of `token`
    pub fn is_assignable(&self, token: &TypeToken, ancestor: &TypeToken) -> bool {
        ancestor.is_any() || token == ancestor || self.ancestry(token).contains(ancestor)
    }
}

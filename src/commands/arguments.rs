//! Converted argument values handed to a command handler.

use crate::error::HandlerError;
use std::any::Any;
use std::fmt;

/// A type-erased converted value.
pub type ArgValue = Box<dyn Any + Send + Sync>;

/// One converted argument.
pub struct Argument {
    name: String,
    raw: String,
    value: ArgValue,
}

impl Argument {
    pub(crate) fn new(name: impl Into<String>, raw: impl Into<String>, value: ArgValue) -> Self {
        Self {
            name: name.into(),
            raw: raw.into(),
            value,
        }
    }

    /// Declared argument name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The exact text this argument consumed.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Borrow the value as `T`.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argument")
            .field("name", &self.name)
            .field("raw", &self.raw)
            .finish_non_exhaustive()
    }
}

/// The ordered call arguments of a matched command.
#[derive(Debug, Default)]
pub struct Arguments {
    items: Vec<Argument>,
}

impl Arguments {
    /// No arguments, as passed to fallback handlers.
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, argument: Argument) {
        self.items.push(argument);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Argument> {
        self.items.iter()
    }

    /// Borrow the argument called `name` as `T`.
    pub fn get<T: 'static>(&self, name: &str) -> Option<&T> {
        self.items
            .iter()
            .find(|a| a.name == name)
            .and_then(|a| a.downcast_ref::<T>())
    }

    /// Borrow the argument at `index` as `T`.
    pub fn at<T: 'static>(&self, index: usize) -> Option<&T> {
        self.items.get(index).and_then(|a| a.downcast_ref::<T>())
    }

    /// Like [`get`](Self::get), but a missing or mistyped argument is an error.
    pub fn require<T: 'static>(&self, name: &str) -> Result<&T, HandlerError> {
        self.get::<T>(name)
            .ok_or_else(|| HandlerError::MissingArgument(name.to_string()))
    }

    /// Move the argument called `name` out as `T`.
    ///
    /// The argument is removed only when it has type `T`; later positional
    /// lookups shift accordingly.
    pub fn take<T: 'static>(&mut self, name: &str) -> Option<T> {
        let pos = self
            .items
            .iter()
            .position(|a| a.name == name && a.value.is::<T>())?;
        let arg = self.items.remove(pos);
        arg.value.downcast::<T>().ok().map(|boxed| *boxed)
    }

    /// The literal text each argument consumed, in order.
    pub fn raw_tokens(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|a| a.raw.as_str())
    }

    /// Rebuild the argument text, joining each argument's raw text with `sep`.
    pub fn rejoin(&self, sep: &str) -> String {
        self.raw_tokens().collect::<Vec<_>>().join(sep)
    }
}

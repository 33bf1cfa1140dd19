use crate::functional::Validation;

/// A value that may be absent.
pub type Maybe<T> = Option<T>;

/// Bridge vocabulary on top of [`Option`].
pub trait MaybeExt<T> {
    fn is_present(&self) -> bool;

    fn or_value(self, default: T) -> T;

    fn or_compute<F: FnOnce() -> T>(self, compute: F) -> T;

    /// Applicative application: present only when both the function and the value are.
    fn apply<U, F: FnOnce(T) -> U>(self, f: Maybe<F>) -> Maybe<U>;

    fn into_validation(self, error: impl Into<String>) -> Validation<T>;
}

impl<T> MaybeExt<T> for Maybe<T> {
    fn is_present(&self) -> bool {
        self.is_some()
    }

    fn or_value(self, default: T) -> T {
        self.unwrap_or(default)
    }

    fn or_compute<F: FnOnce() -> T>(self, compute: F) -> T {
        self.unwrap_or_else(compute)
    }

    fn apply<U, F: FnOnce(T) -> U>(self, f: Maybe<F>) -> Maybe<U> {
        match (f, self) {
            (Some(f), Some(value)) => Some(f(value)),
            _ => None,
        }
    }

    fn into_validation(self, error: impl Into<String>) -> Validation<T> {
        match self {
            Some(value) => Validation::Valid(value),
            None => Validation::invalid(error),
        }
    }
}

use thiserror::Error;

pub type Errors = Vec<String>;

/// Either a value or every problem found while producing it.
///
/// Combining two validations with [`Validation::apply`] or [`Validation::zip`]
/// never stops at the first failure: errors from both operands are kept.
/// [`Validation::flat_map`] is the one short-circuiting combinator and does not
/// agree with `apply` on which errors survive; use it only when the second
/// step cannot run without the first value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation<T> {
    Valid(T),
    Invalid(Errors),
}

/// Accumulated conversion errors, as surfaced to callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .0.join("; "))]
pub struct ValidationErrors(pub Errors);

impl ValidationErrors {
    pub fn messages(&self) -> &[String] {
        &self.0
    }

    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }
}

impl<T> Validation<T> {
    pub fn valid(value: T) -> Self {
        Validation::Valid(value)
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Validation::Invalid(vec![error.into()])
    }

    pub fn invalid_all(errors: Errors) -> Self {
        debug_assert!(!errors.is_empty(), "an invalid validation needs at least one error");
        Validation::Invalid(errors)
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid(_))
    }

    pub fn is_invalid(&self) -> bool {
        !self.is_valid()
    }

    pub fn errors(&self) -> &[String] {
        match self {
            Validation::Valid(_) => &[],
            Validation::Invalid(errors) => errors,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Validation<U> {
        match self {
            Validation::Valid(value) => Validation::Valid(f(value)),
            Validation::Invalid(errors) => Validation::Invalid(errors),
        }
    }

    /// Applicative combine. When both sides are invalid the function's errors
    /// come first, followed by this value's errors.
    pub fn apply<U, F: FnOnce(T) -> U>(self, f: Validation<F>) -> Validation<U> {
        match (f, self) {
            (Validation::Valid(f), Validation::Valid(value)) => Validation::Valid(f(value)),
            (Validation::Invalid(mut errors), Validation::Invalid(more)) => {
                errors.extend(more);
                Validation::Invalid(errors)
            }
            (Validation::Invalid(errors), _) | (_, Validation::Invalid(errors)) => {
                Validation::Invalid(errors)
            }
        }
    }

    /// Pairs two validations, keeping this side's errors before `other`'s.
    pub fn zip<U>(self, other: Validation<U>) -> Validation<(T, U)> {
        match (self, other) {
            (Validation::Valid(a), Validation::Valid(b)) => Validation::Valid((a, b)),
            (Validation::Invalid(mut errors), Validation::Invalid(more)) => {
                errors.extend(more);
                Validation::Invalid(errors)
            }
            (Validation::Invalid(errors), _) | (_, Validation::Invalid(errors)) => {
                Validation::Invalid(errors)
            }
        }
    }

    /// Short-circuiting bind.
    pub fn flat_map<U, F: FnOnce(T) -> Validation<U>>(self, f: F) -> Validation<U> {
        match self {
            Validation::Valid(value) => f(value),
            Validation::Invalid(errors) => Validation::Invalid(errors),
        }
    }

    /// This validation if valid, otherwise `other`.
    pub fn or(self, other: Validation<T>) -> Validation<T> {
        if self.is_valid() { self } else { other }
    }

    pub fn unwrap_or(self, default: T) -> T {
        match self {
            Validation::Valid(value) => value,
            Validation::Invalid(_) => default,
        }
    }

    /// Prefixes every error with `prefix: `. Element indexes attach directly to
    /// the prefix, so `iceServers` over `[1]: ...` reads `iceServers[1]: ...`.
    pub fn context(self, prefix: &str) -> Validation<T> {
        match self {
            Validation::Valid(value) => Validation::Valid(value),
            Validation::Invalid(errors) => Validation::Invalid(
                errors
                    .into_iter()
                    .map(|error| {
                        if error.starts_with('[') {
                            format!("{prefix}{error}")
                        } else {
                            format!("{prefix}: {error}")
                        }
                    })
                    .collect(),
            ),
        }
    }

    pub fn into_result(self) -> Result<T, ValidationErrors> {
        match self {
            Validation::Valid(value) => Ok(value),
            Validation::Invalid(errors) => Err(ValidationErrors(errors)),
        }
    }

    pub fn from_result<E: ToString>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Validation::Valid(value),
            Err(error) => Validation::invalid(error.to_string()),
        }
    }

    /// Turns a list of validations into a validation of the list, keeping
    /// the errors of every invalid element in list order.
    pub fn sequence(validations: Vec<Validation<T>>) -> Validation<Vec<T>> {
        validations.into_iter().collect()
    }
}

impl<T> Validation<Validation<T>> {
    pub fn join(self) -> Validation<T> {
        self.flat_map(|inner| inner)
    }
}

impl<T> FromIterator<Validation<T>> for Validation<Vec<T>> {
    fn from_iter<I: IntoIterator<Item = Validation<T>>>(iter: I) -> Self {
        let mut values = Vec::new();
        let mut errors = Errors::new();
        for validation in iter {
            match validation {
                Validation::Valid(value) => values.push(value),
                Validation::Invalid(more) => errors.extend(more),
            }
        }
        if errors.is_empty() {
            Validation::Valid(values)
        } else {
            Validation::Invalid(errors)
        }
    }
}

use std::fmt;

/// Where a promise is in its lifecycle. Moves away from `Pending` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Pending,
    Resolved,
    Rejected,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Pending => f.write_str("pending"),
            Status::Resolved => f.write_str("resolved"),
            Status::Rejected => f.write_str("rejected"),
        }
    }
}

/// The outcome a promise settled with, carrying its one payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement<T, E> {
    Resolved(T),
    Rejected(E),
}

impl<T, E> Settlement<T, E> {
    pub fn status(&self) -> Status {
        match self {
            Settlement::Resolved(_) => Status::Resolved,
            Settlement::Rejected(_) => Status::Rejected,
        }
    }

    pub fn into_result(self) -> Result<T, E> {
        match self {
            Settlement::Resolved(value) => Ok(value),
            Settlement::Rejected(reason) => Err(reason),
        }
    }
}

impl<T, E> From<Result<T, E>> for Settlement<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Settlement::Resolved(value),
            Err(fault) => Settlement::Rejected(fault),
        }
    }
}

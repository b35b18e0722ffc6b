use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use super::error::DomainError;

/// Identity of an authenticated user. Only constructed from a verified credential
/// or from a row that already exists in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Principal(Uuid);

impl Principal {
    pub(crate) fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub(crate) fn id(&self) -> Uuid {
        self.0
    }
}

impl FromStr for Principal {
    type Err = DomainError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let id = Uuid::parse_str(raw).map_err(|_| DomainError::InvalidCredentials)?;
        if id.is_nil() {
            return Err(DomainError::InvalidCredentials);
        }
        Ok(Self(id))
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::Principal;

    #[test]
    fn parses_uuid_subject() {
        let id = Uuid::new_v4();
        let principal: Principal = id.to_string().parse().expect("must parse");
        assert_eq!(principal.id(), id);
    }

    #[test]
    fn rejects_malformed_and_nil_subjects() {
        assert!("not-a-uuid".parse::<Principal>().is_err());
        assert!(Uuid::nil().to_string().parse::<Principal>().is_err());
    }
}

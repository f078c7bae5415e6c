use std::fmt;

/// Scopes is a bitmask of the permissions an access token carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Scopes(u32);

const NAMES: &[(&str, Scopes)] = &[
    ("api", Scopes::API),
    ("read_api", Scopes::READ_API),
    ("read_user", Scopes::READ_USER),
    ("read_repository", Scopes::READ_REPOSITORY),
    ("write_repository", Scopes::WRITE_REPOSITORY),
    ("read_registry", Scopes::READ_REGISTRY),
    ("write_registry", Scopes::WRITE_REGISTRY),
    ("create_runner", Scopes::CREATE_RUNNER),
    ("manage_runner", Scopes::MANAGE_RUNNER),
    ("k8s_proxy", Scopes::K8S_PROXY),
    ("ai_features", Scopes::AI_FEATURES),
    ("sudo", Scopes::SUDO),
    ("admin_mode", Scopes::ADMIN_MODE),
];

impl Scopes {
    pub const API: Scopes = Scopes(1 << 0);
    pub const READ_API: Scopes = Scopes(1 << 1);
    pub const READ_USER: Scopes = Scopes(1 << 2);
    pub const READ_REPOSITORY: Scopes = Scopes(1 << 3);
    pub const WRITE_REPOSITORY: Scopes = Scopes(1 << 4);
    pub const READ_REGISTRY: Scopes = Scopes(1 << 5);
    pub const WRITE_REGISTRY: Scopes = Scopes(1 << 6);
    pub const CREATE_RUNNER: Scopes = Scopes(1 << 7);
    pub const MANAGE_RUNNER: Scopes = Scopes(1 << 8);
    pub const K8S_PROXY: Scopes = Scopes(1 << 9);
    pub const AI_FEATURES: Scopes = Scopes(1 << 10);
    pub const SUDO: Scopes = Scopes(1 << 11);
    pub const ADMIN_MODE: Scopes = Scopes(1 << 12);

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if this bitmask contains every scope in `required`.
    #[must_use]
    pub const fn has(self, required: Scopes) -> bool {
        self.0 & required.0 == required.0
    }

    #[must_use]
    pub const fn union(self, other: Scopes) -> Scopes {
        Scopes(self.0 | other.0)
    }

    /// Converts a single scope name to its bit.
    pub fn parse(s: &str) -> Option<Scopes> {
        NAMES
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, scope)| *scope)
    }

    /// Parses a comma-separated scope list such as `"api, write_repository"`.
    ///
    /// Entries are trimmed. Blank and unknown entries are collected as
    /// validation messages instead of being dropped, so the caller can report
    /// them alongside its other validation errors.
    pub fn parse_list(list: &str) -> (Scopes, Vec<String>) {
        let mut scopes = Scopes::default();
        let mut errors = Vec::new();

        for entry in list.split(',').map(str::trim) {
            if entry.is_empty() {
                errors.push("Scopes can't contain blank entries".to_string());
                continue;
            }
            match Self::parse(entry) {
                Some(scope) => scopes = scopes.union(scope),
                None => errors.push(format!(
                    "Scopes can only contain available scopes (unknown: {entry})"
                )),
            }
        }

        (scopes, errors)
    }

    #[must_use]
    pub fn to_strings(self) -> Vec<&'static str> {
        NAMES
            .iter()
            .filter(|(_, scope)| self.has(*scope))
            .map(|(name, _)| *name)
            .collect()
    }
}

impl fmt::Display for Scopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_strings().join(", "))
    }
}

impl TryFrom<i64> for Scopes {
    type Error = std::num::TryFromIntError;

    fn try_from(bits: i64) -> Result<Self, Self::Error> {
        u32::try_from(bits).map(Self)
    }
}

impl From<Scopes> for i64 {
    fn from(s: Scopes) -> Self {
        i64::from(s.0)
    }
}

use chrono::Utc;

use super::{NewAccessToken, NewUser, User};

const USERNAME_MAX_LEN: usize = 255;

/// Host-side validation rules. `errors` returns every failing rule as a full
/// sentence; an empty vector means the record may be written.
pub trait Validate {
    fn errors(&self) -> Vec<String>;
}

fn account_errors(username: &str, email: &str, name: &str, encrypted_password: &str) -> Vec<String> {
    let mut errors = Vec::new();

    if username.trim().is_empty() {
        errors.push("Username can't be blank".to_string());
    } else if username.len() > USERNAME_MAX_LEN {
        errors.push(format!(
            "Username is too long (maximum is {USERNAME_MAX_LEN} characters)"
        ));
    } else if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        errors.push(
            "Username can contain only letters, digits, '_', '-' and '.'".to_string(),
        );
    }

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {}
        _ => errors.push("Email is invalid".to_string()),
    }

    if name.trim().is_empty() {
        errors.push("Name can't be blank".to_string());
    }

    if encrypted_password.is_empty() {
        errors.push("Password can't be blank".to_string());
    }

    errors
}

impl Validate for NewUser {
    fn errors(&self) -> Vec<String> {
        account_errors(&self.username, &self.email, &self.name, &self.encrypted_password)
    }
}

impl Validate for User {
    fn errors(&self) -> Vec<String> {
        account_errors(&self.username, &self.email, &self.name, &self.encrypted_password)
    }
}

impl Validate for NewAccessToken {
    fn errors(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push("Name can't be blank".to_string());
        }
        if self.scopes.is_empty() {
            errors.push("Scopes can't be blank".to_string());
        }
        if self.expires_at <= Utc::now() {
            errors.push("Expiration date must be in the future".to_string());
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::types::Scopes;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            id: None,
            username: username.to_string(),
            email: email.to_string(),
            name: "Someone".to_string(),
            encrypted_password: "$argon2id$stub".to_string(),
            admin: false,
            confirmed_at: None,
        }
    }

    #[test]
    fn test_valid_user_has_no_errors() {
        assert!(new_user("root", "admin@example.com").errors().is_empty());
    }

    #[test]
    fn test_user_errors_are_aggregated() {
        let errors = new_user("", "not-an-email").errors();
        assert_eq!(
            errors,
            vec!["Username can't be blank".to_string(), "Email is invalid".to_string()]
        );
    }

    #[test]
    fn test_username_rejects_whitespace() {
        let errors = new_user("a b", "a@b.c").errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Username can contain only"));
    }

    #[test]
    fn test_token_rules() {
        let token = NewAccessToken {
            user_id: 1,
            name: " ".to_string(),
            scopes: Scopes::default(),
            token_digest: String::new(),
            token_lookup: String::new(),
            expires_at: Utc::now() - Duration::days(1),
        };
        assert_eq!(token.errors().len(), 3);

        let token = NewAccessToken {
            name: "ci-1700000000".to_string(),
            scopes: Scopes::API,
            expires_at: Utc::now() + Duration::days(365),
            ..token
        };
        assert!(token.errors().is_empty());
    }
}

//! Session checks backed by the stored CLI config.

use bpctl_core::session::{IdentityProvider, SessionChecker, User};
use bpctl_core::{Result, SessionError};

use crate::CliConfig;

impl SessionChecker for CliConfig {
    fn check_target(&self, require_org: bool, require_space: bool) -> Result<()> {
        let binary_name = self.binary_name.clone();

        if self.api.is_none() {
            return Err(SessionError::NoApiEndpoint { binary_name }.into());
        }

        if self.token.is_none() {
            return Err(SessionError::NotLoggedIn { binary_name }.into());
        }

        if require_org && self.org.is_none() {
            return Err(SessionError::NoOrganizationTargeted { binary_name }.into());
        }

        if require_space && self.space.is_none() {
            return Err(SessionError::NoSpaceTargeted { binary_name }.into());
        }

        Ok(())
    }
}

impl IdentityProvider for CliConfig {
    fn current_user(&self) -> Result<User> {
        match &self.user {
            Some(name) => Ok(User { name: name.clone() }),
            None => Err(SessionError::NotLoggedIn {
                binary_name: self.binary_name.clone(),
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bpctl_core::Error;

    fn logged_in() -> CliConfig {
        CliConfig {
            user: Some("the-user".to_string()),
            ..CliConfig::default()
        }
        .with_api("https://api.example.com")
        .with_token("bearer abc")
    }

    #[test]
    fn test_missing_api_endpoint() {
        let config = CliConfig::default().with_binary_name("faceman");
        assert_eq!(
            config.check_target(false, false),
            Err(Error::Session(SessionError::NoApiEndpoint {
                binary_name: "faceman".to_string()
            }))
        );
    }

    #[test]
    fn test_not_logged_in() {
        let config = CliConfig::default()
            .with_binary_name("faceman")
            .with_api("https://api.example.com");
        assert_eq!(
            config.check_target(false, false),
            Err(Error::Session(SessionError::NotLoggedIn {
                binary_name: "faceman".to_string()
            }))
        );
    }

    #[test]
    fn test_org_and_space_only_checked_when_required() {
        let config = logged_in();
        assert!(config.check_target(false, false).is_ok());
        assert!(matches!(
            config.check_target(true, false),
            Err(Error::Session(SessionError::NoOrganizationTargeted { .. }))
        ));

        let config = CliConfig {
            org: Some("o".to_string()),
            ..logged_in()
        };
        assert!(matches!(
            config.check_target(true, true),
            Err(Error::Session(SessionError::NoSpaceTargeted { .. }))
        ));
    }

    #[test]
    fn test_current_user() {
        assert_eq!(
            logged_in().current_user().unwrap(),
            User {
                name: "the-user".to_string()
            }
        );

        let anonymous = CliConfig {
            user: None,
            ..logged_in()
        };
        assert!(anonymous.current_user().unwrap_err().is_session());
    }
}

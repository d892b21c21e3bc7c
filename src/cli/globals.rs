use secrecy::SecretString;

#[derive(Clone)]
pub struct GlobalArgs {
    pub secret_key: SecretString,
    pub base_url: String,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(secret_key: SecretString, base_url: String) -> Self {
        Self {
            secret_key,
            base_url,
        }
    }
}

impl std::fmt::Debug for GlobalArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalArgs")
            .field("secret_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_global_args() {
        let args = GlobalArgs::new(
            SecretString::from("hunter2"),
            "https://freshpick.store".to_string(),
        );
        assert_eq!(args.secret_key.expose_secret(), "hunter2");
        assert_eq!(args.base_url, "https://freshpick.store");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let args = GlobalArgs::new(
            SecretString::from("hunter2"),
            "https://freshpick.store".to_string(),
        );
        let rendered = format!("{args:?}");
        assert!(rendered.contains("***"));
        assert!(!rendered.contains("hunter2"));
    }
}

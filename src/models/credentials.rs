//! 登录账号

use std::fmt;
use std::path::Path;

use crate::error::{AppError, AppResult, ConfigError};

/// 门户账号密码
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// 从两行文本解析：第一行账号，第二行密码
    pub fn parse(content: &str, source: &str) -> Result<Self, ConfigError> {
        let mut lines = content.lines();
        match (lines.next(), lines.next()) {
            (Some(username), Some(password)) => Ok(Self::new(
                username.trim_end_matches('\r'),
                password.trim_end_matches('\r'),
            )),
            _ => Err(ConfigError::MalformedCredentialsFile {
                path: source.to_string(),
            }),
        }
    }

    /// 读取账号文件
    pub async fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        Ok(Self::parse(&content, &path.display().to_string())?)
    }

    /// 按优先级确定账号：显式账号密码 > 账号文件 > 无
    pub async fn resolve(
        username: Option<String>,
        password: Option<String>,
        file: Option<&Path>,
    ) -> AppResult<Option<Self>> {
        match (username, password, file) {
            (Some(username), Some(password), _) => Ok(Some(Self::new(username, password))),
            (_, _, Some(path)) => Self::from_file(path).await.map(Some),
            _ => Ok(None),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"******")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_two_lines() {
        let creds = Credentials::parse("student01\nsecret\n", "login.txt").unwrap();
        assert_eq!(creds, Credentials::new("student01", "secret"));

        let windows = Credentials::parse("student01\r\nsecret\r\n", "login.txt").unwrap();
        assert_eq!(windows, Credentials::new("student01", "secret"));
    }

    #[test]
    fn test_parse_missing_password() {
        assert!(matches!(
            Credentials::parse("student01\n", "login.txt"),
            Err(ConfigError::MalformedCredentialsFile { .. })
        ));
    }

    #[test]
    fn test_debug_masks_password() {
        let creds = Credentials::new("student01", "secret");
        let printed = format!("{:?}", creds);
        assert!(printed.contains("student01"));
        assert!(!printed.contains("secret"));
    }

    #[tokio::test]
    async fn test_resolve_prefers_explicit_pair() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "from_file\nfile_pass").unwrap();

        let explicit = Credentials::resolve(
            Some("explicit".into()),
            Some("pass".into()),
            Some(file.path()),
        )
        .await
        .unwrap();
        assert_eq!(explicit, Some(Credentials::new("explicit", "pass")));

        let from_file = Credentials::resolve(Some("only_user".into()), None, Some(file.path()))
            .await
            .unwrap();
        assert_eq!(from_file, Some(Credentials::new("from_file", "file_pass")));

        assert_eq!(Credentials::resolve(None, None, None).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_file_is_config_error() {
        let err = Credentials::from_file("/definitely/not/here/login.txt")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::ReadFailed { .. })));
    }
}

use crate::StackError;

/// Трейт-расширение для `Result`: превращает ошибку в [`StackError`] и
/// приклеивает контекст с местом вызова.
pub trait ResultExt<T> {
    fn context<C>(
        self,
        ctx: C,
    ) -> Result<T, StackError>
    where
        C: Into<String>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<StackError>,
{
    #[track_caller]
    fn context<C>(
        self,
        ctx: C,
    ) -> Result<T, StackError>
    where
        C: Into<String>,
    {
        match self {
            Ok(value) => Ok(value),
            Err(e) => Err(e.into().context(ctx)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AuthplugResult, ConfigError, StatusCode};

    fn validate(count: usize) -> Result<(), ConfigError> {
        if count > 4 {
            return Err(ConfigError::TooManyBackends { count, max: 4 });
        }
        Ok(())
    }

    #[test]
    fn test_context_on_err() {
        fn outer(count: usize) -> AuthplugResult<()> {
            validate(count).context("building backend chain")?;
            Ok(())
        }

        assert!(outer(2).is_ok());
        let err = outer(5).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::TooManyBackends);
        assert_eq!(err.contexts().len(), 1);
        assert_eq!(err.contexts()[0].message, "building backend chain");
        assert!(err.contexts()[0].location.unwrap().file().ends_with("result.rs"));
    }

    /// Тест проверяет, что повторный `context` на `StackError` дополняет
    /// цепочку, а не оборачивает ошибку заново.
    #[test]
    fn test_context_on_stack_error_extends_chain() {
        let err = validate(9)
            .context("building backend chain")
            .context("plugin init")
            .unwrap_err();
        assert_eq!(err.contexts().len(), 2);
        assert!(err.downcast_ref::<ConfigError>().is_some());
    }
}

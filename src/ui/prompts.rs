//! Interactive prompts with CI/non-interactive fallback

use super::context::UiContext;
use crate::error::{CrashError, CrashResult};
use std::path::PathBuf;

/// Prompt for selection from a list of options
///
/// Returns the first option when not interactive.
pub async fn select<T: Clone + Send + Eq + 'static>(
    ctx: &UiContext,
    message: &str,
    options: &[(T, String, String)], // (value, label, hint)
) -> CrashResult<T> {
    let first = options
        .first()
        .ok_or_else(|| CrashError::Internal(format!("nothing to select for: {}", message)))?;
    if !ctx.is_interactive() || options.len() == 1 {
        return Ok(first.0.clone());
    }

    let message = message.to_string();
    let items = options.to_vec();

    let result: Result<Result<T, std::io::Error>, _> = tokio::task::spawn_blocking(move || {
        let mut select = cliclack::select(&message);
        for (value, label, hint) in items {
            select = select.item(value, label, hint);
        }
        select.interact()
    })
    .await;

    match result {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(CrashError::User(format!("Select failed: {}", e))),
        Err(e) => Err(CrashError::User(format!("Select task failed: {}", e))),
    }
}

/// Let the operator pick one of several files
pub async fn select_path(
    ctx: &UiContext,
    message: &str,
    paths: &[PathBuf],
) -> CrashResult<PathBuf> {
    let options: Vec<(PathBuf, String, String)> = paths
        .iter()
        .map(|path| {
            let label = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            let hint = path
                .parent()
                .map(|dir| dir.display().to_string())
                .unwrap_or_default();
            (path.clone(), label, hint)
        })
        .collect();
    select(ctx, message, &options).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn select_non_interactive_first() {
        let ctx = UiContext::non_interactive();
        let options = vec![
            ("a".to_string(), "Option A".to_string(), "First".to_string()),
            ("b".to_string(), "Option B".to_string(), "Second".to_string()),
        ];
        let result = select(&ctx, "Choose:", &options).await.unwrap();
        assert_eq!(result, "a");
    }

    #[tokio::test]
    async fn select_nothing_is_an_error() {
        let ctx = UiContext::non_interactive();
        let options: Vec<(String, String, String)> = vec![];
        assert!(select(&ctx, "Choose:", &options).await.is_err());
    }

    #[tokio::test]
    async fn select_path_single() {
        let ctx = UiContext::non_interactive();
        let paths = vec![PathBuf::from("/cache/crash/agent.dmp")];
        let picked = select_path(&ctx, "Select a dump file", &paths).await.unwrap();
        assert_eq!(picked, paths[0]);
    }
}

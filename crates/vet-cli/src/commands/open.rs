use vet_auth::navigator::is_public;
use vet_auth::{App, AuthApi};
use vet_core::Role;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::OpenArgs;
use crate::output::output;

/// Handle `vetdesk open <path>`.
pub async fn handle<A: AuthApi + 'static>(
    args: &OpenArgs,
    app: &App<A>,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let path = normalize_path(&args.path);
    if is_public(&path) {
        anyhow::bail!("open: '{path}' is public and not guarded");
    }
    let required_role = args.role.as_deref().map(Role::parse);

    let outcome = app.open(&path, required_role).await;
    output(&outcome, flags.format)
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_path;

    #[test]
    fn normalize_path_adds_leading_slash() {
        assert_eq!(normalize_path("appointments"), "/appointments");
        assert_eq!(normalize_path(" /pets "), "/pets");
    }
}

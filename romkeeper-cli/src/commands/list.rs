use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use super::Session;
use crate::CliError;

/// List root titles with their clones indented beneath them.
pub(crate) fn run_list(session: &Session) -> Result<(), CliError> {
    let catalog = session.load_catalog()?;
    let registry = &catalog.registry;

    for (depth, id) in registry.clone_tree() {
        let Some(game) = registry.get(id) else {
            continue;
        };
        let indent = "  ".repeat(depth);
        if depth == 0 {
            log::info!(
                "{}[{}] {}",
                indent,
                id.if_supports_color(Stdout, |t| t.dimmed()),
                game.name.if_supports_color(Stdout, |t| t.bold()),
            );
        } else {
            log::info!(
                "{}[{}] {}",
                indent,
                id.if_supports_color(Stdout, |t| t.dimmed()),
                game.name,
            );
        }
    }

    Ok(())
}

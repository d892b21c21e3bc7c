use crate::cli::{actions::Action, globals::GlobalArgs};
use crate::freshpick;
use anyhow::Result;

/// Handle the server action
pub async fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    match action {
        Action::Server { port, dsn } => {
            freshpick::new(port, dsn, globals).await?;
        }
    }

    Ok(())
}

//! Multi-step operations
//!
//! These workflows compose single API calls with the compose file helpers.

use serde::Serialize;
use tracing::{debug, info};

use crate::client::Client;
use crate::compose::{AliasOutcome, add_stack_alias, decode_compose_file, encode_compose_file};
use crate::error::Result;
use crate::response::Response;

/// What [`add_alias_to_stack`] did
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AliasUpdate {
    /// The stack reply was invalid or carried no compose file; nothing was sent
    ComposeUnavailable,
    /// The merge did not apply or did not cover both vhosts entries;
    /// nothing was sent
    Skipped { outcome: AliasOutcome },
    /// The compose file was posted back; this is the update reply
    Updated { response: Response },
}

impl AliasUpdate {
    /// The update reply, when one was sent
    pub fn response(&self) -> Option<&Response> {
        match self {
            AliasUpdate::Updated { response } => Some(response),
            _ => None,
        }
    }
}

/// Add a domain alias to a stack and push the new compose file
///
/// 1. Fetches the stack and decodes its compose file
/// 2. Adds `alias` to the vhosts lists of the service named after the stack
/// 3. Posts the compose file back, only if both lists were updated
///
/// A partial merge is never sent, so the server keeps a consistent pair of
/// vhosts lists. An alias with no hostname is skipped before anything is
/// posted.
///
/// # Example
///
/// ```rust,ignore
/// use sitehost_core::workflows::{AliasUpdate, add_alias_to_stack};
///
/// match add_alias_to_stack(&client, "ch-myserver", "abc123def456ab12", "www.example.com").await? {
///     AliasUpdate::Updated { response } => println!("job: {:?}", response.data_str("job_id")),
///     other => println!("not updated: {:?}", other),
/// }
/// ```
pub async fn add_alias_to_stack(
    client: &Client,
    server: &str,
    stack: &str,
    alias: &str,
) -> Result<AliasUpdate> {
    let stack_info = client.stack_info(server, stack).await;
    let Some(mut document) = decode_compose_file(&stack_info)? else {
        debug!(server, stack, "no compose file in stack reply");
        return Ok(AliasUpdate::ComposeUnavailable);
    };

    let outcome = add_stack_alias(&mut document, stack, alias);
    if !outcome.is_merged() {
        debug!(server, stack, ?outcome, "alias not merged, update skipped");
        return Ok(AliasUpdate::Skipped { outcome });
    }

    let compose = encode_compose_file(&document)?;
    info!(server, stack, alias, "posting compose file with new alias");
    let response = client
        .update_stack_docker_compose(server, stack, &compose)
        .await;

    Ok(AliasUpdate::Updated { response })
}

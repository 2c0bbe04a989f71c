//! `stack` commands

use sitehost_core::{AliasOutcome, AliasUpdate, StackUpdate, add_alias_to_stack, decode_compose_file};
use tracing::{debug, info};

use crate::cli::{OutputFormat, StackCommands};
use crate::connection::ConnectionManager;
use crate::error::{Result as CliResult, SiteHostCtlError};
use crate::output;

use super::async_utils::handle_job_response;
use super::{print_response, read_text_arg};

pub async fn handle_stack_command(
    stack_cmd: &StackCommands,
    conn_mgr: &ConnectionManager,
    profile_name: Option<&str>,
    output_format: OutputFormat,
    query: Option<&str>,
) -> CliResult<()> {
    let client = conn_mgr.create_client(profile_name)?;

    match stack_cmd {
        StackCommands::Get { server, stack } => {
            let response = client.stack_info(server, stack).await;
            print_response(
                &response,
                output_format,
                query,
                &format!("Could not read stack {} on {}", stack, server),
            )
        }

        StackCommands::Compose { server, stack } => {
            let response = client.stack_info(server, stack).await;
            if !response.is_valid() {
                return Err(SiteHostCtlError::api(
                    response.message(),
                    &format!("Could not read stack {} on {}", stack, server),
                ));
            }
            let document = decode_compose_file(&response)?.ok_or_else(|| {
                SiteHostCtlError::ApiError {
                    message: format!("Stack {} has no compose file", stack),
                }
            })?;
            let fmt = output::OutputFormat::resolve(output_format, output::OutputFormat::Yaml);
            output::print_output(&document, fmt, query)?;
            Ok(())
        }

        StackCommands::Update {
            server,
            stack,
            label,
            docker_compose,
            environments,
            async_ops,
        } => {
            let update = StackUpdate {
                label: label.clone().unwrap_or_default(),
                docker_compose: docker_compose
                    .as_deref()
                    .map(read_text_arg)
                    .transpose()?
                    .unwrap_or_default(),
                environments: environments
                    .as_deref()
                    .map(read_text_arg)
                    .transpose()?
                    .unwrap_or_default(),
            };
            if update.is_empty() {
                return Err(SiteHostCtlError::InvalidInput {
                    message: "Nothing to update: pass --label, --docker-compose or --environments"
                        .to_string(),
                });
            }

            debug!("Updating stack {} on {}", stack, server);
            let response = client.update_stack(server, stack, &update).await;
            handle_job_response(
                &client,
                &response,
                async_ops,
                output_format,
                query,
                &format!("Stack {} update queued", stack),
            )
            .await
        }

        StackCommands::Restart {
            server,
            stack,
            container,
            async_ops,
        } => {
            debug!("Restarting stack {} on {}", stack, server);
            let response = client
                .restart_stack(server, stack, container.as_deref())
                .await;
            let target = container.as_deref().unwrap_or(stack.as_str());
            handle_job_response(
                &client,
                &response,
                async_ops,
                output_format,
                query,
                &format!("Restart of {} queued", target),
            )
            .await
        }

        StackCommands::AddAlias {
            server,
            stack,
            alias,
            async_ops,
        } => match add_alias_to_stack(&client, server, stack, alias).await? {
            AliasUpdate::Updated { response } => {
                info!("Alias {} added to stack {}", alias, stack);
                handle_job_response(
                    &client,
                    &response,
                    async_ops,
                    output_format,
                    query,
                    &format!("Alias {} added to stack {}", alias, stack),
                )
                .await
            }
            AliasUpdate::ComposeUnavailable => Err(SiteHostCtlError::ApiError {
                message: format!("Could not read the compose file of stack {}", stack),
            }),
            AliasUpdate::Skipped { outcome } => Err(SiteHostCtlError::InvalidInput {
                message: skipped_message(stack, &outcome),
            }),
        },
    }
}

fn skipped_message(stack: &str, outcome: &AliasOutcome) -> String {
    match outcome {
        AliasOutcome::StackNotFound => {
            format!("Compose file has no service named {}; nothing was changed", stack)
        }
        AliasOutcome::PartiallyMerged {
            environment,
            labels,
        } => {
            let mut missing = Vec::new();
            if !environment {
                missing.push("environment VIRTUAL_HOST");
            }
            if !labels {
                missing.push("labels nz.sitehost.container.website.vhosts");
            }
            format!(
                "Service {} has no {} entry; nothing was changed",
                stack,
                missing.join(" or ")
            )
        }
        AliasOutcome::EmptyAlias => "Alias is empty; nothing was changed".to_string(),
        AliasOutcome::Merged => format!("Alias merged into {} but not sent", stack),
    }
}

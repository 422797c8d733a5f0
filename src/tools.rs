/*!
 * Command contract for agent adapters
 *
 * Describes each report command (name, parameters, description, invocation)
 * straight from the clap definitions, so an adapter that wraps the commands
 * as callable tools always sees the real CLI surface.
 */

use clap::{Arg, Command};
use serde::Serialize;

/// Commands that are not meant to be exposed as tools
const INTERNAL_COMMANDS: &[&str] = &["tools", "completions", "help"];

/// One parameter of a command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterSpec {
    /// Parameter name
    pub name: String,
    /// Whether the parameter must be given
    pub required: bool,
    /// Positional argument rather than a `--flag`
    pub positional: bool,
    /// Help text
    pub help: Option<String>,
}

/// Contract of one command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandContract {
    /// Command name
    pub name: String,
    /// Help text followed by usage instructions
    pub description: String,
    /// Parameters in declaration order
    pub parameters: Vec<ParameterSpec>,
    /// Usage line
    pub usage: String,
    /// Argument vector prefix used to invoke the command
    pub invocation: Vec<String>,
}

/// Build the contracts of every public subcommand of `cli`
pub fn command_contracts(cli: &Command) -> Vec<CommandContract> {
    cli.get_subcommands()
        .filter(|cmd| !INTERNAL_COMMANDS.contains(&cmd.get_name()))
        .map(|cmd| contract_for(cli.get_name(), cmd))
        .collect()
}

fn contract_for(bin_name: &str, cmd: &Command) -> CommandContract {
    let args: Vec<&Arg> = cmd
        .get_arguments()
        .filter(|arg| !matches!(arg.get_id().as_str(), "help" | "version"))
        .collect();

    let parameters = args
        .iter()
        .map(|arg| ParameterSpec {
            name: arg.get_id().to_string(),
            required: arg.is_required_set(),
            positional: arg.is_positional(),
            help: arg.get_help().map(|help| help.to_string()),
        })
        .collect();

    let mut usage = cmd.get_name().to_string();
    for arg in &args {
        usage.push(' ');
        usage.push_str(&usage_token(arg));
    }

    let help = cmd
        .get_about()
        .map(|about| about.to_string())
        .unwrap_or_else(|| "No description".to_string());
    let description = format!(
        "{}\nUsage: {}\nProvide arguments as a single string, separated by spaces.",
        help, usage
    );

    CommandContract {
        name: cmd.get_name().to_string(),
        description,
        parameters,
        usage,
        invocation: vec![bin_name.to_string(), cmd.get_name().to_string()],
    }
}

/// `<name>` for positionals, `[--flag]` or `[--flag <NAME>]` for options
fn usage_token(arg: &Arg) -> String {
    let id = arg.get_id().as_str();
    match arg.get_long() {
        None => format!("<{}>", id),
        Some(long) if arg.get_action().takes_values() => {
            format!("[--{} <{}>]", long, id.to_uppercase())
        }
        Some(long) => format!("[--{}]", long),
    }
}

//! Declarative command table and per-command argument parsing.

use std::collections::BTreeMap;

use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches};

use crate::client::{CliError, CliResult};
use crate::commands::arity::Arity;

const POSITIONAL: &str = "args";

/// VM state transitions that share one request shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LifecycleVerb {
    Start,
    Stop,
    ForceStop,
}

impl LifecycleVerb {
    pub(crate) const fn segment(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::ForceStop => "force_stop",
        }
    }

    pub(crate) fn path(self, name: &str) -> String {
        format!("vm/{}/{name}", self.segment())
    }
}

/// Per-VM resources that can be fetched or replaced with a file upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Attachment {
    PublicKey,
    UserData,
}

impl Attachment {
    /// Multipart field name and path prefix.
    pub(crate) const fn field(self) -> &'static str {
        match self {
            Self::PublicKey => "public_key",
            Self::UserData => "user_data",
        }
    }

    pub(crate) fn path(self, name: &str) -> String {
        format!("{}/{name}", self.field())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Handler {
    List,
    Config,
    Info,
    Lifecycle(LifecycleVerb),
    Remove,
    Register,
    Attach(Attachment),
    Ssh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OptionKind {
    /// String value, empty when absent.
    Text,
    /// Boolean switch, false when absent.
    Flag,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct OptionSpec {
    pub(crate) name: &'static str,
    pub(crate) short: Option<char>,
    pub(crate) kind: OptionKind,
    pub(crate) help: &'static str,
}

impl OptionSpec {
    const fn text(name: &'static str, help: &'static str) -> Self {
        Self {
            name,
            short: None,
            kind: OptionKind::Text,
            help,
        }
    }

    const fn flag(name: &'static str, short: Option<char>, help: &'static str) -> Self {
        Self {
            name,
            short,
            kind: OptionKind::Flag,
            help,
        }
    }
}

/// Static definition of one subcommand.
#[derive(Debug)]
pub(crate) struct Descriptor {
    pub(crate) name: &'static str,
    pub(crate) usage: &'static str,
    pub(crate) arity: Arity,
    pub(crate) about: &'static str,
    pub(crate) options: &'static [OptionSpec],
    pub(crate) handler: Handler,
}

pub(crate) const REGISTER_NAME: &str = "name";
pub(crate) const REGISTER_BASE: &str = "base";
pub(crate) const REGISTER_PUBLIC_KEY: &str = "public-key";
pub(crate) const REGISTER_USER_DATA: &str = "user-data";
pub(crate) const REGISTER_WAIT: &str = "wait";
pub(crate) const REMOVE_YES: &str = "yes";

const REGISTER_OPTIONS: &[OptionSpec] = &[
    OptionSpec::text(REGISTER_NAME, "vm name (* required)"),
    OptionSpec::text(REGISTER_BASE, "base image (* required)"),
    OptionSpec::text(
        REGISTER_PUBLIC_KEY,
        "path to ssh public key file (for root@vm)",
    ),
    OptionSpec::text(REGISTER_USER_DATA, "path to shell script executed on boot up"),
    OptionSpec::flag(REGISTER_WAIT, None, "wait for vm boot up"),
];

const REMOVE_OPTIONS: &[OptionSpec] = &[OptionSpec::flag(
    REMOVE_YES,
    Some('y'),
    "remove without asking for confirmation",
)];

pub(crate) const COMMANDS: &[Descriptor] = &[
    Descriptor {
        name: "list",
        usage: "list",
        arity: Arity::exactly(0),
        about: "List registered VMs",
        options: &[],
        handler: Handler::List,
    },
    Descriptor {
        name: "info",
        usage: "info <name>",
        arity: Arity::exactly(1),
        about: "Show details of a VM",
        options: &[],
        handler: Handler::Info,
    },
    Descriptor {
        name: "config",
        usage: "config",
        arity: Arity::exactly(0),
        about: "Show the service configuration",
        options: &[],
        handler: Handler::Config,
    },
    Descriptor {
        name: "register",
        usage: "register [options]",
        arity: Arity::between(0, 1),
        about: "Register a VM from a base image",
        options: REGISTER_OPTIONS,
        handler: Handler::Register,
    },
    Descriptor {
        name: "start",
        usage: "start <name>",
        arity: Arity::exactly(1),
        about: "Start a VM",
        options: &[],
        handler: Handler::Lifecycle(LifecycleVerb::Start),
    },
    Descriptor {
        name: "stop",
        usage: "stop <name>",
        arity: Arity::exactly(1),
        about: "Stop a VM",
        options: &[],
        handler: Handler::Lifecycle(LifecycleVerb::Stop),
    },
    Descriptor {
        name: "force_stop",
        usage: "force_stop <name>",
        arity: Arity::exactly(1),
        about: "Power off a VM immediately",
        options: &[],
        handler: Handler::Lifecycle(LifecycleVerb::ForceStop),
    },
    Descriptor {
        name: "remove",
        usage: "remove <name>",
        arity: Arity::exactly(1),
        about: "Remove a VM",
        options: REMOVE_OPTIONS,
        handler: Handler::Remove,
    },
    Descriptor {
        name: "public_key",
        usage: "public_key <name> [file]",
        arity: Arity::between(1, 2),
        about: "Show or upload the public key of a VM",
        options: &[],
        handler: Handler::Attach(Attachment::PublicKey),
    },
    Descriptor {
        name: "user_data",
        usage: "user_data <name> [file]",
        arity: Arity::between(1, 2),
        about: "Show or upload the boot script of a VM",
        options: &[],
        handler: Handler::Attach(Attachment::UserData),
    },
    Descriptor {
        name: "ssh",
        usage: "ssh <name> ...",
        arity: Arity::at_least(1),
        about: "Open an SSH session to a VM",
        options: &[],
        handler: Handler::Ssh,
    },
];

/// Look up a command by exact name.
pub(crate) fn find(name: &str) -> Option<&'static Descriptor> {
    COMMANDS.iter().find(|descriptor| descriptor.name == name)
}

/// Usage lines of every command.
pub(crate) fn overview() -> String {
    let lines: Vec<String> = COMMANDS
        .iter()
        .map(|descriptor| format!("  {:<28} {}", descriptor.usage, descriptor.about))
        .collect();
    format!(
        "Usage: mezasi [OPTIONS] <command> [arguments]\n\nCommands:\n{}",
        lines.join("\n")
    )
}

/// Arguments and options of one command invocation.
#[derive(Debug, Clone, Default)]
pub(crate) struct Invocation {
    pub(crate) usage: &'static str,
    pub(crate) args: Vec<String>,
    text: BTreeMap<&'static str, String>,
    flags: BTreeMap<&'static str, bool>,
}

impl Invocation {
    pub(crate) fn new(usage: &'static str, args: Vec<String>) -> Self {
        Self {
            usage,
            args,
            ..Self::default()
        }
    }

    #[must_use]
    pub(crate) fn with_text(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.text.insert(name, value.into());
        self
    }

    #[must_use]
    pub(crate) fn with_flag(mut self, name: &'static str, value: bool) -> Self {
        self.flags.insert(name, value);
        self
    }

    /// Value of a string option; empty when not supplied.
    pub(crate) fn text(&self, name: &str) -> &str {
        self.text.get(name).map_or("", String::as_str)
    }

    pub(crate) fn flag(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    /// The VM name, i.e. the first positional argument.
    pub(crate) fn name(&self) -> CliResult<&str> {
        self.args
            .first()
            .map(String::as_str)
            .ok_or(CliError::ArgumentCount { usage: self.usage })
    }
}

impl Descriptor {
    /// Check the positional argument count against the command's arity.
    pub(crate) fn validate(&self, args: &[String]) -> CliResult<()> {
        debug_assert_eq!(self.arity, Arity::from_usage(self.usage));
        if self.arity.accepts(args.len()) {
            Ok(())
        } else {
            Err(CliError::ArgumentCount { usage: self.usage })
        }
    }

    fn command(&self) -> clap::Command {
        let mut command = clap::Command::new(self.name)
            .about(self.about)
            .override_usage(format!("mezasi {}", self.usage))
            .no_binary_name(true)
            .disable_version_flag(true);
        for option in self.options {
            let mut arg = Arg::new(option.name).long(option.name).help(option.help);
            if let Some(short) = option.short {
                arg = arg.short(short);
            }
            arg = match option.kind {
                OptionKind::Text => arg.action(ArgAction::Set).value_name("VALUE"),
                OptionKind::Flag => arg.action(ArgAction::SetTrue),
            };
            command = command.arg(arg);
        }
        let mut positional = Arg::new(POSITIONAL)
            .action(ArgAction::Append)
            .num_args(1..)
            .value_name("ARGS");
        if self.arity.is_variadic() {
            positional = positional.trailing_var_arg(true).allow_hyphen_values(true);
        }
        command.arg(positional)
    }

    /// Parse the tokens following the command name and validate their count.
    ///
    /// Returns `Ok(None)` when help was requested and printed.
    pub(crate) fn parse(&self, tokens: &[String]) -> CliResult<Option<Invocation>> {
        let matches = match self.command().try_get_matches_from(tokens) {
            Ok(matches) => matches,
            Err(err) if err.kind() == ErrorKind::DisplayHelp => {
                err.print().map_err(CliError::failure)?;
                return Ok(None);
            }
            Err(err) => {
                return Err(CliError::Usage {
                    message: err.render().to_string().trim_end().to_string(),
                });
            }
        };

        let args: Vec<String> = matches
            .get_many::<String>(POSITIONAL)
            .map(|values| values.cloned().collect())
            .unwrap_or_default();
        self.validate(&args)?;

        Ok(Some(self.collect_options(&matches, Invocation::new(self.usage, args))))
    }

    fn collect_options(&self, matches: &ArgMatches, invocation: Invocation) -> Invocation {
        self.options
            .iter()
            .fold(invocation, |invocation, option| match option.kind {
                OptionKind::Text => {
                    let value = matches
                        .get_one::<String>(option.name)
                        .cloned()
                        .unwrap_or_default();
                    invocation.with_text(option.name, value)
                }
                OptionKind::Flag => invocation.with_flag(option.name, matches.get_flag(option.name)),
            })
    }
}

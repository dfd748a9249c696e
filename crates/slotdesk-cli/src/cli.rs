use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

/// Parsed subcommand
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Action {
    /// Local preset listing; no service access
    Presets,
    /// Commands behind the access gate
    Workflow(Workflow),
}

/// Subcommands that talk to the admissions service
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Workflow {
    Years,
    Programs,
    Summary {
        year: Option<u64>,
        filter: Option<String>,
        json: bool,
    },
    Set {
        year: Option<u64>,
        program: u64,
        max_slots: Option<String>,
        preset: Option<u32>,
    },
}

/// Global options
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Globals {
    pub(crate) config: Option<PathBuf>,
    pub(crate) base_url: Option<String>,
    pub(crate) log_json: bool,
    pub(crate) email: Option<String>,
    pub(crate) role: Option<String>,
    pub(crate) person_id: Option<String>,
    pub(crate) employee_id: Option<String>,
}

fn year_arg() -> Arg {
    Arg::new("year")
        .long("year")
        .value_parser(value_parser!(u64))
        .help("School year id (defaults to the active year)")
}

pub(crate) fn command() -> Command {
    Command::new("slotdesk")
        .version(slotdesk_core::VERSION)
        .about("Admission program slot limits for registrars")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .env("SLOTDESK_CONFIG")
                .value_parser(value_parser!(PathBuf))
                .global(true)
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .global(true)
                .help("Admissions service base URL (overrides configuration)"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Emit logs as JSON"),
        )
        .arg(
            Arg::new("email")
                .long("email")
                .env("SLOTDESK_EMAIL")
                .global(true)
                .help("Signed-in user email"),
        )
        .arg(
            Arg::new("role")
                .long("role")
                .env("SLOTDESK_ROLE")
                .global(true)
                .help("Signed-in user role"),
        )
        .arg(
            Arg::new("person-id")
                .long("person-id")
                .env("SLOTDESK_PERSON_ID")
                .global(true)
                .help("Signed-in person id"),
        )
        .arg(
            Arg::new("employee-id")
                .long("employee-id")
                .env("SLOTDESK_EMPLOYEE_ID")
                .global(true)
                .help("Employee id used for the page-access check"),
        )
        .subcommand(Command::new("years").about("List school years"))
        .subcommand(Command::new("programs").about("List programs"))
        .subcommand(Command::new("presets").about("List preset max-slots values"))
        .subcommand(
            Command::new("summary")
                .about("Show remaining slots per program")
                .arg(year_arg())
                .arg(
                    Arg::new("filter")
                        .long("filter")
                        .short('f')
                        .help("Case-insensitive filter over code, description and major"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("set")
                .about("Save or update a program's slot limit")
                .arg(year_arg())
                .arg(
                    Arg::new("program")
                        .long("program")
                        .required(true)
                        .value_parser(value_parser!(u64))
                        .help("Program id"),
                )
                .arg(
                    Arg::new("max-slots")
                        .long("max-slots")
                        .help("Maximum slots (positive integer)"),
                )
                .arg(
                    Arg::new("preset")
                        .long("preset")
                        .value_parser(value_parser!(u32))
                        .help("Preset maximum; --max-slots wins when both are given"),
                )
                .group(
                    clap::ArgGroup::new("quantity")
                        .args(["max-slots", "preset"])
                        .multiple(true)
                        .required(true),
                ),
        )
}

pub(crate) fn parse(matches: &ArgMatches) -> (Globals, Action) {
    let string = |m: &ArgMatches, id: &str| m.get_one::<String>(id).cloned();

    let globals = Globals {
        config: matches.get_one::<PathBuf>("config").cloned(),
        base_url: string(matches, "base-url"),
        log_json: matches.get_flag("log-json"),
        email: string(matches, "email"),
        role: string(matches, "role"),
        person_id: string(matches, "person-id"),
        employee_id: string(matches, "employee-id"),
    };

    let workflow = match matches.subcommand() {
        Some(("presets", _)) => return (globals, Action::Presets),
        Some(("programs", _)) => Workflow::Programs,
        Some(("summary", args)) => Workflow::Summary {
            year: args.get_one::<u64>("year").copied(),
            filter: string(args, "filter"),
            json: args.get_flag("json"),
        },
        Some(("set", args)) => Workflow::Set {
            year: args.get_one::<u64>("year").copied(),
            program: args.get_one::<u64>("program").copied().unwrap_or_default(),
            max_slots: string(args, "max-slots"),
            preset: args.get_one::<u32>("preset").copied(),
        },
        _ => Workflow::Years,
    };

    (globals, Action::Workflow(workflow))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_args(args: &[&str]) -> (Globals, Action) {
        let matches = command().try_get_matches_from(args).unwrap();
        parse(&matches)
    }

    #[test]
    fn command_is_well_formed() {
        command().debug_assert();
    }

    #[test]
    fn parses_summary() {
        let (globals, action) = parse_args(&[
            "slotdesk",
            "--role",
            "registrar",
            "summary",
            "--year",
            "3",
            "-f",
            "bsit",
            "--json",
        ]);
        assert_eq!(globals.role.as_deref(), Some("registrar"));
        assert_eq!(
            action,
            Action::Workflow(Workflow::Summary {
                year: Some(3),
                filter: Some("bsit".to_string()),
                json: true
            })
        );
    }

    #[test]
    fn parses_set_with_global_after_subcommand() {
        let (globals, action) = parse_args(&[
            "slotdesk",
            "set",
            "--program",
            "10",
            "--max-slots",
            "60",
            "--employee-id",
            "EMP-0042",
        ]);
        assert_eq!(globals.employee_id.as_deref(), Some("EMP-0042"));
        assert_eq!(
            action,
            Action::Workflow(Workflow::Set {
                year: None,
                program: 10,
                max_slots: Some("60".to_string()),
                preset: None
            })
        );
    }

    #[test]
    fn presets_is_not_a_workflow() {
        let (_, action) = parse_args(&["slotdesk", "presets"]);
        assert_eq!(action, Action::Presets);

        let (_, action) = parse_args(&["slotdesk", "years"]);
        assert_eq!(action, Action::Workflow(Workflow::Years));
    }

    #[test]
    fn set_requires_a_quantity() {
        let result = command().try_get_matches_from(["slotdesk", "set", "--program", "10"]);
        assert!(result.is_err());
    }

    #[test]
    fn subcommand_is_required() {
        assert!(command().try_get_matches_from(["slotdesk"]).is_err());
    }
}

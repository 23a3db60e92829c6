use clap::{
    Arg, ArgAction, ArgMatches,
    builder::{PossibleValue, TypedValueParser, ValueParser},
};
use derivation::{Elements, Str};
use diagnostics::{Class, Mode, Policy};
use session::{Options, UnstableOption, UnstableOptions};
use std::{
    ffi::OsStr,
    io::{self, Write},
    path::PathBuf,
};
use utility::{
    HashSet, Str,
    paint::{AnsiColor, ColorChoice, Effects, Painter},
};

pub(crate) fn arguments() -> Arguments {
    let unstable_opts = Arg::new(option::UNSTABLE_OPTION)
        .short('Z')
        .value_name("OPTION")
        .action(ArgAction::Append)
        .value_parser(UnstableOptionParser)
        .help("Set an unstable option. See ‘-Z help’ for details");

    let path_arg = Arg::new(argument::PATH)
        .required(true)
        .value_parser(ValueParser::path_buf())
        .help("The path to a source file");

    let matches = clap::Command::new("food")
        .bin_name("food")
        .version(env!("CARGO_PKG_VERSION"))
        .about("The compiler of the Food programming language")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .args([
            Arg::new(option::INCLUDE)
                .long("include")
                .short('I')
                .global(true)
                .value_name("DIR")
                .action(ArgAction::Append)
                .value_parser(ValueParser::path_buf())
                .help("Add a folder to the include search paths"),
            Arg::new(option::INFO_MODE)
                .long("info-mode")
                .global(true)
                .value_name("MODE")
                .value_parser(ModeParser)
                .help("Control how infos are treated"),
            Arg::new(option::WARNING_MODE)
                .long("warning-mode")
                .global(true)
                .value_name("MODE")
                .value_parser(ModeParser)
                .help("Control how warnings are treated"),
            Arg::new(option::SUPPRESS)
                .long("suppress")
                .global(true)
                .value_name("CLASS")
                .action(ArgAction::Append)
                .value_delimiter(',')
                .value_parser(ClassParser)
                .help("Suppress infos and warnings of the given class"),
            Arg::new(option::SHOW_SUPPRESSED)
                .long("show-suppressed")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Display suppressed diagnostics after the active ones"),
            Arg::new(option::QUIET)
                .long("quiet")
                .short('q')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Suppress status output from being printed to stdout"),
            Arg::new(option::COLOR)
                .long("color")
                .global(true)
                .value_name("WHEN")
                .value_parser(ColorChoiceParser)
                .help("Control when to use color"),
        ])
        .subcommands([
            clap::Command::new(subcommand::BUILD)
                .visible_alias("b")
                .about("Compile the given source file to assembly")
                .args([&path_arg, &unstable_opts]),
            clap::Command::new(subcommand::CHECK)
                .visible_alias("c")
                .about("Check the given source file for errors")
                .args([path_arg, unstable_opts]),
        ])
        .get_matches();

    let Some((command, matches)) = matches.subcommand() else {
        unreachable!("a subcommand is required");
    };

    let mode = match command {
        subcommand::BUILD => BuildMode::Build,
        subcommand::CHECK => BuildMode::Check,
        _ => unreachable!(),
    };

    let mut unstable = UnstableOptions::default();
    let mut unstable_help = false;

    for &option in matches.get_many::<UnstableOption>(option::UNSTABLE_OPTION).into_iter().flatten() {
        match option {
            UnstableOption::Help => unstable_help = true,
            option => unstable.set(option),
        }
    }

    let options = Options {
        include_paths: matches
            .get_many::<PathBuf>(option::INCLUDE)
            .into_iter()
            .flatten()
            .cloned()
            .collect(),
        policy: Policy {
            info: matches.get_one(option::INFO_MODE).copied().unwrap_or_default(),
            warning: matches.get_one(option::WARNING_MODE).copied().unwrap_or_default(),
            suppressed_classes: matches
                .get_many::<Str>(option::SUPPRESS)
                .into_iter()
                .flatten()
                .cloned()
                .collect::<HashSet<_>>(),
            show_suppressed: matches.get_flag(option::SHOW_SUPPRESSED),
        },
        color: matches.get_one(option::COLOR).copied().unwrap_or_default(),
        quiet: matches.get_flag(option::QUIET),
        unstable,
    };

    Arguments {
        mode,
        path: matches.get_one(argument::PATH).cloned().unwrap_or_default(),
        options,
        unstable_help,
    }
}

mod subcommand {
    pub(super) const BUILD: &str = "build";
    pub(super) const CHECK: &str = "check";
}

mod argument {
    pub(super) const PATH: &str = "PATH";
}

mod option {
    pub(super) const COLOR: &str = "color";
    pub(super) const INCLUDE: &str = "include";
    pub(super) const INFO_MODE: &str = "info_mode";
    pub(super) const QUIET: &str = "quiet";
    pub(super) const SHOW_SUPPRESSED: &str = "show_suppressed";
    pub(super) const SUPPRESS: &str = "suppress";
    pub(super) const UNSTABLE_OPTION: &str = "unstable_option";
    pub(super) const WARNING_MODE: &str = "warning_mode";
}

pub(crate) struct Arguments {
    pub(crate) mode: BuildMode,
    pub(crate) path: PathBuf,
    pub(crate) options: Options,
    /// Whether `-Z help` was passed.
    pub(crate) unstable_help: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Str)]
#[format(dash_case)]
pub enum BuildMode {
    /// Stop after the error gate.
    Check,
    /// Run the whole pipeline and write the assembly next to the source file.
    Build,
}

/// Print the list of unstable options.
pub(crate) fn unstable_help(color: ColorChoice) -> io::Result<()> {
    let mut stdout = Painter::stdout(color);

    stdout.set(Effects::BOLD | Effects::UNDERLINE)?;
    writeln!(stdout, "Unstable Options:")?;
    stdout.unset()?;

    let mut elements: Vec<_> = UnstableOption::elements()
        .map(|option| (option.name(), option.description()))
        .collect();

    let padding = elements.iter().map(|(syntax, _)| syntax.len()).max().unwrap_or_default();

    elements.sort_by_key(|&(syntax, _)| syntax);

    for (syntax, help) in elements {
        stdout.set(Effects::BOLD)?;
        write!(stdout, "    -Z {syntax:<padding$}     ")?;
        stdout.unset()?;
        writeln!(stdout, "{help}")?;
    }

    writeln!(stdout)?;

    stdout.set(AnsiColor::Red)?;
    writeln!(
        stdout,
        "\
        These options are not subject to any stability guarantees.\n\
        They may be CHANGED in their behavior or REMOVED ENTIRELY at any time and without further notice.\
        "
    )?;
    stdout.unset()?;

    stdout.flush()
}

#[derive(Clone)]
struct ColorChoiceParser;

impl TypedValueParser for ColorChoiceParser {
    type Value = ColorChoice;

    fn parse_ref(
        &self,
        _: &clap::Command,
        _: Option<&Arg>,
        source: &OsStr,
    ) -> Result<Self::Value, clap::Error> {
        let source = parse_utf8(source)?;

        source
            .parse()
            .map_err(|()| invalid_value(format!("‘{source}’ is not a valid color choice")))
    }

    fn possible_values(&self) -> Option<Box<dyn Iterator<Item = PossibleValue>>> {
        Some(Box::new(ColorChoice::elements().map(|choice| PossibleValue::new(choice.name()))))
    }
}

#[derive(Clone)]
struct ModeParser;

impl TypedValueParser for ModeParser {
    type Value = Mode;

    fn parse_ref(
        &self,
        _: &clap::Command,
        _: Option<&Arg>,
        source: &OsStr,
    ) -> Result<Self::Value, clap::Error> {
        let source = parse_utf8(source)?;

        source
            .parse()
            .map_err(|()| invalid_value(format!("‘{source}’ is not a valid diagnostic mode")))
    }

    fn possible_values(&self) -> Option<Box<dyn Iterator<Item = PossibleValue>>> {
        Some(Box::new(Mode::elements().map(|mode| PossibleValue::new(mode.name()))))
    }
}

/// Diagnostic classes are free-form strings.
#[derive(Clone)]
pub(crate) struct ClassParser;

impl TypedValueParser for ClassParser {
    type Value = Str;

    fn parse_ref(
        &self,
        _: &clap::Command,
        _: Option<&Arg>,
        source: &OsStr,
    ) -> Result<Self::Value, clap::Error> {
        let source = parse_utf8(source)?.trim();

        if source.is_empty() {
            return Err(invalid_value("the diagnostic class may not be empty".to_owned()));
        }

        Ok(Class::elements()
            .find(|class| class.name() == source)
            .map_or_else(|| Str::from(source.to_owned()), Str::from))
    }
}

#[derive(Clone)]
struct UnstableOptionParser;

impl TypedValueParser for UnstableOptionParser {
    type Value = UnstableOption;

    fn parse_ref(
        &self,
        _: &clap::Command,
        _: Option<&Arg>,
        source: &OsStr,
    ) -> Result<Self::Value, clap::Error> {
        let source = parse_utf8(source)?;

        source
            .parse()
            .map_err(|()| invalid_value(format!("‘{source}’ is not a valid unstable option")))
    }

    fn possible_values(&self) -> Option<Box<dyn Iterator<Item = PossibleValue>>> {
        Some(Box::new(
            UnstableOption::elements().map(|option| PossibleValue::new(option.name())),
        ))
    }
}

fn invalid_value(message: String) -> clap::Error {
    // @Task pass along the context instead of using `Error::raw`
    clap::Error::raw(clap::error::ErrorKind::InvalidValue, message + "\n")
}

fn parse_utf8(source: &OsStr) -> Result<&str, clap::Error> {
    source.to_str().ok_or_else(|| {
        clap::Error::raw(
            clap::error::ErrorKind::InvalidUtf8,
            format!("‘{}’ is not valid UTF-8\n", source.to_string_lossy()),
        )
    })
}

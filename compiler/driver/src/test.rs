use crate::{BuildMode, OUTPUT_EXTENSION, Pipeline, cli::ClassParser};
use clap::builder::TypedValueParser;
use diagnostics::{Mode, Policy};
use session::{Options, Session};
use std::{ffi::OsStr, fs, path::PathBuf};
use utility::paint::ColorChoice;

/// A fresh directory for a single test.
fn directory(name: &str) -> PathBuf {
    let _ = env_logger::builder().is_test(true).try_init();

    let path = std::env::temp_dir().join(format!("food-driver-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&path);
    fs::create_dir_all(&path).unwrap();
    path
}

fn session(options: Options) -> Session {
    Session::new(Options { color: ColorChoice::Never, quiet: true, ..options })
}

fn classes(session: &Session) -> Vec<String> {
    session
        .engine()
        .active()
        .iter()
        .map(|diagnostic| format!("{} {}", diagnostic.severity.name(), diagnostic.class))
        .collect()
}

#[test]
fn build_writes_assembly_next_to_the_source() {
    let directory = directory("build");
    let path = directory.join("main.food");
    fs::write(&path, "fn add(a: int, b: int) -> int { return a + b; }\nfn main() { var x = add(1, 2); x += 1; }\n").unwrap();

    let session = session(Options::default());
    let output = Pipeline::new(BuildMode::Build, &path, &session).run().unwrap();

    assert_eq!(OUTPUT_EXTENSION, "fasm");
    assert_eq!(output, Some(directory.join("main.fasm")));
    let text = fs::read_to_string(directory.join("main.fasm")).unwrap();
    assert!(text.starts_with("; generated from "), "{text}");
    assert_eq!(text.matches(".unit ").count(), 2, "{text}");
    assert!(text.contains("    call add 2\n"), "{text}");
    assert!(!session.engine().errors_encountered());
}

#[test]
fn errors_prevent_code_generation() {
    let directory = directory("error");
    let path = directory.join("main.food");
    fs::write(&path, "fn main() { y = 1; }\n").unwrap();

    let session = session(Options::default());
    let result = Pipeline::new(BuildMode::Build, &path, &session).run();

    assert!(result.is_err());
    assert!(!directory.join("main.fasm").exists());
    assert_eq!(classes(&session), ["error undefined-name"]);
}

#[test]
fn check_does_not_write_anything() {
    let directory = directory("check");
    let path = directory.join("main.food");
    fs::write(&path, "fn main() { var x = 1; x = x * 2; }\n").unwrap();

    let session = session(Options::default());
    let output = Pipeline::new(BuildMode::Check, &path, &session).run().unwrap();

    assert_eq!(output, None);
    assert!(!directory.join("main.fasm").exists());
}

#[test]
fn unreadable_files_are_reported() {
    let directory = directory("unreadable");
    let path = directory.join("missing.food");

    let session = session(Options::default());
    let result = Pipeline::new(BuildMode::Build, &path, &session).run();

    assert!(result.is_err());
    assert_eq!(classes(&session), ["error io"]);
    assert!(!directory.join("missing.fasm").exists());
}

#[test]
fn included_functions_are_generated_too() {
    let directory = directory("include");
    let library = directory.join("library");
    fs::create_dir_all(&library).unwrap();

    let path = directory.join("main.food");
    fs::write(&path, "include \"util.food\";\nfn main() { var x = one(); x = x; }\n").unwrap();
    fs::write(library.join("util.food"), "fn one() -> int { return 1; }\n").unwrap();

    let session = session(Options { include_paths: vec![library], ..Options::default() });
    let output = Pipeline::new(BuildMode::Build, &path, &session).run().unwrap();

    let Some(output) = output else { panic!("no output was written") };
    let text = fs::read_to_string(output).unwrap();
    assert!(text.contains(".unit one\n"), "{text}");
    assert!(text.contains(".unit main\n"), "{text}");
}

#[test]
fn escalated_warnings_block_the_output() {
    let directory = directory("escalated");
    let path = directory.join("main.food");
    fs::write(&path, "@frobnicate fn main() {}\n").unwrap();

    let session = session(Options {
        policy: Policy { warning: Mode::IncreasedPriority, ..Policy::default() },
        ..Options::default()
    });
    let result = Pipeline::new(BuildMode::Build, &path, &session).run();

    assert!(result.is_err());
    assert!(!directory.join("main.fasm").exists());
    assert_eq!(classes(&session), ["error unused-attribute"]);
}

#[test]
fn suppressed_warnings_do_not_block_the_output() {
    let directory = directory("suppressed");
    let path = directory.join("main.food");
    fs::write(&path, "@frobnicate fn main() {}\n").unwrap();

    let session = session(Options {
        policy: Policy {
            suppressed_classes: ["unused-attribute".into()].into_iter().collect(),
            ..Policy::default()
        },
        ..Options::default()
    });
    let result = Pipeline::new(BuildMode::Build, &path, &session).run();

    assert!(result.is_ok());
    assert_eq!(classes(&session), Vec::<String>::new());
    assert_eq!(session.engine().suppressed().len(), 1);
}

#[test]
fn suppressed_classes_are_free_form() {
    let command = clap::Command::new("food");
    let parse = |source: &str| ClassParser.parse_ref(&command, None, OsStr::new(source));

    assert_eq!(parse("unused-attribute").unwrap(), "unused-attribute");
    assert_eq!(parse("my-lint").unwrap(), "my-lint");
    assert!(parse("").is_err());
}

#[test]
fn uncatalogued_classes_can_be_suppressed() {
    let directory = directory("free-form");
    let path = directory.join("main.food");
    fs::write(&path, "fn main() {}\n").unwrap();

    let session = session(Options {
        policy: Policy {
            suppressed_classes: ["my-lint".into()].into_iter().collect(),
            ..Policy::default()
        },
        ..Options::default()
    });
    let result = Pipeline::new(BuildMode::Check, &path, &session).run();

    assert!(result.is_ok());
    assert_eq!(classes(&session), Vec::<String>::new());
}

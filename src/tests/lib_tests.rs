use super::*;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|arg| (*arg).to_owned()).collect()
}

#[test]
fn no_args_pulls_with_empty_roots() {
    let cmd = parse_command(args(&[])).expect("parse");
    assert_eq!(cmd, Command::Pull(PullArgs { roots: Vec::new() }));
}

#[test]
fn positional_args_become_roots_in_order() {
    let cmd = parse_command(args(&["/tmp/a", "relative/b"])).expect("parse");
    assert_eq!(
        cmd,
        Command::Pull(PullArgs {
            roots: vec![PathBuf::from("/tmp/a"), PathBuf::from("relative/b")],
        })
    );
}

#[test]
fn help_flag_wins_regardless_of_position() {
    assert_eq!(parse_command(args(&["--help"])), Ok(Command::Help));
    assert_eq!(parse_command(args(&["/tmp/a", "-h"])), Ok(Command::Help));
}

#[test]
fn version_flag_is_recognized() {
    assert_eq!(parse_command(args(&["--version"])), Ok(Command::Version));
    assert_eq!(parse_command(args(&["-v"])), Ok(Command::Version));
}

#[test]
fn unknown_flag_is_rejected_with_its_name() {
    let err = parse_command(args(&["--frobnicate"])).expect_err("should reject");
    assert_eq!(err, CliParseError::UnknownFlag("--frobnicate".to_owned()));
    assert_eq!(err.to_string(), "unknown flag: --frobnicate");
}

use anstyle::{AnsiColor, Color, Style};
use multipull::runner::Session;
use multipull::{parse_command, print_usage, print_version, Command};

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cmd = match parse_command(args) {
        Ok(cmd) => cmd,
        Err(err) => {
            report_error(&err);
            print_usage();
            std::process::exit(2);
        }
    };

    match cmd {
        Command::Help => print_usage(),
        Command::Version => print_version(),
        Command::Pull(args) => {
            let mut roots = args.roots;
            if roots.is_empty() {
                match std::env::current_dir() {
                    Ok(cwd) => roots.push(cwd),
                    Err(err) => {
                        report_error(&err);
                        std::process::exit(1);
                    }
                }
            }
            if let Err(err) = Session::new(roots).run() {
                report_error(&err);
                std::process::exit(1);
            }
        }
    }
}

fn report_error(err: &dyn std::error::Error) {
    let style = Style::new()
        .fg_color(Some(Color::Ansi(AnsiColor::Red)))
        .bold();
    anstream::eprintln!("{}error:{} {err}", style.render(), style.render_reset());
}
